use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::retry::RetryPolicy;

#[derive(Parser, Debug)]
#[command(name = "retryzip")]
#[command(version)]
#[command(about = "Extract a ZIP archive, keeping timestamps and retrying flaky filesystem calls", long_about = None)]
#[command(after_help = "Examples:\n  \
  retryzip data1.zip -d out            extract data1.zip into out/\n  \
  retryzip --retries 5 pkg.zip         allow five attempts per filesystem call\n  \
  RUST_LOG=retryzip=debug retryzip pkg.zip   log every entry and retry")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// Attempts per filesystem operation
    #[arg(
        long,
        value_name = "N",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub retries: u32,

    /// Wait after the first failed attempt, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub retry_delay_ms: u64,

    /// Added to the wait after each further failure, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub retry_backoff_ms: u64,

    /// Log each entry and retry to stderr
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode: no summary line
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn destination(&self) -> PathBuf {
        self.extract_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            backoff_increment: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}
