//! Bounded retries with linear backoff.
//!
//! Filesystem calls made during extraction can fail for reasons that clear up
//! on their own (a virus scanner holding a handle, a share that blinks). Every
//! such call goes through [`Retry::run`], which re-invokes the operation up to
//! [`RetryPolicy::max_attempts`] times and waits a little longer after each
//! failure.
//!
//! With the default policy an always-failing operation is attempted three
//! times, sleeping 500ms after the first failure and 1000ms after the second.
//! The error from the third attempt is returned as-is.

use std::fmt::Display;
use std::time::Duration;

use tracing::debug;

/// Delay the backoff falls back to when the accumulated delay overflows.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Attempt count and delay schedule for [`Retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    pub initial_delay: Duration,
    /// Added to the wait after every further failed attempt.
    pub backoff_increment: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_increment: Duration::from_millis(500),
        }
    }
}

/// Something that can block for a while between attempts.
pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleep + ?Sized> Sleep for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Retry executor: a [`RetryPolicy`] paired with the [`Sleep`] used for backoff.
#[derive(Debug, Clone, Default)]
pub struct Retry<S = ThreadSleep> {
    policy: RetryPolicy,
    sleeper: S,
}

impl Retry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, ThreadSleep)
    }
}

impl<S: Sleep> Retry<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// The delay before the n-th retry is `initial_delay + (n - 1) * backoff_increment`,
    /// counted from the end of the failed attempt. Only the error of the last
    /// attempt is returned; earlier errors are dropped.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                debug!(attempt, error = %err, "giving up after final attempt");
                return Err(err);
            }

            debug!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            self.sleeper.sleep(delay);

            delay = delay
                .checked_add(self.policy.backoff_increment)
                .unwrap_or(DEFAULT_INITIAL_DELAY);
        }
    }

    /// Same as [`run`](Self::run), discarding whatever `op` produces.
    pub fn run_effect<T, E, F>(&self, op: F) -> Result<(), E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        self.run(op).map(drop)
    }
}

/// Run `op` under the default policy, sleeping on the current thread.
pub fn with_retries<T, E, F>(op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    Retry::new(RetryPolicy::default()).run(op)
}
