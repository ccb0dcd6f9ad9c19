//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::NaiveDate;
use filetime::FileTime;
use retryzip::Sleep;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Calendar stamp used by the fixtures: (year, month, day, hour, minute, second).
pub type Stamp = (u16, u8, u8, u8, u8, u8);

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct RecordingSleep {
    pub delays: RefCell<Vec<Duration>>,
}

impl Sleep for RecordingSleep {
    fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

impl RecordingSleep {
    pub fn millis(&self) -> Vec<u128> {
        self.delays.borrow().iter().map(Duration::as_millis).collect()
    }
}

/// Unix seconds of a stamp read as UTC.
pub fn utc(stamp: Stamp) -> i64 {
    let (year, month, day, hour, minute, second) = stamp;
    NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
        .unwrap()
        .and_hms_opt(hour.into(), minute.into(), second.into())
        .unwrap()
        .and_utc()
        .timestamp()
}

/// Modification time of `path` in Unix seconds.
pub fn mtime(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap()).unix_seconds()
}

pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Archives written through the `zip` crate.
pub struct ZipFixture {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipFixture {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options(method: zip::CompressionMethod, stamp: Stamp) -> SimpleFileOptions {
        let (year, month, day, hour, minute, second) = stamp;
        let time =
            zip::DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap();
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(time)
    }

    pub fn stored(mut self, name: &str, data: &[u8], stamp: Stamp) -> Self {
        let options = Self::options(zip::CompressionMethod::Stored, stamp);
        self.zip.start_file(name, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    pub fn deflated(mut self, name: &str, data: &[u8], stamp: Stamp) -> Self {
        let options = Self::options(zip::CompressionMethod::Deflated, stamp);
        self.zip.start_file(name, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    pub fn dir(mut self, name: &str, stamp: Stamp) -> Self {
        let options = Self::options(zip::CompressionMethod::Stored, stamp);
        self.zip.add_directory(name, options).unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

/// Minimal STORED-only writer for archives the `zip` crate refuses to produce:
/// duplicate names, wrong CRCs, hand-made extra fields.
#[derive(Default)]
pub struct RawZip {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl RawZip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, data: &[u8], stamp: Stamp) -> Self {
        let crc = crc32(data);
        self.push(name, data, stamp, crc, &[])
    }

    pub fn stored_with_crc(self, name: &str, data: &[u8], stamp: Stamp, crc: u32) -> Self {
        self.push(name, data, stamp, crc, &[])
    }

    /// Adds an extended timestamp field carrying `unix_mtime` to the central header.
    pub fn stored_with_unix_mtime(
        self,
        name: &str,
        data: &[u8],
        stamp: Stamp,
        unix_mtime: i32,
    ) -> Self {
        let mut extra = Vec::new();
        extra.write_u16::<LittleEndian>(0x5455).unwrap();
        extra.write_u16::<LittleEndian>(5).unwrap();
        extra.write_u8(0x01).unwrap();
        extra.write_i32::<LittleEndian>(unix_mtime).unwrap();
        let crc = crc32(data);
        self.push(name, data, stamp, crc, &extra)
    }

    fn push(
        mut self,
        name: &str,
        data: &[u8],
        stamp: Stamp,
        crc: u32,
        central_extra: &[u8],
    ) -> Self {
        let (time, date) = dos(stamp);
        let offset = self.body.len() as u32;
        let size = data.len() as u32;

        let lfh = &mut self.body;
        lfh.write_all(b"PK\x03\x04").unwrap();
        lfh.write_u16::<LittleEndian>(20).unwrap(); // version needed
        lfh.write_u16::<LittleEndian>(0).unwrap(); // flags
        lfh.write_u16::<LittleEndian>(0).unwrap(); // stored
        lfh.write_u16::<LittleEndian>(time).unwrap();
        lfh.write_u16::<LittleEndian>(date).unwrap();
        lfh.write_u32::<LittleEndian>(crc).unwrap();
        lfh.write_u32::<LittleEndian>(size).unwrap();
        lfh.write_u32::<LittleEndian>(size).unwrap();
        lfh.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap();
        lfh.write_all(name.as_bytes()).unwrap();
        lfh.write_all(data).unwrap();

        let cd = &mut self.central;
        cd.write_all(b"PK\x01\x02").unwrap();
        cd.write_u16::<LittleEndian>(20).unwrap(); // version made by
        cd.write_u16::<LittleEndian>(20).unwrap(); // version needed
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(time).unwrap();
        cd.write_u16::<LittleEndian>(date).unwrap();
        cd.write_u32::<LittleEndian>(crc).unwrap();
        cd.write_u32::<LittleEndian>(size).unwrap();
        cd.write_u32::<LittleEndian>(size).unwrap();
        cd.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        cd.write_u16::<LittleEndian>(central_extra.len() as u16).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap(); // comment length
        cd.write_u16::<LittleEndian>(0).unwrap(); // disk number start
        cd.write_u16::<LittleEndian>(0).unwrap(); // internal attributes
        cd.write_u32::<LittleEndian>(0).unwrap(); // external attributes
        cd.write_u32::<LittleEndian>(offset).unwrap();
        cd.write_all(name.as_bytes()).unwrap();
        cd.write_all(central_extra).unwrap();

        self.count += 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = self.body;
        let cd_offset = out.len() as u32;
        out.extend_from_slice(&self.central);

        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.count).unwrap();
        out.write_u16::<LittleEndian>(self.count).unwrap();
        out.write_u32::<LittleEndian>(self.central.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out
    }
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

/// DOS (time, date) words for a stamp.
fn dos(stamp: Stamp) -> (u16, u16) {
    let (year, month, day, hour, minute, second) = stamp;
    let time = (u16::from(hour) << 11) | (u16::from(minute) << 5) | (u16::from(second) / 2);
    let date = ((year - 1980) << 9) | (u16::from(month) << 5) | u16::from(day);
    (time, date)
}
