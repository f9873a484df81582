#![allow(dead_code)]

use std::path::{Path, PathBuf};

use walkv::{LogRecord, RecoveryMode, SyncPolicy, Wal};
use walkv::wal::writer::WALWriter;

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn make_record(i: usize) -> LogRecord {
    LogRecord::put(format!("key{}", i), format!("val{}", i))
}

/// Write `count` put records to `<dir>/test.wal` and return the path.
pub fn write_test_wal(dir: &Path, count: usize) -> PathBuf {
    let path = dir.join("test.wal");
    let mut writer = WALWriter::new(&path, SyncPolicy::EveryWrite).unwrap();
    for i in 0..count {
        writer.append(&make_record(i)).unwrap();
    }
    writer.sync().unwrap();
    path
}

pub fn open_wal(path: &Path, recovery: RecoveryMode) -> Wal {
    Wal::open(path, SyncPolicy::EveryWrite, recovery).unwrap()
}

/// Chop `n` bytes off the end of a file, as a crash mid-append would.
pub fn chop_tail(path: &Path, n: u64) {
    let len = std::fs::metadata(path).unwrap().len();
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(len - n).unwrap();
}
