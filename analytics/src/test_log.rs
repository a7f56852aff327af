//! Captures log records per test thread.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::{const_mutex, Mutex};
use std::sync::Once;
use std::thread::ThreadId;

struct Capture;

static CAPTURE: Capture = Capture;
static RECORDS: Mutex<Vec<(ThreadId, Level, String)>> = const_mutex(Vec::new());

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .push((std::thread::current().id(), record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Warnings logged by the current thread.
pub fn warnings() -> Vec<String> {
    let current = std::thread::current().id();
    RECORDS
        .lock()
        .iter()
        .filter(|(thread, level, _)| *thread == current && *level == Level::Warn)
        .map(|(_, _, message)| message.clone())
        .collect()
}
