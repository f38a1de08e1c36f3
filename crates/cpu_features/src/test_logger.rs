//! In-memory `log` sink for tests.

use core::fmt::Write;

use arrayvec::ArrayString;
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub type Captured = ArrayString<{ 16 * 1024 }>;

static CAPTURED: Mutex<Captured> = Mutex::new(ArrayString::new_const());

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        // records past capacity are dropped
        let _ = writeln!(CAPTURED.lock(), "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Installs the sink. Repeated calls from other tests are harmless.
pub fn install() {
    let _ = log::set_logger(&Capture);
    log::set_max_level(LevelFilter::Trace);
}

/// A copy of everything logged so far.
pub fn captured() -> Captured {
    *CAPTURED.lock()
}
