//! Logger setup for the watcher.
//!
//! The watcher logs through the `log` facade with an `env_logger` backend
//! configured for a dual sink: every record goes to the console and is
//! appended to a log file, so an unattended daemon keeps a history while an
//! attended run stays readable. `RUST_LOG` overrides the default `info`
//! level. The interactive commands (`auth`, `completions`) do not touch the
//! logger and keep using the colored console macros.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
};

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Writer that duplicates every record to stdout and an append-only file.
struct DualSink {
    file: File,
}

impl Write for DualSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

/// Initializes the global logger with console and file sinks.
///
/// # Errors
///
/// Returns an error string when the log file cannot be opened for appending
/// or when a logger was already installed.
pub fn init(log_path: &str) -> Result<(), String> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| format!("cannot open log file {}: {}", log_path, e))?;

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .target(Target::Pipe(Box::new(DualSink { file })))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        });

    builder
        .try_init()
        .map_err(|e| format!("failed to initialize logger: {}", e))
}
