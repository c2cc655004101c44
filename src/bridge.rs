//! Routes the `log` crate macros into a [`Logger`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{LevelFilter, Log};

use crate::{catalog::Level, compose::Location, error::Result, logger::Logger};

/// A logger shared across threads; the mutex serializes every call.
pub type SharedLogger = Arc<Mutex<Logger>>;

/// `log` has no fatal level, and `trace` folds into `debug`.
pub fn level_from_log(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

fn lock(logger: &SharedLogger) -> MutexGuard<'_, Logger> {
    logger.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LogBridge {
    logger: SharedLogger,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        level_from_log(metadata.level()).passes(lock(&self.logger).threshold())
    }

    fn log(&self, record: &log::Record) {
        let location = match (record.file(), record.line(), record.module_path()) {
            (Some(file), Some(line), Some(module)) => Some(Location::new(file, line, module)),
            _ => None,
        };
        lock(&self.logger).emit(location, level_from_log(record.level()), false, *record.args());
    }

    fn flush(&self) {}
}

/// Installs `logger` behind the `log` facade and returns a handle to it.
///
/// The threshold stays the only gate: `log`'s max level is opened fully so
/// later threshold changes through the handle take effect.
pub(crate) fn install(logger: Logger) -> Result<SharedLogger> {
    let shared = Arc::new(Mutex::new(logger));
    log::set_boxed_logger(Box::new(LogBridge {
        logger: Arc::clone(&shared),
    }))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(shared)
}
