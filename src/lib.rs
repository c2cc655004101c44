//! # fanlog
//! Process logger that composes each event once and fans it out to the
//! terminal, the system log, registered file descriptors and callback hooks.
//!
//! ## Usage
//! ```rust
//! use fanlog::{Level, logger_config, log_warn};
//!
//! let logger = logger_config()
//!     .with_identity("svc")
//!     .with_level(Level::Info)
//!     .build()
//!     .expect("valid configuration");
//! log_warn!(logger, "disk low");
//! // stderr gets "warn (at <file>:<line>, in <module>): disk low"
//! ```
//!
//! Every sink gets the same line, `svc[1234]: warn (at ...): disk low\n`.
//! The terminal and the system log skip the leading `svc[1234]: ` tag,
//! descriptors get the whole line, hooks get the whole line and the tag length.
//!
//! ## Descriptors and hooks
//! ```rust
//! use std::os::fd::AsRawFd;
//! use fanlog::{ChannelHook, logger_config};
//!
//! let file = tempfile::tempfile().unwrap();
//! let mut logger = logger_config().with_identity("svc").no_stderr().build().unwrap();
//! logger.add_descriptor(file.as_raw_fd()).unwrap();
//! let (hook, messages) = ChannelHook::channel();
//! logger.add_hook(hook).unwrap();
//!
//! fanlog::log_info!(logger, "ready on port {}", 8080);
//! assert!(messages.try_recv().unwrap().body().ends_with("ready on port 8080\n"));
//! ```
//!
//! ## The `log` facade
//! ```rust
//! use fanlog::logger_config;
//!
//! let shared = logger_config().with_identity("svc").init_global().unwrap();
//! log::info!("Hello, world!");
//! shared.lock().unwrap().set_threshold(Some(fanlog::Level::Debug));
//! log::debug!("now visible");
//! ```
//!
//! Fatal events (`Level::Fatal`, [`FatalCondition`]) write to every sink and
//! then exit with status 255.
//!
//! The logger does no locking of its own; use [`SharedLogger`] or another
//! lock around it when logging from several threads.

mod bridge;
mod catalog;
mod compose;
mod config;
mod dispatch;
mod error;
mod fatal;
mod hook;
mod logger;
mod macros;
mod registry;
mod syslog;

pub use bridge::{SharedLogger, level_from_log};
pub use catalog::{Facility, Level, facility_name, facility_num, level_name, level_num};
pub use compose::{Composed, Location};
pub use config::{FANLOG_CONFIG, FanlogConfig};
pub use dispatch::Terminal;
pub use error::{Error, Result};
pub use fatal::{FATAL_EXIT_STATUS, FatalCondition, raise, raise_code};
pub use hook::{ChannelHook, FnHook, HookArg, HookFn, HookKey, LogHook, LogMessage};
pub use logger::{ERRNO_FLAG, Logger};
pub use registry::{Flags, QUERY, SinkRegistry};

use std::{io::Write, path::Path};

/// Builder for configuring and initializing a [`Logger`].
pub struct ConfigBuilder {
    identity: Option<String>,
    facility: Facility,
    flags: Flags,
    level: Level,
    color: bool,
    terminal: Option<Terminal>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            identity: None,
            facility: Facility::User,
            flags: Flags::STDERR,
            level: FANLOG_CONFIG.level(),
            color: FANLOG_CONFIG.COLOR,
            terminal: None,
        }
    }
}

/// File name of the running program, as found in `argv[0]`.
fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

impl ConfigBuilder {
    fn with_flag(self, flag: Flags, yes: bool) -> Self {
        let flags = if yes {
            self.flags | flag
        } else {
            self.flags.without(flag)
        };
        Self { flags, ..self }
    }

    /// Sets the identity used in the tag and for the system log.
    /// Defaults to the program name.
    pub fn with_identity(self, identity: &str) -> Self {
        Self {
            identity: Some(identity.into()),
            ..self
        }
    }
    /// Sets the system log facility.
    pub fn with_facility(self, facility: Facility) -> Self {
        Self { facility, ..self }
    }
    /// Also log to the system log service.
    pub fn with_syslog(self) -> Self {
        self.with_flag(Flags::SYSLOG, true)
    }
    /// Ignore stderr logging
    pub fn no_stderr(self) -> Self {
        self.with_flag(Flags::STDERR, false)
    }
    /// Dynamically set the stderr flag.
    pub fn with_stderr(self, yes: bool) -> Self {
        self.with_flag(Flags::STDERR, yes)
    }
    /// Spell out errno names and numbers.
    pub fn with_errno_detail(self) -> Self {
        self.with_flag(Flags::ERRNO_DETAIL, true)
    }
    /// Sets the threshold. Defaults to `FANLOG_LEVEL`.
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }
    /// Color level names on the terminal. Defaults to `FANLOG_COLOR`.
    pub fn with_color(self, color: bool) -> Self {
        Self { color, ..self }
    }
    /// Write terminal output somewhere other than stderr.
    pub fn with_terminal<W: Write + Send + 'static>(self, writer: W) -> Self {
        Self {
            terminal: Some(Terminal::new(writer)),
            ..self
        }
    }

    pub fn build(self) -> Result<Logger> {
        let Self {
            identity,
            facility,
            flags,
            level,
            color,
            terminal,
        } = self;
        let mut logger = Logger::new();
        logger.set_terminal(terminal.unwrap_or_default().with_color(color));
        logger.set_threshold(Some(level));
        let identity = identity.unwrap_or_else(program_name);
        logger.configure(&identity, facility, flags)?;
        Ok(logger)
    }

    /// Builds the logger and installs it behind the `log` facade.
    /// Fails if a global logger is already set.
    pub fn init_global(self) -> Result<SharedLogger> {
        bridge::install(self.build()?)
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
