use std::os::fd::RawFd;

/// Errors returned by the configuration and registry calls.
///
/// Emission never fails from the caller's point of view, so nothing here is
/// produced while writing to sinks.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid identity {0:?}: must be non-empty and contain no '%' or NUL")]
    InvalidIdentity(String),
    #[error("invalid log facility {0}")]
    InvalidFacility(i64),
    #[error("illegal flags {0:#x}")]
    IllegalFlags(u32),
    #[error("invalid log level {0}")]
    InvalidLevel(i64),
    #[error("unknown log level name {0:?}")]
    UnknownLevel(String),
    #[error("descriptor {fd} is not writable: {source}")]
    InvalidHandle {
        fd: RawFd,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is already registered")]
    AlreadyExists(&'static str),
    #[error("{0} is not registered")]
    NotFound(&'static str),
    #[error("could not install the global logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;
