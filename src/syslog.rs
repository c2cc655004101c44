//! Thin wrapper over the POSIX `openlog(3)`/`syslog(3)`/`closelog(3)` calls.
//!
//! libc keeps one connection per process, so only one [`Syslog`] should be
//! alive at a time. Dropping it calls `closelog`.

use std::ffi::CString;

use crate::{
    catalog::{Facility, Level},
    error::{Error, Result},
};

/// Where dispatch sends system log lines.
pub(crate) trait SystemLog {
    fn send(&self, level: Level, message: &str);
}

/// The C string handed to `syslog(3)`: no trailing newline, interior NULs
/// written out as `\0`.
pub(crate) fn syslog_message(message: &str) -> Option<CString> {
    let message = message.strip_suffix('\n').unwrap_or(message);
    CString::new(message.replace('\0', "\\0")).ok()
}

pub struct Syslog {
    // openlog keeps the pointer, so the string must outlive the connection
    _ident: CString,
}

impl Syslog {
    pub fn open(identity: &str, facility: Facility) -> Result<Self> {
        let ident =
            CString::new(identity).map_err(|_| Error::InvalidIdentity(identity.to_string()))?;
        unsafe {
            libc::openlog(
                ident.as_ptr(),
                libc::LOG_NDELAY | libc::LOG_NOWAIT | libc::LOG_PID,
                facility.syslog_code(),
            );
        }
        Ok(Self { _ident: ident })
    }
}

impl SystemLog for Syslog {
    /// Sends one message. The service adds its own `ident[pid]` prefix and
    /// line framing, so callers pass the untagged text.
    fn send(&self, level: Level, message: &str) {
        let Some(message) = syslog_message(message) else {
            return;
        };
        unsafe {
            libc::syslog(level.syslog_priority(), c"%s".as_ptr(), message.as_ptr());
        }
    }
}

impl Drop for Syslog {
    fn drop(&mut self) {
        unsafe { libc::closelog() };
    }
}
