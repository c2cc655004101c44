//! Fan-out of a composed line to every active sink.
//!
//! | sink        | receives                         |
//! |-------------|----------------------------------|
//! | terminal    | the line without its tag         |
//! | syslog      | the line without its tag         |
//! | descriptors | the whole line                   |
//! | hooks       | the whole line and the tag length|
//!
//! Delivery is best effort: a failing sink is skipped and the others are
//! still written.

use std::{
    cell::RefCell,
    fmt,
    io::{self, Write},
    os::fd::{BorrowedFd, RawFd},
    sync::Arc,
};

use colored::Colorize;
use nix::{errno::Errno, unistd};

use crate::{
    catalog::Level, compose::Composed, hook::LogHook, registry::Flags, syslog::SystemLog,
};

/// The local terminal stream, stderr unless replaced.
pub struct Terminal {
    writer: Box<dyn Write + Send>,
    color: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
            color: false,
        }
    }

    /// Color the level name. Only the terminal is ever colored.
    pub fn with_color(self, color: bool) -> Self {
        Self { color, ..self }
    }

    /// Writes `line`, which starts with the level name.
    fn write_line(&mut self, level: Level, line: &str) -> io::Result<()> {
        match line.strip_prefix(level.name()) {
            Some(rest) if self.color => {
                let name = match level {
                    Level::Fatal | Level::Error => level.name().red(),
                    Level::Warn => level.name().yellow(),
                    Level::Info => level.name().green(),
                    Level::Debug => level.name().blue(),
                };
                write!(self.writer, "{name}{rest}")?;
            }
            _ => self.writer.write_all(line.as_bytes())?,
        }
        self.writer.flush()
    }
}

/// Descriptors are borrowed from the caller, who keeps them open while
/// registered.
fn borrow(fd: RawFd) -> io::Result<BorrowedFd<'static>> {
    if fd < 0 {
        return Err(Errno::EBADF.into());
    }
    Ok(unsafe { BorrowedFd::borrow_raw(fd) })
}

/// Fails unless `fd` is open for writing.
pub(crate) fn probe_writable(fd: RawFd) -> io::Result<()> {
    unistd::write(borrow(fd)?, b"")?;
    Ok(())
}

fn write_fd(fd: RawFd, mut buf: &[u8]) -> io::Result<()> {
    let fd = borrow(fd)?;
    while !buf.is_empty() {
        match unistd::write(fd, buf) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(written) => buf = &buf[written..],
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno.into()),
        }
    }
    Ok(())
}

pub(crate) struct Sinks<'a> {
    pub flags: Flags,
    pub terminal: &'a RefCell<Terminal>,
    pub syslog: Option<&'a dyn SystemLog>,
    pub descriptors: &'a [RawFd],
    pub hooks: &'a [Arc<dyn LogHook>],
}

pub(crate) fn dispatch(composed: &Composed, level: Level, sinks: &Sinks<'_>) {
    if sinks.flags.contains(Flags::STDERR) {
        // already borrowed means a hook is logging from inside a terminal write
        if let Ok(mut terminal) = sinks.terminal.try_borrow_mut() {
            terminal.write_line(level, composed.body()).ok();
        }
    }
    if sinks.flags.contains(Flags::SYSLOG)
        && let Some(syslog) = sinks.syslog
    {
        syslog.send(level, composed.body());
    }
    for &fd in sinks.descriptors {
        write_fd(fd, composed.text().as_bytes()).ok();
    }
    for hook in sinks.hooks {
        hook.on_message(composed.text(), composed.tag_len());
    }
}
