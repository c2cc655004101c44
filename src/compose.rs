//! Builds the rendered line for one event.
//!
//! ```text
//! {identity}[{pid}]: {level}[ (at {file}:{line}, in {function})]: {message}[{errno}]\n
//! ^------- tag ------^
//! ```
//!
//! Composition runs twice over the same segments. The first pass only counts
//! bytes, the buffer is then allocated at exactly that size, and the second
//! pass writes through a writer that refuses to go past the measured length.
//! `fmt::Arguments` may interpolate anything, so its length is only known
//! once it has been formatted.

use std::fmt::{self, Write};

use nix::errno::Errno;

use crate::catalog::Level;

/// Where an event was raised. Only rendered when all three parts are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub file: &'a str,
    pub line: u32,
    pub function: &'a str,
}

impl<'a> Location<'a> {
    pub const fn new(file: &'a str, line: u32, function: &'a str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.file.is_empty() && self.line != 0 && !self.function.is_empty()
    }
}

/// The `: description` suffix, optionally followed by ` (NAME = number)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrnoSuffix {
    pub code: i32,
    pub verbose: bool,
}

impl fmt::Display for ErrnoSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errno = Errno::from_raw(self.code);
        write!(f, ": {}", errno.desc())?;
        if self.verbose {
            write!(f, " ({errno:?} = {})", self.code)?;
        }
        Ok(())
    }
}

/// A rendered event: the full line and the length of its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    text: String,
    tag_len: usize,
}

impl Composed {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// The line with the tag skipped.
    pub fn body(&self) -> &str {
        &self.text[self.tag_len..]
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct Event<'a> {
    pub identity: &'a str,
    pub pid: u32,
    pub level: Level,
    pub location: Option<Location<'a>>,
    pub errno: Option<ErrnoSuffix>,
    pub args: fmt::Arguments<'a>,
}

impl Event<'_> {
    fn write_tag<W: Write>(&self, w: &mut W) -> fmt::Result {
        write!(w, "{}[{}]: ", self.identity, self.pid)
    }

    fn write_body<W: Write>(&self, w: &mut W) -> fmt::Result {
        w.write_str(self.level.name())?;
        if let Some(location) = self.location.filter(Location::is_complete) {
            write!(
                w,
                " (at {}:{}, in {})",
                location.file, location.line, location.function
            )?;
        }
        w.write_str(": ")?;
        w.write_fmt(self.args)?;
        if let Some(errno) = self.errno {
            write!(w, "{errno}")?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Measure(usize);

impl Write for Measure {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Appends to `buf` up to `limit` bytes, cutting on a char boundary.
struct Bounded<'b> {
    buf: &'b mut String,
    limit: usize,
}

impl Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        Err(fmt::Error)
    }
}

pub fn compose(event: &Event<'_>) -> Composed {
    // A Display impl that fails cuts the line short in both passes alike.
    let mut measure = Measure::default();
    let _ = event.write_tag(&mut measure);
    let tag_len = measure.0;
    let _ = event.write_body(&mut measure);
    let body_end = measure.0;

    let mut text = String::with_capacity(body_end + 1);
    let mut out = Bounded {
        buf: &mut text,
        limit: body_end,
    };
    let _ = event
        .write_tag(&mut out)
        .and_then(|()| event.write_body(&mut out));
    text.push('\n');

    Composed {
        tag_len: tag_len.min(text.len() - 1),
        text,
    }
}
