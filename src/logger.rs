use std::{cell::RefCell, fmt, io, os::fd::RawFd, sync::Arc};

use crate::{
    catalog::{Facility, Level},
    compose::{ErrnoSuffix, Event, Location, compose},
    dispatch::{Sinks, Terminal, dispatch},
    error::{Error, Result},
    fatal::{FATAL_EXIT_STATUS, FatalCondition},
    hook::LogHook,
    registry::{Flags, SinkRegistry},
    syslog::{Syslog, SystemLog},
};

/// Bit set on a raw level ordinal to request the errno suffix, see
/// [`Logger::emit_raw`].
pub const ERRNO_FLAG: u32 = 1 << 31;

/// The logging context: identity, destinations and registered sinks.
///
/// Create it once at startup and hand `&Logger` to the call sites. Nothing
/// in here locks; when several threads log, serialize access around the
/// whole logger (see [`crate::SharedLogger`]).
#[derive(Default)]
pub struct Logger {
    identity: String,
    facility: Facility,
    registry: SinkRegistry,
    terminal: RefCell<Terminal>,
    syslog: Option<Syslog>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("identity", &self.identity)
            .field("facility", &self.facility)
            .field("registry", &self.registry)
            .field("syslog", &self.syslog.is_some())
            .finish()
    }
}

fn validate_identity(identity: &str) -> Result<()> {
    if identity.is_empty() || identity.contains(['%', '\0']) {
        return Err(Error::InvalidIdentity(identity.to_string()));
    }
    Ok(())
}

impl Logger {
    /// An unconfigured logger: no destinations, `info` threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets identity, facility and destinations. Nothing changes on error.
    ///
    /// With [`Flags::SYSLOG`] the system log is opened under `identity`; a
    /// discouraged facility is then reported as a `warn` event.
    pub fn configure(&mut self, identity: &str, facility: Facility, flags: Flags) -> Result<()> {
        validate_identity(identity)?;
        self.syslog = None;
        if flags.contains(Flags::SYSLOG) {
            self.syslog = Some(Syslog::open(identity, facility)?);
        }
        self.identity = identity.to_string();
        self.facility = facility;
        self.registry.set_flags(flags);

        if self.syslog.is_some() && facility.discouraged() {
            self.emit(
                None,
                Level::Warn,
                false,
                format_args!("dangerous log facility specified: {facility}"),
            );
        }
        Ok(())
    }

    /// [`Logger::configure`] taking a facility ordinal and raw flag bits.
    pub fn configure_raw(&mut self, identity: &str, facility: i64, flags: u32) -> Result<()> {
        validate_identity(identity)?;
        let facility = Facility::from_ordinal(facility)?;
        let flags = Flags::from_bits(flags)?;
        self.configure(identity, facility, flags)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    pub fn flags(&self) -> Flags {
        self.registry.flags()
    }

    pub fn registry(&self) -> &SinkRegistry {
        &self.registry
    }

    /// Swaps the terminal stream and returns the previous one.
    pub fn set_terminal(&mut self, terminal: Terminal) -> Terminal {
        self.terminal.replace(terminal)
    }

    pub fn threshold(&self) -> Level {
        self.registry.threshold()
    }

    /// Returns the previous threshold; `None` just reads it.
    pub fn set_threshold(&mut self, level: Option<Level>) -> Level {
        self.registry.set_threshold(level)
    }

    pub fn set_threshold_ordinal(&mut self, ordinal: i64) -> Result<Level> {
        self.registry.set_threshold_ordinal(ordinal)
    }

    pub fn add_descriptor(&mut self, fd: RawFd) -> Result<()> {
        self.registry.add_descriptor(fd)
    }

    pub fn remove_descriptor(&mut self, fd: RawFd) -> Result<()> {
        self.registry.remove_descriptor(fd)
    }

    pub fn add_hook(&mut self, hook: Arc<dyn LogHook>) -> Result<()> {
        self.registry.add_hook(hook)
    }

    pub fn remove_hook<H: LogHook + ?Sized>(&mut self, hook: &Arc<H>) -> Result<()> {
        self.registry.remove_hook(hook)
    }

    /// Composes one event and writes it to every active sink.
    ///
    /// Events less severe than the threshold are dropped without a trace.
    /// With `with_errno`, the errno value current at the call is appended.
    /// A [`Level::Fatal`] event exits the process with status 255 once every
    /// sink has been written, whether or not any sink is enabled.
    pub fn emit(
        &self,
        location: Option<Location<'_>>,
        level: Level,
        with_errno: bool,
        args: fmt::Arguments<'_>,
    ) {
        let errno = with_errno.then(|| io::Error::last_os_error().raw_os_error().unwrap_or(0));
        if !level.passes(self.registry.threshold()) {
            return;
        }
        let flags = self.registry.flags();
        let composed = compose(&Event {
            identity: &self.identity,
            pid: std::process::id(),
            level,
            location,
            errno: errno.map(|code| ErrnoSuffix {
                code,
                verbose: flags.contains(Flags::ERRNO_DETAIL),
            }),
            args,
        });
        dispatch(
            &composed,
            level,
            &Sinks {
                flags,
                terminal: &self.terminal,
                syslog: self
                    .syslog
                    .as_ref()
                    .map(|syslog| syslog as &dyn SystemLog),
                descriptors: self.registry.descriptors(),
                hooks: self.registry.hooks(),
            },
        );
        if level.terminates() {
            std::process::exit(FATAL_EXIT_STATUS);
        }
    }

    /// [`Logger::emit`] taking a level ordinal, optionally or'ed with
    /// [`ERRNO_FLAG`]. Unknown ordinals are dropped silently.
    pub fn emit_raw(&self, location: Option<Location<'_>>, raw: u32, args: fmt::Arguments<'_>) {
        let with_errno = raw & ERRNO_FLAG != 0;
        if let Some(level) = Level::from_ordinal(i64::from(raw & !ERRNO_FLAG)) {
            self.emit(location, level, with_errno, args);
        }
    }

    /// Reports a predefined condition. Every condition is fatal.
    pub fn raise(&self, condition: FatalCondition) -> ! {
        crate::fatal::raise(self, condition)
    }

    /// Back to the state of [`Logger::new`]: closes the system log, forgets
    /// descriptors (without closing them) and hooks, restores stderr.
    pub fn teardown(&mut self) {
        self.syslog = None;
        self.identity.clear();
        self.facility = Facility::User;
        self.registry.clear();
        self.terminal.replace(Terminal::stderr());
    }
}
