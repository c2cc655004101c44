use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
    os::fd::RawFd,
    sync::Arc,
};

use crate::{
    catalog::Level,
    dispatch::probe_writable,
    error::{Error, Result},
    hook::LogHook,
};

/// Sentinel ordinal for [`SinkRegistry::set_threshold_ordinal`] that reads the
/// threshold without changing it.
pub const QUERY: i64 = -1;

/// Enabled destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u32);

impl Flags {
    /// Send events to the system log service.
    pub const SYSLOG: Flags = Flags(1);
    /// Send events to the terminal stream.
    pub const STDERR: Flags = Flags(2);
    /// Spell out errno as `NAME = number` after its description.
    pub const ERRNO_DETAIL: Flags = Flags(4);

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn all() -> Self {
        Flags(Self::SYSLOG.0 | Self::STDERR.0 | Self::ERRNO_DETAIL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rejects any bit outside [`Flags::all`].
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::all().0 != 0 {
            return Err(Error::IllegalFlags(bits));
        }
        Ok(Flags(bits))
    }

    pub const fn without(self, other: Flags) -> Self {
        Flags(self.0 & !other.0)
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

/// Destination flags, threshold, and the registered descriptors and hooks.
///
/// Descriptors are borrowed: the registry never closes them. Both
/// collections keep registration order, which is also delivery order.
pub struct SinkRegistry {
    flags: Flags,
    threshold: Level,
    descriptors: Vec<RawFd>,
    hooks: Vec<Arc<dyn LogHook>>,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self {
            flags: Flags::empty(),
            threshold: Level::Info,
            descriptors: Vec::new(),
            hooks: Vec::new(),
        }
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("flags", &self.flags)
            .field("threshold", &self.threshold)
            .field("descriptors", &self.descriptors)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub(crate) fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    /// Replaces the threshold and returns the previous one. `None` only
    /// reads the current threshold.
    pub fn set_threshold(&mut self, level: Option<Level>) -> Level {
        match level {
            Some(level) => std::mem::replace(&mut self.threshold, level),
            None => self.threshold,
        }
    }

    /// Ordinal form of [`SinkRegistry::set_threshold`], with [`QUERY`] as the
    /// read-only sentinel.
    pub fn set_threshold_ordinal(&mut self, ordinal: i64) -> Result<Level> {
        if ordinal == QUERY {
            return Ok(self.threshold);
        }
        let level = Level::from_ordinal(ordinal).ok_or(Error::InvalidLevel(ordinal))?;
        Ok(self.set_threshold(Some(level)))
    }

    pub fn descriptors(&self) -> &[RawFd] {
        &self.descriptors
    }

    /// Registers `fd` after checking it accepts a zero-length write.
    pub fn add_descriptor(&mut self, fd: RawFd) -> Result<()> {
        probe_writable(fd).map_err(|source| Error::InvalidHandle { fd, source })?;
        if self.descriptors.contains(&fd) {
            return Err(Error::AlreadyExists("descriptor"));
        }
        self.descriptors.push(fd);
        Ok(())
    }

    pub fn remove_descriptor(&mut self, fd: RawFd) -> Result<()> {
        let index = self
            .descriptors
            .iter()
            .position(|&registered| registered == fd)
            .ok_or(Error::NotFound("descriptor"))?;
        self.descriptors.remove(index);
        self.descriptors.shrink_to_fit();
        Ok(())
    }

    pub fn hooks(&self) -> &[Arc<dyn LogHook>] {
        &self.hooks
    }

    /// Registers a hook. Hooks with the same [`LogHook::key`] cannot be
    /// registered twice.
    pub fn add_hook(&mut self, hook: Arc<dyn LogHook>) -> Result<()> {
        let key = hook.key();
        if self.hooks.iter().any(|registered| registered.key() == key) {
            return Err(Error::AlreadyExists("hook"));
        }
        self.hooks.push(hook);
        Ok(())
    }

    /// Removes the hook registered under the same key as `hook`.
    pub fn remove_hook<H: LogHook + ?Sized>(&mut self, hook: &Arc<H>) -> Result<()> {
        let key = hook.key();
        let index = self
            .hooks
            .iter()
            .position(|registered| registered.key() == key)
            .ok_or(Error::NotFound("hook"))?;
        self.hooks.remove(index);
        self.hooks.shrink_to_fit();
        Ok(())
    }

    /// Back to the initial state: no destinations, `info` threshold, no sinks.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::FnHook;
    use std::{fs::File, os::fd::AsRawFd, sync::Mutex};

    fn noop(_: &str, _: usize, _: &u32) {}

    #[test]
    fn test_flags_validation() {
        assert_eq!(Flags::from_bits(0).unwrap(), Flags::empty());
        assert_eq!(Flags::from_bits(7).unwrap(), Flags::all());
        assert!(matches!(Flags::from_bits(8), Err(Error::IllegalFlags(8))));
        assert!(matches!(
            Flags::from_bits(0x8000_0002),
            Err(Error::IllegalFlags(0x8000_0002))
        ));
        let flags = Flags::SYSLOG | Flags::STDERR;
        assert!(flags.contains(Flags::STDERR));
        assert!(!flags.contains(Flags::ERRNO_DETAIL));
        assert_eq!(flags.bits(), 3);
        assert_eq!(flags.without(Flags::SYSLOG), Flags::STDERR);
    }

    #[test]
    fn test_threshold_query_and_set() {
        let mut registry = SinkRegistry::new();
        assert_eq!(registry.set_threshold(None), Level::Info);
        assert_eq!(registry.set_threshold(Some(Level::Debug)), Level::Info);
        assert_eq!(registry.threshold(), Level::Debug);
        assert_eq!(registry.set_threshold_ordinal(QUERY).unwrap(), Level::Debug);
        assert_eq!(registry.set_threshold_ordinal(0).unwrap(), Level::Debug);
        assert_eq!(registry.threshold(), Level::Fatal);
        assert!(matches!(
            registry.set_threshold_ordinal(5),
            Err(Error::InvalidLevel(5))
        ));
        assert!(matches!(
            registry.set_threshold_ordinal(-2),
            Err(Error::InvalidLevel(-2))
        ));
        assert_eq!(registry.threshold(), Level::Fatal);
    }

    #[test]
    fn test_descriptor_duplicates_and_missing() {
        let file = tempfile::tempfile().unwrap();
        let other = tempfile::tempfile().unwrap();
        let mut registry = SinkRegistry::new();
        registry.add_descriptor(file.as_raw_fd()).unwrap();
        assert!(matches!(
            registry.add_descriptor(file.as_raw_fd()),
            Err(Error::AlreadyExists("descriptor"))
        ));
        assert_eq!(registry.descriptors(), &[file.as_raw_fd()]);

        assert!(matches!(
            registry.remove_descriptor(other.as_raw_fd()),
            Err(Error::NotFound("descriptor"))
        ));
        assert_eq!(registry.descriptors(), &[file.as_raw_fd()]);

        registry.add_descriptor(other.as_raw_fd()).unwrap();
        registry.remove_descriptor(file.as_raw_fd()).unwrap();
        assert_eq!(registry.descriptors(), &[other.as_raw_fd()]);
    }

    #[test]
    fn test_descriptor_must_be_writable() {
        let mut registry = SinkRegistry::new();
        assert!(matches!(
            registry.add_descriptor(-1),
            Err(Error::InvalidHandle { fd: -1, .. })
        ));
        let read_only = File::open(file!()).unwrap();
        assert!(matches!(
            registry.add_descriptor(read_only.as_raw_fd()),
            Err(Error::InvalidHandle { .. })
        ));
        assert!(registry.descriptors().is_empty());
    }

    #[test]
    fn test_hooks_keyed_by_callback_and_argument() {
        let mut registry = SinkRegistry::new();
        let first = FnHook::new(noop, 1);
        let second = FnHook::new(noop, 2);
        registry.add_hook(first.clone()).unwrap();
        registry.add_hook(second.clone()).unwrap();
        assert!(matches!(
            registry.add_hook(first.clone()),
            Err(Error::AlreadyExists("hook"))
        ));
        assert_eq!(registry.hooks().len(), 2);

        registry.remove_hook(&first).unwrap();
        assert!(matches!(
            registry.remove_hook(&first),
            Err(Error::NotFound("hook"))
        ));
        assert_eq!(registry.hooks().len(), 1);
        assert_eq!(registry.hooks()[0].key(), second.key());
    }

    fn touch(_: &str, _: usize, seen: &Arc<Mutex<usize>>) {
        *seen.lock().unwrap() += 1;
    }

    #[test]
    fn test_same_callback_and_argument_is_one_hook() {
        let shared = Arc::new(Mutex::new(0));
        let mut registry = SinkRegistry::new();
        registry
            .add_hook(FnHook::new(touch, Arc::clone(&shared)))
            .unwrap();
        assert!(matches!(
            registry.add_hook(FnHook::new(touch, Arc::clone(&shared))),
            Err(Error::AlreadyExists("hook"))
        ));
        assert_eq!(registry.hooks().len(), 1);

        registry
            .add_hook(FnHook::new(touch, Arc::new(Mutex::new(0))))
            .unwrap();
        assert_eq!(registry.hooks().len(), 2);

        // a separately built pair with the same identity removes the first
        registry
            .remove_hook(&FnHook::new(touch, Arc::clone(&shared)))
            .unwrap();
        assert_eq!(registry.hooks().len(), 1);
        registry.hooks()[0].on_message("x", 0);
        assert_eq!(*shared.lock().unwrap(), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let file = tempfile::tempfile().unwrap();
        let mut registry = SinkRegistry::new();
        registry.set_flags(Flags::STDERR);
        registry.set_threshold(Some(Level::Debug));
        registry.add_descriptor(file.as_raw_fd()).unwrap();
        registry.add_hook(FnHook::new(noop, 0)).unwrap();
        registry.clear();
        assert_eq!(registry.flags(), Flags::empty());
        assert_eq!(registry.threshold(), Level::Info);
        assert!(registry.descriptors().is_empty());
        assert!(registry.hooks().is_empty());
    }
}
