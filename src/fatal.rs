//! Predefined fatal conditions.

use std::fmt;

use crate::{catalog::Level, logger::Logger};

/// Exit status of a process ended by a fatal event.
pub const FATAL_EXIT_STATUS: i32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FatalCondition {
    Internal = 0,
    MemAllocation = 1,
}

struct ConditionInfo {
    message: &'static str,
    level: Level,
    with_errno: bool,
}

const CONDITIONS: [ConditionInfo; 2] = [
    ConditionInfo {
        message: "Unknown Internal Error",
        level: Level::Fatal,
        with_errno: false,
    },
    ConditionInfo {
        message: "Failed to allocate memory",
        level: Level::Fatal,
        with_errno: true,
    },
];

impl FatalCondition {
    pub const ALL: [FatalCondition; 2] = [FatalCondition::Internal, FatalCondition::MemAllocation];

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    fn info(self) -> &'static ConditionInfo {
        &CONDITIONS[self as usize]
    }

    pub fn message(self) -> &'static str {
        self.info().message
    }

    pub fn level(self) -> Level {
        self.info().level
    }

    /// Whether the errno value is appended to the message.
    pub fn with_errno(self) -> bool {
        self.info().with_errno
    }
}

impl fmt::Display for FatalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Emits `condition` through `logger` and ends the process.
pub fn raise(logger: &Logger, condition: FatalCondition) -> ! {
    logger.emit(
        None,
        condition.level(),
        condition.with_errno(),
        format_args!("{}", condition.message()),
    );
    std::process::exit(FATAL_EXIT_STATUS)
}

/// [`raise`] by table index.
///
/// # Panics
/// On a code with no table entry, which is a bug in the caller.
pub fn raise_code(logger: &Logger, code: u32) -> ! {
    match FatalCondition::from_code(code) {
        Some(condition) => raise(logger, condition),
        None => panic!("unknown fatal condition code {code}"),
    }
}
