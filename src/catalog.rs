//! Severity levels and syslog facilities, with their names.
//!
//! Both tables are contiguous: every ordinal in `0..COUNT` has an entry, and
//! name lookups are ASCII case-insensitive.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Severity of an event. Lower ordinals are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Fatal = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

struct LevelInfo {
    name: &'static str,
    priority: libc::c_int,
    terminates: bool,
}

const LEVELS: [LevelInfo; Level::COUNT] = [
    LevelInfo {
        name: "fatal",
        priority: libc::LOG_ALERT,
        terminates: true,
    },
    LevelInfo {
        name: "error",
        priority: libc::LOG_ERR,
        terminates: false,
    },
    LevelInfo {
        name: "warn",
        priority: libc::LOG_WARNING,
        terminates: false,
    },
    LevelInfo {
        name: "info",
        priority: libc::LOG_INFO,
        terminates: false,
    },
    LevelInfo {
        name: "debug",
        priority: libc::LOG_INFO,
        terminates: false,
    },
];

impl Level {
    pub const COUNT: usize = 5;
    pub const ALL: [Level; Level::COUNT] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    pub fn from_ordinal(ordinal: i64) -> Option<Level> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    fn info(self) -> &'static LevelInfo {
        &LEVELS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Priority handed to `syslog(3)`.
    pub fn syslog_priority(self) -> libc::c_int {
        self.info().priority
    }

    /// Whether emitting at this level ends the process.
    pub fn terminates(self) -> bool {
        self.info().terminates
    }

    /// True when an event at `self` passes a gate set at `threshold`.
    pub fn passes(self, threshold: Level) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        level_num(Some(s)).ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}

/// Name of the level with the given ordinal, if there is one.
pub fn level_name(ordinal: i64) -> Option<&'static str> {
    Level::from_ordinal(ordinal).map(Level::name)
}

/// Level whose name matches `name`. `None` means "no such level", which is
/// distinct from `Some(Level::Fatal)` at ordinal 0.
pub fn level_num(name: Option<&str>) -> Option<Level> {
    let name = name?;
    Level::ALL
        .into_iter()
        .find(|level| level.name().eq_ignore_ascii_case(name))
}

/// Routing category for the system log service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Facility {
    Auth = 0,
    AuthPriv,
    Daemon,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
    Lpr,
    Mail,
    News,
    Cron,
    Ftp,
    Kern,
    Syslog,
    Uucp,
    #[default]
    User,
}

struct FacilityInfo {
    name: &'static str,
    code: libc::c_int,
    discouraged: bool,
}

const fn facility(name: &'static str, code: libc::c_int) -> FacilityInfo {
    FacilityInfo {
        name,
        code,
        discouraged: false,
    }
}

const FACILITIES: [FacilityInfo; Facility::COUNT] = [
    facility("auth", libc::LOG_AUTH),
    facility("authpriv", libc::LOG_AUTHPRIV),
    facility("daemon", libc::LOG_DAEMON),
    facility("local0", libc::LOG_LOCAL0),
    facility("local1", libc::LOG_LOCAL1),
    facility("local2", libc::LOG_LOCAL2),
    facility("local3", libc::LOG_LOCAL3),
    facility("local4", libc::LOG_LOCAL4),
    facility("local5", libc::LOG_LOCAL5),
    facility("local6", libc::LOG_LOCAL6),
    facility("local7", libc::LOG_LOCAL7),
    facility("lpr", libc::LOG_LPR),
    facility("mail", libc::LOG_MAIL),
    facility("news", libc::LOG_NEWS),
    facility("cron", libc::LOG_CRON),
    facility("ftp", libc::LOG_FTP),
    FacilityInfo {
        name: "kern",
        code: libc::LOG_KERN,
        discouraged: true,
    },
    FacilityInfo {
        name: "syslog",
        code: libc::LOG_SYSLOG,
        discouraged: true,
    },
    facility("uucp", libc::LOG_UUCP),
    facility("user", libc::LOG_USER),
];

impl Facility {
    pub const COUNT: usize = 20;
    pub const ALL: [Facility; Facility::COUNT] = [
        Facility::Auth,
        Facility::AuthPriv,
        Facility::Daemon,
        Facility::Local0,
        Facility::Local1,
        Facility::Local2,
        Facility::Local3,
        Facility::Local4,
        Facility::Local5,
        Facility::Local6,
        Facility::Local7,
        Facility::Lpr,
        Facility::Mail,
        Facility::News,
        Facility::Cron,
        Facility::Ftp,
        Facility::Kern,
        Facility::Syslog,
        Facility::Uucp,
        Facility::User,
    ];

    /// Facility at `ordinal`, or `Error::InvalidFacility` when out of range.
    pub fn from_ordinal(ordinal: i64) -> Result<Facility, Error> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(Error::InvalidFacility(ordinal))
    }

    fn info(self) -> &'static FacilityInfo {
        &FACILITIES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Facility code handed to `openlog(3)`.
    pub fn syslog_code(self) -> libc::c_int {
        self.info().code
    }

    /// Facilities reserved for the system itself; using one triggers a warning.
    pub fn discouraged(self) -> bool {
        self.info().discouraged
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facility {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(facility_num(Some(s)))
    }
}

pub fn facility_name(ordinal: i64) -> Option<&'static str> {
    Facility::from_ordinal(ordinal).ok().map(Facility::name)
}

/// Facility whose name matches `name`; anything unknown falls back to `user`.
pub fn facility_num(name: Option<&str>) -> Facility {
    name.and_then(|name| {
        Facility::ALL
            .into_iter()
            .find(|facility| facility.name().eq_ignore_ascii_case(name))
    })
    .unwrap_or_default()
}
