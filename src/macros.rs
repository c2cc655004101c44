//! Emission macros that fill in the source location.
//!
//! `module_path!()` stands in for the function name.

/// `emit!(logger, level, "fmt", args..)`, or `emit!(logger, level, errno; "fmt", args..)`
/// to append the current errno.
#[macro_export]
macro_rules! emit {
    ($logger:expr, $level:expr, errno; $($arg:tt)+) => {
        $logger.emit(
            ::core::option::Option::Some($crate::Location::new(file!(), line!(), module_path!())),
            $level,
            true,
            format_args!($($arg)+),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.emit(
            ::core::option::Option::Some($crate::Location::new(file!(), line!(), module_path!())),
            $level,
            false,
            format_args!($($arg)+),
        )
    };
}

/// Emits at `fatal`, which ends the process.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {{
        $crate::emit!($logger, $crate::Level::Fatal, $($arg)+);
        ::std::process::exit($crate::FATAL_EXIT_STATUS)
    }};
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => { $crate::emit!($logger, $crate::Level::Error, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => { $crate::emit!($logger, $crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => { $crate::emit!($logger, $crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => { $crate::emit!($logger, $crate::Level::Debug, $($arg)+) };
}
