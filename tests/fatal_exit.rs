use std::{
    fs::{self, OpenOptions},
    io::Write,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use fanlog::{FATAL_EXIT_STATUS, FatalCondition, Level, logger_config};

const CHILD_DIR: &str = "FANLOG_TEST_CHILD_DIR";

/// Runs `test_name` again in a child process, with `dir` handed over through
/// the environment so the child takes its fatal branch.
fn run_child(test_name: &str, dir: &Path) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_DIR, dir)
        .output()
        .unwrap()
}

fn child_dir() -> Option<PathBuf> {
    std::env::var_os(CHILD_DIR).map(PathBuf::from)
}

fn append(path: &Path, line: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(line.as_bytes()).unwrap();
}

#[test]
fn fatal_event_exits_after_writing_every_sink() {
    if let Some(dir) = child_dir() {
        let mut logger = logger_config()
            .with_identity("svc")
            .with_level(Level::Info)
            .build()
            .unwrap();
        let file = fs::File::create(dir.join("descriptor.log")).unwrap();
        logger.add_descriptor(file.as_raw_fd()).unwrap();
        let hook_log = dir.join("hook.log");
        logger
            .add_hook(std::sync::Arc::new(move |message: &str, tag_len: usize| {
                append(&hook_log, &message[tag_len..])
            }))
            .unwrap();
        logger.emit(None, Level::Fatal, false, format_args!("disk on fire"));
        unreachable!("fatal emit returned");
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_child("fatal_event_exits_after_writing_every_sink", dir.path());

    assert_eq!(output.status.code(), Some(FATAL_EXIT_STATUS));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fatal: disk on fire\n"), "stderr: {stderr}");
    let descriptor = fs::read_to_string(dir.path().join("descriptor.log")).unwrap();
    assert!(descriptor.starts_with("svc["));
    assert!(descriptor.ends_with("]: fatal: disk on fire\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("hook.log")).unwrap(),
        "fatal: disk on fire\n"
    );
}

#[test]
fn fatal_event_exits_without_any_destination() {
    if child_dir().is_some() {
        let mut logger = logger_config()
            .with_identity("svc")
            .no_stderr()
            .build()
            .unwrap();
        logger.set_threshold(Some(Level::Fatal));
        logger.emit(None, Level::Error, false, format_args!("below threshold"));
        logger.emit(None, Level::Fatal, false, format_args!("quiet death"));
        unreachable!("fatal emit returned");
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_child("fatal_event_exits_without_any_destination", dir.path());

    assert_eq!(output.status.code(), Some(FATAL_EXIT_STATUS));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("quiet death"));
    assert!(!stderr.contains("below threshold"));
}

#[cfg(target_os = "linux")]
#[test]
fn raising_allocation_failure_reports_errno() {
    if child_dir().is_some() {
        let logger = logger_config()
            .with_identity("svc")
            .with_errno_detail()
            .build()
            .unwrap();
        unsafe { *libc::__errno_location() = libc::ENOMEM };
        fanlog::raise(&logger, FatalCondition::MemAllocation);
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_child("raising_allocation_failure_reports_errno", dir.path());

    assert_eq!(output.status.code(), Some(FATAL_EXIT_STATUS));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("fatal: Failed to allocate memory: Cannot allocate memory (ENOMEM = 12)\n"),
        "stderr: {stderr}"
    );
}

#[test]
fn raising_by_code_uses_the_condition_table() {
    if child_dir().is_some() {
        let logger = logger_config().with_identity("svc").build().unwrap();
        fanlog::raise_code(&logger, FatalCondition::Internal.code());
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_child("raising_by_code_uses_the_condition_table", dir.path());

    assert_eq!(output.status.code(), Some(FATAL_EXIT_STATUS));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fatal: Unknown Internal Error\n"), "stderr: {stderr}");
}
