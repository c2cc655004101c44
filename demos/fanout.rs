use std::os::fd::AsRawFd;

use fanlog::{FnHook, Level, emit, log_info, log_warn, logger_config};

fn count_bytes(message: &str, tag_len: usize, label: &&'static str) {
    println!("{label}: {} bytes, tag {tag_len}", message.len());
}

fn main() {
    let mut logger = logger_config()
        .with_identity("fanout")
        .with_level(Level::Debug)
        .with_color(true)
        .build()
        .expect("Unable to configure logger");

    let file = std::fs::File::create("/tmp/fanout.log").expect("Unable to create log file");
    logger.add_descriptor(file.as_raw_fd()).unwrap();
    logger.add_hook(FnHook::new(count_bytes, "first")).unwrap();
    logger.add_hook(FnHook::new(count_bytes, "second")).unwrap();

    log_info!(logger, "Hello, world!");
    log_warn!(logger, "queue at {}%", 90);
    if std::fs::File::open("/nonexistent").is_err() {
        emit!(logger, Level::Error, errno; "open /nonexistent");
    }
    println!(
        "/tmp/fanout.log:\n{}",
        std::fs::read_to_string("/tmp/fanout.log").unwrap()
    );
}
