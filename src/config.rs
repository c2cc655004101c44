use std::sync::LazyLock;

use derive_from_env::FromEnv;

use crate::catalog::Level;

/// Defaults read from the environment, e.g. `FANLOG_LEVEL=debug`.
#[derive(FromEnv)]
#[from_env(prefix = "FANLOG")]
#[allow(non_snake_case)]
pub struct FanlogConfig {
    #[from_env(default = "info")]
    pub LEVEL: String,
    #[from_env(default = "false")]
    pub COLOR: bool,
}

impl FanlogConfig {
    /// Threshold named by `FANLOG_LEVEL`; an unknown name keeps `info`.
    pub fn level(&self) -> Level {
        self.LEVEL.parse().unwrap_or(Level::Info)
    }
}

pub static FANLOG_CONFIG: LazyLock<FanlogConfig> = LazyLock::new(|| {
    FanlogConfig::from_env().unwrap_or_else(|_| FanlogConfig {
        LEVEL: "info".into(),
        COLOR: false,
    })
});
