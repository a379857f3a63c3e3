//! Runtime configuration, loaded from the environment with sane defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Seconds each betting round stays open
const DEFAULT_ROUND_PERIOD_SECS: u64 = 60;
/// Everyone starts with this balance on first sight
const DEFAULT_STARTING_BALANCE: u64 = 1000;
/// HTTP listen address
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
/// ReDB data directory
const DEFAULT_DATA_PATH: &str = "./lottery_data";

#[derive(Debug, Clone)]
pub struct LotteryConfig {
    pub round_period_secs: u64,
    pub starting_balance: u64,
    pub listen_addr: SocketAddr,
    pub data_path: String,
}

impl LotteryConfig {
    pub fn round_period(&self) -> Duration {
        Duration::from_secs(self.round_period_secs.max(1))
    }
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            round_period_secs: DEFAULT_ROUND_PERIOD_SECS,
            starting_balance: DEFAULT_STARTING_BALANCE,
            listen_addr: DEFAULT_LISTEN_ADDR.parse().expect("default listen addr is valid"),
            data_path: DEFAULT_DATA_PATH.to_string(),
        }
    }
}

/// Load configuration from the environment, falling back to defaults.
pub fn load() -> LotteryConfig {
    let defaults = LotteryConfig::default();
    LotteryConfig {
        round_period_secs: env_u64("ROUND_PERIOD_SECS", defaults.round_period_secs),
        starting_balance: env_u64("STARTING_BALANCE", defaults.starting_balance),
        listen_addr: env::var("LISTEN_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_addr),
        data_path: env::var("DATA_PATH").unwrap_or(defaults.data_path),
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
