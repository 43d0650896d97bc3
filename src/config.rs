//! Run configuration.
//!
//! Defaults target a paper trading TWS on the local machine. The connection, symbol and output
//! directory can be overridden from the environment:
//!
//! - `IVTRACK_ADDRESS`    e.g. `127.0.0.1:4002`
//! - `IVTRACK_CLIENT_ID`  e.g. `100`
//! - `IVTRACK_SYMBOL`     e.g. `AAPL`
//! - `IVTRACK_OUTPUT_DIR` e.g. `/tmp/ivtrack`

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

pub const ADDRESS_VAR: &str = "IVTRACK_ADDRESS";
pub const CLIENT_ID_VAR: &str = "IVTRACK_CLIENT_ID";
pub const SYMBOL_VAR: &str = "IVTRACK_SYMBOL";
pub const OUTPUT_DIR_VAR: &str = "IVTRACK_OUTPUT_DIR";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Address of TWS or IB Gateway, e.g. 127.0.0.1:7497
    pub address: String,
    pub client_id: i32,
    /// Underlying stock symbol.
    pub symbol: String,
    /// Number of weekly expiries between a trading day and the option looked up for it.
    pub weeks_out: u32,
    /// Fraction of the underlying close used as the put strike target.
    pub otm_ratio: f64,
    /// Strike grid the target is rounded to.
    pub strike_increment: f64,
    /// Wait limit for contract and option data requests.
    pub request_timeout: Duration,
    /// Wait limit for the year-to-date stock bars.
    pub bulk_timeout: Duration,
    /// Interval at which pending requests are checked for completion.
    pub poll_interval: Duration,
    /// Delay between trading days to stay under the gateway pacing limits.
    pub pacing: Duration,
    /// A partial snapshot is written every `checkpoint_every` trading days.
    pub checkpoint_every: usize,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: "127.0.0.1:7497".into(),
            client_id: 1,
            symbol: "NVDA".into(),
            weeks_out: 3,
            otm_ratio: 0.90,
            strike_increment: 5.0,
            request_timeout: Duration::from_secs(30),
            bulk_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
            pacing: Duration::from_millis(500),
            checkpoint_every: 20,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Some(address) = var(ADDRESS_VAR) {
            config.address = address;
        }
        if let Some(client_id) = var(CLIENT_ID_VAR) {
            config.client_id = client_id
                .parse()
                .map_err(|e| Error::Config(format!("{CLIENT_ID_VAR}={client_id:?}: {e}")))?;
        }
        if let Some(symbol) = var(SYMBOL_VAR) {
            config.symbol = symbol.to_uppercase();
        }
        if let Some(output_dir) = var(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(output_dir);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::Config("address must not be empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::Config("symbol must not be empty".into()));
        }
        if !(self.otm_ratio > 0.0 && self.otm_ratio <= 1.0) {
            return Err(Error::Config(format!("otm ratio must be in (0, 1], got {}", self.otm_ratio)));
        }
        if self.strike_increment <= 0.0 || !self.strike_increment.is_finite() {
            return Err(Error::Config(format!("strike increment must be positive, got {}", self.strike_increment)));
        }
        if self.weeks_out == 0 {
            return Err(Error::Config("weeks out must be at least 1".into()));
        }
        if self.checkpoint_every == 0 {
            return Err(Error::Config("checkpoint interval must be at least 1".into()));
        }
        Ok(())
    }

    /// Final snapshot, e.g. `./nvda_vol_ytd_data.csv`.
    pub fn final_file(&self) -> PathBuf {
        self.output_dir.join(format!("{}_vol_ytd_data.csv", self.file_stem()))
    }

    /// Partial snapshot written after trading day `index`, e.g. `./nvda_vol_ytd_partial_20.csv`.
    pub fn partial_file(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_vol_ytd_partial_{index}.csv", self.file_stem()))
    }

    fn file_stem(&self) -> String {
        self.symbol.trim().to_lowercase()
    }
}

fn var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
