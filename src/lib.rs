//! Collects the year-to-date implied volatility of out-of-the-money puts from
//! [TWS or IB Gateway](https://interactivebrokers.github.io/tws-api/introduction.html).
//!
//! For every daily bar of the underlying the collector picks a put near 90% of the close,
//! a few weekly expiries out, requests its `OPTION_IMPLIED_VOLATILITY` bar and writes one
//! CSV row per trading day.
//!
//!```no_run
//!     use ivtrack::{calendar, Collector, Config, TwsGateway};
//!
//!     fn main() -> anyhow::Result<()> {
//!         let config = Config::from_env()?;
//!         let gateway = TwsGateway::connect(&config)?;
//!
//!         let collector = Collector::new(gateway, config);
//!         let records = collector.run_and_save(calendar::today_in_exchange())?;
//!         println!("collected {} records", records.len());
//!         Ok(())
//!     }
//!```

/// Trading calendar helpers: YTD window, weekdays and weekly option expiries.
pub mod calendar;

/// Per-day orchestration of contract discovery, strike selection and volatility lookups.
pub mod collector;

/// Run configuration.
pub mod config;

/// Instruments requested from the gateway and the data they return.
pub mod contracts;

/// Access to market data through TWS or IB Gateway.
pub mod gateway;

/// Output rows, CSV snapshots and run summaries.
pub mod records;

/// Strike targeting.
pub mod strikes;

mod errors;

#[cfg(test)]
pub(crate) mod stubs;

pub use collector::Collector;
pub use config::Config;
pub use errors::Error;
pub use gateway::{MarketData, Outcome, TwsGateway};
pub use records::VolRecord;

pub type Result<T> = std::result::Result<T, Error>;
