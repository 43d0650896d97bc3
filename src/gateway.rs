//! Market data requests against TWS or IB Gateway.
//!
//! The ibapi client answers requests from its own reader thread. Each request issued here runs
//! on a short-lived worker thread and hands its single result back over a channel. The caller
//! polls that channel at a fixed interval until the result arrives or the request's time limit
//! passes.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};
use ibapi::client::blocking::Client;
use ibapi::market_data::historical::{self, BarSize, WhatToShow};
use ibapi::market_data::TradingHours;
use log::{debug, info, warn};
use time::Date;

use crate::config::Config;
use crate::contracts::{self, DailyBar, OptionContract};
use crate::{calendar, Error, Result};

/// Result of waiting on a request.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The request finished within its time limit.
    Completed(T),
    /// The time limit passed first.
    TimedOut,
}

impl<T> Outcome<T> {
    pub fn try_map<U, F: FnOnce(T) -> Result<U>>(self, f: F) -> Result<Outcome<U>> {
        match self {
            Outcome::Completed(value) => Ok(Outcome::Completed(f(value)?)),
            Outcome::TimedOut => Ok(Outcome::TimedOut),
        }
    }
}

/// Source of the data the collector needs.
///
/// Errors the gateway reports for a request, such as "no data", are not failures here;
/// implementations report them as a completed request with no data. `Err` means the request
/// could not be answered at all, e.g. the connection was lost.
pub trait MarketData {
    /// Daily `TRADES` bars for a stock over the last `duration_days`, regular trading hours.
    fn daily_bars(&self, symbol: &str, duration_days: i32, timeout: Duration) -> Result<Outcome<Vec<DailyBar>>>;

    /// Every option listed for `symbol` at `expiry` (`YYYYMMDD`).
    fn option_contracts(&self, symbol: &str, expiry: &str, timeout: Duration) -> Result<Outcome<Vec<OptionContract>>>;

    /// Daily `OPTION_IMPLIED_VOLATILITY` bars for `contract` for the session of `day`.
    /// The close of a bar is the implied volatility.
    fn implied_volatility(&self, contract: &OptionContract, day: Date, timeout: Duration) -> Result<Outcome<Vec<DailyBar>>>;
}

/// [MarketData] served by a connected TWS or IB Gateway.
pub struct TwsGateway {
    client: Arc<Client>,
    poll_interval: Duration,
}

impl TwsGateway {
    /// Connects to the gateway at `config.address` as `config.client_id`.
    pub fn connect(config: &Config) -> Result<TwsGateway> {
        info!("connecting to {} as client {}", config.address, config.client_id);

        let client = Client::connect(&config.address, config.client_id)?;

        info!("connected. server version {}", client.server_version());

        Ok(TwsGateway::new(client, config.poll_interval))
    }

    pub fn new(client: Client, poll_interval: Duration) -> TwsGateway {
        TwsGateway {
            client: Arc::new(client),
            poll_interval,
        }
    }

    fn historical_bars(
        &self,
        label: &str,
        contract: ibapi::contracts::Contract,
        interval_end: Option<time::OffsetDateTime>,
        duration: historical::Duration,
        what_to_show: WhatToShow,
        timeout: Duration,
    ) -> Result<Outcome<Vec<DailyBar>>> {
        let client = Arc::clone(&self.client);

        let outcome = await_completion(label, timeout, self.poll_interval, move || {
            client.historical_data(&contract, interval_end, duration, BarSize::Day, what_to_show, TradingHours::Regular)
        })?;

        outcome.try_map(|result| soft_complete(label, result.map(|data| data.bars.iter().map(DailyBar::from).collect())))
    }
}

impl MarketData for TwsGateway {
    fn daily_bars(&self, symbol: &str, duration_days: i32, timeout: Duration) -> Result<Outcome<Vec<DailyBar>>> {
        let label = format!("{symbol} daily bars");
        debug!("requesting {label} for the last {duration_days} days");

        self.historical_bars(
            &label,
            contracts::stock(symbol),
            None,
            historical::Duration::days(duration_days),
            WhatToShow::Trades,
            timeout,
        )
    }

    fn option_contracts(&self, symbol: &str, expiry: &str, timeout: Duration) -> Result<Outcome<Vec<OptionContract>>> {
        let label = format!("{symbol} options expiring {expiry}");
        debug!("querying {label}");

        let client = Arc::clone(&self.client);
        let query = contracts::option_chain_query(symbol, expiry);

        let outcome = await_completion(&label, timeout, self.poll_interval, move || client.contract_details(&query))?;

        outcome.try_map(|result| {
            Ok(soft_complete(&label, result)?
                .iter()
                .filter_map(|details| match OptionContract::try_from(details) {
                    Ok(contract) => Some(contract),
                    Err(err) => {
                        debug!("skipping contract {} {}: {err}", details.contract.symbol, details.contract.strike);
                        None
                    }
                })
                .collect())
        })
    }

    fn implied_volatility(&self, contract: &OptionContract, day: Date, timeout: Duration) -> Result<Outcome<Vec<DailyBar>>> {
        let label = format!("{} {} {}{} implied volatility", contract.symbol, contract.expiry, contract.strike, contract.right);
        debug!("requesting {label} for {day}");

        self.historical_bars(
            &label,
            contracts::option(contract),
            Some(calendar::session_end(day)),
            historical::Duration::days(1),
            WhatToShow::OptionImpliedVolatility,
            timeout,
        )
    }
}

/// Runs `request` on a worker thread and waits for its result.
///
/// The result channel is checked every `poll_interval` until `timeout` has passed. A request
/// that times out keeps running; its result is dropped when it eventually arrives.
pub fn await_completion<T, F>(label: &str, timeout: Duration, poll_interval: Duration, request: F) -> Result<Outcome<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = channel::bounded(1);

    thread::Builder::new().name(format!("request: {label}")).spawn(move || {
        // receiver is gone if the caller gave up
        let _ = sender.send(request());
    })?;

    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!("timeout waiting for {label} after {timeout:?}");
            return Ok(Outcome::TimedOut);
        }

        match receiver.recv_timeout(poll_interval.min(remaining)) {
            Ok(result) => return Ok(Outcome::Completed(result)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::Simple(format!("request for {label} ended without a result")));
            }
        }
    }
}

// Errors reported by the gateway itself (e.g. 162 or 200, no data) complete the request with
// no data. Connection loss, cancellation and shutdown are failures.
fn soft_complete<T: Default>(label: &str, result: std::result::Result<T, ibapi::Error>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ibapi::Error::Message(code, message)) => {
            warn!("no data for {label}: [{code}] {message}");
            Ok(T::default())
        }
        Err(err) => Err(Error::Api(err)),
    }
}
