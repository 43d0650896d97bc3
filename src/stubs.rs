use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use time::Date;

use crate::contracts::{DailyBar, OptionContract, Right};
use crate::gateway::{MarketData, Outcome};
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Request {
    DailyBars { symbol: String, duration_days: i32, timeout: Duration },
    OptionContracts { symbol: String, expiry: String },
    ImpliedVolatility { contract: OptionContract, day: Date },
}

/// Scripted market data. Requests without a scripted response complete with no data.
pub(crate) struct MarketDataStub {
    pub requests: RwLock<Vec<Request>>,
    pub daily_bars: Outcome<Vec<DailyBar>>,
    /// Option chains by expiry.
    pub option_contracts: HashMap<String, Outcome<Vec<OptionContract>>>,
    /// Volatility bars by trading day.
    pub implied_volatility: HashMap<Date, Outcome<Vec<DailyBar>>>,
    /// Trading days whose volatility request fails.
    pub failing_days: Vec<Date>,
    /// Trading days on which the connection drops during the volatility request.
    pub disconnected_days: Vec<Date>,
}

impl Default for MarketDataStub {
    fn default() -> Self {
        MarketDataStub {
            requests: RwLock::new(vec![]),
            daily_bars: Outcome::Completed(vec![]),
            option_contracts: HashMap::new(),
            implied_volatility: HashMap::new(),
            failing_days: vec![],
            disconnected_days: vec![],
        }
    }
}

impl MarketDataStub {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.read().unwrap().clone()
    }

    fn record(&self, request: Request) {
        self.requests.write().unwrap().push(request);
    }
}

impl MarketData for MarketDataStub {
    fn daily_bars(&self, symbol: &str, duration_days: i32, timeout: Duration) -> Result<Outcome<Vec<DailyBar>>> {
        self.record(Request::DailyBars {
            symbol: symbol.to_string(),
            duration_days,
            timeout,
        });
        Ok(self.daily_bars.clone())
    }

    fn option_contracts(&self, symbol: &str, expiry: &str, _timeout: Duration) -> Result<Outcome<Vec<OptionContract>>> {
        self.record(Request::OptionContracts {
            symbol: symbol.to_string(),
            expiry: expiry.to_string(),
        });
        Ok(self
            .option_contracts
            .get(expiry)
            .cloned()
            .unwrap_or(Outcome::Completed(vec![])))
    }

    fn implied_volatility(&self, contract: &OptionContract, day: Date, _timeout: Duration) -> Result<Outcome<Vec<DailyBar>>> {
        self.record(Request::ImpliedVolatility {
            contract: contract.clone(),
            day,
        });
        if self.failing_days.contains(&day) {
            return Err(Error::Simple(format!("request for {day} failed")));
        }
        if self.disconnected_days.contains(&day) {
            return Err(Error::Api(ibapi::Error::ConnectionReset));
        }
        Ok(self
            .implied_volatility
            .get(&day)
            .cloned()
            .unwrap_or(Outcome::Completed(vec![])))
    }
}

/// Daily bar closing at `close`.
pub(crate) fn bar(date: Date, close: f64) -> DailyBar {
    DailyBar {
        date,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000.0,
    }
}

/// Option chain for `symbol` at `expiry` listing a put and a call at each strike.
pub(crate) fn option_chain(symbol: &str, expiry: &str, strikes: &[f64]) -> Vec<OptionContract> {
    strikes
        .iter()
        .flat_map(|strike| {
            [Right::Call, Right::Put].map(|right| OptionContract {
                symbol: symbol.to_string(),
                expiry: expiry.to_string(),
                strike: *strike,
                right,
            })
        })
        .collect()
}
