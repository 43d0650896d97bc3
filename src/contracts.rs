use std::fmt::{self, Display};
use std::str::FromStr;

use ibapi::contracts::{Contract, ContractDetails, SecurityType};
use ibapi::market_data::historical::Bar;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// Option contracts on US equities deliver 100 shares.
pub const OPTION_MULTIPLIER: &str = "100";

/// Either Put or Call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Right {
    Put,
    Call,
}

impl Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Put => write!(f, "P"),
            Self::Call => write!(f, "C"),
        }
    }
}

impl FromStr for Right {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P" | "PUT" => Ok(Self::Put),
            "C" | "CALL" => Ok(Self::Call),
            other => Err(Error::Simple(format!("unsupported option right: {other:?}"))),
        }
    }
}

/// One day of trading for an instrument.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<&Bar> for DailyBar {
    fn from(bar: &Bar) -> Self {
        DailyBar {
            date: bar.date.date(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Listed option identified by underlying, expiry, strike and right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    /// Last trading day formatted as `YYYYMMDD`.
    pub expiry: String,
    pub strike: f64,
    pub right: Right,
}

impl OptionContract {
    pub fn put(symbol: &str, expiry: &str, strike: f64) -> Self {
        OptionContract {
            symbol: symbol.to_string(),
            expiry: expiry.to_string(),
            strike,
            right: Right::Put,
        }
    }
}

impl TryFrom<&ContractDetails> for OptionContract {
    type Error = Error;

    fn try_from(details: &ContractDetails) -> Result<Self, Self::Error> {
        let contract = &details.contract;

        Ok(OptionContract {
            symbol: contract.symbol.to_string(),
            expiry: contract.last_trade_date_or_contract_month.to_string(),
            strike: contract.strike,
            right: contract.right.parse()?,
        })
    }
}

/// Stock routed through SMART in USD.
pub fn stock(symbol: &str) -> Contract {
    Contract {
        symbol: symbol.into(),
        security_type: SecurityType::Stock,
        exchange: "SMART".into(),
        currency: "USD".into(),
        ..Default::default()
    }
}

/// Fully specified option contract, suitable for market data requests.
pub fn option(contract: &OptionContract) -> Contract {
    Contract {
        symbol: contract.symbol.as_str().into(),
        security_type: SecurityType::Option,
        exchange: "SMART".into(),
        currency: "USD".into(),
        last_trade_date_or_contract_month: contract.expiry.clone(),
        strike: contract.strike,
        right: contract.right.to_string(),
        multiplier: OPTION_MULTIPLIER.into(),
        trading_class: contract.symbol.clone(),
        ..Default::default()
    }
}

/// Partially specified option contract. A contract details request for it returns every strike
/// and right listed for `symbol` at `expiry`.
pub fn option_chain_query(symbol: &str, expiry: &str) -> Contract {
    Contract {
        symbol: symbol.into(),
        security_type: SecurityType::Option,
        exchange: "SMART".into(),
        currency: "USD".into(),
        last_trade_date_or_contract_month: expiry.to_string(),
        ..Default::default()
    }
}
