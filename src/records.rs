use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Serialize, Serializer};
use time::Date;

use crate::{calendar, Result};

/// Implied volatility of the put chosen for one trading day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VolRecord {
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    /// Close of the underlying.
    pub underlying_price: f64,
    /// Strike of the put. The target strike when no listed put was found.
    pub strike: f64,
    /// Expiry of the put as `YYYYMMDD`.
    pub expiry: String,
    /// Absent when the gateway had no volatility data for the put.
    pub implied_vol: Option<f64>,
}

fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let formatted = calendar::format_date(*date).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Writes collected records as CSV.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    symbol: String,
}

impl SnapshotWriter {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
        }
    }

    /// Column names, in [VolRecord] field order.
    pub fn header(&self) -> [String; 5] {
        [
            "Date".to_string(),
            format!("{}_Price", self.symbol),
            "OTM_Put_Strike".to_string(),
            "Option_Expiry".to_string(),
            "Implied_Vol".to_string(),
        ]
    }

    /// Replaces `path` with `records`. Nothing is written for an empty slice.
    ///
    /// Returns the number of records written.
    pub fn write(&self, path: &Path, records: &[VolRecord]) -> Result<usize> {
        if records.is_empty() {
            warn!("no results to save to {}", path.display());
            return Ok(0);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;

        writer.write_record(self.header())?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("saved {} records to {}", records.len(), path.display());

        Ok(records.len())
    }
}

/// Overview of a collection run.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub symbol: String,
    pub records: usize,
    pub first_date: Date,
    pub last_date: Date,
    pub min_price: f64,
    pub max_price: f64,
    /// Lowest and highest implied volatility, if any record has one.
    pub vol_range: Option<(f64, f64)>,
    pub records_with_vol: usize,
}

impl Summary {
    /// Returns `None` for an empty run.
    pub fn from_records(symbol: &str, records: &[VolRecord]) -> Option<Summary> {
        let first = records.first()?;

        let mut summary = Summary {
            symbol: symbol.to_uppercase(),
            records: records.len(),
            first_date: first.date,
            last_date: first.date,
            min_price: first.underlying_price,
            max_price: first.underlying_price,
            vol_range: None,
            records_with_vol: 0,
        };

        for record in records {
            summary.first_date = summary.first_date.min(record.date);
            summary.last_date = summary.last_date.max(record.date);
            summary.min_price = summary.min_price.min(record.underlying_price);
            summary.max_price = summary.max_price.max(record.underlying_price);

            if let Some(vol) = record.implied_vol {
                summary.records_with_vol += 1;
                summary.vol_range = match summary.vol_range {
                    Some((low, high)) => Some((low.min(vol), high.max(vol))),
                    None => Some((vol, vol)),
                };
            }
        }

        Some(summary)
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Date range: {} to {}", self.first_date, self.last_date)?;
        write!(f, "{} price range: ${:.2} - ${:.2}", self.symbol, self.min_price, self.max_price)?;
        if let Some((low, high)) = self.vol_range {
            writeln!(f)?;
            writeln!(f, "IV range: {low:.4} - {high:.4}")?;
            write!(f, "Records with IV data: {}/{}", self.records_with_vol, self.records)?;
        }
        Ok(())
    }
}
