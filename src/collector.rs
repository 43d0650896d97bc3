use std::thread;

use log::{error, info, warn};
use time::Date;

use crate::config::Config;
use crate::contracts::DailyBar;
use crate::gateway::{MarketData, Outcome};
use crate::records::{SnapshotWriter, VolRecord};
use crate::{calendar, strikes, Error, Result};

/// Walks the year-to-date bars of the configured symbol and looks up the implied volatility of
/// an out-of-the-money put for each trading day.
pub struct Collector<M: MarketData> {
    source: M,
    config: Config,
    writer: SnapshotWriter,
}

impl<M: MarketData> Collector<M> {
    pub fn new(source: M, config: Config) -> Self {
        let writer = SnapshotWriter::new(&config.symbol);
        Collector { source, config, writer }
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Collects one record per daily bar from January 1st to `today`.
    ///
    /// Partial snapshots are written along the way. A day that fails is logged and left out.
    /// Fails if the daily bars themselves time out, or if the gateway connection is lost. In the
    /// latter case the records collected so far are saved to a partial snapshot first.
    pub fn run(&self, today: Date) -> Result<Vec<VolRecord>> {
        let symbol = &self.config.symbol;
        let start = calendar::ytd_start(today);
        let duration_days = calendar::ytd_duration_days(start, today);

        info!("requesting {symbol} historical data from {start} to {today}");

        let bars = match self.source.daily_bars(symbol, duration_days, self.config.bulk_timeout)? {
            Outcome::Completed(bars) => bars,
            Outcome::TimedOut => return Err(Error::Timeout(format!("{symbol} daily bars"))),
        };

        if bars.is_empty() {
            warn!("no stock data received for {symbol}");
            return Ok(vec![]);
        }

        let weekdays = calendar::trading_days(start, today).len();
        info!("received {} days of {symbol} data ({weekdays} weekdays since {start})", bars.len());

        let checkpoint_every = self.config.checkpoint_every.max(1);
        let mut records = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            match self.process_day(bar) {
                Ok(record) => records.push(record),
                Err(err @ Error::Api(_)) => {
                    error!("stopping at {}: {err}", bar.date);
                    self.save_partial(i, &records);
                    return Err(err);
                }
                Err(err) => error!("error processing {}: {err}", bar.date),
            }

            if !self.config.pacing.is_zero() && i + 1 < bars.len() {
                thread::sleep(self.config.pacing);
            }

            if i > 0 && i % checkpoint_every == 0 {
                info!("processed {}/{} days. saving intermediate results", i + 1, bars.len());
                self.save_partial(i, &records);
            }
        }

        Ok(records)
    }

    /// [Collector::run] followed by the final snapshot.
    pub fn run_and_save(&self, today: Date) -> Result<Vec<VolRecord>> {
        let records = self.run(today)?;
        self.writer.write(&self.config.final_file(), &records)?;
        Ok(records)
    }

    fn save_partial(&self, i: usize, records: &[VolRecord]) {
        if let Err(err) = self.writer.write(&self.config.partial_file(i), records) {
            error!("error saving intermediate results: {err}");
        }
    }

    fn process_day(&self, bar: &DailyBar) -> Result<VolRecord> {
        let symbol = &self.config.symbol;
        let timeout = self.config.request_timeout;

        let price = bar.close;
        let target_strike = strikes::otm_put_strike(price, self.config.otm_ratio, self.config.strike_increment);
        let expiry = calendar::format_expiry(calendar::nearest_expiry(bar.date, self.config.weeks_out))?;

        info!("processing {}: {symbol}=${price:.2}, target strike ${target_strike}", bar.date);

        let mut record = VolRecord {
            date: bar.date,
            underlying_price: price,
            strike: target_strike,
            expiry,
            implied_vol: None,
        };

        let contracts = match self.source.option_contracts(symbol, &record.expiry, timeout)? {
            Outcome::Completed(contracts) if !contracts.is_empty() => contracts,
            Outcome::Completed(_) => {
                info!("no option contracts found for expiry {}", record.expiry);
                return Ok(record);
            }
            Outcome::TimedOut => {
                warn!("contract details request timed out for expiry {}", record.expiry);
                return Ok(record);
            }
        };

        let Some(put) = strikes::best_put(&contracts, target_strike) else {
            info!("no suitable put options found for expiry {}", record.expiry);
            return Ok(record);
        };

        info!("found put option: strike ${}", put.strike);
        record.strike = put.strike;

        match self.source.implied_volatility(put, bar.date, timeout)? {
            Outcome::Completed(bars) => match bars.first() {
                Some(vol) => {
                    info!("IV: {:.4}", vol.close);
                    record.implied_vol = Some(vol.close);
                }
                None => info!("no historical IV data available"),
            },
            Outcome::TimedOut => warn!("historical IV request timed out"),
        }

        Ok(record)
    }
}
