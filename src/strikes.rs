use crate::contracts::{OptionContract, Right};

/// Strike of an out-of-the-money put, `ratio` of `price` rounded to the nearest `increment`.
///
/// Halfway values round to the even multiple.
///
/// # Examples
///
/// ```
/// use ivtrack::strikes::otm_put_strike;
///
/// assert_eq!(otm_put_strike(131.88, 0.90, 5.0), 120.0);
/// ```
pub fn otm_put_strike(price: f64, ratio: f64, increment: f64) -> f64 {
    (price * ratio / increment).round_ties_even() * increment
}

/// Listed put with the strike closest to `target`. The first of equally close puts wins.
pub fn best_put(contracts: &[OptionContract], target: f64) -> Option<&OptionContract> {
    let mut best: Option<&OptionContract> = None;

    for contract in contracts.iter().filter(|contract| contract.right == Right::Put) {
        match best {
            Some(current) if (current.strike - target).abs() <= (contract.strike - target).abs() => {}
            _ => best = Some(contract),
        }
    }

    best
}
