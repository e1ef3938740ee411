//! Aggregation of daily bars into weekly or monthly bars.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Interval;
use chrono::{Datelike, NaiveDate};

fn bucket_key(date: NaiveDate, interval: Interval) -> (i32, u32) {
    match interval {
        Interval::Daily => (date.year(), date.ordinal()),
        Interval::Weekly => {
            let week = date.iso_week();
            (week.year(), week.week())
        }
        Interval::Monthly => (date.year(), date.month()),
    }
}

/// Merges consecutive bars in the same bucket: first open, highest high,
/// lowest low, last close, summed volume, dated at the first bar.
/// Input must be ascending by date.
pub fn resample(bars: &[OhlcvBar], interval: Interval) -> Vec<OhlcvBar> {
    if interval == Interval::Daily {
        return bars.to_vec();
    }

    let mut out: Vec<OhlcvBar> = Vec::new();
    let mut current_key = None;
    for bar in bars {
        let key = bucket_key(bar.date, interval);
        match out.last_mut() {
            Some(agg) if current_key == Some(key) => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                out.push(bar.clone());
                current_key = Some(key);
            }
        }
    }
    out
}
