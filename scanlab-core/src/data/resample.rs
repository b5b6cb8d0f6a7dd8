//! Aggregate fine bars into coarser ones (1h → 4h, 1d → 1wk).
//!
//! Buckets come from [`Interval::bucket_start`]: open of the first bar, max high,
//! min low, close of the last bar, summed volume. Void bars are skipped and
//! buckets with no bars are not emitted, so gaps stay gaps.

use crate::domain::{Interval, PriceBar, PriceSeries};
use crate::error::CoreError;

/// Aggregate `bars` (ascending) into `target` buckets, stamped with the bucket start.
pub fn resample_bars(bars: &[PriceBar], target: Interval) -> Vec<PriceBar> {
    let mut out: Vec<PriceBar> = Vec::new();

    for bar in bars.iter().filter(|b| !b.is_void()) {
        let bucket = target.bucket_start(bar.timestamp);
        match out.last_mut() {
            Some(agg) if agg.timestamp == bucket => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => out.push(PriceBar {
                timestamp: bucket,
                ..bar.clone()
            }),
        }
    }
    out
}

/// Resample a whole series. `target` must not be finer than the source.
pub fn resample(series: &PriceSeries, target: Interval) -> Result<PriceSeries, CoreError> {
    if target.duration() < series.interval().duration() {
        return Err(CoreError::InvalidInput(format!(
            "cannot resample {} bars down to {target}",
            series.interval()
        )));
    }
    if target == series.interval() {
        return Ok(series.clone());
    }
    PriceSeries::new(
        series.symbol(),
        target,
        resample_bars(series.bars(), target),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn bar(ts: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn hourly_to_four_hour() {
        let bars = vec![
            bar(at(5, 8), 10.0, 12.0, 9.0, 11.0),
            bar(at(5, 9), 11.0, 13.0, 10.5, 12.5),
            bar(at(5, 11), 12.5, 12.6, 8.0, 9.0),
            bar(at(5, 12), 9.0, 10.0, 8.5, 9.5),
        ];
        let out = resample_bars(&bars, Interval::FourHour);
        assert_eq!(out.len(), 2);

        let first = &out[0];
        assert_eq!(first.timestamp, at(5, 8));
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 13.0);
        assert_eq!(first.low, 8.0);
        assert_eq!(first.close, 9.0);
        assert_eq!(first.volume, 300.0);

        assert_eq!(out[1].timestamp, at(5, 12));
        assert_eq!(out[1].close, 9.5);
    }

    #[test]
    fn gaps_produce_no_empty_buckets() {
        let bars = vec![
            bar(at(5, 1), 10.0, 10.0, 10.0, 10.0),
            bar(at(5, 20), 11.0, 11.0, 11.0, 11.0),
        ];
        let out = resample_bars(&bars, Interval::FourHour);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, at(5, 0));
        assert_eq!(out[1].timestamp, at(5, 20));
    }

    #[test]
    fn void_bars_skipped() {
        let mut void = bar(at(5, 9), 11.0, 11.0, 11.0, 11.0);
        void.close = f64::NAN;
        let bars = vec![bar(at(5, 8), 10.0, 10.0, 10.0, 10.0), void];
        let out = resample_bars(&bars, Interval::FourHour);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].close, 10.0);
    }

    #[test]
    fn daily_to_weekly_starts_monday() {
        // 2024-03-06 is a Wednesday, 2024-03-11 the following Monday.
        let bars = vec![
            bar(at(6, 0), 10.0, 11.0, 9.0, 10.5),
            bar(at(8, 0), 10.5, 12.0, 10.0, 11.5),
            bar(at(11, 0), 11.5, 11.6, 11.0, 11.2),
        ];
        let series = PriceSeries::new("SPY", Interval::Daily, bars).unwrap();
        let weekly = resample(&series, Interval::Weekly).unwrap();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.bars()[0].timestamp, at(4, 0));
        assert_eq!(weekly.bars()[0].close, 11.5);
        assert_eq!(weekly.bars()[1].timestamp, at(11, 0));
    }

    #[test]
    fn refuses_to_upsample() {
        let series =
            PriceSeries::new("SPY", Interval::Daily, vec![bar(at(5, 0), 1.0, 1.0, 1.0, 1.0)])
                .unwrap();
        assert!(resample(&series, Interval::OneHour).is_err());
        assert_eq!(resample(&series, Interval::Daily).unwrap(), series);
    }
}
