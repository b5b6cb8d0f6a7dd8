//! Result export — CSV, JSON and a ranked plain-text table.
//!
//! Export never reorders the stored result list; [`ranked`] returns a sorted
//! view for display only.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::state::ScanHit;

// ─── Ranking ────────────────────────────────────────────────────────

/// Hits ordered by profit factor, then win rate, both descending.
pub fn ranked(hits: &[ScanHit]) -> Vec<&ScanHit> {
    let mut view: Vec<&ScanHit> = hits.iter().collect();
    view.sort_by(|a, b| {
        b.profit_factor
            .partial_cmp(&a.profit_factor)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .unwrap_or(Ordering::Equal)
            })
    });
    view
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: ticker, signals, signal_time, cross_time, gap_pct, close, ema_fast,
/// ema_slow, rsi, win_rate, profit_factor, sample_count
pub fn results_csv(hits: &[ScanHit]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker",
        "signals",
        "signal_time",
        "cross_time",
        "gap_pct",
        "close",
        "ema_fast",
        "ema_slow",
        "rsi",
        "win_rate",
        "profit_factor",
        "sample_count",
    ])?;

    for h in hits {
        wtr.write_record([
            h.ticker.clone(),
            h.signal_label(),
            h.signal_time.to_string(),
            h.cross_time.map(|t| t.to_string()).unwrap_or_default(),
            h.gap_pct.map(|g| format!("{g:.4}")).unwrap_or_default(),
            format!("{:.4}", h.close),
            format!("{:.4}", h.ema_fast),
            format!("{:.4}", h.ema_slow),
            format!("{:.2}", h.rsi),
            format!("{:.4}", h.win_rate),
            format!("{:.4}", h.profit_factor),
            h.sample_count.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn results_json(hits: &[ScanHit]) -> Result<String> {
    serde_json::to_string_pretty(hits).context("failed to serialize scan results to JSON")
}

/// Write hits to `path`; the extension (`.csv` or `.json`) picks the format.
pub fn write_results(path: &Path, hits: &[ScanHit]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let body = match ext.as_deref() {
        Some("csv") => results_csv(hits)?,
        Some("json") => results_json(hits)?,
        _ => bail!(
            "unsupported export format for {} (use .csv or .json)",
            path.display()
        ),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Table ──────────────────────────────────────────────────────────

/// Fixed-width table of the ranked hits.
pub fn results_table(hits: &[ScanHit]) -> String {
    let mut out = String::with_capacity(128 + hits.len() * 96);
    out.push_str(&format!(
        "{:<4} {:<10} {:<36} {:>10} {:>7} {:>8} {:>6} {:>5}\n",
        "#", "Ticker", "Signals", "Close", "RSI", "WinRate", "PF", "N"
    ));
    out.push_str(&format!("{}\n", "-".repeat(93)));
    for (i, h) in ranked(hits).into_iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<10} {:<36} {:>10.2} {:>7.1} {:>7.1}% {:>6.2} {:>5}\n",
            i + 1,
            h.ticker,
            h.signal_label(),
            h.close,
            h.rsi,
            h.win_rate * 100.0,
            h.profit_factor,
            h.sample_count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::hit;

    fn hits() -> Vec<ScanHit> {
        let mut low = hit("LOW");
        low.profit_factor = 1.6;
        let mut high = hit("HIGH");
        high.profit_factor = 9.9;
        let mut mid = hit("MID");
        mid.profit_factor = 2.5;
        vec![low, high, mid]
    }

    #[test]
    fn ranked_sorts_by_profit_factor_without_touching_input() {
        let hits = hits();
        let order: Vec<&str> = ranked(&hits).iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "MID", "LOW"]);
        assert_eq!(hits[0].ticker, "LOW");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = results_csv(&hits()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ticker,signals,signal_time"));
        assert!(lines[1].starts_with("LOW,golden_cross+bullish_continuation,2025-06-02 00:00:00"));
    }

    #[test]
    fn json_roundtrips() {
        let json = results_json(&hits()).unwrap();
        let parsed: Vec<ScanHit> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hits());
    }

    #[test]
    fn table_lists_ranked_rows() {
        let table = results_table(&hits());
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("HIGH"));
    }

    #[test]
    fn write_results_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out").join("hits.csv");
        write_results(&csv_path, &hits()).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("ticker,"));

        assert!(write_results(&dir.path().join("hits.xlsx"), &hits()).is_err());
    }
}
