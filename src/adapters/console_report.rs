//! Plain-text rendering of batch and single-symbol analyses.

use crate::domain::analysis::{
    BatchOutcome, DetailedAnalysis, PLACEHOLDER, RSI_PERIOD, VOLATILITY_PERIOD,
};
use crate::domain::history::{HistoryRow, HistorySummary};
use crate::domain::indicator::IndicatorType;
use crate::domain::portfolio::Portfolio;
use crate::domain::summary::{strong_buys, top_picks, weakest};
use std::fmt::Write;

const TOP_PICKS: usize = 3;

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{:.2}{}", v, suffix))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn fmt_change(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:+.2}%", v))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn render_batch_report(portfolio_name: &str, outcome: &BatchOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", portfolio_name);

    if outcome.results.is_empty() {
        let _ = writeln!(out, "No symbols could be analysed.");
    } else {
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:>10} {:>9} {:>7} {:<5}",
            "Symbol", "Name", "Price", "Change", "Signals", "Rec"
        );
        for r in &outcome.results {
            let _ = writeln!(
                out,
                "{:<6} {:<20} {:>10.2} {:>9} {:>7} {:<5}",
                r.symbol,
                r.display_name,
                r.price(),
                fmt_change(r.day_change_percent),
                r.snapshot.signal_fraction(),
                r.recommendation()
            );
        }

        let stats = outcome.summary();
        let _ = writeln!(out, "\n=== Summary ===");
        let _ = writeln!(out, "Analysed:         {}", stats.total);
        let _ = writeln!(
            out,
            "BUY:              {} ({:.1}%)",
            stats.buy_count,
            stats.percent_of_total(stats.buy_count)
        );
        let _ = writeln!(
            out,
            "HOLD:             {} ({:.1}%)",
            stats.hold_count,
            stats.percent_of_total(stats.hold_count)
        );
        let _ = writeln!(
            out,
            "SELL:             {} ({:.1}%)",
            stats.sell_count,
            stats.percent_of_total(stats.sell_count)
        );
        let _ = writeln!(out, "Average price:    {}", fmt_opt(stats.average_price, ""));
        let _ = writeln!(
            out,
            "Price range:      {} - {}",
            fmt_opt(stats.min_price, ""),
            fmt_opt(stats.max_price, "")
        );
        let _ = writeln!(
            out,
            "Average signals:  {}",
            fmt_opt(stats.average_signal_count, "/3")
        );
        let _ = writeln!(
            out,
            "Average change:   {}",
            fmt_change(stats.average_day_change)
        );

        let _ = writeln!(out, "\n=== Top Picks ===");
        for (i, r) in top_picks(&outcome.results).iter().take(TOP_PICKS).enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({}) {} {}",
                i + 1,
                r.symbol,
                r.display_name,
                r.snapshot.signal_fraction(),
                r.recommendation()
            );
        }

        let strong = strong_buys(&outcome.results);
        if !strong.is_empty() {
            let symbols: Vec<&str> = strong.iter().map(|r| r.symbol.as_str()).collect();
            let _ = writeln!(out, "Strong buys:      {}", symbols.join(", "));
        }
        let weak = weakest(&outcome.results);
        if !weak.is_empty() {
            let symbols: Vec<&str> = weak.iter().map(|r| r.symbol.as_str()).collect();
            let _ = writeln!(out, "Weakest:          {}", symbols.join(", "));
        }
    }

    if !outcome.skipped.is_empty() {
        let _ = writeln!(out, "\n=== Skipped ===");
        for s in &outcome.skipped {
            let _ = writeln!(out, "  {}: {}", s.symbol, s.reason);
        }
    }
    if outcome.sink_failures > 0 {
        let _ = writeln!(out, "\n{} sink write(s) failed", outcome.sink_failures);
    }

    out
}

pub fn render_detailed(detail: &DetailedAnalysis) -> String {
    let r = &detail.result;
    let snap = &r.snapshot;
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ({}) ===", r.symbol, r.display_name);
    let _ = writeln!(out, "Price:              {:.2}", r.price());
    let _ = writeln!(out, "Day change:         {}", fmt_change(r.day_change_percent));
    let _ = writeln!(out, "Volume:             {}", r.latest_volume);
    let _ = writeln!(out, "Bars analysed:      {}", detail.bars);

    let _ = writeln!(out, "\n--- Moving averages ---");
    let short = IndicatorType::Sma(detail.windows.short_window).to_string();
    let long = IndicatorType::Sma(detail.windows.long_window).to_string();
    let _ = writeln!(out, "{:<20}{:.2}", format!("{}:", short), snap.short_average);
    let _ = writeln!(out, "{:<20}{}", format!("{}:", long), fmt_opt(snap.long_average, ""));

    let _ = writeln!(out, "\n--- 30-day range ---");
    let _ = writeln!(out, "High:               {:.2}", detail.highest_high);
    let _ = writeln!(out, "Low:                {:.2}", detail.lowest_low);
    let _ = writeln!(
        out,
        "From low:           {}",
        fmt_opt(detail.performance_from_low, "%")
    );
    let _ = writeln!(
        out,
        "Below high:         {}",
        fmt_opt(detail.distance_from_high, "%")
    );
    let _ = writeln!(out, "Avg volume (10d):   {:.0}", detail.average_volume);
    let rsi = IndicatorType::Rsi(RSI_PERIOD).to_string();
    let volatility = IndicatorType::Volatility(VOLATILITY_PERIOD).to_string();
    let _ = writeln!(out, "{:<20}{}", format!("{}:", rsi), fmt_opt(detail.rsi, ""));
    let _ = writeln!(
        out,
        "{:<20}{}",
        format!("{}:", volatility),
        fmt_opt(detail.volatility, "")
    );

    let _ = writeln!(out, "\n--- Signals {} ---", snap.signal_fraction());
    if snap.active_signals.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for signal in &snap.active_signals {
        let _ = writeln!(out, "  + {}", signal);
    }
    let _ = writeln!(out, "\nRecommendation:     {}", r.recommendation());
    let _ = writeln!(out, "{}", snap.advice());

    out
}

/// One line per portfolio: key, display name, symbols.
pub fn render_portfolios(portfolios: &[(String, Portfolio)]) -> String {
    let mut out = String::new();
    for (key, p) in portfolios {
        let _ = writeln!(
            out,
            "{:<12} {:<20} {}",
            key,
            p.name,
            p.symbols().join(", ")
        );
    }
    out
}

/// Recorded rows oldest first, followed by the recommendation tally of
/// `summary`.
pub fn render_history(rows: &[HistoryRow], summary: &HistorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== History ===");
    if rows.is_empty() {
        let _ = writeln!(out, "No recorded analyses.");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<19} {:<6} {:>10} {:>8} {:<5} {}",
        "Timestamp", "Symbol", "Price", "Change", "Rec", "Type"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<19} {:<6} {:>10} {:>8} {:<5} {}",
            row.timestamp,
            row.symbol,
            row.price,
            row.change_percent,
            row.recommendation,
            row.analysis_type
        );
    }

    let _ = writeln!(out, "\n=== Recent recommendations ===");
    let _ = writeln!(out, "Analyses:         {}", summary.total);
    for (recommendation, count) in &summary.recommendations {
        let _ = writeln!(out, "  {:<16}{}", format!("{}:", recommendation), count);
    }
    if let Some(last) = &summary.last {
        let _ = writeln!(
            out,
            "Last analysis:    {} {} {} ({})",
            last.timestamp, last.symbol, last.recommendation, last.analysis_type
        );
    }
    out
}
