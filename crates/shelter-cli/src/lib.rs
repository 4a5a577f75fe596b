//! shelter-cli
//! ===========
//!
//! Command-line interface for the `shelter-core` nearest-shelter engine.
//!
//! The binary (`shelter-cli`) is the primary deliverable; this library target
//! holds the argument parsing and text rendering helpers it uses.
//!
//! Basic usage:
//!
//! ```text
//! shelter-cli --data-dir ./data nearest "33.8117,132.7789" --hazard earthquake --level full
//! shelter-cli --config shelters.json --json nearest "(33.8117, 132.7789)" --top 3
//! shelter-cli --data-dir ./data search 公民館
//! shelter-cli --data-dir ./data validate
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

use anyhow::{anyhow, bail, Context, Result};
use shelter_core::{
    CapabilityLevel, HazardType, QueryOutcome, RowIssue, ShelterRecord, SnapshotStats,
};
use std::fmt::Write;

/// Parses `"lat,lon"`. Whitespace anywhere and one pair of surrounding
/// parentheses are ignored.
///
/// ```rust
/// assert_eq!(shelter_cli::parse_point("(33.81, 132.77)").unwrap(), (33.81, 132.77));
/// ```
pub fn parse_point(text: &str) -> Result<(f64, f64)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let inner = compact
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(&compact);

    let (lat, lon) = inner
        .split_once(',')
        .ok_or_else(|| anyhow!("point `{text}` must be written as \"lat,lon\""))?;
    if lon.contains(',') {
        bail!("point `{text}` has more than two components");
    }
    let lat: f64 = lat
        .parse()
        .with_context(|| format!("latitude `{lat}` is not a number"))?;
    let lon: f64 = lon
        .parse()
        .with_context(|| format!("longitude `{lon}` is not a number"))?;
    Ok((lat, lon))
}

pub fn parse_hazard(text: &str) -> Result<HazardType> {
    text.parse::<HazardType>().map_err(|e| anyhow!(e))
}

pub fn parse_level(text: &str) -> Result<CapabilityLevel> {
    text.parse::<CapabilityLevel>().map_err(|e| anyhow!(e))
}

pub fn render_outcome(outcome: &QueryOutcome) -> String {
    let mut out = String::new();
    match outcome {
        QueryOutcome::NoMatch => out.push_str("No matching shelter found\n"),
        QueryOutcome::Matches(result) => {
            for (rank, entry) in result.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>2}. {}  {:.1} km  {}  [key {}]",
                    rank + 1,
                    entry.shelter.name(),
                    entry.distance_km,
                    entry.tier,
                    entry.shelter.key().unwrap_or("-"),
                );
                if !entry.shelter.address().is_empty() {
                    let _ = writeln!(out, "    {}", entry.shelter.address());
                }
            }
        }
    }
    out
}

pub fn render_stats(stats: &SnapshotStats) -> String {
    format!(
        "Snapshot statistics:\n  Sources: {}\n  Records: {}\n  Locatable shelters: {}\n  Keyed records: {}\n  Dropped rows: {}\n",
        stats.sources, stats.records, stats.locatable, stats.keyed, stats.dropped_rows
    )
}

pub fn render_search(query: &str, hits: &[ShelterRecord]) -> String {
    if hits.is_empty() {
        return format!("No shelters found matching: {query}\n");
    }
    let mut out = String::new();
    for s in hits {
        let _ = writeln!(
            out,
            "{} ({:.4}, {:.4}) {}",
            s.name(),
            s.location.lat(),
            s.location.lon(),
            s.address()
        );
    }
    out
}

pub fn render_issues(stats: &SnapshotStats, issues: &[RowIssue]) -> String {
    let mut out = format!(
        "Snapshot OK: {} records, {} locatable, {} rows dropped\n",
        stats.records, stats.locatable, stats.dropped_rows
    );
    for issue in issues {
        let _ = writeln!(
            out,
            "  {} row {}: {}",
            issue.dataset,
            issue.row + 1,
            issue.reason
        );
    }
    out
}
