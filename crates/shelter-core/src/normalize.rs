// crates/shelter-core/src/normalize.rs

//! Raw [`Dataset`] → canonical rows.
//!
//! Every source names its key column differently (`共通ID`, `df2_共通ID`, ...)
//! and writes capability levels in its own encoding. After this pass all
//! rows carry one canonical key, typed capability levels and, for the
//! facilities source, a validated [`Site`].

use crate::error::{Result, ShelterError};
use crate::loader::Dataset;
use crate::model::{AcceptanceTag, CapabilityMap, GeoPoint, Site};
use crate::schema::{SourceRole, SourceSpec};
use crate::text::non_blank;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A row that was dropped during normalization, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub dataset: String,
    /// Zero-based data row index (header excluded).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Index of the row in its source dataset.
    pub row: usize,
    pub key: Option<String>,
    pub site: Option<Site>,
    pub capabilities: CapabilityMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub id: String,
    pub role: SourceRole,
    pub rows: Vec<NormalizedRow>,
    pub issues: Vec<RowIssue>,
    /// Keys of dropped rows, paired with their row index. They still count
    /// toward key uniqueness.
    pub dropped_keys: Vec<(usize, String)>,
}

/// Trims the key; an integer written with a trailing `.0` (a spreadsheet
/// float export) is reduced to the integer text.
pub fn canonical_key(raw: &str) -> String {
    let key = raw.trim();
    match key.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) => int.to_owned(),
        _ => key.to_owned(),
    }
}

pub fn normalize(dataset: &Dataset, spec: &SourceSpec) -> Result<NormalizedTable> {
    let id = dataset.id();
    let values = spec.capability_encoding.table();
    let mut rows = Vec::with_capacity(dataset.len());
    let mut issues = Vec::new();
    let mut dropped_keys = Vec::new();

    for row in 0..dataset.len() {
        let key = spec
            .schema
            .key
            .as_deref()
            .and_then(|col| non_blank(dataset.get(row, col)))
            .map(canonical_key);

        let mut capabilities = CapabilityMap::new();
        for (hazard, column) in &spec.fields.hazards {
            if dataset.has_column(column) {
                let level = values.translate(id, column, non_blank(dataset.get(row, column)))?;
                capabilities.set(*hazard, level);
            }
        }

        let site = match spec.role {
            SourceRole::HazardCapability => None,
            SourceRole::Facilities => match site_for(dataset, spec, row)? {
                Ok(site) => Some(site),
                Err(reason) => {
                    warn!(dataset = id, row, %reason, "dropping facility row");
                    if let Some(key) = key {
                        dropped_keys.push((row, key));
                    }
                    issues.push(RowIssue {
                        dataset: id.to_owned(),
                        row,
                        reason,
                    });
                    continue;
                }
            },
        };

        rows.push(NormalizedRow {
            row,
            key,
            site,
            capabilities,
        });
    }

    Ok(NormalizedTable {
        id: id.to_owned(),
        role: spec.role,
        rows,
        issues,
        dropped_keys,
    })
}

/// Outer `Result` is fatal (unrecognized acceptance value); inner `Err` is a
/// per-row validation failure that drops only this row.
fn site_for(
    dataset: &Dataset,
    spec: &SourceSpec,
    row: usize,
) -> Result<std::result::Result<Site, String>> {
    let fields = &spec.fields;
    let cell = |col: &Option<String>| col.as_deref().and_then(|c| non_blank(dataset.get(row, c)));

    let acceptance = match fields.acceptance.as_deref() {
        Some(col) if dataset.has_column(col) => {
            spec.acceptance_encoding
                .translate(dataset.id(), col, non_blank(dataset.get(row, col)))?
        }
        _ => AcceptanceTag::Unspecified,
    };

    let Some(name) = cell(&fields.name) else {
        return Ok(Err("facility name is empty".into()));
    };
    let address = cell(&fields.address).unwrap_or_default();

    let lat = match parse_coord(cell(&fields.latitude), "latitude") {
        Ok(v) => v,
        Err(reason) => return Ok(Err(reason)),
    };
    let lon = match parse_coord(cell(&fields.longitude), "longitude") {
        Ok(v) => v,
        Err(reason) => return Ok(Err(reason)),
    };
    let location = match GeoPoint::new(lat, lon) {
        Ok(p) => p,
        Err(ShelterError::InvalidArgument(reason)) => return Ok(Err(reason)),
        Err(other) => return Err(other),
    };

    Ok(Ok(Site {
        name: name.to_owned(),
        address: address.to_owned(),
        location,
        acceptance,
    }))
}

fn parse_coord(cell: Option<&str>, what: &str) -> std::result::Result<f64, String> {
    let raw = cell.ok_or_else(|| format!("{what} is empty"))?;
    raw.parse::<f64>()
        .map_err(|_| format!("{what} `{raw}` is not a number"))
}
