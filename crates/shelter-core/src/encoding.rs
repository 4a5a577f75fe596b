// crates/shelter-core/src/encoding.rs

//! Translation tables from raw cell text to canonical enums.
//!
//! Sources disagree on how they write capability levels: some use symbols
//! (○ △ ✕), some letters, some integers (1 = full, 2 = partial, 0 = none).
//! Each source declares which table applies. A value outside the table is a
//! data defect and fails loudly; only blank cells mean "no data".

use crate::error::{Result, ShelterError};
use crate::model::{AcceptanceTag, CapabilityLevel};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static SYMBOL: Lazy<ValueMap> = Lazy::new(|| {
    ValueMap::from_pairs([
        ("○", CapabilityLevel::Full),
        ("◯", CapabilityLevel::Full),
        ("〇", CapabilityLevel::Full),
        ("△", CapabilityLevel::Partial),
        ("✕", CapabilityLevel::None),
        ("×", CapabilityLevel::None),
        ("✖", CapabilityLevel::None),
        ("-", CapabilityLevel::Unknown),
        ("−", CapabilityLevel::Unknown),
    ])
});

static LETTER: Lazy<ValueMap> = Lazy::new(|| {
    ValueMap::from_pairs([
        ("A", CapabilityLevel::Full),
        ("a", CapabilityLevel::Full),
        ("B", CapabilityLevel::Partial),
        ("b", CapabilityLevel::Partial),
        ("C", CapabilityLevel::None),
        ("c", CapabilityLevel::None),
    ])
});

static INTEGER: Lazy<ValueMap> = Lazy::new(|| {
    ValueMap::from_pairs([
        ("1", CapabilityLevel::Full),
        ("1.0", CapabilityLevel::Full),
        ("2", CapabilityLevel::Partial),
        ("2.0", CapabilityLevel::Partial),
        ("0", CapabilityLevel::None),
        ("0.0", CapabilityLevel::None),
    ])
});

static STANDARD: Lazy<ValueMap> = Lazy::new(|| {
    let mut map = SYMBOL.clone();
    map.extend(&LETTER);
    map.extend(&INTEGER);
    map
});

static ACCEPTANCE: Lazy<AcceptanceMap> = Lazy::new(|| {
    AcceptanceMap(
        [
            ("要配慮者", AcceptanceTag::Restricted),
            ("restricted", AcceptanceTag::Restricted),
            ("一般", AcceptanceTag::General),
            ("general", AcceptanceTag::General),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect(),
    )
});

/// Raw value → [`CapabilityLevel`] table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMap(BTreeMap<String, CapabilityLevel>);

impl ValueMap {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, CapabilityLevel)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
    }

    pub fn extend(&mut self, other: &ValueMap) {
        self.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), *v)));
    }

    pub fn lookup(&self, raw: &str) -> Option<CapabilityLevel> {
        self.0.get(raw).copied()
    }

    /// Translates one cell. `None` (blank) reads as `Unknown`.
    pub fn translate(&self, dataset: &str, column: &str, cell: Option<&str>) -> Result<CapabilityLevel> {
        let Some(raw) = cell else {
            return Ok(CapabilityLevel::Unknown);
        };
        self.lookup(raw).ok_or_else(|| ShelterError::UnrecognizedValue {
            dataset: dataset.to_owned(),
            column: column.to_owned(),
            value: raw.to_owned(),
        })
    }
}

/// Which capability table a source uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityEncoding {
    Symbol,
    Letter,
    Integer,
    /// Union of symbol, letter and integer tables; they do not overlap.
    #[default]
    Standard,
    Custom(ValueMap),
}

impl CapabilityEncoding {
    pub fn table(&self) -> &ValueMap {
        match self {
            CapabilityEncoding::Symbol => &*SYMBOL,
            CapabilityEncoding::Letter => &*LETTER,
            CapabilityEncoding::Integer => &*INTEGER,
            CapabilityEncoding::Standard => &*STANDARD,
            CapabilityEncoding::Custom(map) => map,
        }
    }
}

/// Raw value → [`AcceptanceTag`] table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceMap(BTreeMap<String, AcceptanceTag>);

impl Default for AcceptanceMap {
    fn default() -> Self {
        ACCEPTANCE.clone()
    }
}

impl AcceptanceMap {
    /// Default table plus `extra` entries (which win on conflict).
    pub fn with_entries<'a>(extra: impl IntoIterator<Item = (&'a str, AcceptanceTag)>) -> Self {
        let mut map = Self::default();
        map.0
            .extend(extra.into_iter().map(|(k, v)| (k.to_owned(), v)));
        map
    }

    /// Translates one cell. `None` (blank) reads as `Unspecified`.
    pub fn translate(&self, dataset: &str, column: &str, cell: Option<&str>) -> Result<AcceptanceTag> {
        let Some(raw) = cell else {
            return Ok(AcceptanceTag::Unspecified);
        };
        self.0
            .get(raw)
            .or_else(|| self.0.get(raw.to_ascii_lowercase().as_str()))
            .copied()
            .ok_or_else(|| ShelterError::UnrecognizedValue {
                dataset: dataset.to_owned(),
                column: column.to_owned(),
                value: raw.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_all_three_encodings() {
        let table = CapabilityEncoding::Standard.table();
        assert_eq!(table.lookup("○"), Some(CapabilityLevel::Full));
        assert_eq!(table.lookup("△"), Some(CapabilityLevel::Partial));
        assert_eq!(table.lookup("✕"), Some(CapabilityLevel::None));
        assert_eq!(table.lookup("B"), Some(CapabilityLevel::Partial));
        assert_eq!(table.lookup("0"), Some(CapabilityLevel::None));
        assert_eq!(table.lookup("2.0"), Some(CapabilityLevel::Partial));
    }

    #[test]
    fn narrow_tables_reject_other_encodings() {
        let err = CapabilityEncoding::Integer
            .table()
            .translate("hazards", "df2_地震", Some("○"))
            .unwrap_err();
        match err {
            ShelterError::UnrecognizedValue { column, value, .. } => {
                assert_eq!(column, "df2_地震");
                assert_eq!(value, "○");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_value_is_never_coerced() {
        let table = CapabilityEncoding::Standard.table();
        assert!(table.translate("s", "c", Some("3")).is_err());
        assert!(table.translate("s", "c", Some("yes")).is_err());
        assert_eq!(
            table.translate("s", "c", None).unwrap(),
            CapabilityLevel::Unknown
        );
    }

    #[test]
    fn custom_encoding_from_json() {
        let enc: CapabilityEncoding =
            serde_json::from_str(r#"{"custom": {"Y": "full", "N": "none"}}"#).unwrap();
        assert_eq!(enc.table().lookup("Y"), Some(CapabilityLevel::Full));
        assert_eq!(enc.table().lookup("○"), None);
    }

    #[test]
    fn acceptance_defaults() {
        let map = AcceptanceMap::default();
        assert_eq!(
            map.translate("f", "受入対象者", Some("要配慮者")).unwrap(),
            AcceptanceTag::Restricted
        );
        assert_eq!(
            map.translate("f", "受入対象者", Some("General")).unwrap(),
            AcceptanceTag::General
        );
        assert_eq!(
            map.translate("f", "受入対象者", None).unwrap(),
            AcceptanceTag::Unspecified
        );
        assert!(map.translate("f", "受入対象者", Some("妊婦")).is_err());
    }

    #[test]
    fn acceptance_extra_entries() {
        let map = AcceptanceMap::with_entries([("全員", AcceptanceTag::General)]);
        assert_eq!(
            map.translate("f", "c", Some("全員")).unwrap(),
            AcceptanceTag::General
        );
    }
}
