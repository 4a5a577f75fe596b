// crates/shelter-core/src/error.rs

use thiserror::Error;

/// Errors raised while building a shelter snapshot or answering a query.
///
/// Pipeline errors (`Schema`, `AmbiguousKey`, `UnrecognizedValue`, I/O and
/// parse failures) block every query against the affected snapshot until the
/// source is corrected. Query errors (`InvalidArgument`, `DeadlineExceeded`)
/// only fail the request that caused them; see [`ShelterError::is_query_error`].
///
/// An empty match is *not* an error; it is reported as
/// [`crate::QueryOutcome::NoMatch`].
#[derive(Debug, Error)]
pub enum ShelterError {
    #[error("dataset `{dataset}` is missing required columns: {missing:?}")]
    Schema {
        dataset: String,
        missing: Vec<String>,
    },

    #[error("key `{key}` appears more than once in dataset `{dataset}`")]
    AmbiguousKey { key: String, dataset: String },

    #[error("dataset `{dataset}`: column `{column}` holds unrecognized value `{value}`")]
    UnrecognizedValue {
        dataset: String,
        column: String,
        value: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("query exceeded its deadline of {budget_ms} ms; partial results discarded")]
    DeadlineExceeded { budget_ms: u128 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("table read error: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("snapshot cache error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl ShelterError {
    /// `true` for errors local to a single query; the cached snapshot and other
    /// concurrent queries are unaffected by these.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            ShelterError::InvalidArgument(_) | ShelterError::DeadlineExceeded { .. }
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ShelterError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ShelterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_are_classified() {
        assert!(ShelterError::invalid("top_n must be positive").is_query_error());
        assert!(ShelterError::DeadlineExceeded { budget_ms: 5 }.is_query_error());
        assert!(!ShelterError::AmbiguousKey {
            key: "1".into(),
            dataset: "facilities".into()
        }
        .is_query_error());
    }

    #[test]
    fn schema_error_names_missing_columns() {
        let err = ShelterError::Schema {
            dataset: "facilities".into(),
            missing: vec!["latitude".into()],
        };
        assert_eq!(
            err.to_string(),
            "dataset `facilities` is missing required columns: [\"latitude\"]"
        );
    }
}
