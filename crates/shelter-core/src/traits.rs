// crates/shelter-core/src/traits.rs
use crate::error::Result;
use crate::loader::{DatasetVersion, RawTable};
use crate::text::fold_key;

/// Where a dataset's rows come from.
///
/// The loader only ever talks to sources through this trait, so file-backed
/// tables and in-memory tables share one pipeline. `version` must be cheap:
/// the snapshot store calls it on every snapshot lookup to decide whether a
/// rebuild is due.
pub trait TableSource: Send + Sync {
    /// Identity + modification stamp of the current contents.
    fn version(&self) -> Result<DatasetVersion>;

    /// Reads the full table. This is the only place I/O happens.
    fn read(&self) -> Result<RawTable>;
}

/// Name-based matching helpers for types that expose a display name.
///
/// Comparisons go through [`fold_key`], so they are case-insensitive and
/// accent-insensitive.
///
/// # Examples
/// ```rust
/// use shelter_core::traits::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Łódź Hall").name_contains("lodz"));
/// assert!(Place("Zürich").is_named("zurich"));
/// ```
pub trait NameMatch {
    fn name_str(&self) -> &str;

    #[inline]
    fn is_named(&self, q: &str) -> bool {
        fold_key(self.name_str()) == fold_key(q)
    }

    #[inline]
    fn name_contains(&self, q: &str) -> bool {
        fold_key(self.name_str()).contains(&fold_key(q))
    }
}
