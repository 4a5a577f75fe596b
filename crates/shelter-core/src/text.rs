// crates/shelter-core/src/text.rs

/// Convert a string into a folded key suitable for comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII (e.g. `Łódź` -> `Lodz`, `松山` -> `Song Shan`)
/// 2\) Normalize to lowercase
///
/// Both sides of a comparison must be folded the same way; the
/// transliteration is best-effort and not meant for display.
///
/// # Examples
///
/// ```rust
/// use shelter_core::text::fold_key;
///
/// assert_eq!(fold_key("Łódź"), "lodz");
/// assert_eq!(fold_key("Straße"), "strasse");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Normalizes a header cell: trims whitespace and strips a UTF-8 byte order mark.
pub fn clean_header(s: &str) -> String {
    s.trim_start_matches('\u{feff}').trim().to_owned()
}

/// Trims a data cell; blank cells become `None`.
pub fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_key_is_case_and_accent_insensitive() {
        assert_eq!(fold_key("MÜNCHEN"), fold_key("munchen"));
        assert_eq!(fold_key("松山市"), fold_key("松山市"));
    }

    #[test]
    fn clean_header_strips_bom() {
        assert_eq!(clean_header("\u{feff}施設・場所名 "), "施設・場所名");
    }

    #[test]
    fn blank_cells_are_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" ○ ")), Some("○"));
        assert_eq!(non_blank(None), None);
    }
}
