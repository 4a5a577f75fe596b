// crates/shelter-core/src/loader/csv.rs
use super::RawTable;
use crate::error::Result;
use polars::prelude::*;
use std::io::Cursor;

/// Parses CSV bytes with every column kept as text.
///
/// Type inference is switched off (`infer_schema_length = 0`) so that codes
/// such as `01`, `1.0` or `○` reach the normalizer exactly as written.
pub(crate) fn parse(bytes: Vec<u8>) -> Result<RawTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();

    let text_columns = columns
        .iter()
        .map(|name| df.column(name).and_then(|c| c.str()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let rows = (0..df.height())
        .map(|idx| {
            text_columns
                .iter()
                .map(|col| col.get(idx).map(str::to_owned))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_codes_as_text() {
        let csv = "共通ID,施設・場所名,df2_地震\n01,公民館,1.0\n02,小学校,\n";
        let table = parse(csv.as_bytes().to_vec()).unwrap();

        assert_eq!(table.columns(), ["共通ID", "施設・場所名", "df2_地震"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), Some("01"));
        assert_eq!(table.cell(0, 2), Some("1.0"));
        assert_eq!(table.cell(1, 2), None);
    }
}
