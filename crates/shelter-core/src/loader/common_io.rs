// crates/shelter-core/src/loader/common_io.rs
use crate::error::{Result, ShelterError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[cfg(feature = "compact")]
use flate2::read::GzDecoder;

/// Opens a file, buffers it, and wraps it in a Gzip decoder when the name ends in `.gz`.
/// Returns a generic Reader so the caller doesn't care about the compression.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        ShelterError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);

    if !is_gzip(path) {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(ShelterError::Config(format!(
            "{} is gzip-compressed; enable the `compact` feature",
            path.display()
        )))
    }
}

/// Reads the whole (decompressed) payload into memory.
pub fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut reader = open_stream(path)?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Format extension with any `.gz` suffix removed: `a.csv.gz` -> `csv`.
pub fn payload_extension(path: &Path) -> Option<String> {
    let inner = if is_gzip(path) {
        Path::new(path.file_stem()?)
    } else {
        path
    };
    inner
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_extension_skips_gz() {
        assert_eq!(payload_extension(Path::new("a/b.csv.gz")).as_deref(), Some("csv"));
        assert_eq!(payload_extension(Path::new("b.JSON")).as_deref(), Some("json"));
        assert_eq!(payload_extension(Path::new("noext")), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_all(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ShelterError::NotFound(_)));
    }

    #[cfg(feature = "compact")]
    #[test]
    fn reads_gzip_payload() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"a,b\n1,2\n").unwrap();
        enc.finish().unwrap();

        assert_eq!(read_all(&path).unwrap(), b"a,b\n1,2\n");
    }
}
