//! PDF file recognition: header sniffing and extension checks used by
//! input discovery and the extractor.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the header of `path` and return the declared PDF version.
///
/// Fails with [`Error::UnknownFormat`] when the file does not start with a
/// PDF header, and with [`Error::UnsupportedVersion`] when the version field
/// is malformed.
pub fn sniff_pdf_version<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    pdf_version_from_bytes(&header)
}

/// Return the PDF version declared in the first bytes of `data`.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    if rest.len() < VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    let version = String::from_utf8_lossy(&rest[..VERSION_LEN]).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Whether `path` carries a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_valid_header() {
        let version = pdf_version_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(version, "1.7");
        let version = pdf_version_from_bytes(b"%PDF-2.0\n").unwrap();
        assert_eq!(version, "2.0");
    }

    #[test]
    fn test_version_rejects_other_formats() {
        assert!(matches!(
            pdf_version_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            pdf_version_from_bytes(b"%PDF-"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            pdf_version_from_bytes(b"%PDF-x.y"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_sniff_reads_file_header() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&good, b"%PDF-1.4\nrest of file").unwrap();
        std::fs::write(&bad, b"definitely not").unwrap();

        assert_eq!(sniff_pdf_version(&good).unwrap(), "1.4");
        assert!(matches!(sniff_pdf_version(&bad), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension("report.pdf"));
        assert!(has_pdf_extension("REPORT.PDF"));
        assert!(!has_pdf_extension("report.pdf.txt"));
        assert!(!has_pdf_extension("report"));
    }
}
