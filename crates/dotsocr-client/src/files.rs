//! Local file validation for uploads.
//!
//! Every upload is checked before any network request: the path must point at
//! a regular file, the extension must belong to an accepted format, the MIME
//! type guessed from the filename must agree, and the leading bytes must carry
//! the format's magic signature.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// File formats accepted by the upload endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Jpeg,
    Png,
    WebP,
}

/// Longest magic signature checked (WebP: RIFF....WEBP).
const MAGIC_HEADER_LEN: usize = 12;

/// Maximum filename length accepted by the server's storage layer.
const MAX_FILENAME_LEN: usize = 255;

impl FileFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::WebP => &["webp"],
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Check whether the leading file bytes carry this format's signature
    pub fn matches_magic(&self, header: &[u8]) -> bool {
        match self {
            Self::Pdf => header.starts_with(b"%PDF"),
            Self::Jpeg => header.starts_with(&[0xFF, 0xD8]),
            Self::Png => header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Self::WebP => {
                header.len() >= MAGIC_HEADER_LEN
                    && &header[..4] == b"RIFF"
                    && &header[8..12] == b"WEBP"
            }
        }
    }
}

/// Validates that `path` points at a readable PDF file.
///
/// Checks extension, guessed MIME type, and the `%PDF` magic header, in that
/// order, without reading past the file's first bytes.
pub fn validate_pdf_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    existing_file(path)?;

    if extension_of(path).as_deref() != Some("pdf") {
        return Err(Error::invalid_file_type(path, "expected a .pdf extension"));
    }

    let guess = mime_guess::from_path(path).first_or_octet_stream();
    if guess != mime::APPLICATION_PDF {
        return Err(Error::invalid_file_type(
            path,
            format!("guessed MIME type '{guess}' is not application/pdf"),
        ));
    }

    let header = read_header(path)?;
    if !FileFormat::Pdf.matches_magic(&header) {
        return Err(Error::invalid_file_type(path, "missing %PDF header"));
    }

    Ok(())
}

/// Validates that `path` points at a readable JPEG, PNG, or WebP image and
/// returns the detected format.
pub fn validate_image_file(path: impl AsRef<Path>) -> Result<FileFormat> {
    let path = path.as_ref();
    existing_file(path)?;

    let ext = extension_of(path).unwrap_or_default();
    let format = FileFormat::from_extension(&ext)
        .filter(|format| *format != FileFormat::Pdf)
        .ok_or_else(|| {
            Error::invalid_file_type(path, "expected a .jpg, .jpeg, .png, or .webp extension")
        })?;

    let guess = mime_guess::from_path(path).first_or_octet_stream();
    if guess.essence_str() != format.mime_type() {
        return Err(Error::invalid_file_type(
            path,
            format!(
                "guessed MIME type '{guess}' is not {}",
                format.mime_type()
            ),
        ));
    }

    let header = read_header(path)?;
    if !format.matches_magic(&header) {
        return Err(Error::invalid_file_type(
            path,
            "file content does not match its image signature",
        ));
    }

    Ok(format)
}

/// Validates a whole image batch, returning the format of each file.
pub fn validate_image_files(paths: &[impl AsRef<Path>]) -> Result<Vec<FileFormat>> {
    paths.iter().map(validate_image_file).collect()
}

/// Strips directories and replaces characters the server's storage layer
/// rejects, truncating to the storage limit while keeping the extension.
pub fn sanitize_filename(filename: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let mut cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_FILENAME_LEN {
        cleaned = match cleaned.rfind('.') {
            Some(dot) if dot > 0 => {
                let ext: String = cleaned[dot..].to_string();
                let keep = MAX_FILENAME_LEN.saturating_sub(ext.chars().count());
                let stem: String = cleaned[..dot].chars().take(keep).collect();
                stem + &ext
            }
            _ => cleaned.chars().take(MAX_FILENAME_LEN).collect(),
        };
    }

    cleaned
}

/// Filename to attach to a multipart upload part.
pub(crate) fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(sanitize_filename)
        .unwrap_or_else(|| "upload".to_string())
}

fn existing_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::file_not_found(path))
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| Error::file_read(path, e))?;
    let mut header = [0u8; MAGIC_HEADER_LEN];
    let mut filled = 0;

    while filled < header.len() {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::file_read(path, e)),
        }
    }

    Ok(header[..filled].to_vec())
}
