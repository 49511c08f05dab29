//! Item image uploads.
//!
//! Uploaded filenames are sanitized before they touch the filesystem, and
//! only a small set of image extensions is accepted. Files are written
//! under the configured upload directory; the database stores the path
//! relative to the static root so templates can serve it back.

use std::path::Path;

use thiserror::Error;

/// File extensions accepted for item images (lowercase).
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Path prefix, relative to the static root, under which images are stored.
const UPLOAD_PREFIX: &str = "assets/uploads";

/// Errors that can occur while storing an uploaded image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload had no usable filename after sanitization.
    #[error("image filename is not usable")]
    BadFilename,

    /// The file extension is not in the allow-list.
    #[error("images must be jpg, jpeg, or png")]
    UnsupportedType,

    /// The uploaded file was empty.
    #[error("uploaded image is empty")]
    Empty,

    /// Writing the file failed.
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce an untrusted filename to a safe single path component.
///
/// Keeps ASCII alphanumerics, dots, dashes, and underscores; everything
/// else becomes an underscore. Any directory part is discarded, and
/// leading dots are stripped so the result can never traverse out of the
/// upload directory or hide as a dotfile.
///
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.to_owned())
}

/// Whether a filename carries an accepted image extension.
#[must_use]
pub fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&lower.as_str())
        })
}

/// Sanitize, validate, and persist an uploaded image.
///
/// Writes the file into `upload_dir` and returns the path to store in the
/// database, relative to the static root (e.g. `assets/uploads/mug.png`).
/// A same-named upload overwrites the previous file.
///
/// # Errors
///
/// Returns `UploadError::BadFilename` if the name sanitizes to nothing,
/// `UploadError::UnsupportedType` for disallowed extensions,
/// `UploadError::Empty` for zero-byte uploads, and `UploadError::Io` if
/// the write fails.
pub async fn store_image(
    upload_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let filename = sanitize_filename(original_name).ok_or(UploadError::BadFilename)?;

    if !has_allowed_extension(&filename) {
        return Err(UploadError::UnsupportedType);
    }

    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(upload_dir.join(&filename), bytes).await?;

    Ok(format!("{UPLOAD_PREFIX}/{filename}"))
}
