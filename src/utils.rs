//! Utility functions for export filenames and HTTP header inspection

use chrono::NaiveDateTime;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
pub(crate) const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Build the download filename for an export
///
/// Format: `<prefix>_<YYYYMMDD>_<HHMMSS>.<extension>`. An empty extension yields
/// no trailing dot.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use orders_export::utils::export_filename;
///
/// let moment = NaiveDate::from_ymd_opt(2023, 6, 10)
///     .unwrap()
///     .and_hms_opt(14, 5, 9)
///     .unwrap();
/// assert_eq!(
///     export_filename("orders_export", moment, "xlsx"),
///     "orders_export_20230610_140509.xlsx"
/// );
/// ```
pub fn export_filename(prefix: &str, moment: NaiveDateTime, extension: &str) -> String {
    let stamp = moment.format("%Y%m%d_%H%M%S");
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{}_{}", prefix, stamp)
    } else {
        format!("{}_{}.{}", prefix, stamp, extension)
    }
}

/// Extract the filename from a Content-Disposition header
///
/// Handles `filename="x.xlsx"`, unquoted `filename=x.xlsx`, and the RFC 5987
/// `filename*=UTF-8''x.xlsx` form. The encoded form wins when both are present.
pub fn filename_from_content_disposition(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;

    let mut plain = None;
    for part in value.split(';') {
        let part = part.trim();
        if let Some(encoded) = part.strip_prefix("filename*=") {
            // Format is: charset'lang'encoded-filename
            if let Some(idx) = encoded.rfind('\'')
                && let Ok(decoded) = urlencoding::decode(&encoded[idx + 1..])
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        } else if let Some(name) = part.strip_prefix("filename=") {
            let name = name.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }

    plain
}

/// Map a Content-Type to a file extension
///
/// Only formats the export endpoint is known to produce are mapped.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some("xlsx"),
        "application/vnd.ms-excel" => Some("xls"),
        "text/csv" => Some("csv"),
        "application/pdf" => Some("pdf"),
        "application/zip" => Some("zip"),
        _ => None,
    }
}

/// Work out the extension the server declared for a payload
///
/// Tries the Content-Disposition filename first, then the Content-Type.
/// `None` when neither identifies the format.
pub fn declared_extension(headers: &HeaderMap) -> Option<String> {
    if let Some(filename) = filename_from_content_disposition(headers)
        && let Some(ext) = Path::new(&filename).extension().and_then(|e| e.to_str())
        && !ext.is_empty()
    {
        return Some(ext.to_ascii_lowercase());
    }

    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
        && let Some(ext) = extension_for_content_type(content_type)
    {
        return Some(ext.to_string());
    }

    None
}

/// Candidate path for the `attempt`-th collision of `path`
///
/// Attempt 0 is the path itself; later attempts insert ` (n)` before the
/// extension, e.g. `report (1).xlsx`.
pub(crate) fn collision_candidate(path: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    };

    match path.parent() {
        Some(parent) => parent.join(new_name),
        None => PathBuf::from(new_name),
    }
}
