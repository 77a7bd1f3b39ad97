// Content-Disposition filename extraction

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Name used when the backend does not suggest one
pub const DEFAULT_FILENAME: &str = "generated.pptx";

static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)filename=([^;]+)").expect("filename pattern is valid"));

/// Recover the suggested filename from a `Content-Disposition` header value.
///
/// - `attachment; filename=report.pptx` → `report.pptx`
/// - `attachment; filename="report.pptx"` → `report.pptx`
/// - missing header or no `filename=` → `generated.pptx`
///
/// Only the final path component is kept, so the result is always a plain
/// name inside the output directory.
pub fn filename_from_disposition(header: Option<&str>) -> String {
    let Some(header) = header else {
        return DEFAULT_FILENAME.to_string();
    };

    let Some(raw) = FILENAME_PATTERN
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return DEFAULT_FILENAME.to_string();
    };

    let unquoted = raw.replace('"', "");
    let unquoted = unquoted.trim();

    // Treat backslashes as separators too, Windows-style names come through here
    let normalized = unquoted.replace('\\', "/");
    match Path::new(&normalized).file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => DEFAULT_FILENAME.to_string(),
    }
}
