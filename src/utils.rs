//! Utility functions for output naming and size formatting

/// Suffix inserted before the extension of every output file
const OUTPUT_SUFFIX: &str = "_upscaled";

/// Extension used when the input name has none
const FALLBACK_EXTENSION: &str = "jpg";

/// Compute the output name for a processed file
///
/// The suffix is inserted before the final extension; the extension is
/// lowercased. Inputs without an extension default to `jpg`.
///
/// # Examples
///
/// ```
/// use cloudscale::utils::upscaled_file_name;
///
/// assert_eq!(upscaled_file_name("photo.jpg"), "photo_upscaled.jpg");
/// assert_eq!(upscaled_file_name("a.b.jpg"), "a.b_upscaled.jpg");
/// assert_eq!(upscaled_file_name("noext"), "noext_upscaled.jpg");
/// ```
#[must_use]
pub fn upscaled_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((base, ext)) => format!("{base}{OUTPUT_SUFFIX}.{}", ext.to_lowercase()),
        None => format!("{name}{OUTPUT_SUFFIX}.{FALLBACK_EXTENSION}"),
    }
}

/// Format a byte count for display
///
/// Uses binary thresholds with one decimal for KB and two for MB.
///
/// # Examples
///
/// ```
/// use cloudscale::utils::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(2 * 1024 * 1024), "2.00 MB");
/// ```
#[must_use]
pub fn format_bytes(len: u64) -> String {
    if len < 1024 {
        format!("{len} B")
    } else if len < 1_048_576 {
        format!("{:.1} KB", len as f64 / 1024.0)
    } else {
        format!("{:.2} MB", len as f64 / 1_048_576.0)
    }
}
