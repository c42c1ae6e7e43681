//! Extension-based file size estimates.
//!
//! Used for files whose size is unknown at planning time, so that formats
//! requiring sizes can still be compiled.

/// Projected or co-added image
pub const IMAGE_BYTES: u64 = 4 * 1024 * 1024;
/// Image table
pub const TABLE_BYTES: u64 = 16 * 1024;
/// Fit parameters or header text
pub const TEXT_BYTES: u64 = 1024;
/// Rendered preview
pub const PREVIEW_BYTES: u64 = 512 * 1024;
/// Anything else
pub const DEFAULT_BYTES: u64 = 4096;

/// Estimated size for a file name.
#[must_use]
pub fn estimate_size(name: &str) -> u64 {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "fits" | "fit" | "gz" => IMAGE_BYTES,
        "tbl" => TABLE_BYTES,
        "txt" | "hdr" => TEXT_BYTES,
        "png" | "jpg" | "jpeg" => PREVIEW_BYTES,
        _ => DEFAULT_BYTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimates() {
        assert_eq!(estimate_size("p1.fits"), IMAGE_BYTES);
        assert_eq!(estimate_size("raw.fits.gz"), IMAGE_BYTES);
        assert_eq!(estimate_size("1-images.tbl"), TABLE_BYTES);
        assert_eq!(estimate_size("1-fit.000000.000001.txt"), TEXT_BYTES);
        assert_eq!(estimate_size("region.hdr"), TEXT_BYTES);
        assert_eq!(estimate_size("mosaic-color.PNG"), PREVIEW_BYTES);
        assert_eq!(estimate_size("README"), DEFAULT_BYTES);
    }
}
