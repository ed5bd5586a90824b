//! Bundle size measurement and the size ceiling check.

use htmlpack_shared::{HtmlpackError, Result};

/// Encoded size of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSize {
    /// UTF-8 byte count.
    pub bytes: usize,
}

impl BundleSize {
    pub fn measure(html: &str) -> Self {
        Self { bytes: html.len() }
    }

    /// Size in KB (bytes / 1024).
    pub fn kb(self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    /// Whether the size is strictly above `limit_kb`.
    pub fn exceeds(self, limit_kb: u64) -> bool {
        self.kb() > limit_kb as f64
    }
}

/// Measure `html` and fail with [`HtmlpackError::SizeExceeded`] above the limit.
/// The bundle is never truncated.
pub fn check_size(html: &str, limit_kb: u64) -> Result<BundleSize> {
    let size = BundleSize::measure(html);
    if size.exceeds(limit_kb) {
        return Err(HtmlpackError::SizeExceeded {
            size_kb: size.kb(),
            limit_kb,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_encoded_bytes() {
        let size = BundleSize::measure("é");
        assert_eq!(size.bytes, 2);
        assert!((BundleSize::measure(&"a".repeat(1536)).kb() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bundle_over_the_limit_reports_measured_size() {
        let html = "x".repeat(105 * 1024);
        let err = check_size(&html, 100).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("105.00KB"), "{msg}");
        assert!(msg.contains("100KB limit"), "{msg}");
    }

    #[test]
    fn limit_is_inclusive() {
        let html = "x".repeat(100 * 1024);
        assert!(check_size(&html, 100).is_ok());
        assert!(check_size(&format!("{html}x"), 100).is_err());
    }
}
