//! Validation for uploaded-image storage paths.

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Check that `path` names an image with an allowed extension.
///
/// Paths are opaque storage keys here; only the extension is inspected.
pub fn validate_image_path(path: &str) -> Result<(), String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err("image path must not be empty".into());
    }
    let ext = trimmed
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(format!(
            "unsupported image type; expected one of {}",
            ALLOWED_EXTENSIONS.join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_known_extensions() {
        for path in ["receipts/a.jpg", "b.JPEG", "c.png", "dir/d.gif"] {
            assert!(validate_image_path(path).is_ok(), "{path}");
        }
    }

    #[test]
    fn test_rejects_other_files() {
        for path in ["a.pdf", "archive.tar.gz", "noext", "", "  "] {
            assert!(validate_image_path(path).is_err(), "{path}");
        }
    }
}
