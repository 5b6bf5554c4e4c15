//! Input validation for detection requests
//!
//! Every check here runs before any vendor call is attempted. A failure names
//! the constraint that was violated so the caller can report it as a client error.

use thiserror::Error;

/// MIME types the detection vendor accepts, keyed by lowercase file extension.
const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
];

/// MIME types a [`crate::SubmissionRequest`] may carry.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Threshold must be between 0 and 1 (got {0})")]
    ThresholdOutOfRange(f64),

    #[error("Invalid file type '.{extension}'. Only {} are supported.", .allowed.join(", "))]
    UnsupportedExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Missing file extension (filename: {0})")]
    MissingExtension(String),

    #[error("Unsupported MIME type '{0}'")]
    UnsupportedMimeType(String),

    #[error("Image is empty")]
    EmptyImage,
}

/// Check that `threshold` lies in `[0, 1]` inclusive. NaN is rejected.
pub fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange(threshold))
    }
}

/// Check the extension of `filename` against `allowed` (case-insensitive).
///
/// Returns the lowercase extension without the leading dot.
pub fn validate_extension(filename: &str, allowed: &[String]) -> Result<String, ValidationError> {
    let extension = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => return Err(ValidationError::MissingExtension(filename.to_string())),
    };

    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
        return Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: allowed.to_vec(),
        });
    }

    Ok(extension)
}

/// Map a lowercase extension to the MIME type sent to the vendor.
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Validate a caller-declared MIME type.
pub fn validate_mime_type(mime_type: &str) -> Result<(), ValidationError> {
    let normalized = mime_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(mime_type)
        .to_lowercase();

    if SUPPORTED_MIME_TYPES.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedMimeType(mime_type.to_string()))
    }
}

pub fn validate_image_data(data: &[u8]) -> Result<(), ValidationError> {
    if data.is_empty() {
        return Err(ValidationError::EmptyImage);
    }
    Ok(())
}

/// Validate a file name and threshold pair and infer the MIME type.
///
/// The threshold is checked first, then the extension.
pub fn validate_input(
    filename: &str,
    threshold: f64,
    allowed_extensions: &[String],
) -> Result<&'static str, ValidationError> {
    validate_threshold(threshold)?;
    let extension = validate_extension(filename, allowed_extensions)?;
    mime_type_for_extension(&extension)
        .ok_or_else(|| ValidationError::UnsupportedMimeType(format!("(extension .{})", extension)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_allowed() -> Vec<String> {
        vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_threshold_bounds_inclusive() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(0.016).is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        for t in [-0.0001, 1.0001, -1.0, 2.0, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                validate_threshold(t),
                Err(ValidationError::ThresholdOutOfRange(t)),
                "threshold {} should be rejected",
                t
            );
        }
    }

    #[test]
    fn test_threshold_nan_rejected() {
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_supported_extensions_any_case() {
        let allowed = default_allowed();
        for name in ["a.jpg", "a.JPG", "b.jpeg", "b.JpEg", "c.png", "c.PNG", "dir.v2/x.Png"] {
            assert!(validate_extension(name, &allowed).is_ok(), "{} should pass", name);
        }
        assert_eq!(validate_extension("photo.JPEG", &allowed).unwrap(), "jpeg");
    }

    #[test]
    fn test_unsupported_extensions() {
        let allowed = default_allowed();
        for name in ["a.gif", "a.bmp", "a.exe", "a.jpg.txt", "a.pngx"] {
            match validate_extension(name, &allowed) {
                Err(ValidationError::UnsupportedExtension { allowed: list, .. }) => {
                    assert_eq!(list, allowed)
                }
                other => panic!("{} should be unsupported, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_missing_extension() {
        let allowed = default_allowed();
        for name in ["photo", "photo.", ".png", ""] {
            assert!(matches!(
                validate_extension(name, &allowed),
                Err(ValidationError::MissingExtension(_))
            ));
        }
    }

    #[test]
    fn test_unsupported_extension_message_names_allowed_types() {
        let err = validate_extension("a.gif", &default_allowed()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type '.gif'. Only jpg, jpeg, png are supported."
        );
    }

    #[test]
    fn test_mime_type_for_extension() {
        assert_eq!(mime_type_for_extension("jpg"), Some("image/jpeg"));
        assert_eq!(mime_type_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_type_for_extension("png"), Some("image/png"));
        assert_eq!(mime_type_for_extension("tiff"), None);
    }

    #[test]
    fn test_validate_input_checks_threshold_first() {
        let err = validate_input("a.gif", 1.5, &default_allowed()).unwrap_err();
        assert_eq!(err, ValidationError::ThresholdOutOfRange(1.5));
    }

    #[test]
    fn test_validate_input_infers_mime() {
        assert_eq!(
            validate_input("Cat.JPG", 0.5, &default_allowed()),
            Ok("image/jpeg")
        );
        assert_eq!(validate_input("cat.png", 0.0, &default_allowed()), Ok("image/png"));
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("image/png").is_ok());
        assert!(validate_mime_type("IMAGE/JPEG; charset=binary").is_ok());
        assert!(validate_mime_type("application/pdf").is_err());
    }

    #[test]
    fn test_validate_image_data() {
        assert_eq!(validate_image_data(&[]), Err(ValidationError::EmptyImage));
        assert!(validate_image_data(&[0xFF, 0xD8]).is_ok());
    }
}
