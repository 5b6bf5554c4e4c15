//! Validation modules

pub mod input;

pub use input::{
    mime_type_for_extension, validate_extension, validate_image_data, validate_input,
    validate_mime_type, validate_threshold, ValidationError, SUPPORTED_MIME_TYPES,
};
