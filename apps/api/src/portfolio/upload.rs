//! Résumé file intake. Only plain text is accepted; anything else is rejected
//! before its content reaches the rest of the pipeline.

use bytes::Bytes;

use crate::errors::AppError;

pub const INVALID_FILE_MESSAGE: &str = "Please upload a valid .txt file.";

const PLAIN_TEXT: &str = "text/plain";

/// Decodes an uploaded résumé file.
///
/// Accepted when the declared content type is `text/plain` (parameters such as
/// `charset` are ignored), or when no type is declared and the file name ends
/// in `.txt`. The body must be valid UTF-8.
pub fn decode_text_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, AppError> {
    let is_text = match content_type {
        Some(declared) => declared
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PLAIN_TEXT)),
        None => file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".txt")),
    };

    if !is_text {
        return Err(AppError::UnsupportedMediaType(INVALID_FILE_MESSAGE.to_string()));
    }

    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::UnsupportedMediaType(INVALID_FILE_MESSAGE.to_string()))
}
