//! Centralized validation for uploaded catalogs and prediction inputs.

/// Maximum number of rows accepted from a single CSV (DOS protection)
pub const MAX_CSV_ROWS: usize = 1_000_000;

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Magic bytes at the start of every gzip stream
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_CSV_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_CSV_ROWS}"
        ))
    } else {
        None
    }
}

/// Check whether content starts with the gzip magic number
#[must_use]
pub fn is_gzip(content: &[u8]) -> bool {
    content.starts_with(&GZIP_MAGIC)
}

/// Security validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("File content appears malformed or invalid")]
    InvalidFileContent,
    #[error("File format validation failed")]
    FormatValidationFailed,
}

/// Secure filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.contains('\0') || filename.chars().any(|c| ('\x01'..='\x1F').contains(&c)) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    // Hidden files only pass with a tabular extension
    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check if filename has a known tabular extension
fn has_known_extension(filename: &str) -> bool {
    let safe_extensions = [".csv", ".csv.gz", ".gz", ".txt"];

    safe_extensions
        .iter()
        .any(|ext| filename.to_lowercase().ends_with(ext))
}

/// Validate that file content is not malicious or malformed
///
/// # Errors
///
/// Returns `ValidationError::InvalidFileContent` if the content is too small,
/// contains unexpected binary data for text formats, or fails UTF-8 validation.
pub fn validate_file_content(content: &[u8], expected_text: bool) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    if expected_text {
        let non_printable_count = content
            .iter()
            .filter(|&&b| b < 9 || (b > 13 && b < 32) || b == 127)
            .count();

        // Allow up to 5% control characters for text files
        if content.len() > 100 && non_printable_count > content.len() / 20 {
            return Err(ValidationError::InvalidFileContent);
        }

        if std::str::from_utf8(content).is_err() {
            return Err(ValidationError::InvalidFileContent);
        }
    }

    Ok(())
}

/// Validate an uploaded CSV (plain or gzip-compressed)
///
/// A `.gz` filename requires gzip content; gzip content is accepted under any
/// name. Everything else must be UTF-8 text.
///
/// # Errors
///
/// Returns a `ValidationError` if filename validation fails, a `.gz` upload is
/// not gzip, or text content validation fails.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
) -> Result<Option<String>, ValidationError> {
    let validated_filename = if let Some(name) = filename {
        Some(validate_filename(name)?)
    } else {
        None
    };

    let named_gzip = validated_filename
        .as_deref()
        .is_some_and(|n| n.to_lowercase().ends_with(".gz"));

    if named_gzip && !is_gzip(content) {
        return Err(ValidationError::FormatValidationFailed);
    }

    validate_file_content(content, !is_gzip(content))?;

    Ok(validated_filename)
}
