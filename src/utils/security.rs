use chrono::Utc;
use std::fmt;
use std::path::{Component, Path};

/// Characters kept besides alphanumerics.
const ALLOWED_PUNCTUATION: &str = "-_.() ";

//===============
// Name Handling
//===============

/// Conservatively sanitize a client-supplied filename for saving or display.
///
/// Keeps alphanumerics plus `-_.() `, drops everything else (separators
/// included). Falls back to `file_<unix seconds>` when nothing survives.
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(*c))
        .collect();

    if sanitized.is_empty() {
        return format!("file_{}", Utc::now().timestamp());
    }
    sanitized
}

//===============
// Path Handling
//===============
#[derive(Debug)]
pub enum PathValidationError {
    ContainsParentDir,
    AbsolutePath,
    InvalidComponent,
    NullByte,
    Empty,
    NotSingleComponent,
}

impl fmt::Display for PathValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationError::ContainsParentDir => {
                write!(f, "Path contains parent directory (..)")
            }
            PathValidationError::AbsolutePath => write!(f, "Path is absolute"),
            PathValidationError::InvalidComponent => write!(f, "Path contains invalid component"),
            PathValidationError::NullByte => write!(f, "Path contains null byte"),
            PathValidationError::Empty => write!(f, "Path is empty"),
            PathValidationError::NotSingleComponent => {
                write!(f, "Name must not contain directories")
            }
        }
    }
}

impl std::error::Error for PathValidationError {}

// Uploads are written straight into the destination directory, so the stored
// name must be exactly one normal path component.
pub fn validate_filename(filename: &str) -> Result<(), PathValidationError> {
    if filename.is_empty() {
        return Err(PathValidationError::Empty);
    }

    // rust uses C-style APIs so \0 can end str early
    if filename.contains('\0') {
        return Err(PathValidationError::NullByte);
    }

    let mut components = Path::new(filename).components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        Some(Component::ParentDir) => return Err(PathValidationError::ContainsParentDir),
        Some(Component::RootDir) => return Err(PathValidationError::AbsolutePath),
        Some(Component::CurDir) | None => return Err(PathValidationError::InvalidComponent),
        Some(Component::Prefix(_)) => return Err(PathValidationError::InvalidComponent), // Windows
    }

    if components.next().is_some() {
        return Err(PathValidationError::NotSingleComponent);
    }

    Ok(())
}
