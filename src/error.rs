// ⚠️ Error taxonomy for the customer ledger core
// Every invariant violation surfaces as Duplicate or NotFound, never silently

use std::fmt;
use std::path::PathBuf;

// ============================================================================
// ERROR KIND
// ============================================================================

#[derive(Debug)]
pub enum CrmError {
    /// Malformed input that slipped past the front-end (negative money, empty name, bad index)
    Validation { field: String, message: String },

    /// An exact match already exists; nothing was mutated
    Duplicate { entity: &'static str, key: String },

    /// Stale handle: the referenced entity is no longer in its collection
    NotFound { entity: &'static str, id: String },

    /// Date string failed structural validation (format YYYY:MM:DD, year >= 1900)
    MalformedDate { input: String, reason: String },

    /// File could not be opened, read or written
    Io { path: PathBuf, source: std::io::Error },

    /// Snapshot document is not valid JSON or misses required fields
    Snapshot { message: String },
}

pub type CrmResult<T> = Result<T, CrmError>;

impl CrmError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        CrmError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        CrmError::Duplicate {
            entity,
            key: key.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        CrmError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, CrmError::Duplicate { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CrmError::NotFound { .. })
    }
}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmError::Validation { field, message } => {
                write!(f, "invalid {}: {}", field, message)
            }
            CrmError::Duplicate { entity, key } => {
                write!(f, "a {} named {} already exists", entity, key)
            }
            CrmError::NotFound { entity, id } => {
                write!(f, "{} {} is no longer present", entity, id)
            }
            CrmError::MalformedDate { input, reason } => {
                write!(f, "malformed date '{}': {}", input, reason)
            }
            CrmError::Io { path, source } => {
                write!(f, "could not access {}: {}", path.display(), source)
            }
            CrmError::Snapshot { message } => write!(f, "unreadable snapshot: {}", message),
        }
    }
}

impl std::error::Error for CrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrmError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let dup = CrmError::duplicate("customer", "Anna Rossi");
        assert_eq!(dup.to_string(), "a customer named Anna Rossi already exists");
        assert!(dup.is_duplicate());

        let missing = CrmError::not_found("contract", "abc");
        assert!(missing.is_not_found());
        assert!(missing.to_string().contains("abc"));
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error;

        let err = CrmError::Io {
            path: PathBuf::from("/nowhere/data.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nowhere/data.json"));
    }
}
