use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during kaodex core operations.
#[derive(Debug, Error)]
pub enum KaodexError {
    /// A review-document section did not decode as the expected JSON shape.
    ///
    /// Recoverable: the review session reports it and reopens the editor.
    #[error("invalid {section} section ({preview:?}): {source}")]
    DocumentSection {
        /// Which section failed (`SPECIES`, `EMOTION`, `MISC`, `METADATA`).
        section: &'static str,
        /// A short preview of the offending text.
        preview: String,
        /// The underlying decode failure.
        source: serde_json::Error,
    },

    /// A corpus file could not be decoded as an id-keyed record object.
    #[error("malformed corpus file {}: {source}", path.display())]
    Corpus {
        /// The file that failed to decode.
        path: PathBuf,
        /// The underlying decode failure.
        source: serde_json::Error,
    },

    /// JSON encoding failure outside a specific corpus file.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A regex pattern failed to compile (should never happen with the
    /// static patterns defined in this crate).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for kaodex operations.
pub type Result<T> = std::result::Result<T, KaodexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let bad_json = serde_json::from_str::<Vec<String>>("oops").unwrap_err();
        let err = KaodexError::DocumentSection {
            section: "SPECIES",
            preview: "oops".into(),
            source: bad_json,
        };
        assert!(err.to_string().contains("SPECIES"));
        assert!(err.to_string().contains("oops"));

        let bad_json = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err = KaodexError::Corpus {
            path: PathBuf::from("dirty_json/cat.json"),
            source: bad_json,
        };
        assert!(err.to_string().contains("cat.json"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KaodexError>();
    }
}
