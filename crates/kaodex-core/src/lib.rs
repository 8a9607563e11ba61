//! # Kaodex Core
//!
//! The heart of the kaodex corpus tooling. Provides codepoint-level
//! kaomoji classification, reviewer-extensible keyword taxonomies, and
//! the review-document protocol used by the interactive cleaning
//! pipeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use kaodex_core::classify::{Classifier, EmojiTable};
//!
//! let classifier = Classifier::new(EmojiTable::fallback()).unwrap();
//!
//! assert!(classifier.has_emoji("nice \u{1F600}"));
//! assert!(classifier.is_multiline("∧_∧\n(･ω･)"));
//! assert!(!classifier.is_dot_art("plain text"));
//! ```
pub mod classify;
pub mod document;
pub mod error;
pub mod record;
pub mod taxonomy;

// Re-export primary API
pub use classify::{Classifier, EmojiTable};
pub use document::{DocumentMetadata, ReviewDocument};
pub use error::{KaodexError, Result};
pub use record::{KaomojiRecord, RecordMap};
pub use taxonomy::{Taxonomy, TaxonomyPair};
