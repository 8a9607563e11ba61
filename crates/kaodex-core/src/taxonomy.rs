//! Reviewer-extensible keyword taxonomies.
//!
//! Each taxonomy is a newline-delimited term file (blank lines and `#`
//! comments ignored, membership case-insensitive, casing preserved on
//! disk). A taxonomy is loaded once per run, passed explicitly to the
//! tagger and review session, and only ever grows: review acceptance
//! appends unseen terms.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::record::KaomojiRecord;

/// One named, append-only keyword set backed by a term file.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    path: PathBuf,
    /// Lowercased membership set; the file keeps original casing.
    terms: HashSet<String>,
}

impl Taxonomy {
    /// Loads the taxonomy from `path`. A missing or unreadable file is
    /// non-fatal: the taxonomy starts empty and the miss is logged.
    #[must_use]
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        let mut terms = HashSet::new();

        match fs::read_to_string(&path) {
            Ok(text) => {
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    terms.insert(line.to_lowercase());
                }
            }
            Err(err) => {
                warn!(taxonomy = %name, path = %path.display(), %err, "keyword file not found, using empty set");
            }
        }

        Self { name, path, terms }
    }

    /// The taxonomy's name ("species", "emotions").
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing term file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of known terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no terms are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.to_lowercase())
    }

    /// Returns the labels that are members of this taxonomy, in their
    /// original order and with their original casing.
    #[must_use]
    pub fn classify(&self, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .filter(|label| self.contains(label))
            .cloned()
            .collect()
    }

    /// Appends every term not already known (case-insensitive) to the
    /// term file, preserving the casing as supplied. Returns the terms
    /// that were actually added.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O failure if the term file cannot be
    /// written. Not transactional with any other taxonomy.
    pub fn append(&mut self, terms: &[String]) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for term in terms {
            if self.contains(term) {
                continue;
            }
            self.terms.insert(term.to_lowercase());
            added.push(term.clone());
        }
        if added.is_empty() {
            return Ok(added);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for term in &added {
            write!(file, "\n{term}")?;
        }
        Ok(added)
    }

    /// All known terms, lowercased and sorted, for the review-document
    /// reference listing.
    #[must_use]
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.terms.iter().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}

/// The two taxonomies every record is tagged against.
#[derive(Debug, Clone)]
pub struct TaxonomyPair {
    pub species: Taxonomy,
    pub emotion: Taxonomy,
}

impl TaxonomyPair {
    /// Loads both taxonomies from their term files.
    #[must_use]
    pub fn load(species_path: impl Into<PathBuf>, emotions_path: impl Into<PathBuf>) -> Self {
        Self {
            species: Taxonomy::load("species", species_path),
            emotion: Taxonomy::load("emotions", emotions_path),
        }
    }

    /// Auto-tags a record: the free-form `misc` labels that match a
    /// taxonomy are copied into `species`/`emotion`. `misc` itself is
    /// left whole, so a promoted term appears in both places.
    pub fn tag(&self, record: &mut KaomojiRecord) {
        record.species = self.species.classify(&record.misc);
        record.emotion = self.emotion.classify(&record.misc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_taxonomy(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn load_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taxonomy(&dir, "species.txt", "# header\ncat\n\nWolf\n  bear  \n");
        let taxonomy = Taxonomy::load("species", path);

        assert_eq!(taxonomy.len(), 3);
        assert!(taxonomy.contains("cat"));
        assert!(taxonomy.contains("WOLF"));
        assert!(taxonomy.contains("bear"));
        assert!(!taxonomy.contains("# header"));
    }

    #[test]
    fn missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let taxonomy = Taxonomy::load("species", dir.path().join("absent.txt"));
        assert!(taxonomy.is_empty());
    }

    #[test]
    fn classify_preserves_casing_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taxonomy(&dir, "species.txt", "wolf\ncat\n");
        let taxonomy = Taxonomy::load("species", path);

        let labels = vec!["Wolf".to_string(), "xyz".to_string(), "CAT".to_string()];
        assert_eq!(taxonomy.classify(&labels), vec!["Wolf", "CAT"]);
    }

    #[test]
    fn append_skips_known_terms_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taxonomy(&dir, "species.txt", "cat\n");
        let mut taxonomy = Taxonomy::load("species", &path);

        let added = taxonomy
            .append(&["CAT".into(), "Fox".into(), "fox".into()])
            .unwrap();
        assert_eq!(added, vec!["Fox"]);
        assert!(taxonomy.contains("fox"));

        // Reviewer casing lands on disk; reload sees the new term.
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Fox"));
        let reloaded = Taxonomy::load("species", &path);
        assert!(reloaded.contains("FOX"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emotions.txt");
        let mut taxonomy = Taxonomy::load("emotions", &path);

        taxonomy.append(&["happy".into()]).unwrap();
        assert!(path.exists());
        assert!(Taxonomy::load("emotions", &path).contains("happy"));
    }

    #[test]
    fn append_nothing_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emotions.txt");
        let mut taxonomy = Taxonomy::load("emotions", &path);

        let added = taxonomy.append(&[]).unwrap();
        assert!(added.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn sorted_terms_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taxonomy(&dir, "species.txt", "wolf\nbear\ncat\n");
        let taxonomy = Taxonomy::load("species", path);
        assert_eq!(taxonomy.sorted_terms(), vec!["bear", "cat", "wolf"]);
    }

    #[test]
    fn tag_splits_misc_without_consuming_it() {
        let dir = tempfile::tempdir().unwrap();
        let species = write_taxonomy(&dir, "species.txt", "cat\n");
        let emotions = write_taxonomy(&dir, "emotions.txt", "happy\n");
        let pair = TaxonomyPair::load(species, emotions);

        let mut record = KaomojiRecord {
            content: "(=^･ω･^=)".into(),
            misc: vec!["cat".into(), "happy".into()],
            ..KaomojiRecord::default()
        };
        pair.tag(&mut record);

        assert_eq!(record.species, vec!["cat"]);
        assert_eq!(record.emotion, vec!["happy"]);
        assert_eq!(record.misc, vec!["cat", "happy"]);
    }

    #[test]
    fn tag_leaves_unmatched_labels_in_misc_only() {
        let dir = tempfile::tempdir().unwrap();
        let pair = TaxonomyPair::load(
            dir.path().join("species.txt"),
            dir.path().join("emotions.txt"),
        );

        let mut record = KaomojiRecord {
            misc: vec!["mystery".into()],
            ..KaomojiRecord::default()
        };
        pair.tag(&mut record);

        assert!(record.species.is_empty());
        assert!(record.emotion.is_empty());
        assert_eq!(record.misc, vec!["mystery"]);
    }
}
