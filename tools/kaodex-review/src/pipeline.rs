//! Batch review pipeline over the dirty corpus directory.
//!
//! Source files are work queues: every reviewed record, accepted or
//! skipped, is removed from its file, and drained files are deleted, so
//! an interrupted run resumes with only the unprocessed remainder.
//! Accepted records are persisted to the output corpus immediately; a
//! crash mid-review loses at most the in-flight record.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use kaodex_core::classify::Classifier;
use kaodex_core::record::{self, RecordMap};
use kaodex_core::taxonomy::TaxonomyPair;

use crate::session::{self, ReviewOutcome, ReviewUi};

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of unreviewed kaomoji JSON files.
    pub dirty_dir: PathBuf,
    /// Directory receiving the timestamped cleaned corpus.
    pub cleaned_dir: PathBuf,
}

/// What a pipeline run accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub saved: usize,
    pub skipped: usize,
    /// The cleaned corpus file, if any input was found.
    pub output: Option<PathBuf>,
}

/// Runs the full classify → tag → review → persist pipeline.
///
/// A missing dirty directory or an empty file set is reported and
/// yields an empty summary — not an error. A malformed source file is
/// fatal: the run cannot safely drain a queue it cannot read.
pub fn run(
    config: &PipelineConfig,
    classifier: &Classifier,
    taxonomies: &mut TaxonomyPair,
    ui: &mut dyn ReviewUi,
) -> Result<Summary> {
    if !config.dirty_dir.is_dir() {
        println!("Error: {} directory not found", config.dirty_dir.display());
        return Ok(Summary::default());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(&config.dirty_dir)
        .with_context(|| format!("failed to list {}", config.dirty_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if files.is_empty() {
        println!(
            "No JSON files found in {} directory",
            config.dirty_dir.display()
        );
        return Ok(Summary::default());
    }

    fs::create_dir_all(&config.cleaned_dir)
        .with_context(|| format!("failed to create {}", config.cleaned_dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let output_path = config.cleaned_dir.join(format!("cleaned_kaomoji_{stamp}.json"));
    record::write_record_map(&output_path, &RecordMap::new())
        .context("failed to initialize cleaned corpus")?;

    let mut summary = Summary {
        output: Some(output_path.clone()),
        ..Summary::default()
    };

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!("Processing {name}...");

        let mut records = record::read_record_map(path)?;
        let ids: Vec<String> = records.keys().cloned().collect();

        for id in &ids {
            let value = records
                .get(id)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            let mut rec = record::decode_record(path, &value)?;

            classifier.classify(&mut rec);
            taxonomies.tag(&mut rec);

            match session::review(id, &rec, taxonomies, ui)? {
                ReviewOutcome::Accepted(reviewed) => {
                    let mut corpus = record::read_record_map(&output_path)?;
                    corpus.insert(id.clone(), serde_json::to_value(&reviewed)?);
                    record::write_record_map(&output_path, &corpus)?;
                    summary.saved += 1;
                }
                ReviewOutcome::Skipped => summary.skipped += 1,
            }

            // Processed either way: drop it from the work queue.
            records.remove(id);
        }

        if records.is_empty() {
            fs::remove_file(path)
                .with_context(|| format!("failed to delete drained file {name}"))?;
            println!("  Deleted empty file: {name}");
        } else {
            record::write_record_map(path, &records)?;
        }
        info!(file = %name, records = ids.len(), "source file drained");
        println!("  Processed {} kaomojis from {name}", ids.len());
    }

    println!("\nSummary:");
    println!("  Saved: {} kaomojis", summary.saved);
    println!("  Skipped: {} kaomojis", summary.skipped);
    println!("  Output: {}", output_path.display());

    Ok(summary)
}
