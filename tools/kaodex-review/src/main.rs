//! Kaodex Review Tool
//!
//! Interactive cleaning pipeline for the kaodex kaomoji corpus: streams
//! unreviewed records from the dirty directory, auto-classifies and
//! tags each one, opens it in the reviewer's editor, and commits
//! accepted records to a timestamped cleaned corpus. Runs are
//! resumable — processed records are removed from their source files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use kaodex_core::classify::{Classifier, EmojiTable};
use kaodex_core::taxonomy::TaxonomyPair;

mod pipeline;
mod session;
#[cfg(test)]
mod support;

use pipeline::PipelineConfig;
use session::EditorUi;

/// CLI arguments
#[derive(Parser)]
#[command(name = "kaodex-review")]
#[command(about = "Review and clean scraped kaomoji records")]
#[command(version)]
struct Cli {
    /// Directory of unreviewed kaomoji JSON files
    #[arg(long, default_value = "dirty_json")]
    dirty_dir: PathBuf,

    /// Directory receiving the cleaned corpus
    #[arg(long, default_value = "cleaned")]
    cleaned_dir: PathBuf,

    /// Species keyword file
    #[arg(long, default_value = "species.txt")]
    species_file: PathBuf,

    /// Emotion keyword file
    #[arg(long, default_value = "emotions.txt")]
    emotions_file: PathBuf,

    /// Emoji codepoint data file (built-in ranges are used if absent)
    #[arg(long, default_value = "emoji_data.txt")]
    emoji_data: PathBuf,

    /// Editor invoked for manual review
    #[arg(long, env = "EDITOR", default_value = "vim")]
    editor: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let classifier = Classifier::new(EmojiTable::load(&cli.emoji_data))?;
    let mut taxonomies = TaxonomyPair::load(&cli.species_file, &cli.emotions_file);
    let mut ui = EditorUi::new(cli.editor);

    let config = PipelineConfig {
        dirty_dir: cli.dirty_dir,
        cleaned_dir: cli.cleaned_dir,
    };
    pipeline::run(&config, &classifier, &mut taxonomies, &mut ui)?;

    Ok(())
}
