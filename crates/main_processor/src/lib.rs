//! Batch C-to-Rust translation: scans a project, translates files in
//! dependency order through the model, post-processes each result, and
//! writes a buildable Rust project tree.

pub mod pkg_config;
pub mod processor;
pub mod translator;

use anyhow::{anyhow, Result};
use log::info;
use std::path::Path;
use std::sync::Arc;

pub use pkg_config::PipelineConfig;
pub use processor::BatchReport;
pub use translator::{FileTranslator, TranslationOutcome};

/// Translate the C project at `input_dir` into a Rust project at
/// `output_dir`. Configuration comes from config.toml; missing pipeline
/// settings fall back to their defaults.
pub async fn translate_project(input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
    let project = file_scanner::scan_c_project(input_dir)?;
    if project.is_empty() {
        return Err(anyhow!("no C source files found in {}", input_dir.display()));
    }
    info!(
        "translating {} files from {} to {}",
        project.files.len(),
        input_dir.display(),
        output_dir.display()
    );

    let cfg = pkg_config::get_config()?;
    let translator = Arc::new(FileTranslator::new(
        project,
        output_dir.to_path_buf(),
        cfg.clone(),
    )?);
    translator.write_project_manifest()?;

    processor::process_batch(translator, cfg.max_retry_attempts, cfg.concurrent_limit).await
}
