//! Per-file translation pipeline: prompt, model request, extraction,
//! heuristic cleanup, compile probe, and an optional model repair round.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

use crate::pkg_config::PipelineConfig;
use file_scanner::ScannedProject;
use prompt_builder::repair::{build_repair_prompt, repair_system_prompt, RepairContext};
use prompt_builder::translation::TranslationPromptBuilder;
use rust_fixer::{analyze_module_layout, ModuleLayout};

/// How one file left the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// Written to this path under the output tree.
    Translated(PathBuf),
    /// The model declared the file has nothing to translate.
    Skipped,
}

pub struct FileTranslator {
    project: ScannedProject,
    output_root: PathBuf,
    builder: TranslationPromptBuilder,
    cfg: PipelineConfig,
    /// All project sources joined with file banners. Every request carries
    /// the full project so the model sees cross-file context; the per-file
    /// system prompt names the file to translate.
    combined_source: String,
}

impl FileTranslator {
    pub fn new(
        project: ScannedProject,
        output_root: PathBuf,
        cfg: PipelineConfig,
    ) -> Result<Self> {
        let combined_source = file_scanner::combine_sources(&project)?;
        let builder = TranslationPromptBuilder::new(project.files.clone());
        Ok(Self {
            project,
            output_root,
            builder,
            cfg,
            combined_source,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.project.files
    }

    /// Run the whole pipeline for one project-relative file.
    pub async fn translate_file(&self, file: &Path) -> Result<TranslationOutcome> {
        let system_prompt = self.builder.system_prompt_for(file);
        let response = self
            .request(vec![self.combined_source.clone()], system_prompt)
            .await?;

        if rust_fixer::is_skip_response(&response) {
            info!("{} skipped by the model", file.display());
            return Ok(TranslationOutcome::Skipped);
        }

        let layout = analyze_module_layout(file, &self.project.files);
        let mut code = rust_fixer::extract_rust_code(&response);
        code = rust_fixer::sanitize_translation(&code, &layout, &self.project.files);

        if self.cfg.fix_errors {
            code = self.verify_and_fix(code, &layout).await;
        }

        let target = self.rust_target_path(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, &code)
            .with_context(|| format!("failed to write {}", target.display()))?;
        info!("{} -> {}", file.display(), target.display());

        Ok(TranslationOutcome::Translated(target))
    }

    async fn request(&self, messages: Vec<String>, prompt: String) -> Result<String> {
        let limit = Duration::from_secs(self.cfg.translation_timeout_secs);
        match timeout(
            limit,
            llm_requester::llm_request_with_prompt(messages, prompt),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "translation request timed out after {}s",
                self.cfg.translation_timeout_secs
            )),
        }
    }

    /// Probe the code, apply mechanical fixes, and escalate to a model
    /// repair round when allowed. Code that still fails is returned as-is
    /// with a warning; the caller writes it so the user can finish by hand.
    /// The probe is best-effort: when rustc cannot run at all, the code is
    /// returned unverified instead of failing the translation.
    async fn verify_and_fix(&self, code: String, layout: &ModuleLayout) -> String {
        let Some(report) = run_probe(&code) else {
            return code;
        };
        if report.success {
            return code;
        }

        let analysis = rust_fixer::analyze_rustc_errors(&report.stderr);
        let (mut fixed, changed) = rust_fixer::apply_known_fixes(&code, &analysis, Some(layout));
        let mut stderr = report.stderr;
        if changed {
            match run_probe(&fixed) {
                Some(report) if report.success => {
                    info!("{} fixed mechanically", layout.file.display());
                    return fixed;
                }
                Some(report) => stderr = report.stderr,
                None => return fixed,
            }
        }

        if !self.cfg.use_ai_fix {
            warn!(
                "{} still fails to compile, writing as-is",
                layout.file.display()
            );
            return fixed;
        }

        let context = RepairContext {
            file_name: layout.base_name.clone(),
            is_main: layout.is_main,
            sibling_modules: layout.sibling_modules.clone(),
            child_modules: layout.child_modules.clone(),
        };
        let prompt = build_repair_prompt(&fixed, &stderr, Some(&context));
        match self.request(vec![prompt], repair_system_prompt()).await {
            Ok(answer) => {
                let repaired = rust_fixer::strip_markdown_fences(&answer);
                match run_probe(&repaired) {
                    Some(report) if report.success => {
                        info!("{} repaired by the model", layout.file.display());
                    }
                    _ => {
                        warn!(
                            "{} still fails after model repair, writing as-is",
                            layout.file.display()
                        );
                    }
                }
                fixed = repaired;
            }
            Err(e) => {
                warn!("model repair request failed: {e}, writing unfixed code");
            }
        }
        fixed
    }

    /// Where a C file lands in the generated src tree. `main.*` becomes
    /// `src/main.rs`; everything else keeps its relative directory with a
    /// `.rs` stem, so a header and its paired source map to the same module
    /// file (the source is translated later and wins).
    pub fn rust_target_path(&self, file: &Path) -> PathBuf {
        let mut relative = file.to_path_buf();
        relative.set_extension("rs");
        self.output_root.join("src").join(relative)
    }

    /// Minimal manifest for the generated project.
    pub fn write_project_manifest(&self) -> Result<()> {
        let name = self
            .project
            .root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("translated_project")
            .replace(['-', ' ', '.'], "_")
            .to_lowercase();
        let manifest = format!(
            "[package]\n\
             name = \"{name}\"\n\
             version = \"0.1.0\"\n\
             edition = \"2021\"\n\n\
             [dependencies]\n\
             libc = \"0.2\"\n"
        );
        fs::create_dir_all(&self.output_root)?;
        let path = self.output_root.join("Cargo.toml");
        fs::write(&path, manifest).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Run the compile probe. A probe that cannot execute (rustc missing, temp
/// dir unavailable) is not a translation failure; it only disables
/// verification for this file.
fn run_probe(code: &str) -> Option<rust_fixer::ProbeReport> {
    match rust_fixer::probe_syntax(code) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("compile probe unavailable, skipping verification: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator_for(dir: &Path, files: &[&str]) -> FileTranslator {
        for name in files {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "int stub(void);\n").unwrap();
        }
        let project = ScannedProject {
            root: dir.to_path_buf(),
            files: files.iter().map(PathBuf::from).collect(),
        };
        FileTranslator::new(project, dir.join("out"), PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_main_maps_to_src_main() {
        let tmp = tempfile::tempdir().unwrap();
        let t = translator_for(tmp.path(), &["main.c", "math.c"]);
        assert_eq!(
            t.rust_target_path(Path::new("main.c")),
            tmp.path().join("out/src/main.rs")
        );
    }

    #[test]
    fn test_nested_file_keeps_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let t = translator_for(tmp.path(), &["main.c", "module/stu.c"]);
        assert_eq!(
            t.rust_target_path(Path::new("module/stu.c")),
            tmp.path().join("out/src/module/stu.rs")
        );
    }

    #[test]
    fn test_header_and_source_share_target() {
        let tmp = tempfile::tempdir().unwrap();
        let t = translator_for(tmp.path(), &["main.c", "math.h", "math.c"]);
        assert_eq!(
            t.rust_target_path(Path::new("math.h")),
            t.rust_target_path(Path::new("math.c"))
        );
    }

    #[test]
    fn test_combined_source_carries_banners() {
        let tmp = tempfile::tempdir().unwrap();
        let t = translator_for(tmp.path(), &["main.c", "math.c"]);
        assert!(t.combined_source.contains("// ---------- main.c ----------"));
        assert!(t.combined_source.contains("// ---------- math.c ----------"));
    }

    #[tokio::test]
    async fn test_missing_compiler_does_not_fail_translation() {
        let tmp = tempfile::tempdir().unwrap();
        let t = translator_for(tmp.path(), &["main.c"]);
        let layout =
            rust_fixer::analyze_module_layout(Path::new("main.c"), &[PathBuf::from("main.c")]);

        // With an empty PATH the probe cannot spawn rustc; the code must
        // come back unverified rather than erroring out.
        let saved_path = std::env::var_os("PATH");
        std::env::set_var("PATH", "");
        let code = t.verify_and_fix("fn main() {}".to_string(), &layout).await;
        match saved_path {
            Some(p) => std::env::set_var("PATH", p),
            None => std::env::remove_var("PATH"),
        }

        assert_eq!(code, "fn main() {}");
    }

    #[test]
    fn test_manifest_written() {
        let tmp = tempfile::tempdir().unwrap();
        let project_dir = tmp.path().join("My-Demo");
        let t = translator_for(&project_dir, &["main.c"]);
        t.write_project_manifest().unwrap();
        let manifest = fs::read_to_string(project_dir.join("out/Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"my_demo\""));
        assert!(manifest.contains("libc = \"0.2\""));
    }
}
