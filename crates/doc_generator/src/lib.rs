//! Markdown documentation generation for a scanned C project.
//!
//! Each section of the project document is produced by its own model
//! request over regex-extracted facts about the sources. Sections that
//! fail are replaced with a placeholder so one bad request does not lose
//! the whole document.

pub mod analysis;

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use analysis::CFileInfo;
use file_scanner::ScannedProject;
use prompt_builder::docs;

const SECTION_FAILED: &str = "_Section generation failed; see the log for details._";

/// One generated section of the project document.
#[derive(Debug, Clone)]
pub struct DocSection {
    pub title: String,
    pub body: String,
}

/// The assembled project documentation.
#[derive(Debug, Clone)]
pub struct ProjectDocs {
    pub project_name: String,
    pub sections: Vec<DocSection>,
    /// file name -> generated per-file document
    pub file_docs: Vec<(String, String)>,
}

pub struct DocGenerator {
    project: ScannedProject,
    project_name: String,
    infos: Vec<CFileInfo>,
}

impl DocGenerator {
    /// Analyze every file of `project` up front; the prompts all draw from
    /// the same extracted facts.
    pub fn new(project: ScannedProject) -> Result<Self> {
        let project_name = project
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());

        let mut infos = Vec::new();
        for file in &project.files {
            let full_path = project.resolve(file);
            let content = fs::read_to_string(&full_path)
                .with_context(|| format!("failed to read {}", full_path.display()))?;
            infos.push(analysis::analyze_file(file, &content));
        }

        Ok(Self {
            project,
            project_name,
            infos,
        })
    }

    pub fn file_count(&self) -> usize {
        self.project.files.len()
    }

    /// Generate the five project sections, optionally followed by per-file
    /// documents.
    pub async fn generate(&self, per_file: bool) -> Result<ProjectDocs> {
        info!(
            "generating documentation for {} ({} files)",
            self.project_name,
            self.infos.len()
        );

        let sections = vec![
            self.section("Project Overview", self.overview_request()).await,
            self.section("Architecture", self.architecture_request()).await,
            self.section("Module Guide", self.modules_request()).await,
            self.section("Data Structures", self.data_structures_request())
                .await,
            self.section("API Reference", self.api_reference_request()).await,
        ];

        let mut file_docs = Vec::new();
        if per_file {
            for info in &self.infos {
                let doc = self.file_doc(info).await;
                file_docs.push((info.name(), doc));
            }
        }

        Ok(ProjectDocs {
            project_name: self.project_name.clone(),
            sections,
            file_docs,
        })
    }

    fn overview_request(&self) -> String {
        docs::overview_prompt(
            &self.project_name,
            &analysis::files_summary(&self.infos),
            &analysis::key_file_samples(&self.infos),
        )
    }

    fn architecture_request(&self) -> String {
        docs::architecture_prompt(&self.project_name, &analysis::dependency_map(&self.infos))
    }

    fn modules_request(&self) -> String {
        docs::modules_prompt(&self.project_name, &analysis::module_structure(&self.infos))
    }

    fn data_structures_request(&self) -> String {
        let (summary, samples) = analysis::data_structure_summary(&self.infos);
        docs::data_structures_prompt(&summary, &samples)
    }

    fn api_reference_request(&self) -> String {
        docs::api_reference_prompt(&analysis::api_summary(&self.infos))
    }

    async fn section(&self, title: &str, request: String) -> DocSection {
        info!("generating section: {title}");
        let body = match llm_requester::llm_request_with_prompt(
            vec![request],
            docs::doc_system_prompt(),
        )
        .await
        {
            Ok(body) => body.trim().to_string(),
            Err(e) => {
                error!("section '{title}' failed: {e}");
                SECTION_FAILED.to_string()
            }
        };
        DocSection {
            title: title.to_string(),
            body,
        }
    }

    async fn file_doc(&self, info: &CFileInfo) -> String {
        info!("generating file documentation for {}", info.name());
        let request = docs::file_doc_prompt(
            &info.name(),
            info.kind_label(),
            &info.includes.join("\n"),
            &info.types.join("\n"),
            &info.functions.join("\n"),
            &analysis::related_files(info, &self.infos),
            &info.content,
        );
        match llm_requester::llm_request_with_prompt(vec![request], docs::doc_system_prompt()).await
        {
            Ok(body) => body.trim().to_string(),
            Err(e) => {
                error!("file documentation for {} failed: {e}", info.name());
                SECTION_FAILED.to_string()
            }
        }
    }
}

/// Assemble the sections into one markdown document with a table of
/// contents and a generation footer.
pub fn render_project_docs(docs: &ProjectDocs) -> String {
    let mut out = format!("# {} Documentation\n\n## Table of Contents\n\n", docs.project_name);
    for section in &docs.sections {
        out.push_str(&format!("- [{}](#{})\n", section.title, anchor(&section.title)));
    }
    out.push('\n');
    for section in &docs.sections {
        out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.body));
    }
    out.push_str(&format!(
        "---\n\n*Generated on {}*\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Write the project document (and any per-file documents) under
/// `output_dir`. Returns the path of the main document.
pub fn save_docs(docs: &ProjectDocs, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let main_path = output_dir.join("PROJECT_DOCUMENTATION.md");
    fs::write(&main_path, render_project_docs(docs))
        .with_context(|| format!("failed to write {}", main_path.display()))?;
    info!("wrote {}", main_path.display());

    if !docs.file_docs.is_empty() {
        let files_dir = output_dir.join("files");
        fs::create_dir_all(&files_dir)?;
        for (name, body) in &docs.file_docs {
            let doc_name = format!("{}.md", name.replace(['/', '\\'], "_"));
            let path = files_dir.join(doc_name);
            let content = format!("# {name}\n\n{body}\n");
            if let Err(e) = fs::write(&path, content) {
                warn!("failed to write {}: {e}", path.display());
            }
        }
    }

    Ok(main_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_docs() -> ProjectDocs {
        ProjectDocs {
            project_name: "demo".to_string(),
            sections: vec![
                DocSection {
                    title: "Project Overview".to_string(),
                    body: "An example.".to_string(),
                },
                DocSection {
                    title: "API Reference".to_string(),
                    body: "One function.".to_string(),
                },
            ],
            file_docs: vec![("module/stu.c".to_string(), "Student module.".to_string())],
        }
    }

    #[test]
    fn test_render_includes_toc_and_footer() {
        let out = render_project_docs(&sample_docs());
        assert!(out.starts_with("# demo Documentation"));
        assert!(out.contains("- [Project Overview](#project-overview)"));
        assert!(out.contains("## API Reference\n\nOne function."));
        assert!(out.contains("*Generated on "));
    }

    #[test]
    fn test_save_writes_main_and_file_docs() {
        let dir = tempfile::tempdir().unwrap();
        let main_path = save_docs(&sample_docs(), dir.path()).unwrap();
        assert!(main_path.exists());
        let per_file = dir.path().join("files").join("module_stu.c.md");
        let content = std::fs::read_to_string(per_file).unwrap();
        assert!(content.contains("Student module."));
    }

    #[test]
    fn test_generator_analyzes_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.c"), "int main(void) { return 0; }").unwrap();
        std::fs::write(dir.path().join("util.h"), "int add(int a, int b);").unwrap();
        let project = file_scanner::scan_c_project(dir.path()).unwrap();
        let generator = DocGenerator::new(project).unwrap();
        assert_eq!(generator.file_count(), 2);
    }
}
