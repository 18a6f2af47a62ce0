//! Lightweight C source analysis for documentation prompts.
//!
//! Regex extraction only: includes, type definitions and function
//! signatures. Enough structure for a documentation prompt, nothing close
//! to a parser.

use regex::Regex;
use std::path::{Path, PathBuf};

const SAMPLE_CHARS: usize = 2000;
const TYPE_SAMPLE_CHARS: usize = 1500;

/// Extracted facts about one C file.
#[derive(Debug, Clone)]
pub struct CFileInfo {
    pub path: PathBuf,
    pub includes: Vec<String>,
    pub types: Vec<String>,
    pub functions: Vec<String>,
    pub content: String,
}

impl CFileInfo {
    pub fn name(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn kind_label(&self) -> &'static str {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some("h") | Some("hpp") => "header file",
            _ => "implementation file",
        }
    }

    /// Local (quoted) includes only, i.e. project-internal dependencies.
    pub fn local_includes(&self) -> Vec<String> {
        self.includes
            .iter()
            .filter(|inc| !inc.starts_with('<'))
            .map(|inc| inc.trim_matches('"').to_string())
            .collect()
    }
}

pub fn analyze_file(path: &Path, content: &str) -> CFileInfo {
    CFileInfo {
        path: path.to_path_buf(),
        includes: extract_includes(content),
        types: extract_types(content),
        functions: extract_functions(content),
        content: content.to_string(),
    }
}

fn extract_includes(content: &str) -> Vec<String> {
    let re = Regex::new(r#"#include\s*(<[^>]+>|"[^"]+")"#).unwrap();
    re.captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect()
}

fn extract_types(content: &str) -> Vec<String> {
    let mut types = Vec::new();
    let named = Regex::new(r"(?:typedef\s+)?(struct|enum|union)\s+(\w+)").unwrap();
    for cap in named.captures_iter(content) {
        let entry = format!("{} {}", &cap[1], &cap[2]);
        if !types.contains(&entry) {
            types.push(entry);
        }
    }
    // typedef struct { ... } Name;
    let anon = Regex::new(r"\}\s*(\w+)\s*;").unwrap();
    for cap in anon.captures_iter(content) {
        let name = &cap[1];
        if content.contains("typedef") && !types.iter().any(|t| t.ends_with(name)) {
            types.push(format!("typedef {name}"));
        }
    }
    types
}

fn extract_functions(content: &str) -> Vec<String> {
    let re = Regex::new(
        r"(?m)^\s*(?:static\s+|inline\s+|extern\s+)*((?:unsigned\s+|signed\s+|const\s+)*\w+(?:\s*\*+)?)\s+(\w+)\s*\(([^;{}()]*)\)\s*[{;]",
    )
    .unwrap();
    let mut functions = Vec::new();
    for cap in re.captures_iter(content) {
        let ret = cap[1].trim().to_string();
        let name = cap[2].trim().to_string();
        let params = cap[3].split_whitespace().collect::<Vec<_>>().join(" ");
        if matches!(name.as_str(), "if" | "while" | "for" | "switch" | "return") {
            continue;
        }
        let sig = format!("{ret} {name}({params})");
        if !functions.contains(&sig) {
            functions.push(sig);
        }
    }
    functions
}

fn truncate(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Indented file listing for the overview prompt.
pub fn files_summary(infos: &[CFileInfo]) -> String {
    infos
        .iter()
        .map(|info| format!("- {}", info.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Samples of the most important files: main first, then headers.
pub fn key_file_samples(infos: &[CFileInfo]) -> String {
    let mut sample = String::new();
    for info in infos.iter().take(3) {
        sample.push_str(&format!(
            "--- {} ---\n{}\n\n",
            info.name(),
            truncate(&info.content, SAMPLE_CHARS)
        ));
    }
    sample
}

/// One line per file listing its project-internal includes.
pub fn dependency_map(infos: &[CFileInfo]) -> String {
    infos
        .iter()
        .map(|info| {
            let deps = info.local_includes();
            if deps.is_empty() {
                format!("{}: no internal dependencies", info.name())
            } else {
                format!("{} depends on: {}", info.name(), deps.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Directory -> files grouping for the modules prompt.
pub fn module_structure(infos: &[CFileInfo]) -> String {
    let mut lines = Vec::new();
    let mut last_dir: Option<PathBuf> = None;
    for info in infos {
        let dir = info
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf());
        if dir != last_dir {
            match &dir {
                Some(d) => lines.push(format!("{}/", d.display())),
                None => lines.push("(project root)".to_string()),
            }
            last_dir = dir;
        }
        if let Some(name) = info.path.file_name() {
            lines.push(format!("  {}", name.to_string_lossy()));
        }
    }
    lines.join("\n")
}

/// Type inventory plus truncated definitions of the files that define them.
pub fn data_structure_summary(infos: &[CFileInfo]) -> (String, String) {
    let mut summary = Vec::new();
    let mut samples = String::new();
    for info in infos {
        if info.types.is_empty() {
            continue;
        }
        summary.push(format!("{}: {}", info.name(), info.types.join(", ")));
        samples.push_str(&format!(
            "Definitions in {}:\n```c\n{}\n```\n\n",
            info.name(),
            truncate(&info.content, TYPE_SAMPLE_CHARS)
        ));
    }
    if summary.is_empty() {
        summary.push("no named structs or enums found".to_string());
    }
    (summary.join("\n"), samples)
}

/// Function inventory grouped by file.
pub fn api_summary(infos: &[CFileInfo]) -> String {
    let mut lines = Vec::new();
    for info in infos {
        if info.functions.is_empty() {
            continue;
        }
        lines.push(format!("file {}:", info.name()));
        for func in &info.functions {
            lines.push(format!("  {func}"));
        }
    }
    if lines.is_empty() {
        lines.push("no function declarations found".to_string());
    }
    lines.join("\n")
}

/// Which other files include this one, for the per-file prompt.
pub fn related_files(info: &CFileInfo, infos: &[CFileInfo]) -> String {
    let own_name = info
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dependents: Vec<String> = infos
        .iter()
        .filter(|other| other.path != info.path)
        .filter(|other| other.local_includes().iter().any(|inc| inc.ends_with(&own_name)))
        .map(|other| other.name())
        .collect();
    if dependents.is_empty() {
        String::new()
    } else {
        format!("\nIncluded by: {}\n", dependents.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
#include <stdio.h>
#include "math_utils.h"

typedef struct Point {
    int x;
    int y;
} Point;

enum Color { RED, GREEN };

static int clamp(int v, int lo, int hi) {
    if (v < lo) return lo;
    return v > hi ? hi : v;
}

int main(void) {
    return 0;
}
"#;

    #[test]
    fn test_extract_includes() {
        let info = analyze_file(Path::new("main.c"), SAMPLE);
        assert_eq!(info.includes, vec!["<stdio.h>", "\"math_utils.h\""]);
        assert_eq!(info.local_includes(), vec!["math_utils.h"]);
    }

    #[test]
    fn test_extract_types() {
        let info = analyze_file(Path::new("main.c"), SAMPLE);
        assert!(info.types.contains(&"struct Point".to_string()));
        assert!(info.types.contains(&"enum Color".to_string()));
    }

    #[test]
    fn test_extract_functions_skips_keywords() {
        let info = analyze_file(Path::new("main.c"), SAMPLE);
        assert!(info.functions.iter().any(|f| f.contains("clamp(")));
        assert!(info.functions.iter().any(|f| f.contains("main(")));
        assert!(!info.functions.iter().any(|f| f.contains(" if(")));
    }

    #[test]
    fn test_dependency_map() {
        let main = analyze_file(Path::new("main.c"), SAMPLE);
        let header = analyze_file(Path::new("math_utils.h"), "int clamp(int v, int lo, int hi);");
        let map = dependency_map(&[main, header]);
        assert!(map.contains("main.c depends on: math_utils.h"));
        assert!(map.contains("math_utils.h: no internal dependencies"));
    }

    #[test]
    fn test_related_files() {
        let main = analyze_file(Path::new("main.c"), SAMPLE);
        let header = analyze_file(Path::new("math_utils.h"), "int clamp(int v, int lo, int hi);");
        let infos = vec![main, header.clone()];
        let related = related_files(&infos[1], &infos);
        assert!(related.contains("main.c"));
    }

    #[test]
    fn test_module_structure_groups_directories() {
        let a = analyze_file(Path::new("main.c"), "int main(void) { return 0; }");
        let b = analyze_file(Path::new("module/stu.c"), "void stu(void) {}");
        let s = module_structure(&[a, b]);
        assert!(s.contains("(project root)"));
        assert!(s.contains("module/"));
        assert!(s.contains("  stu.c"));
    }
}
