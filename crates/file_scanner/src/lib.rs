use anyhow::{Result, anyhow};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as C sources.
pub const C_EXTENSIONS: &[&str] = &["c", "h", "cpp", "hpp"];

/// A scanned C project: the root directory plus the source files found in
/// it, stored relative to the root so module paths can be derived later.
#[derive(Debug, Clone)]
pub struct ScannedProject {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl ScannedProject {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute path of a project-relative file.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.root.join(file)
    }
}

fn has_c_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Recursively scan a project tree for C sources, returning paths relative
/// to the root. Hidden directories are skipped.
pub fn scan_tree(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(anyhow!("path is not a directory: {}", root.display()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(10)
        .into_iter()
        .filter_entry(|e| {
            // Depth 0 is the root the caller asked for; a dot-named
            // project directory is still scannable.
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .map(|n| n.starts_with('.') && n.len() > 1)
                    .unwrap_or(false)
        })
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && has_c_extension(path, extensions) {
            let rel = path.strip_prefix(root).unwrap_or(path);
            files.push(rel.to_path_buf());
        }
    }
    debug!("scan_tree found {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Order source files for translation: `main.c` first, then each header
/// immediately followed by its paired implementation file, then the
/// remaining headers, then the remaining implementation files.
pub fn sort_c_files(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut main_file = None;
    let mut headers = Vec::new();
    let mut impls = Vec::new();

    for f in files {
        let name = f.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let ext = f.extension().and_then(|e| e.to_str()).unwrap_or("");
        if name == "main.c" || name == "main.cpp" {
            main_file = Some(f);
        } else if ext == "h" || ext == "hpp" {
            headers.push(f);
        } else {
            impls.push(f);
        }
    }

    let mut sorted = Vec::new();
    if let Some(m) = main_file {
        sorted.push(m);
    }

    let mut paired = Vec::new();
    for h in &headers {
        let stem = h.with_extension("");
        if let Some(pos) = impls.iter().position(|c| c.with_extension("") == stem) {
            sorted.push(h.clone());
            sorted.push(impls.remove(pos));
            paired.push(h.clone());
        }
    }
    for h in headers {
        if !paired.contains(&h) {
            sorted.push(h);
        }
    }
    sorted.extend(impls);
    sorted
}

/// Scan a project directory (recursively) and return the files in
/// translation order.
pub fn scan_c_project(root: &Path) -> Result<ScannedProject> {
    let files = scan_tree(root, C_EXTENSIONS)?;
    let files = sort_c_files(files);
    info!(
        "scanned project {}: {} source files",
        root.display(),
        files.len()
    );
    Ok(ScannedProject {
        root: root.to_path_buf(),
        files,
    })
}

/// Concatenate the project's sources into one string, each file preceded by
/// a banner comment naming it. The combined text is what the model sees, so
/// the banners double as file boundaries in the prompt.
pub fn combine_sources(project: &ScannedProject) -> Result<String> {
    let mut combined = String::new();
    for file in &project.files {
        let path = project.resolve(file);
        let content = fs::read_to_string(&path)
            .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;
        combined.push_str(&format!("\n// ---------- {} ----------\n\n", file.display()));
        combined.push_str(&content);
        combined.push('\n');
    }

    if combined.is_empty() {
        return Err(anyhow!(
            "no source content found in {}",
            project.root.display()
        ));
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &str) {
        if let Some(parent) = dir.join(name).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_scan_tree_filters_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "main.c", "int main() {}");
        touch(tmp.path(), "math.h", "int max(int, int);");
        touch(tmp.path(), "notes.txt", "not code");

        let files = scan_tree(tmp.path(), C_EXTENSIONS).unwrap();
        assert_eq!(files.len(), 2);
        assert!(!files.contains(&PathBuf::from("notes.txt")));
    }

    #[test]
    fn test_scan_tree_missing_directory() {
        assert!(scan_tree(Path::new("/non/existent/dir"), C_EXTENSIONS).is_err());
    }

    #[test]
    fn test_scan_tree_recurses_and_relativizes() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "main.c", "");
        touch(tmp.path(), "module/stu.c", "");
        touch(tmp.path(), "module/data.c", "");

        let files = scan_tree(tmp.path(), C_EXTENSIONS).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.contains(&PathBuf::from("module/stu.c")));
    }

    #[test]
    fn test_scan_tree_dot_named_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".myproject");
        touch(&root, "main.c", "");
        touch(&root, ".git/junk.c", "");

        let files = scan_tree(&root, C_EXTENSIONS).unwrap();
        assert_eq!(files, vec![PathBuf::from("main.c")]);
    }

    #[test]
    fn test_sort_main_first_headers_before_impls() {
        let files = vec![
            PathBuf::from("math.c"),
            PathBuf::from("util.c"),
            PathBuf::from("math.h"),
            PathBuf::from("main.c"),
        ];
        let sorted = sort_c_files(files);
        assert_eq!(
            sorted,
            vec![
                PathBuf::from("main.c"),
                PathBuf::from("math.h"),
                PathBuf::from("math.c"),
                PathBuf::from("util.c"),
            ]
        );
    }

    #[test]
    fn test_sort_unpaired_header_before_remaining_impls() {
        let files = vec![PathBuf::from("misc.c"), PathBuf::from("types.h")];
        let sorted = sort_c_files(files);
        assert_eq!(
            sorted,
            vec![PathBuf::from("types.h"), PathBuf::from("misc.c")]
        );
    }

    #[test]
    fn test_combine_sources_banners() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "main.c", "int main() { return 0; }");
        touch(tmp.path(), "math.h", "int max(int a, int b);");

        let project = scan_c_project(tmp.path()).unwrap();
        let combined = combine_sources(&project).unwrap();
        assert!(combined.contains("// ---------- main.c ----------"));
        assert!(combined.contains("// ---------- math.h ----------"));
        assert!(combined.contains("int main() { return 0; }"));
        // main.c banner comes first
        assert!(
            combined.find("main.c").unwrap() < combined.find("math.h").unwrap()
        );
    }

    #[test]
    fn test_combine_sources_empty_project() {
        let tmp = TempDir::new().unwrap();
        let project = ScannedProject {
            root: tmp.path().to_path_buf(),
            files: Vec::new(),
        };
        assert!(combine_sources(&project).is_err());
    }
}
