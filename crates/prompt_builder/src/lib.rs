//! Prompt construction for the C→Rust translation pipeline.
//!
//! Three prompt families: translation prompts (per file kind), repair
//! prompts (compiler diagnostics fed back to the model), and documentation
//! prompts (per section of the generated project docs).

use std::path::Path;

pub mod docs;
pub mod repair;
pub mod translation;

pub use repair::{RepairContext, build_repair_prompt};
pub use translation::TranslationPromptBuilder;

/// Response sentinel the model emits when a file needs no standalone
/// translation (for example a header fully merged into its impl file).
pub const SKIP_SENTINEL: &str = "Skip this file";

/// What role a C file plays in the project, which decides the translation
/// rules it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CFileKind {
    /// `main.c`, becomes `main.rs` with the program entry point.
    Main,
    /// `.h`/`.hpp` declarations, becomes a module definition file.
    Header,
    /// `.c`/`.cpp` other than main, becomes a module implementation.
    Implementation,
    /// Anything else.
    Generic,
}

/// Classify a C source file by its name and extension.
pub fn classify_file(path: &Path) -> CFileKind {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if name == "main.c" || name == "main.cpp" {
        CFileKind::Main
    } else if ext == "h" || ext == "hpp" {
        CFileKind::Header
    } else if ext == "c" || ext == "cpp" {
        CFileKind::Implementation
    } else {
        CFileKind::Generic
    }
}

/// Module name a C file maps to: the file stem.
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_main() {
        assert_eq!(classify_file(Path::new("main.c")), CFileKind::Main);
        assert_eq!(classify_file(Path::new("src/main.c")), CFileKind::Main);
    }

    #[test]
    fn test_classify_header_and_impl() {
        assert_eq!(classify_file(Path::new("math.h")), CFileKind::Header);
        assert_eq!(classify_file(Path::new("math.c")), CFileKind::Implementation);
        assert_eq!(
            classify_file(Path::new("module/stu.c")),
            CFileKind::Implementation
        );
    }

    #[test]
    fn test_classify_generic() {
        assert_eq!(classify_file(Path::new("README.md")), CFileKind::Generic);
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name(&PathBuf::from("module/stu.c")), "stu");
        assert_eq!(module_name(&PathBuf::from("math.h")), "math");
    }
}
