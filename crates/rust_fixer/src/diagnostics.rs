//! Compile probe and error classification.
//!
//! Translated code is checked with a metadata-only `rustc` invocation in a
//! temporary directory. Diagnostics are bucketed with regexes so the common
//! categories (missing trait imports, missing module declarations) can be
//! fixed mechanically before any model round trip.

use log::{debug, warn};
use regex::Regex;
use std::io::Write;
use std::process::Command;
use thiserror::Error;

use crate::imports::insert_statements;
use crate::module_tree::ModuleLayout;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to stage code for the compile probe: {0}")]
    Stage(#[from] std::io::Error),
    #[error("rustc is not available: {0}")]
    CompilerUnavailable(String),
}

/// Outcome of one compile probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub success: bool,
    pub stderr: String,
}

/// Structured view of the probe diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ErrorAnalysis {
    /// (method, trait) pairs from "trait not implemented" notes.
    pub missing_traits: Vec<(String, String)>,
    pub undefined_functions: Vec<String>,
    pub module_errors: Vec<String>,
    pub path_errors: Vec<String>,
    pub other_errors: Vec<String>,
    pub suggested_fixes: Vec<String>,
}

impl ErrorAnalysis {
    pub fn is_empty(&self) -> bool {
        self.missing_traits.is_empty()
            && self.undefined_functions.is_empty()
            && self.module_errors.is_empty()
            && self.path_errors.is_empty()
            && self.other_errors.is_empty()
    }
}

/// Syntax-check `code` without building the surrounding project: the file
/// is written to a temp dir and compiled with `--emit=metadata`, so missing
/// sibling modules still surface as diagnostics but nothing is linked.
pub fn probe_syntax(code: &str) -> Result<ProbeReport, ProbeError> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("probe.rs");
    let mut file = std::fs::File::create(&source)?;
    file.write_all(code.as_bytes())?;

    let output = Command::new("rustc")
        .arg("--edition=2021")
        .arg("--crate-type=lib")
        .arg("--emit=metadata")
        .arg("--out-dir")
        .arg(dir.path())
        .arg(&source)
        .output()
        .map_err(|e| ProbeError::CompilerUnavailable(e.to_string()))?;

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    debug!("compile probe exited with {:?}", output.status.code());
    Ok(ProbeReport {
        success: output.status.success(),
        stderr,
    })
}

/// Bucket rustc stderr into fixable categories.
pub fn analyze_rustc_errors(stderr: &str) -> ErrorAnalysis {
    let trait_re = Regex::new(
        r"the method [`']([^'`]+)[`'] exists for[^,]+, but the following trait is not implemented:\s*[`']([^'`]+)[`']",
    )
    .unwrap();
    let func_re = Regex::new(r"cannot find function [`']([^'`]+)[`']").unwrap();
    let module_re = Regex::new(r"cannot find (?:module|crate) [`']([^'`]+)[`']").unwrap();
    let module_file_re = Regex::new(r"file not found for module [`']([^'`]+)[`']").unwrap();
    let path_re =
        Regex::new(r"failed to resolve: (use of undeclared [^\n]+|maybe a missing crate[^\n]*)")
            .unwrap();

    let mut analysis = ErrorAnalysis::default();

    for cap in trait_re.captures_iter(stderr) {
        let method = cap[1].to_string();
        let trait_path = cap[2].to_string();
        analysis
            .suggested_fixes
            .push(format!("import `{trait_path}` for `.{method}()`"));
        analysis.missing_traits.push((method, trait_path));
    }
    for cap in func_re.captures_iter(stderr) {
        analysis.undefined_functions.push(cap[1].to_string());
    }
    for cap in module_re.captures_iter(stderr) {
        analysis.module_errors.push(cap[1].to_string());
    }
    for cap in module_file_re.captures_iter(stderr) {
        analysis.module_errors.push(cap[1].to_string());
    }
    for cap in path_re.captures_iter(stderr) {
        analysis.path_errors.push(cap[1].to_string());
    }

    for line in stderr.lines() {
        let line = line.trim();
        if line.starts_with("error") && !line.starts_with("error: aborting") {
            if !trait_re.is_match(line)
                && !func_re.is_match(line)
                && !module_re.is_match(line)
                && !module_file_re.is_match(line)
                && !path_re.is_match(line)
            {
                analysis.other_errors.push(line.to_string());
            }
        }
    }

    analysis
}

/// `use` path for the traits rustc most often reports as unimplemented on
/// translated code.
fn trait_import(trait_path: &str) -> Option<String> {
    let import = match trait_path {
        "Read" | "std::io::Read" => "std::io::Read",
        "Write" | "std::io::Write" => "std::io::Write",
        "BufRead" | "std::io::BufRead" => "std::io::BufRead",
        "Iterator" | "std::iter::Iterator" => return None, // always in scope
        "From" | "Into" => return None,                    // prelude
        other if other.starts_with("std::") => other,
        _ => return None,
    };
    Some(import.to_string())
}

/// Apply the mechanical fixes the analysis allows: trait imports for
/// missing-trait diagnostics and `mod` declarations for unresolved modules
/// the layout knows about. Returns the patched code and whether anything
/// changed.
pub fn apply_known_fixes(
    code: &str,
    analysis: &ErrorAnalysis,
    layout: Option<&ModuleLayout>,
) -> (String, bool) {
    let mut statements = Vec::new();

    for (method, trait_path) in &analysis.missing_traits {
        match trait_import(trait_path) {
            Some(import) => {
                let stmt = format!("use {import};");
                if !code.contains(&stmt) && !statements.contains(&stmt) {
                    statements.push(stmt);
                }
            }
            None => debug!("no known import for trait {trait_path} (method {method})"),
        }
    }

    let mut mod_statements = Vec::new();
    if let Some(layout) = layout {
        for missing in &analysis.module_errors {
            if layout.nested_modules.contains_key(missing) {
                let modules = &layout.nested_modules[missing];
                let mut stmt = format!("mod {missing} {{");
                for module in modules {
                    stmt.push_str(&format!("\n    pub mod {module};"));
                }
                stmt.push_str("\n}");
                if !code.contains(&format!("mod {missing}")) {
                    mod_statements.push(stmt);
                }
            } else if layout.sibling_modules.contains(missing) {
                let stmt = format!("mod {missing};");
                if !code.contains(&stmt) {
                    mod_statements.push(stmt);
                }
            } else {
                warn!("unresolved module `{missing}` has no file in the project");
            }
        }
    }
    statements.extend(mod_statements);

    if statements.is_empty() {
        return (code.to_string(), false);
    }
    (insert_statements(code, &statements), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MISSING_TRAIT: &str = "error[E0599]: the method `read_to_string` exists for struct `File`, but the following trait is not implemented: `std::io::Read`";
    const MISSING_MODULE: &str = "error[E0432]: cannot find module `math` in this scope";

    #[test]
    fn test_probe_accepts_valid_code() {
        let report = probe_syntax("pub fn add(a: i32, b: i32) -> i32 { a + b }").unwrap();
        assert!(report.success, "{}", report.stderr);
    }

    #[test]
    fn test_probe_rejects_invalid_code() {
        let report = probe_syntax("fn broken( {").unwrap();
        assert!(!report.success);
        assert!(!report.stderr.is_empty());
    }

    #[test]
    fn test_analyze_missing_trait() {
        let analysis = analyze_rustc_errors(MISSING_TRAIT);
        assert_eq!(
            analysis.missing_traits,
            vec![("read_to_string".to_string(), "std::io::Read".to_string())]
        );
        assert!(!analysis.suggested_fixes.is_empty());
    }

    #[test]
    fn test_analyze_missing_module() {
        let analysis = analyze_rustc_errors(MISSING_MODULE);
        assert_eq!(analysis.module_errors, vec!["math".to_string()]);
    }

    #[test]
    fn test_analyze_other_errors_collected() {
        let stderr = "error[E0308]: mismatched types";
        let analysis = analyze_rustc_errors(stderr);
        assert_eq!(analysis.other_errors.len(), 1);
        assert!(analysis.missing_traits.is_empty());
    }

    #[test]
    fn test_apply_trait_fix() {
        let analysis = analyze_rustc_errors(MISSING_TRAIT);
        let (fixed, changed) = apply_known_fixes("fn run() {}", &analysis, None);
        assert!(changed);
        assert!(fixed.contains("use std::io::Read;"));
    }

    #[test]
    fn test_apply_module_fix_from_layout() {
        let files = vec![PathBuf::from("main.c"), PathBuf::from("math.c")];
        let layout = crate::module_tree::analyze_module_layout(std::path::Path::new("main.c"), &files);
        let analysis = analyze_rustc_errors(MISSING_MODULE);
        let (fixed, changed) = apply_known_fixes("fn main() {}", &analysis, Some(&layout));
        assert!(changed);
        assert!(fixed.contains("mod math;"));
    }

    #[test]
    fn test_no_fix_no_change() {
        let (fixed, changed) = apply_known_fixes("fn run() {}", &ErrorAnalysis::default(), None);
        assert!(!changed);
        assert_eq!(fixed, "fn run() {}");
    }
}
