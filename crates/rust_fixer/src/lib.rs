//! Post-processing for model-translated Rust code.
//!
//! Three layers, applied in order of increasing cost:
//! 1. [`extract`] pulls the code block out of a chat response.
//! 2. [`sanitize_translation`] runs the text-level heuristics: stray main
//!    removal, self-module removal, missing imports, module declarations.
//! 3. [`diagnostics`] compiles the result with a metadata-only rustc probe
//!    and mechanically fixes the diagnostic categories it recognizes.
//!
//! Anything still failing after these layers is left to the caller, which
//! can escalate to a model-assisted repair round.

pub mod diagnostics;
pub mod extract;
pub mod imports;
pub mod module_tree;

use log::warn;
use std::path::PathBuf;

pub use diagnostics::{
    analyze_rustc_errors, apply_known_fixes, probe_syntax, ErrorAnalysis, ProbeError, ProbeReport,
};
pub use extract::{extract_rust_code, is_skip_response, strip_markdown_fences};
pub use imports::add_missing_imports;
pub use module_tree::{analyze_module_layout, fix_module_references, ModuleLayout};

/// Run every text-level heuristic on one translated file.
///
/// `layout` must come from [`analyze_module_layout`] over the same file
/// list as `files`, so module repairs agree across the project.
pub fn sanitize_translation(code: &str, layout: &ModuleLayout, files: &[PathBuf]) -> String {
    let mut fixed = code.to_string();

    if layout.is_main {
        if !fixed.contains("fn main") {
            warn!("{} translated without a main function", layout.file.display());
        }
    } else {
        if fixed.contains("fn main") {
            fixed = module_tree::strip_stray_main(&fixed);
        }
        fixed = module_tree::strip_self_module(&fixed, &layout.base_name);
    }

    fixed = imports::add_missing_imports(&fixed);
    fixed = module_tree::fix_module_references(&fixed, layout);
    if layout.is_main {
        fixed = module_tree::rewrite_flat_modules(&fixed, files);
    }
    fixed
}
