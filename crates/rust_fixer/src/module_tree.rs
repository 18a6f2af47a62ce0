//! Module structure inference.
//!
//! Rust module declarations are inferred from the flat list of project
//! source paths: files in the same directory are sibling modules, a
//! subdirectory is a nested module containing `pub mod` entries for its
//! files. The layout drives which `mod` statements `main.rs` needs and
//! which declarations the other files must not carry.

use log::{info, warn};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::imports::insert_statements;

/// Inferred module position of one file within the project.
#[derive(Debug, Clone, Default)]
pub struct ModuleLayout {
    pub file: PathBuf,
    pub base_name: String,
    pub directory: PathBuf,
    pub is_main: bool,
    /// Modules living in the same directory.
    pub sibling_modules: Vec<String>,
    /// Direct subdirectory name -> modules inside it.
    pub nested_modules: BTreeMap<String, Vec<String>>,
    /// Modules in direct subdirectories, flattened.
    pub child_modules: Vec<String>,
    /// `mod` declarations main.rs needs for this layout.
    pub mod_statements: Vec<String>,
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn dir_of(path: &Path) -> PathBuf {
    path.parent().unwrap_or(Path::new("")).to_path_buf()
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// Analyze where `file` sits in the module tree implied by `files`. Paths
/// are project-relative; the same list must be used for every file so the
/// per-file layouts agree.
pub fn analyze_module_layout(file: &Path, files: &[PathBuf]) -> ModuleLayout {
    let mut layout = ModuleLayout {
        file: file.to_path_buf(),
        base_name: stem_of(file),
        directory: dir_of(file),
        ..Default::default()
    };
    layout.is_main = layout.base_name == "main";

    // Directory -> module stems, and parent directory -> child directory
    // names, both straight from the file list.
    let mut module_map: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    let mut dir_modules: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();

    for f in files {
        let parent = dir_of(f);
        module_map
            .entry(parent.clone())
            .or_default()
            .push(stem_of(f));

        if parent != Path::new("") {
            let grandparent = dir_of(&parent);
            if let Some(dir_name) = parent.file_name().and_then(|n| n.to_str()) {
                dir_modules
                    .entry(grandparent)
                    .or_default()
                    .insert(dir_name.to_string());
            }
        }
    }

    if let Some(stems) = module_map.get(&layout.directory) {
        for stem in stems {
            if *stem != layout.base_name {
                push_unique(&mut layout.sibling_modules, stem.clone());
            }
        }
    }

    if let Some(children) = dir_modules.get(&layout.directory) {
        for child_dir in children {
            let child_path = layout.directory.join(child_dir);
            if let Some(stems) = module_map.get(&child_path) {
                let mut unique = Vec::new();
                for stem in stems {
                    push_unique(&mut unique, stem.clone());
                }
                layout.child_modules.extend(unique.iter().cloned());
                layout.nested_modules.insert(child_dir.clone(), unique);
            }
        }
    }

    if layout.is_main {
        for (dir_name, modules) in &layout.nested_modules {
            layout
                .mod_statements
                .push(render_nested_mod(dir_name, modules));
        }
        for module in &layout.sibling_modules {
            if !layout.nested_modules.contains_key(module) {
                layout.mod_statements.push(format!("mod {module};"));
            }
        }
    }

    layout
}

fn render_nested_mod(dir_name: &str, modules: &[String]) -> String {
    let mut stmt = format!("mod {dir_name} {{");
    for module in modules {
        stmt.push_str(&format!("\n    pub mod {module};"));
    }
    stmt.push_str("\n}");
    stmt
}

/// Repair the `mod` declarations of one translated file.
///
/// For the main file, missing sibling and nested-directory declarations are
/// inserted (after the `use` block when one exists). For any other file a
/// self-referential `mod <self>;` is removed.
pub fn fix_module_references(code: &str, layout: &ModuleLayout) -> String {
    if !layout.is_main {
        return strip_self_module(code, &layout.base_name);
    }

    let simple_mod = Regex::new(r"mod\s+(\w+)\s*;").unwrap();
    let nested_mod = Regex::new(r"mod\s+(\w+)\s*\{([^}]*)\}").unwrap();

    let mut existing: BTreeSet<String> = BTreeSet::new();
    for cap in simple_mod.captures_iter(code) {
        existing.insert(cap[1].to_string());
    }
    for cap in nested_mod.captures_iter(code) {
        existing.insert(cap[1].to_string());
    }

    let mut missing = Vec::new();
    for (dir_name, modules) in &layout.nested_modules {
        if !existing.contains(dir_name) {
            missing.push(render_nested_mod(dir_name, modules));
        }
    }
    for module in &layout.sibling_modules {
        if !existing.contains(module) && !layout.nested_modules.contains_key(module) {
            missing.push(format!("mod {module};"));
        }
    }

    if missing.is_empty() {
        return code.to_string();
    }

    info!(
        "adding {} missing mod declaration(s) to {}",
        missing.len(),
        layout.file.display()
    );
    insert_statements(code, &missing)
}

/// Remove a self-referential module declaration; a module file must not
/// declare itself.
pub fn strip_self_module(code: &str, base_name: &str) -> String {
    let self_mod = format!("mod {base_name};");
    if code.contains(&self_mod) {
        warn!("{base_name}.rs declared itself, removing '{self_mod}'");
        code.replace(&self_mod, "").trim().to_string()
    } else {
        code.to_string()
    }
}

/// Remove a stray `fn main` from a module file. Deliberately naive: the cut
/// ends at the first closing brace, which matches how these strays usually
/// look (a two-line wrapper calling into the module).
pub fn strip_stray_main(code: &str) -> String {
    let Some(start) = code.find("fn main") else {
        return code.to_string();
    };
    warn!("module file contains a main function, removing it");
    match code[start..].find('}') {
        Some(rel_end) => {
            let end = start + rel_end + 1;
            format!("{}\n{}", code[..start].trim_end(), code[end..].trim_start())
                .trim()
                .to_string()
        }
        None => code.to_string(),
    }
}

/// Rewrite flat `mod x;` declarations into nested blocks when the file
/// list shows that `x` is a directory module. Replacement runs back to
/// front so match offsets stay valid.
pub fn rewrite_flat_modules(code: &str, files: &[PathBuf]) -> String {
    let mut dir_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for f in files {
        let parent = dir_of(f);
        if let Some(dir_name) = parent.file_name().and_then(|n| n.to_str()) {
            let entry = dir_map.entry(dir_name.to_string()).or_default();
            push_unique(entry, stem_of(f));
        }
    }

    let simple_mod = Regex::new(r"mod\s+(\w+)\s*;").unwrap();
    let matches: Vec<_> = simple_mod
        .captures_iter(code)
        .map(|cap| {
            let m = cap.get(0).unwrap();
            (m.start(), m.end(), cap[1].to_string())
        })
        .collect();

    let mut fixed = code.to_string();
    for (start, end, name) in matches.into_iter().rev() {
        if let Some(submodules) = dir_map.get(&name) {
            if !submodules.is_empty() {
                info!("rewriting 'mod {name};' into a nested module declaration");
                let nested = render_nested_mod(&name, submodules);
                fixed.replace_range(start..end, &nested);
            }
        }
    }
    fixed
}
