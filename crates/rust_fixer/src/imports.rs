//! Missing-import heuristics.
//!
//! Translated code frequently calls into `std::io`, `std::fs` or
//! `std::path` without importing them. A small usage-pattern table catches
//! the common cases without parsing the code.

use log::info;
use regex::Regex;

/// Usage pattern -> the `use` path it implies.
const IMPORT_PATTERNS: &[(&str, &str)] = &[
    ("File::", "std::io"),
    ("stdin()", "std::io"),
    ("stdout()", "std::io"),
    ("fs::File", "std::fs"),
    ("fs::read", "std::fs"),
    ("Path::", "std::path::Path"),
    ("PathBuf::", "std::path::PathBuf"),
    (".lines()", "std::io::BufRead"),
    ("read_line", "std::io::BufRead"),
    (".flush()", "std::io::Write"),
    ("write_all", "std::io::Write"),
    ("read_to_string", "std::io::Read"),
    ("BufReader", "std::io::BufReader"),
    ("BufWriter", "std::io::BufWriter"),
];

/// Scan `code` for usage patterns whose imports are absent. Returned paths
/// are deduplicated and sorted.
pub fn detect_missing_imports(code: &str) -> Vec<String> {
    let mut missing = Vec::new();
    for (pattern, import) in IMPORT_PATTERNS {
        if code.contains(pattern) && !has_import(code, import) {
            if !missing.contains(&import.to_string()) {
                missing.push(import.to_string());
            }
        }
    }
    missing.sort();
    missing
}

fn has_import(code: &str, import: &str) -> bool {
    if code.contains(&format!("use {import};")) || code.contains(&format!("use {import}::")) {
        return true;
    }
    // A braced group like `use std::io::{self, Read};` covers both the
    // module itself and its members.
    if let Some((parent, name)) = import.rsplit_once("::") {
        let group = Regex::new(&format!(
            r"use\s+{}::\{{[^}}]*\b(self|{})\b",
            regex::escape(parent),
            regex::escape(name)
        ))
        .unwrap();
        if group.is_match(code) {
            return true;
        }
    } else if code.contains(&format!("use {import} ")) {
        return true;
    }
    false
}

/// Add `use` lines for each missing import, grouping `std::io` members into
/// one braced import.
pub fn add_missing_imports(code: &str) -> String {
    let missing = detect_missing_imports(code);
    if missing.is_empty() {
        return code.to_string();
    }
    info!("adding missing imports: {}", missing.join(", "));

    let mut io_members = Vec::new();
    let mut statements = Vec::new();
    for import in &missing {
        match import.strip_prefix("std::io::") {
            Some(member) => io_members.push(member.to_string()),
            None if import == "std::io" => io_members.push("self".to_string()),
            None => statements.push(format!("use {import};")),
        }
    }
    if !io_members.is_empty() {
        if io_members.len() == 1 && io_members[0] != "self" {
            statements.insert(0, format!("use std::io::{};", io_members[0]));
        } else {
            statements.insert(0, format!("use std::io::{{{}}};", io_members.join(", ")));
        }
    }

    insert_statements(code, &statements)
}

/// Insert statements after the last existing `use` line, or before the
/// first non-comment line when there are none.
pub fn insert_statements(code: &str, statements: &[String]) -> String {
    if statements.is_empty() {
        return code.to_string();
    }
    let block = statements.join("\n");

    let use_line = Regex::new(r"(?m)^\s*use\s+[^;]+;").unwrap();
    if let Some(last) = use_line.find_iter(code).last() {
        let end = last.end();
        return format!("{}\n{}{}", &code[..end], block, &code[end..]);
    }

    // No use block: skip leading comments and blank lines.
    let mut insert_at = 0;
    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.is_empty() {
            insert_at += line.len() + 1;
        } else {
            break;
        }
    }
    insert_at = insert_at.min(code.len());
    format!("{}{}\n\n{}", &code[..insert_at], block, &code[insert_at..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_missing_bufread() {
        let code = "fn run(r: impl std::io::Read) {\n    let reader = BufReader::new(r);\n    for line in reader.lines() {}\n}";
        let missing = detect_missing_imports(code);
        assert!(missing.contains(&"std::io::BufRead".to_string()));
        assert!(missing.contains(&"std::io::BufReader".to_string()));
    }

    #[test]
    fn test_existing_import_not_reported() {
        let code = "use std::io::BufReader;\n\nfn run() { let _ = BufReader::new(std::io::empty()); }";
        let missing = detect_missing_imports(code);
        assert!(!missing.contains(&"std::io::BufReader".to_string()));
    }

    #[test]
    fn test_braced_group_counts_as_imported() {
        let code = "use std::io::{BufRead, BufReader};\n\nfn run() { for _ in std::io::empty().lines() {} }";
        assert!(detect_missing_imports(code).is_empty());
    }

    #[test]
    fn test_add_groups_io_members() {
        let code = "fn copy() {\n    let mut out = BufWriter::new(Vec::new());\n    out.flush().ok();\n}";
        let fixed = add_missing_imports(code);
        assert!(fixed.contains("use std::io::{BufWriter, Write};"));
    }

    #[test]
    fn test_add_path_import() {
        let code = "fn p() { let _ = Path::new(\"x\"); }";
        let fixed = add_missing_imports(code);
        assert!(fixed.starts_with("use std::path::Path;"));
    }

    #[test]
    fn test_insert_after_last_use() {
        let code = "use std::fs;\nuse std::path::Path;\n\nfn main() {}\n";
        let out = insert_statements(code, &["mod math;".to_string()]);
        let mod_pos = out.find("mod math;").unwrap();
        assert!(mod_pos > out.find("std::path::Path").unwrap());
        assert!(mod_pos < out.find("fn main").unwrap());
    }

    #[test]
    fn test_insert_skips_leading_comments() {
        let code = "// translated module\n\nfn main() {}\n";
        let out = insert_statements(code, &["mod math;".to_string()]);
        assert!(out.find("// translated module").unwrap() < out.find("mod math;").unwrap());
        assert!(out.find("mod math;").unwrap() < out.find("fn main").unwrap());
    }
}
