//! Per-file translation prompts.
//!
//! Each C file gets a system prompt tailored to its role: the main file, a
//! header, an implementation file, or something generic. The shared output
//! contract asks for `<rust>`-delimited code and allows a skip sentinel for
//! files that need no standalone translation.

use log::debug;
use std::path::{Path, PathBuf};

use crate::{CFileKind, SKIP_SENTINEL, classify_file, module_name};

/// Builds translation system prompts for the files of one project.
pub struct TranslationPromptBuilder {
    files: Vec<PathBuf>,
}

impl TranslationPromptBuilder {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// System prompt for translating one file of the project.
    pub fn system_prompt_for(&self, file: &Path) -> String {
        let kind = classify_file(file);
        let module = module_name(file);
        debug!("building {:?} prompt for {}", kind, file.display());

        let mut prompt = format!(
            "You are an expert in both C and Rust. Translate the following C code into \
             idiomatic Rust, following Rust best practices, memory-safety principles, and \
             idiomatic expression throughout.\n\n\
             The file to translate now is: {}\n",
            file.display()
        );

        if !self.files.is_empty() {
            let names: Vec<String> = self.files.iter().map(|f| f.display().to_string()).collect();
            prompt.push_str(&format!(
                "\nRelated files in the project: {}\n",
                names.join(", ")
            ));
        }

        match kind {
            CFileKind::Main => prompt.push_str(&main_file_rules()),
            CFileKind::Header => prompt.push_str(&header_file_rules(&module)),
            CFileKind::Implementation => prompt.push_str(&implementation_file_rules(&module)),
            CFileKind::Generic => prompt.push_str(&generic_file_rules(&module)),
        }

        prompt.push_str(&output_format_rules());
        prompt
    }
}

fn main_file_rules() -> String {
    "\n[File role]\n\
     - This is the main program file containing the program entry point.\n\
     - It becomes main.rs in the Rust project.\n\n\
     [Translation rules]\n\
     1. The output must contain fn main() as the program entry point.\n\
     2. If the C code calls functions from other modules:\n\
        - declare them at the top with `mod module_name;`\n\
        - call them through the module path, e.g. module_name::function_name()\n\
     3. Do not re-implement functions that live in other modules; only reference them.\n\
     4. Use `mod module_name;` declarations, never inline `mod module_name { ... }` \
        bodies for code that belongs to other files.\n\
     5. main.rs must not contain function definitions that other modules already provide.\n\n\
     [Output]\n\
     - Output only the contents of main.rs; do not include other modules.\n"
        .to_string()
}

fn header_file_rules(module: &str) -> String {
    format!(
        "\n[File role]\n\
         - This is a C header containing declarations and possibly type definitions.\n\
         - Rust has no headers; this becomes a module definition file.\n\n\
         [Translation rules]\n\
         1. Turn function declarations into full definitions marked `pub`.\n\
         2. Turn type definitions (structs, enums) into Rust equivalents, also `pub`.\n\
         3. Do not include a main function.\n\
         4. Do not include `mod {module};` or any other module declaration.\n\
         5. Define everything at the top level; do not nest modules.\n\n\
         [Output]\n\
         - On success, output the complete contents of {module}.rs.\n\
         - If the implementations already live in the matching .c file, still translate \
           this file rather than skipping it.\n"
    )
}

fn implementation_file_rules(module: &str) -> String {
    format!(
        "\n[File role]\n\
         - This is a C implementation file for functions declared in the matching header.\n\
         - It becomes the module implementation in Rust.\n\n\
         [Translation rules]\n\
         1. Mark every externally visible function `pub`.\n\
         2. Internal helpers may stay private.\n\
         3. Do not include a main function.\n\
         4. Do not include `mod {module};` or any other module declaration.\n\
         5. Implement every function the matching header declares.\n\n\
         [Output]\n\
         - On success, output the complete contents of {module}.rs including all function \
           implementations. If the header defines types or declares functions, implement \
           them here.\n"
    )
}

fn generic_file_rules(module: &str) -> String {
    format!(
        "\n[File role]\n\
         - This is a C source file to convert into a Rust module.\n\n\
         [Translation rules]\n\
         1. Work out what the file does (utilities, a feature component, ...).\n\
         2. Translate every function and type into its Rust equivalent.\n\
         3. Mark anything externally visible `pub`.\n\
         4. Do not include `mod {module};` or other module declarations.\n\
         5. Keep the result organized the way Rust code is normally organized.\n\n\
         [Output]\n\
         - On success, output the corresponding Rust module code.\n"
    )
}

fn output_format_rules() -> String {
    format!(
        "\n[Output format]\n\
         1. First, briefly describe the structure and purpose of the C code.\n\
         2. Then provide the complete Rust implementation on a new line after a <rust> marker, \
            closed with </rust>.\n\
         3. Do not add explanatory comments inside the Rust code.\n\
         4. Do not use markdown code fences (``` or ''').\n\n\
         Example:\n\
         This C file implements max and min helpers.\n\n\
         <rust>\n\
         pub fn max(a: i32, b: i32) -> i32 {{\n\
             if a > b {{ a }} else {{ b }}\n\
         }}\n\
         </rust>\n\n\
         If this file does not need a standalone translation, output only: {SKIP_SENTINEL}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TranslationPromptBuilder {
        TranslationPromptBuilder::new(vec![
            PathBuf::from("main.c"),
            PathBuf::from("math.h"),
            PathBuf::from("math.c"),
        ])
    }

    #[test]
    fn test_main_prompt_mentions_entry_point() {
        let prompt = builder().system_prompt_for(Path::new("main.c"));
        assert!(prompt.contains("fn main()"));
        assert!(prompt.contains("mod module_name;"));
        assert!(prompt.contains("main.c, math.h, math.c"));
    }

    #[test]
    fn test_header_prompt_forbids_main() {
        let prompt = builder().system_prompt_for(Path::new("math.h"));
        assert!(prompt.contains("Do not include a main function"));
        assert!(prompt.contains("math.rs"));
        assert!(prompt.contains("mod math;"));
    }

    #[test]
    fn test_output_contract_present_for_all_kinds() {
        for file in ["main.c", "math.h", "math.c", "weird.txt"] {
            let prompt = builder().system_prompt_for(Path::new(file));
            assert!(prompt.contains("<rust>"), "missing marker for {file}");
            assert!(prompt.contains(SKIP_SENTINEL), "missing sentinel for {file}");
        }
    }
}
