//! Documentation prompts: one per section of the generated project docs,
//! plus a per-file documentation prompt.

/// System prompt shared by all documentation requests.
pub fn doc_system_prompt() -> String {
    "You are a professional software documentation expert who turns C code into clear \
     documentation. Write in a professional, readable style."
        .to_string()
}

const NO_PREAMBLE: &str = "Write in markdown. Do not open with \"based on the provided \
information\" or similar framing; start directly with the document content.";

/// Project overview section: file listing plus samples of the key files.
pub fn overview_prompt(project_name: &str, files_summary: &str, main_content: &str) -> String {
    format!(
        "You are a professional software documentation writer. Generate a project overview \
         document from the following C project information.\n\n\
         Project name: {project_name}\n\
         Project file structure:\n{files_summary}\n\n\
         Samples of key files in the project:\n{main_content}\n\n\
         Provide:\n\
         1. Introduction: the project's main functionality and purpose\n\
         2. Background: the problem the project solves\n\
         3. Technology stack: the main techniques and libraries used\n\
         4. Highlights: the project's main characteristics and strengths\n\n\
         {NO_PREAMBLE}\n"
    )
}

/// Architecture section: driven by the `#include` dependency map.
pub fn architecture_prompt(project_name: &str, dependencies: &str) -> String {
    format!(
        "You are a professional software architect. Generate an architecture document from \
         the following C project's file dependencies.\n\n\
         Project name: {project_name}\n\n\
         File dependencies:\n{dependencies}\n\n\
         Provide:\n\
         1. Architecture overview: the overall design\n\
         2. Components: the main components and their responsibilities\n\
         3. Module relations: dependencies between modules\n\
         4. Data flow: the main data flows through the system\n\n\
         {NO_PREAMBLE} ASCII diagrams are welcome where they help.\n"
    )
}

/// Modules section: driven by the directory structure.
pub fn modules_prompt(project_name: &str, modules: &str) -> String {
    format!(
        "You are a professional software documentation writer. Generate a module guide from \
         the following C project's module structure.\n\n\
         Project name: {project_name}\n\n\
         Module structure:\n{modules}\n\n\
         Provide:\n\
         1. Module overview: how the project is divided into modules\n\
         2. Per-module functionality: each module's main responsibilities\n\
         3. Module relations: interactions and dependencies between modules\n\n\
         {NO_PREAMBLE}\n"
    )
}

/// Data structures section: struct/enum inventory plus detailed samples.
pub fn data_structures_prompt(summary: &str, samples: &str) -> String {
    format!(
        "You are a professional software documentation writer. Generate a data-structure \
         guide from the following C project's type definitions.\n\n\
         Data structure inventory:\n{summary}\n\n\
         {samples}\n\n\
         Provide:\n\
         1. Overview: the design ideas behind the main data structures\n\
         2. Key structs: purpose and field descriptions\n\
         3. Enums: the main enum types and their uses\n\
         4. Relations: how the main data structures relate\n\n\
         {NO_PREAMBLE} Do not invent types that are not in the inventory.\n"
    )
}

/// API reference section: extracted function declarations.
pub fn api_reference_prompt(api_summary: &str) -> String {
    format!(
        "You are a professional software documentation writer. Generate an API reference \
         from the following C project's function declarations.\n\n\
         Function inventory:\n{api_summary}\n\n\
         Provide:\n\
         1. API grouping: functions grouped by feature or module\n\
         2. Key functions: name, parameters, return value, behavior, caveats\n\
         3. Call flow: the order the main APIs are used in\n\n\
         {NO_PREAMBLE} Tables improve readability. Do not invent functions that are not in \
         the inventory.\n"
    )
}

/// Per-file documentation prompt.
pub fn file_doc_prompt(
    file_name: &str,
    file_kind: &str,
    includes: &str,
    types: &str,
    functions: &str,
    related_files: &str,
    content: &str,
) -> String {
    let or_none = |s: &str| {
        if s.is_empty() {
            "none".to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "You are a professional software documentation writer for C code. Generate detailed \
         documentation for the following C file.\n\n\
         File name: {file_name}\n\
         File type: {file_kind}\n\n\
         Included headers:\n{}\n\n\
         Defined structs/enums:\n{}\n\n\
         Functions:\n{}\n\
         {related_files}\n\
         File content:\n\
         ```c\n\
         {content}\n\
         ```\n\n\
         Provide:\n\
         1. File overview: the file's main purpose\n\
         2. Function descriptions: behavior, parameters, return values, caveats of each\n\
         3. Data structures: the important structs, enums and typedefs\n\
         4. Usage example: how to use the file's main functionality, where applicable\n\
         5. Dependencies: files this one depends on or is depended on by\n\n\
         {NO_PREAMBLE}\n",
        or_none(includes),
        or_none(types),
        or_none(functions),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_prompts_embed_inputs() {
        let p = overview_prompt("demo", "- main.c", "--- main.c ---\nint main() {}");
        assert!(p.contains("Project name: demo"));
        assert!(p.contains("- main.c"));

        let p = architecture_prompt("demo", "main.c depends on: math.h");
        assert!(p.contains("main.c depends on: math.h"));

        let p = api_reference_prompt("file math.c:\n  int max(int a, int b)");
        assert!(p.contains("int max(int a, int b)"));
    }

    #[test]
    fn test_file_doc_prompt_marks_missing_sections() {
        let p = file_doc_prompt("util.c", "implementation file", "", "", "", "", "int x;");
        assert!(p.contains("Included headers:\nnone"));
        assert!(p.contains("```c"));
    }
}
