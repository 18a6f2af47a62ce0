//! Repair prompts: feed compiler diagnostics back to the model for a
//! second-pass fix of a failed translation.

use log::debug;

/// Module context handed to the repair prompt so the model knows how the
/// broken file relates to the rest of the generated project.
#[derive(Debug, Clone, Default)]
pub struct RepairContext {
    pub file_name: String,
    pub is_main: bool,
    pub sibling_modules: Vec<String>,
    pub child_modules: Vec<String>,
}

impl RepairContext {
    fn render(&self) -> String {
        let list = |v: &[String]| {
            if v.is_empty() {
                "none".to_string()
            } else {
                v.join(", ")
            }
        };
        format!(
            "File: {}.rs\n\
             Main file: {}\n\
             Sibling modules: {}\n\
             Child modules: {}\n",
            self.file_name,
            if self.is_main { "yes" } else { "no" },
            list(&self.sibling_modules),
            list(&self.child_modules),
        )
    }
}

/// System prompt for the repair pass.
pub fn repair_system_prompt() -> String {
    "You are a Rust expert who specializes in fixing compilation errors in Rust code."
        .to_string()
}

/// Build the user prompt for a repair request: the broken code, the
/// compiler output, and the module context.
pub fn build_repair_prompt(
    rust_code: &str,
    error_message: &str,
    context: Option<&RepairContext>,
) -> String {
    debug!(
        "building repair prompt, code {} chars, errors {} chars",
        rust_code.len(),
        error_message.len()
    );

    let module_context = context.map(|c| c.render()).unwrap_or_default();

    format!(
        "I am translating C code to Rust, but the generated Rust code fails to compile. \
         Please fix these errors.\n\n\
         {module_context}\n\
         The Rust code with errors:\n\
         ```rust\n\
         {rust_code}\n\
         ```\n\n\
         Compiler output:\n\
         ```\n\
         {error_message}\n\
         ```\n\n\
         Analyze the errors and provide the complete fixed Rust code. Pay particular \
         attention to:\n\
         1. Missing trait imports (std::io::Read, Write, BufRead, ...)\n\
         2. Module path problems (referencing other modules correctly)\n\
         3. Type errors and undefined functions\n\
         4. Preserving the original behavior while fixing\n\n\
         Your output must be complete, directly compilable Rust code with no explanation \
         and no markdown fences.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_prompt_includes_code_and_errors() {
        let prompt = build_repair_prompt("fn main() { undefined() }", "error[E0425]", None);
        assert!(prompt.contains("fn main() { undefined() }"));
        assert!(prompt.contains("error[E0425]"));
        assert!(prompt.contains("no markdown fences"));
    }

    #[test]
    fn test_repair_prompt_renders_context() {
        let ctx = RepairContext {
            file_name: "main".to_string(),
            is_main: true,
            sibling_modules: vec!["math".to_string()],
            child_modules: vec![],
        };
        let prompt = build_repair_prompt("code", "errors", Some(&ctx));
        assert!(prompt.contains("File: main.rs"));
        assert!(prompt.contains("Main file: yes"));
        assert!(prompt.contains("Sibling modules: math"));
        assert!(prompt.contains("Child modules: none"));
    }
}
