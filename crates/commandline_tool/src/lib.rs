use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "c2rust-translate")]
#[command(version = "0.1")]
#[command(about = "LLM-assisted C to Rust project translation", long_about = None)]
pub struct Cli {
    /// Show debug log (off by default)
    #[arg(long, short = 'd', global = true, help = "show debug log")]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the C sources of a project in translation order
    Scan {
        /// C project directory (required)
        #[arg(long, short, value_name = "DIR", help = "enter path", required = true)]
        input_dir: PathBuf,
    },

    /// Translate a C project into a Rust project
    Translate {
        /// C project directory (required)
        #[arg(long, value_name = "DIR", required = true)]
        input_dir: PathBuf,

        /// Rust project output directory (optional)
        #[arg(
            long,
            value_name = "DIR",
            help = "Output path (default: input_dir's parent/(input_dir_name + \"_rust\"))"
        )]
        output_dir: Option<PathBuf>,
    },

    /// Generate markdown documentation for a C project
    Docs {
        /// C project directory (required)
        #[arg(long, value_name = "DIR", required = true)]
        input_dir: PathBuf,

        /// Documentation output directory (optional)
        #[arg(
            long,
            value_name = "DIR",
            help = "Output path (default: input_dir's parent/(input_dir_name + \"_docs\"))"
        )]
        output_dir: Option<PathBuf>,

        /// Also generate one document per source file
        #[arg(long)]
        per_file: bool,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

fn sibling_dir(input_dir: &Path, suffix: &str) -> PathBuf {
    let parent = input_dir.parent().unwrap_or_else(|| Path::new("."));
    let dir_name = input_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    parent.join(format!("{dir_name}{suffix}"))
}

/// Default Rust output directory next to the input project.
pub fn default_rust_dir_for(input_dir: &Path) -> PathBuf {
    sibling_dir(input_dir, "_rust")
}

/// Default documentation output directory next to the input project.
pub fn default_docs_dir_for(input_dir: &Path) -> PathBuf {
    sibling_dir(input_dir, "_docs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_dirs_sit_next_to_input() {
        let input = Path::new("/work/demo");
        assert_eq!(default_rust_dir_for(input), PathBuf::from("/work/demo_rust"));
        assert_eq!(default_docs_dir_for(input), PathBuf::from("/work/demo_docs"));
    }
}
