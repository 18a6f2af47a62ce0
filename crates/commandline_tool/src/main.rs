use commandline_tool::{default_docs_dir_for, default_rust_dir_for, parse_args, Commands};
use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{Datelike, Local, Timelike};
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::{rngs::StdRng, Rng};
use tracing_appender::rolling;
use tracing_log::LogTracer;
use tracing_subscriber::filter::LevelFilter as SubLevel;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the CLI first so --debug can steer the log filters
    let cli = parse_args();

    // Route log macros through tracing
    let _ = LogTracer::init();

    let log_dir = Path::new("log");
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory: {}", e);
    }

    // Console layer, log output only, no interactive prompts
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    // Archive the previous run's latest.log under a timestamped name; the
    // current run always writes latest.log
    let latest_path = log_dir.join("latest.log");
    if latest_path.exists() {
        if let Ok(metadata) = fs::metadata(&latest_path) {
            if let Ok(modified) = metadata.modified() {
                // 10 digits: yyMMddHH plus two random digits
                let datetime: chrono::DateTime<Local> = modified.into();
                let mut rng = StdRng::from_entropy();
                let rnd: u8 = rng.gen_range(0..100);
                let code = format!(
                    "{:02}{:02}{:02}{:02}{:02}",
                    (datetime.year() % 100) as i32,
                    datetime.month(),
                    datetime.day(),
                    datetime.hour(),
                    rnd
                );
                let archive_path = log_dir.join(format!("{}.log", code));
                // Append an increasing index if the target already exists
                let mut final_path = archive_path.clone();
                let mut idx = 1;
                while final_path.exists() {
                    final_path = log_dir.join(format!("{}-{}.log", code, idx));
                    idx += 1;
                }
                let _ = fs::rename(&latest_path, &final_path);
            }
        }
    }

    // "never" rolling keeps a fixed latest.log
    let file_appender = rolling::never(log_dir, "latest.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Leak the guard so buffered log lines survive until process exit
    let _guard: &'static _ = Box::leak(Box::new(guard));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(non_blocking);

    // Console shows WARN and up unless --debug; the file gets INFO, or
    // DEBUG when --debug is set
    let stdout_filter = if cli.debug {
        SubLevel::DEBUG
    } else {
        SubLevel::WARN
    };
    let file_filter = if cli.debug {
        SubLevel::DEBUG
    } else {
        SubLevel::INFO
    };

    let subscriber = tracing_subscriber::registry()
        .with(stdout_layer.with_filter(stdout_filter))
        .with(file_layer.with_filter(file_filter));
    let _ = subscriber.try_init();

    // Surface configuration problems before any model request happens
    if let Err(e) = llm_requester::validate_llm_config() {
        warn!("LLM configuration problem: {}", e);
        match llm_requester::diagnose_config_issues() {
            Ok(report) => println!("{}", report),
            Err(diag_err) => error!("failed to diagnose configuration: {}", diag_err),
        }
    }

    match &cli.command {
        Commands::Scan { input_dir } => {
            debug!("scan command selected");
            println!("scanning project\ninput directory: {}", input_dir.display());

            match file_scanner::scan_c_project(input_dir) {
                Ok(project) => {
                    println!("found {} C source files (translation order):", project.files.len());
                    for (i, file) in project.files.iter().enumerate() {
                        println!("  {}. {}", i + 1, file.display());
                    }
                }
                Err(e) => {
                    error!("scan failed: {}", e);
                    println!("scan failed: {}", e);
                }
            }
            Ok(())
        }

        Commands::Translate {
            input_dir,
            output_dir,
        } => {
            println!("translate command selected\ninput directory: {}", input_dir.display());

            if !input_dir.exists() {
                error!("input directory does not exist: {}", input_dir.display());
                println!("error: input directory does not exist: {}", input_dir.display());
                return Ok(());
            }

            let output_dir = output_dir
                .clone()
                .unwrap_or_else(|| default_rust_dir_for(input_dir));
            println!("output directory: {}", output_dir.display());

            match main_processor::translate_project(input_dir, &output_dir).await {
                Ok(report) => {
                    info!("✅ C to Rust translation finished");
                    println!(
                        "🎉 translation finished: {} translated, {} skipped, {} failed",
                        report.translated, report.skipped, report.failed
                    );
                    println!("📁 Rust project written to {}", output_dir.display());
                    if report.failed > 0 {
                        println!(
                            "⚠️  {} file(s) failed, check log/latest.log for details",
                            report.failed
                        );
                    }
                }
                Err(e) => {
                    error!("❌ translation failed: {}", e);
                    println!("⚠️  translation failed: {}", e);
                    if e.to_string().contains("config.toml") {
                        println!("💡 hint: create config/config.toml, for example:");
                        println!("     provider = \"openai\"");
                        println!("     [llm.openai]");
                        println!("     api_key = \"sk-...\"");
                    }
                }
            }
            Ok(())
        }

        Commands::Docs {
            input_dir,
            output_dir,
            per_file,
        } => {
            println!("docs command selected\ninput directory: {}", input_dir.display());

            let output_dir = output_dir
                .clone()
                .unwrap_or_else(|| default_docs_dir_for(input_dir));
            println!("output directory: {}", output_dir.display());

            let project = match file_scanner::scan_c_project(input_dir) {
                Ok(project) if !project.is_empty() => project,
                Ok(_) => {
                    warn!("no C source files found in {}", input_dir.display());
                    println!("no C source files found in {}", input_dir.display());
                    return Ok(());
                }
                Err(e) => {
                    error!("scan failed: {}", e);
                    println!("scan failed: {}", e);
                    return Ok(());
                }
            };

            let generator = match doc_generator::DocGenerator::new(project) {
                Ok(generator) => generator,
                Err(e) => {
                    error!("failed to analyze project: {}", e);
                    println!("failed to analyze project: {}", e);
                    return Ok(());
                }
            };
            println!("generating documentation for {} files...", generator.file_count());

            match generator.generate(*per_file).await {
                Ok(docs) => match doc_generator::save_docs(&docs, &output_dir) {
                    Ok(main_path) => {
                        info!("✅ documentation generated");
                        println!("🎉 documentation written to {}", main_path.display());
                    }
                    Err(e) => {
                        error!("failed to save documentation: {}", e);
                        println!("failed to save documentation: {}", e);
                    }
                },
                Err(e) => {
                    error!("❌ documentation generation failed: {}", e);
                    println!("⚠️  documentation generation failed: {}", e);
                }
            }
            Ok(())
        }
    }
}
