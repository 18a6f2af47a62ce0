use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::translator::{FileTranslator, TranslationOutcome};

fn progress_style_spinner() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

fn progress_style_bar() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}").unwrap()
}

/// Totals for one batch run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchReport {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Translate every file of the project concurrently, with per-file retry
/// and progress bars. The semaphore bounds in-flight model requests.
pub async fn process_batch(
    translator: Arc<FileTranslator>,
    max_retries: usize,
    concurrent_limit: usize,
) -> Result<BatchReport> {
    let files: Vec<PathBuf> = translator.files().to_vec();
    info!("starting batch translation of {} files", files.len());

    run_batch(files, max_retries, concurrent_limit, move |file| {
        let translator = translator.clone();
        async move { translator.translate_file(&file).await }
    })
    .await
}

/// The batch engine behind [`process_batch`], generic over the per-file
/// operation so the retry and accounting logic is testable on its own.
async fn run_batch<F, Fut>(
    files: Vec<PathBuf>,
    max_retries: usize,
    concurrent_limit: usize,
    op: F,
) -> Result<BatchReport>
where
    F: Fn(PathBuf) -> Fut + Clone + Send + 'static,
    Fut: std::future::Future<Output = Result<TranslationOutcome>> + Send + 'static,
{
    let concurrent = concurrent_limit.max(1);
    let max_retries = max_retries.max(1);

    let m = MultiProgress::new();
    let overall = m.add(ProgressBar::new(files.len() as u64));
    overall.set_style(progress_style_bar());
    overall.set_message("overall progress");

    let sem = Arc::new(Semaphore::new(concurrent));

    let mut handles = Vec::with_capacity(files.len());
    for file in files {
        let pb = m.add(ProgressBar::new_spinner());
        pb.set_style(progress_style_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("queued: {}", file.display()));

        let permit = sem.clone();
        let overall = overall.clone();
        let op = op.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit
                .acquire_owned()
                .await
                .map_err(|e| anyhow!("semaphore error: {}", e))?;
            let mut attempt = 0usize;
            loop {
                attempt += 1;
                pb.set_message(format!(
                    "translating: {} (attempt {}/{})",
                    file.display(),
                    attempt,
                    max_retries
                ));
                match op(file.clone()).await {
                    Ok(outcome) => {
                        pb.finish_with_message(format!("done: {}", file.display()));
                        overall.inc(1);
                        break Ok(outcome);
                    }
                    Err(err) if attempt < max_retries => {
                        pb.set_message(format!("retrying: {} ({})", file.display(), err));
                    }
                    Err(err) => {
                        pb.abandon_with_message(format!("failed: {} ({})", file.display(), err));
                        overall.inc(1);
                        break Err(err);
                    }
                }
            }
        });
        handles.push(handle);
    }

    let mut report = BatchReport::default();
    for handle in handles {
        match handle.await {
            Ok(Ok(TranslationOutcome::Translated(_))) => report.translated += 1,
            Ok(Ok(TranslationOutcome::Skipped)) => report.skipped += 1,
            Ok(Err(_)) => report.failed += 1,
            Err(_join_err) => report.failed += 1,
        }
    }

    overall.finish_with_message("batch finished");
    info!(
        "batch done: {} translated, {} skipped, {} failed",
        report.translated, report.skipped, report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retry_until_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        // Fails twice, succeeds on the third attempt.
        let report = run_batch(vec![PathBuf::from("a.c")], 3, 1, move |_file| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow!("transient failure"))
                } else {
                    Ok(TranslationOutcome::Skipped)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abandon_the_file() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let files = vec![PathBuf::from("broken.c"), PathBuf::from("fine.c")];
        let report = run_batch(files, 2, 2, move |file| {
            let counter = counter.clone();
            async move {
                if file == PathBuf::from("broken.c") {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(anyhow!("always fails"))
                } else {
                    Ok(TranslationOutcome::Translated(PathBuf::from(
                        "out/src/fine.rs",
                    )))
                }
            }
        })
        .await
        .unwrap();

        // Abandoned after exactly max_retries attempts; the other file is
        // unaffected.
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(report.translated, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_zero_limits_are_clamped() {
        let report = run_batch(vec![PathBuf::from("a.c")], 0, 0, |_file| async {
            Ok(TranslationOutcome::Skipped)
        })
        .await
        .unwrap();
        assert_eq!(report.skipped, 1);
    }
}
