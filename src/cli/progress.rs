//! Terminal progress reporting for download runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::scheduler::{ProgressReport, TaskOutcome, TaskStatus};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Progress reporter backed by a single indicatif bar over the task count.
///
/// Per-task completion lines are printed above the bar so they survive after
/// the bar clears.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    /// Creates a reporter for `total` tasks.
    #[must_use]
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} episodes - {msg}",
            )
            .expect("progress template is valid")
            .progress_chars("━━╌"),
        );
        bar.enable_steady_tick(Duration::from_millis(250));
        Self { bar }
    }

    /// Clears the bar once the run has settled.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReport for BarReporter {
    fn on_task_start(&self, title: &str) {
        self.bar.set_message(title.to_string());
    }

    fn on_task_done(&self, title: &str, label: &str) {
        self.bar.println(format!("  {label:<10} {title}"));
        self.bar.inc(1);
    }
}

/// Formats a byte count as a human-readable string (B, KB, MB, GB).
#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Formats an elapsed duration as a human-readable string.
fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{:01}s", secs, d.subsec_millis() / 100)
    }
}

/// Prints the end-of-run summary.
pub fn print_summary(outcomes: &[TaskOutcome], elapsed: Duration) {
    let downloaded = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(TaskStatus::Downloaded(_))))
        .count();
    let converted = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(TaskStatus::Converted(_))))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(TaskStatus::Skipped)))
        .count();
    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    let total_bytes: u64 = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(|status| status.bytes())
        .sum();

    println!("\n{SEPARATOR}");
    println!("Processed {} episode(s) in {}", outcomes.len(), format_elapsed(elapsed));
    if downloaded > 0 {
        println!("  downloaded:  {downloaded} ({})", format_bytes(total_bytes));
    }
    if converted > 0 {
        println!("  converted:   {converted}");
    }
    if skipped > 0 {
        println!("  skipped:     {skipped}");
    }
    if failed > 0 {
        println!("  failed:      {failed}");
    }
    println!("{SEPARATOR}");
}
