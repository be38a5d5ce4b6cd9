//! Terminal display logic for the rank-check CLI.
//!
//! This module handles all human-readable output: the validation spinner,
//! the live progress counter, the run header, warnings, the summary bar, the
//! rankings matrix and per-query details. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use rank_check_lib::{
    CheckConfig, LocalResult, QueryFailure, RankingMatrix, ResultRecord, Summary, TargetPosition,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message, or `None` if stderr isn't a TTY.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Single-line `[n/total]` counter on stderr, redrawn in place.
pub struct ProgressLine {
    term: Option<Term>,
}

impl ProgressLine {
    /// A disabled progress line draws nothing.
    pub fn new(enabled: bool) -> Self {
        let term = Term::stderr();
        Self {
            term: (enabled && term.is_term()).then_some(term),
        }
    }

    pub fn update(&mut self, completed: usize, total: usize) {
        if let Some(term) = &self.term {
            let _ = term.clear_line();
            let _ = term.write_str(&format!(
                "{} Analyzing queries... {:.0}%",
                style(format!("[{}/{}]", completed, total)).cyan(),
                percent(completed, total),
            ));
        }
    }

    pub fn finish(self) {
        if let Some(term) = &self.term {
            let _ = term.clear_line();
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a text-mode run.
pub fn print_header(
    target: &str,
    keyword_count: usize,
    location_count: usize,
    config: &CheckConfig,
) {
    let queries = keyword_count * location_count;
    println!(
        "{} {} {}",
        style("rank-check").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Analyzing {} across {} quer{}",
            target,
            queries,
            if queries == 1 { "y" } else { "ies" }
        ))
        .dim(),
    );

    let meta_parts = [
        format!("Keywords: {}", keyword_count),
        format!("Locations: {}", location_count),
        format!("Concurrency: {}", config.concurrency),
        format!(
            "Rate: {}/{}s ({})",
            config.rate_limit,
            config.rate_period.as_secs_f64(),
            config.rate_policy
        ),
    ];
    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Warnings ─────────────────────────────────────────────────────────────────

/// Warn about locations the geocoder could not resolve.
pub fn print_dropped_locations(dropped: &[String]) {
    if dropped.is_empty() {
        return;
    }
    println!(
        "  {} {}",
        style("⚠").yellow(),
        style(format!(
            "Skipped {} location{} that could not be resolved: {}",
            dropped.len(),
            if dropped.len() == 1 { "" } else { "s" },
            format_list(dropped, 5),
        ))
        .yellow(),
    );
    println!();
}

/// List failed queries, one line each.
pub fn print_failures(failures: &[QueryFailure]) {
    if failures.is_empty() {
        return;
    }

    println!(
        "  {}",
        style(format!(
            "{} quer{} could not be completed:",
            failures.len(),
            if failures.len() == 1 { "y" } else { "ies" }
        ))
        .yellow()
    );
    for failure in failures {
        println!("  {} {}", style("•").dim(), failure);
    }
    println!();
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the summary bar with headline metrics.
pub fn print_summary(summary: &Summary, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} quer{} in {:.1}s  {}  {}  {}  {}",
        style(summary.total_queries).bold(),
        if summary.total_queries == 1 { "y" } else { "ies" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} on page 1", summary.ranked_queries)).green(),
        style("|").dim(),
        style(format!("{:.1}% ranking rate", summary.ranking_rate)).bold(),
    );
    if summary.local_queries > 0 {
        println!(
            "  {} local pack appearance{} in {} quer{} with local results ({:.1}%)",
            style(summary.local_appearances).bold(),
            if summary.local_appearances == 1 { "" } else { "s" },
            summary.local_queries,
            if summary.local_queries == 1 { "y" } else { "ies" },
            summary.local_rate,
        );
    }
    println!();
}

// ── Rankings matrix ──────────────────────────────────────────────────────────

/// Print the location × keyword grid. Ranked cells are green, the
/// not-on-page-one marker red, uncovered cells a dim `-`.
pub fn print_matrix(matrix: &RankingMatrix) {
    if matrix.locations.is_empty() {
        return;
    }

    let location_width = column_width(matrix.locations.iter(), "Location", 24);
    let cell_width = column_width(matrix.keywords.iter(), "Not on Page 1", 20);

    println!("  {}", style("Rankings Overview").bold().underlined());
    let mut header = format!("  {}", pad_str("Location", location_width, Alignment::Left, None));
    for keyword in &matrix.keywords {
        header.push_str("  ");
        header.push_str(&pad_str(keyword, cell_width, Alignment::Left, Some("..")));
    }
    println!("{}", style(header).bold());

    for location in &matrix.locations {
        let mut line = format!(
            "  {}",
            pad_str(location, location_width, Alignment::Left, Some(".."))
        );
        for keyword in &matrix.keywords {
            let cell = match matrix.get(location, keyword) {
                Some(position) => position.to_string(),
                None => "-".to_string(),
            };
            let padded = pad_str(&cell, cell_width, Alignment::Left, None).to_string();
            let styled = match matrix.get(location, keyword) {
                Some(TargetPosition::Ranked(_)) => style(padded).green().bold(),
                Some(TargetPosition::NotOnPageOne) => style(padded).red(),
                None => style(padded).dim(),
            };
            line.push_str(&format!("  {}", styled));
        }
        println!("{}", line);
    }
    println!();
}

// ── Details ──────────────────────────────────────────────────────────────────

/// Per-query top organic and local results.
pub fn print_details(records: &[ResultRecord]) {
    let mut sorted: Vec<&ResultRecord> = records.iter().collect();
    sorted.sort_by(|a, b| (&a.keyword, &a.location).cmp(&(&b.keyword, &b.location)));

    println!("  {}", style("Detailed Results").bold().underlined());
    for record in sorted {
        let position = match record.target_position {
            TargetPosition::Ranked(_) => style(record.target_position.to_string()).green().bold(),
            TargetPosition::NotOnPageOne => style(record.target_position.to_string()).red(),
        };
        println!(
            "  {} {} {}  {}",
            style(&record.keyword).bold(),
            style("in").dim(),
            style(&record.location).bold(),
            position,
        );

        if !record.organic_results.is_empty() {
            println!("    {}", style("Top organic results").dim());
            for (idx, organic) in record.organic_results.iter().enumerate() {
                println!(
                    "      #{} {} {}",
                    idx + 1,
                    or_na(&organic.title),
                    style(format!("({})", or_na(&organic.domain))).dim(),
                );
            }
        }

        if !record.local_results.is_empty() {
            println!("    {}", style("Top local results").dim());
            for (idx, local) in record.local_results.iter().enumerate() {
                println!(
                    "      #{} {} {}",
                    idx + 1,
                    or_na(&local.title),
                    style(format_rating(local)).dim(),
                );
            }
        }
    }
    println!();
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// `4.7★ (88 reviews)`, with `N/A` for a missing rating.
pub fn format_rating(local: &LocalResult) -> String {
    let rating = local
        .rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string());
    format!("{}★ ({} reviews)", rating, local.reviews.unwrap_or(0))
}

/// Join at most `max_show` items, summarizing the rest.
pub fn format_list(items: &[String], max_show: usize) -> String {
    if items.len() <= max_show {
        items.join(", ")
    } else {
        let remaining = items.len() - max_show;
        format!("{}, ... and {} more", items[..max_show].join(", "), remaining)
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

fn column_width<'a, I>(values: I, header: &str, cap: usize) -> usize
where
    I: Iterator<Item = &'a String>,
{
    values
        .map(|v| console::measure_text_width(v))
        .chain(std::iter::once(console::measure_text_width(header)))
        .max()
        .unwrap_or(0)
        .min(cap)
}

// ── Tests ────────────────────────────────────────────────────────────────────
