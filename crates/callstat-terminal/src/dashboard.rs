//! Live dashboard display
//!
//! This module renders the whole dashboard into one boxed terminal frame:
//! the headline statistics with rate bars, the outcome distribution, the
//! current page of recent calls and a footer describing the active filters.

use callstat_core::filters::FilterCriteria;
use callstat_core::pagination::Pager;
use callstat_core::pipeline::DashboardView;
use callstat_core::timezone::TimezoneConfig;
use callstat_core::types::OutcomeGroup;
use colored::*;
use std::fmt;
use tracing::debug;

use crate::output::{describe_filters, format_rounded};

/// Box drawing characters for UI (ASCII)
const BOX_CORNER: &str = "+";
const BOX_HORIZONTAL: &str = "-";
const BOX_VERTICAL: &str = "|";

/// Progress bar characters (ASCII)
const PROGRESS_FULL: &str = "#";
const PROGRESS_EMPTY: &str = ".";

/// Width of the rate bars
const BAR_WIDTH: usize = 30;

/// Qualified rate at or above which the bar is green
const QUALIFIED_GOOD_THRESHOLD: f64 = 50.0;

/// Qualified rate below which the bar is red
const QUALIFIED_POOR_THRESHOLD: f64 = 25.0;

/// Live dashboard renderer
pub struct DashboardRenderer {
    width: usize,
    timezone: TimezoneConfig,
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
}

impl DashboardRenderer {
    /// Create a renderer sized to the current terminal
    pub fn new(timezone: TimezoneConfig) -> Self {
        let raw_width = terminal_width().unwrap_or(100);
        let width = if raw_width < 60 {
            raw_width.max(20)
        } else {
            raw_width.clamp(60, 120)
        };
        let colored_output = std::env::var("NO_COLOR").is_err();
        debug!("Dashboard width {} (terminal {})", width, raw_width);
        Self {
            width,
            timezone,
            colored_output,
        }
    }

    /// Renderer with a fixed width and no colors
    pub fn plain(width: usize, timezone: TimezoneConfig) -> Self {
        Self {
            width: width.max(20),
            timezone,
            colored_output: false,
        }
    }

    /// Render one frame
    ///
    /// The pager is synced to the view first, so a new view starts on the
    /// first page.
    pub fn render(
        &self,
        view: &DashboardView,
        criteria: &FilterCriteria,
        pager: &mut Pager,
        footer: &str,
    ) -> String {
        pager.sync(view);

        let mut output = String::new();
        output.push_str(&self.draw_border());
        output.push_str(&self.draw_centered_line("CALLSTAT - SALES DASHBOARD"));
        output.push_str(&self.draw_separator());

        output.push_str(&self.draw_stats_section(view));
        output.push_str(&self.draw_separator());

        output.push_str(&self.draw_outcomes_section(view));
        output.push_str(&self.draw_separator());

        output.push_str(&self.draw_calls_section(view, pager));
        output.push_str(&self.draw_separator());

        output.push_str(&self.draw_line(&format!("Filters: {}", describe_filters(criteria))));
        output.push_str(&self.draw_centered_line(footer));
        output.push_str(&self.draw_border());
        output.push('\n');

        output
    }

    fn draw_border(&self) -> String {
        format!(
            "\n{}{}{}",
            BOX_CORNER,
            BOX_HORIZONTAL.repeat(self.width - 2),
            BOX_CORNER
        )
    }

    fn draw_separator(&self) -> String {
        self.draw_border()
    }

    /// Draw a centered line within the box
    fn draw_centered_line(&self, text: &str) -> String {
        let available_width = self.width.saturating_sub(2);
        let text = console::truncate_str(text, available_width, "...");
        let text_width = console::measure_text_width(&text);
        let padding = (available_width - text_width) / 2;
        format!(
            "\n{}{}{}{}{}",
            BOX_VERTICAL,
            " ".repeat(padding),
            text,
            " ".repeat(available_width - padding - text_width),
            BOX_VERTICAL
        )
    }

    /// Draw a left-aligned line with padding
    fn draw_line(&self, content: &str) -> String {
        let available_width = self.width.saturating_sub(4);
        let truncated_content = console::truncate_str(content, available_width, "...");
        let final_width = console::measure_text_width(&truncated_content);

        let padding = available_width.saturating_sub(final_width);
        format!(
            "\n{} {}{} {}",
            BOX_VERTICAL,
            truncated_content,
            " ".repeat(padding),
            BOX_VERTICAL
        )
    }

    fn draw_stats_section(&self, view: &DashboardView) -> String {
        let stats = &view.stats;
        let mut output = String::new();

        output.push_str(&self.draw_line(&format!(
            "Total Calls: {}   Avg Duration: {}",
            stats.total_calls,
            format_rounded(stats.avg_duration_minutes, "m")
        )));

        let rate = stats.qualified_rate_percent;
        let qualified_bar = self.colorize(
            &self.create_progress_bar(rate, BAR_WIDTH),
            self.rate_color(rate),
        );
        output.push_str(&self.draw_line(&format!(
            "QUALIFIED   {}  {:>4}",
            qualified_bar,
            format_rounded(rate, "%")
        )));

        let sentiment_bar = self.create_progress_bar(stats.avg_sentiment_percent, BAR_WIDTH);
        let sentiment_bar = self.colorize(&sentiment_bar, "blue");
        output.push_str(&self.draw_line(&format!(
            "SENTIMENT   {}  {:>4}",
            sentiment_bar,
            format_rounded(stats.avg_sentiment_percent, "%")
        )));

        output
    }

    fn draw_outcomes_section(&self, view: &DashboardView) -> String {
        let total = view.outcomes.total();
        let mut output = String::new();

        for (group, count) in view.outcomes.entries() {
            let share = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            let bar = self.create_progress_bar(share, BAR_WIDTH);
            let color = match group {
                OutcomeGroup::Qualified => "green",
                OutcomeGroup::Lost => "red",
                OutcomeGroup::Other => "yellow",
            };
            output.push_str(&self.draw_line(&format!(
                "{:<11} {}  {:>4} ({})",
                group.label().to_uppercase(),
                self.colorize(&bar, color),
                format_rounded(share, "%"),
                count
            )));
        }

        output
    }

    fn draw_calls_section(&self, view: &DashboardView, pager: &mut Pager) -> String {
        if view.calls.is_empty() {
            return self.draw_line("No calls match the current filters");
        }

        let total_pages = pager.total_pages(view.calls.len());
        let mut output = self.draw_line(&format!(
            "RECENT CALLS (page {} of {}, {} matching)",
            pager.page().min(total_pages - 1) + 1,
            total_pages,
            view.calls.len()
        ));

        for call in pager.page_of(&view.calls) {
            let date = call.date.with_timezone(&self.timezone.tz).format("%Y-%m-%d %H:%M");
            output.push_str(&self.draw_line(&format!(
                "  {}  {:<20} {:<13} {:>4} {:>4}",
                date,
                console::truncate_str(call.prospect_name.as_deref().unwrap_or("-"), 20, "..."),
                call.outcome.as_str(),
                format_rounded(call.duration_minutes(), "m"),
                format_rounded(call.sentiment_score * 100.0, "%")
            )));
        }

        output
    }

    /// Create a progress bar
    fn create_progress_bar(&self, percentage: f64, width: usize) -> String {
        let clamped_percentage = if percentage.is_finite() {
            percentage.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let filled = (((clamped_percentage / 100.0) * width as f64) as usize).min(width);
        let empty = width.saturating_sub(filled);
        format!(
            "[{}{}]",
            PROGRESS_FULL.repeat(filled),
            PROGRESS_EMPTY.repeat(empty)
        )
    }

    fn rate_color(&self, qualified_rate: f64) -> &'static str {
        if qualified_rate >= QUALIFIED_GOOD_THRESHOLD {
            "green"
        } else if qualified_rate < QUALIFIED_POOR_THRESHOLD {
            "red"
        } else {
            "yellow"
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.colored_output {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "yellow" => text.yellow().to_string(),
            "blue" => text.blue().to_string(),
            _ => text.green().to_string(),
        }
    }
}

/// Get terminal width using the cross-platform terminal_size crate
fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}

impl fmt::Display for DashboardRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DashboardRenderer(width: {})", self.width)
    }
}
