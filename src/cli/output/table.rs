//! Table output formatting for CLI commands
//!
//! Provides formatted table output for prediction records using comfy-table.
//! Supports color-coded cells, automatic column sizing, and accessibility features.

use crate::domain::models::{PredictionFactors, PredictionRecord};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<usize>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<usize>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format a list of prediction records as a table
    pub fn format_records(&self, records: &[PredictionRecord]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("Factors").add_attribute(Attribute::Bold),
            Cell::new("Prob").add_attribute(Attribute::Bold),
            Cell::new("Conf").add_attribute(Attribute::Bold),
            Cell::new("League").add_attribute(Attribute::Bold),
            Cell::new("Age").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

        for record in records {
            let id_short = &record.id.to_string()[..8];
            let factors = truncate_text(&describe_factors(&record.factors), 40);

            let status_cell = if self.use_colors {
                Cell::new(record_status(record)).fg(record_status_color(record))
            } else {
                Cell::new(format!(
                    "{} {}",
                    record_status_icon(record),
                    record_status(record)
                ))
            };

            table.add_row(vec![
                Cell::new(id_short),
                Cell::new(record.kind().as_str()),
                Cell::new(&factors),
                Cell::new(format!("{:.3}", record.combined_probability())),
                Cell::new(format!("{:.2}", record.confidence)),
                Cell::new(record.league.as_deref().unwrap_or("-")),
                Cell::new(format_relative_time(&record.created_at)),
                status_cell,
            ]);
        }

        table.to_string()
    }

    /// Create a base table with common settings
    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        // Use UTF-8 preset for nice borders
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        // Apply max width if set
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check for dumb terminal
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

/// One-line summary of the factor payload
pub fn describe_factors(factors: &PredictionFactors) -> String {
    match factors {
        PredictionFactors::Single { factor_text, .. } => factor_text.clone(),
        PredictionFactors::Multi { legs } => {
            let texts: Vec<&str> = legs.iter().map(|l| l.factor_text.as_str()).collect();
            format!("{} legs: {}", legs.len(), texts.join(" + "))
        }
    }
}

/// Status text combining resolution and sync state
fn record_status(record: &PredictionRecord) -> &'static str {
    match &record.resolution {
        Some(r) if r.correct => "correct",
        Some(_) => "incorrect",
        None if record.synced => "open",
        None => "open*",
    }
}

/// Map record status to color
fn record_status_color(record: &PredictionRecord) -> Color {
    match &record.resolution {
        Some(r) if r.correct => Color::Green,
        Some(_) => Color::Red,
        None if record.synced => Color::Yellow,
        None => Color::DarkYellow,
    }
}

/// Map record status to icon
fn record_status_icon(record: &PredictionRecord) -> &'static str {
    match &record.resolution {
        Some(r) if r.correct => "✓",
        Some(_) => "✗",
        None => "○",
    }
}

/// Truncate text to max length with ellipsis
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        format!("{}...", &text[..max_len.saturating_sub(3)])
    }
}

/// Format relative time (e.g., "2 hours ago")
fn format_relative_time(datetime: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let duration = now.signed_duration_since(*datetime);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let mins = duration.num_minutes();
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if duration.num_days() < 30 {
        let days = duration.num_days();
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        datetime.format("%Y-%m-%d").to_string()
    }
}
