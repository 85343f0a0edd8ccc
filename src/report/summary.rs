//! Console summaries rendered with comfy-table

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{OutlierDetection, RemovalReason, RemovedColumn};

/// Summary of a column reduction run (redundancy reduction or subset selection)
#[derive(Debug, Default)]
pub struct ReductionSummary {
    pub initial_features: usize,
    pub final_features: usize,
    pub removed: Vec<RemovedColumn>,
    pub duplicate_rows_removed: usize,
    pub load_time: Duration,
    pub reduction_time: Duration,
    pub save_time: Duration,
}

impl ReductionSummary {
    pub fn new(initial_features: usize) -> Self {
        Self {
            initial_features,
            final_features: initial_features,
            ..Default::default()
        }
    }

    /// Record the removal trace; the final feature count follows from it
    pub fn set_removed(&mut self, removed: Vec<RemovedColumn>) {
        self.final_features = self.initial_features.saturating_sub(removed.len());
        self.removed = removed;
    }

    pub fn set_duplicate_rows_removed(&mut self, count: usize) {
        self.duplicate_rows_removed = count;
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_reduction_time(&mut self, elapsed: Duration) {
        self.reduction_time = elapsed;
    }

    pub fn set_save_time(&mut self, elapsed: Duration) {
        self.save_time = elapsed;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.reduction_time + self.save_time
    }

    pub fn duplicate_count(&self) -> usize {
        self.count_where(|r| matches!(r, RemovalReason::ExactDuplicate { .. }))
    }

    pub fn correlation_count(&self) -> usize {
        self.count_where(|r| matches!(r, RemovalReason::HighlyCorrelated { .. }))
    }

    pub fn constant_count(&self) -> usize {
        self.count_where(|r| matches!(r, RemovalReason::Constant))
    }

    fn count_where(&self, predicate: impl Fn(&RemovalReason) -> bool) -> usize {
        self.removed.iter().filter(|r| predicate(&r.reason)).count()
    }

    /// Share of features removed, in percent
    pub fn reduction_percentage(&self) -> f64 {
        if self.initial_features > 0 {
            (self.initial_features - self.final_features) as f64 / self.initial_features as f64
                * 100.0
        } else {
            0.0
        }
    }

    pub fn display(&self) {
        print_section_title("📋", "REDUCTION SUMMARY");

        let mut table = new_table();
        table.add_row(vec![
            Cell::new("📁 Initial Features"),
            Cell::new(self.initial_features),
        ]);
        table.add_row(vec![
            Cell::new("👯 Dropped (Duplicate)"),
            count_cell(self.duplicate_count()),
        ]);
        table.add_row(vec![
            Cell::new("🔗 Dropped (Correlation)"),
            count_cell(self.correlation_count()),
        ]);
        table.add_row(vec![
            Cell::new("➖ Dropped (Constant)"),
            count_cell(self.constant_count()),
        ]);
        table.add_row(vec![
            Cell::new("🧹 Duplicate Rows Removed"),
            count_cell(self.duplicate_rows_removed),
        ]);
        table.add_row(vec![
            Cell::new("✅ Final Features"),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let reduction_pct = self.reduction_percentage();
        let color = if reduction_pct > 30.0 {
            Color::Green
        } else if reduction_pct > 10.0 {
            Color::Yellow
        } else {
            Color::Cyan
        };
        table.add_row(vec![
            Cell::new("📉 Reduction"),
            Cell::new(format!("{:.1}%", reduction_pct))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("⏱  Total Time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        print_indented(&table);

        if !self.removed.is_empty() {
            print_section_title("📝", "DROPPED FEATURES");
            println!();
            for removed in &self.removed {
                println!(
                    "      {} {} {}",
                    style("•").dim(),
                    style(&removed.column).yellow(),
                    style(format!("- {}", removed.reason)).dim()
                );
            }
        }
    }
}

/// Summary of an outlier detection run
#[derive(Debug)]
pub struct OutlierSummary<'a> {
    pub detection: &'a OutlierDetection,
}

impl<'a> OutlierSummary<'a> {
    pub fn new(detection: &'a OutlierDetection) -> Self {
        Self { detection }
    }

    pub fn display(&self) {
        let detection = self.detection;

        print_section_title("📋", "OUTLIER SUMMARY");
        let mut table = new_table();
        table.add_row(vec![
            Cell::new("📁 Rows"),
            Cell::new(detection.combined_flags.len()),
        ]);
        table.add_row(vec![
            Cell::new("📦 IQR Outliers"),
            count_cell(detection.iqr_count()),
        ]);
        table.add_row(vec![
            Cell::new("📈 Z-score Outliers"),
            count_cell(detection.zscore_count()),
        ]);
        table.add_row(vec![
            Cell::new("🚩 Flagged Rows"),
            count_cell(detection.outlier_count()).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📉 Flagged Share"),
            Cell::new(format!("{:.2}%", detection.outlier_percentage())),
        ]);
        table.add_row(vec![
            Cell::new("✅ Clean Rows"),
            Cell::new(detection.clean.height())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        print_indented(&table);

        if detection.diagnostics.is_empty() {
            return;
        }

        print_section_title("🔍", "PER-COLUMN DIAGNOSTICS");
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(
            ["Column", "Q1", "Q3", "IQR", "Mean", "Std", "IQR out", "Z out"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
        for diag in &detection.diagnostics {
            table.add_row(vec![
                Cell::new(&diag.column),
                Cell::new(format!("{:.4}", diag.q1)),
                Cell::new(format!("{:.4}", diag.q3)),
                Cell::new(format!("{:.4}", diag.iqr)),
                Cell::new(format!("{:.4}", diag.mean)),
                Cell::new(format!("{:.4}", diag.std_dev)),
                count_cell(diag.iqr_outliers),
                count_cell(diag.zscore_outliers),
            ]);
        }
        print_indented(&table);
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table
}

fn count_cell(count: usize) -> Cell {
    Cell::new(count).fg(if count == 0 { Color::White } else { Color::Red })
}

fn print_section_title(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
