use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dropout_analysis::{ExploreSummary, Histogram};
use dropout_model::PipelineReport;

use crate::commands::{FitOutcome, RunOutcome, TableOrigin};

const BAR_WIDTH: usize = 40;

pub fn print_summary(outcome: &RunOutcome) {
    match &outcome.origin {
        TableOrigin::Assembled { source_dir } => {
            println!("Source: {}", source_dir.display());
        }
        TableOrigin::Loaded { path } => println!("Loaded: {}", path.display()),
    }
    println!("Rows: {}  Columns: {}", outcome.rows, outcome.columns);
    if let Some((training, testing)) = outcome.split {
        println!("Split: {training} training / {testing} testing");
    }
    if let Some(saved) = &outcome.saved {
        println!("Snapshot: {}", saved.snapshot.display());
        println!("Training: {}", saved.training.display());
        println!("Testing: {}", saved.testing.display());
    }
    if let Some(report) = &outcome.report {
        println!("{}", gate_table(report));
    }
    if let Some(summary) = &outcome.explore {
        print_explore(summary);
    }
    if let Some(fit) = &outcome.fit {
        print_fit(fit);
    }
}

pub fn gate_table(report: &PipelineReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Gate"),
        header_cell("In"),
        header_cell("Kept"),
        header_cell("Dropped"),
        header_cell("Reasons"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for gate in &report.gates {
        let reasons = gate
            .dropped
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(gate.gate.label()),
            Cell::new(gate.input),
            Cell::new(gate.kept),
            count_cell(gate.dropped_total(), Color::Yellow),
            if reasons.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(reasons)
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(report.total_dropped()).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

pub fn histogram_table(histogram: &Histogram) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dropout rate"),
        header_cell("Studies"),
        header_cell(""),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let peak = histogram
        .bins
        .iter()
        .map(|bin| bin.count)
        .max()
        .unwrap_or(0)
        .max(1);
    for bin in &histogram.bins {
        let bar = "#".repeat(bin.count * BAR_WIDTH / peak);
        table.add_row(vec![
            Cell::new(format!("{:.2} - {:.2}", bin.lower, bin.upper)),
            Cell::new(bin.count),
            Cell::new(bar).fg(Color::Green),
        ]);
    }
    table
}

fn print_explore(summary: &ExploreSummary) {
    println!("Dropout rate over {} studies", summary.rows);
    println!("{}", histogram_table(&summary.histogram));
    if summary.histogram.missing > 0 || summary.histogram.out_of_range > 0 {
        println!(
            "({} missing, {} outside [0, 1])",
            summary.histogram.missing, summary.histogram.out_of_range
        );
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("r with droprate"),
        header_cell("n"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for correlation in &summary.correlations {
        table.add_row(vec![
            Cell::new(&correlation.column),
            number_cell(correlation.r),
            Cell::new(correlation.observations),
        ]);
    }
    println!("{table}");
}

fn print_fit(outcome: &FitOutcome) {
    let fit = &outcome.fit;
    println!(
        "Least squares on {} ({} complete rows)",
        outcome.fitted_on, fit.observations
    );
    let mut table = Table::new();
    table.set_header(vec![header_cell("Term"), header_cell("Estimate")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for coefficient in &fit.coefficients {
        let estimate = match coefficient.estimate {
            Some(value) => Cell::new(format!("{value:.6}")),
            None => Cell::new("aliased").fg(Color::Yellow),
        };
        table.add_row(vec![Cell::new(&coefficient.term), estimate]);
    }
    println!("{table}");
    println!("R²: {}", format_optional(fit.r_squared));
    if let Some(r_squared) = outcome.test_r_squared {
        println!("Test R²: {r_squared:.4}");
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.4}"))
}

fn number_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.4}")),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
