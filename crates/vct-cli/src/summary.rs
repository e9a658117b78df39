use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};

use vct_model::{ImportSummary, OutcomeStatus};
use vct_store::VerifyReport;

/// Issues listed before the rest are folded into a count.
const MAX_LISTED_ISSUES: usize = 10;

pub fn print_import_summary(summary: &ImportSummary) {
    println!("Database: {}", summary.db_path.display());
    println!("File size: {}", format_megabytes(summary.db_size_bytes));
    println!(
        "Files: {} imported, {} skipped, {} failed",
        summary.succeeded(),
        summary.skipped(),
        summary.failed()
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Source"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    for outcome in summary.imported_tables() {
        let OutcomeStatus::Imported { rows, columns } = outcome.status else {
            continue;
        };
        table.add_row(vec![
            table_cell(outcome.table.as_deref().unwrap_or("-")),
            Cell::new(rows),
            Cell::new(columns),
            dim_cell(outcome.source.display()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total_rows()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!("{} indexes", summary.indexes_created)).fg(Color::DarkGrey),
    ]);
    println!("{table}");
    print_problem_files(summary);
}

fn print_problem_files(summary: &ImportSummary) {
    let problems: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| !o.is_imported())
        .collect();
    if problems.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Status"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for outcome in problems {
        let (status, reason) = match &outcome.status {
            OutcomeStatus::Skipped { reason } => (Cell::new("SKIPPED").fg(Color::Yellow), reason),
            OutcomeStatus::Failed { reason } => (
                Cell::new("FAILED")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
                reason,
            ),
            OutcomeStatus::Imported { .. } => continue,
        };
        table.add_row(vec![
            Cell::new(outcome.source.display()),
            status,
            Cell::new(reason),
        ]);
    }
    println!();
    println!("Not imported:");
    println!("{table}");
}

pub fn print_verify_report(report: &VerifyReport) {
    println!("Database file size: {}", format_megabytes(report.db_size_bytes));
    println!("Total tables: {}", report.table_count());
    println!("Total rows: {}", report.total_rows);

    for (category, tables) in report.by_category() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell(category.label()),
            header_cell("Rows"),
            header_cell("Columns"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Right);
        align_column(&mut table, 2, CellAlignment::Right);
        for entry in tables {
            table.add_row(vec![
                table_cell(&entry.name),
                Cell::new(entry.rows),
                Cell::new(entry.column_count()),
            ]);
        }
        println!();
        println!("{table}");
    }

    println!();
    if report.is_clean() {
        println!("No obvious data integrity issues found");
        return;
    }
    let issues = report.issues();
    println!("Potential issues found:");
    for (table, anomaly) in issues.iter().take(MAX_LISTED_ISSUES) {
        println!("  - {anomaly}: {table}");
    }
    if issues.len() > MAX_LISTED_ISSUES {
        println!("  ... and {} more", issues.len() - MAX_LISTED_ISSUES);
    }
}

/// Renders a data frame as a table, one row per frame row.
pub fn print_frame(title: &str, frame: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..frame.height() {
        let cells: Vec<Cell> = frame
            .get_columns()
            .iter()
            .map(|column| match column.get(row) {
                Ok(AnyValue::Null) | Err(_) => dim_cell("NULL"),
                Ok(value) => Cell::new(any_to_string(&value)),
            })
            .collect();
        table.add_row(cells);
    }
    println!("{title} ({} rows):", frame.height());
    println!("{table}");
}

fn any_to_string(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => {
            let s = other.to_string();
            if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
                s[1..s.len() - 1].to_string()
            } else {
                s
            }
        }
    }
}

fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
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
        .set_width(140);
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

fn table_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
