use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use consult_model::Stats;

use crate::types::{BuildResult, ParsedName, SeverityRow, severity_distribution};

pub fn print_summary(result: &BuildResult) {
    let dataset = &result.run.dataset;
    println!("Source: {}", dataset.dataset_meta.source_dir);
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        for path in &result.written {
            println!("Output: {}", path.display());
        }
    }
    println!(
        "Patients: {}  Scale records: {}  Elapsed: {} ms",
        dataset.patients.len(),
        result.run.scale_records,
        result.run.elapsed.as_millis()
    );
    println!("{}", stats_table(&dataset.stats));

    let severity = severity_distribution(&dataset.patients);
    if severity.iter().any(|row| row.gad7 > 0 || row.phq9 > 0) {
        println!();
        println!("Severity:");
        println!("{}", severity_table(&severity));
    }

    if !result.run.warnings.is_empty() {
        println!();
        println!("Warnings:");
        let mut table = Table::new();
        table.set_header(vec![header_cell("#"), header_cell("Warning")]);
        apply_summary_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        for (idx, warning) in result.run.warnings.iter().enumerate() {
            table.add_row(vec![dim_cell(idx + 1), Cell::new(warning).fg(Color::Yellow)]);
        }
        println!("{table}");
    }

    if dataset.stats.has_errors() {
        eprintln!();
        eprintln!("Errors:");
        let mut table = Table::new();
        table.set_header(vec![header_cell("File"), header_cell("Message")]);
        apply_summary_table_style(&mut table);
        for error in &dataset.stats.errors {
            table.add_row(vec![
                Cell::new(&error.file),
                Cell::new(&error.message).fg(Color::Red),
            ]);
        }
        eprintln!("{table}");
    }
}

pub fn print_parsed_names(parsed: &[ParsedName]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Sequence"),
        header_cell("Patient"),
        header_cell("Name"),
        header_cell("Gender"),
        header_cell("Age"),
    ]);
    apply_summary_table_style(&mut table);
    for row in parsed {
        match &row.outcome {
            Ok(meta) => {
                let sequences = meta
                    .sequences()
                    .map(|sequence| sequence.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(vec![
                    Cell::new(&row.input),
                    Cell::new(sequences),
                    Cell::new(meta.primary.patient_id()).fg(Color::Blue),
                    Cell::new(&meta.name),
                    optional_cell(meta.gender.map(|gender| gender.to_string())),
                    optional_cell(meta.age.map(|age| age.to_string())),
                ]);
            }
            Err(message) => {
                table.add_row(vec![
                    Cell::new(&row.input),
                    Cell::new(message).fg(Color::Red),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    println!("{table}");
}

fn stats_table(stats: &Stats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Transcript files", stats.total_files, None),
        ("Converted", stats.converted_files, None),
        ("Failed", stats.failed_files, Some(Color::Red)),
        ("Visits", stats.total_visits, None),
        ("Patients with keywords", stats.patients_with_keywords, None),
        ("Patients with gender", stats.patients_with_gender, None),
        ("Patients with age", stats.patients_with_age, None),
        ("Patients with scales", stats.patients_with_scales, None),
        ("Errors", stats.errors.len(), Some(Color::Red)),
    ];
    for (label, count, highlight) in rows {
        table.add_row(vec![Cell::new(label), count_cell(count, highlight)]);
    }
    table
}

fn severity_table(rows: &[SeverityRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Band"),
        header_cell("GAD-7"),
        header_cell("PHQ-9"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.severity),
            count_cell(row.gad7, None),
            count_cell(row.phq9, None),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, highlight: Option<Color>) -> Cell {
    match highlight {
        Some(color) if count > 0 => Cell::new(count).fg(color).add_attribute(Attribute::Bold),
        _ if count == 0 => dim_cell(count),
        _ => Cell::new(count),
    }
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
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
