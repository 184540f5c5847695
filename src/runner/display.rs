use comfy_table::{Table, Cell, ContentArrangement, Attribute, CellAlignment};
use colored::*;
use super::report::{BatchReport, JobStatus};
use super::runner::BatchPlan;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

/// Builds the table of planned invocations.
pub fn plan_table(plan: &BatchPlan) -> Table {
    let mut table = Table::new();
    table
        .set_header(header(&["#", "Model", "Variant", "Predictions", "Command"]))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (i, planned) in plan.jobs.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(comfy_table::Color::White).set_alignment(CellAlignment::Right),
            Cell::new(&planned.job.model).fg(comfy_table::Color::Green),
            Cell::new(planned.job.variant.label()).fg(comfy_table::Color::Magenta),
            Cell::new(planned.predictions.display()).fg(comfy_table::Color::Blue),
            Cell::new(&planned.invocation).fg(comfy_table::Color::DarkGrey),
        ]);
    }

    table
}

/// Prints the planned invocations without running anything.
pub fn display_plan(plan: &BatchPlan) {
    println!(
        "\n{} {} for dataset {} ({})",
        "Plan:".bright_cyan().bold(),
        plan.tool.to_string().bold(),
        plan.dataset.yellow(),
        plan.directory.display()
    );
    println!("\n{}", plan_table(plan));
    println!("{}", format!("Total invocations: {}", plan.jobs.len()).bright_green());
}

fn status_cell(status: &JobStatus) -> Cell {
    let color = match status {
        JobStatus::Succeeded => comfy_table::Color::Green,
        JobStatus::Failed { .. } | JobStatus::SpawnFailed { .. } => comfy_table::Color::Red,
        JobStatus::Skipped => comfy_table::Color::DarkGrey,
    };
    Cell::new(status.describe()).fg(color)
}

/// Builds the per-job outcome table of a finished batch.
pub fn report_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table
        .set_header(header(&["#", "Model", "Variant", "Status", "Duration"]))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (i, outcome) in report.outcomes.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(comfy_table::Color::White).set_alignment(CellAlignment::Right),
            Cell::new(&outcome.job.model).fg(comfy_table::Color::Green),
            Cell::new(outcome.job.variant.label()).fg(comfy_table::Color::Magenta),
            status_cell(&outcome.status),
            Cell::new(format!("{:.1}s", outcome.duration().as_secs_f64()))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// One line summary, e.g. `detect coco128: 30/32 succeeded, 2 failed, 0 skipped`.
pub fn summary_line(report: &BatchReport) -> String {
    format!(
        "{} {}: {}/{} succeeded, {} failed, {} skipped",
        report.tool,
        report.dataset,
        report.succeeded(),
        report.total(),
        report.failed(),
        report.skipped()
    )
}

/// Outcome table and colored summary of a finished batch.
///
/// A halted batch is not called out here; the caller reports the halt
/// error itself.
pub fn render_report(report: &BatchReport) -> String {
    let summary = summary_line(report);
    let summary = if report.is_clean() {
        summary.bright_green()
    } else {
        summary.yellow()
    };
    format!("\n{}\n{}\n{}", report_table(report), "=".repeat(80).bright_black(), summary)
}

/// Prints the outcome table and the summary of a finished batch.
pub fn display_report(report: &BatchReport) {
    println!("{}", render_report(report));
}
