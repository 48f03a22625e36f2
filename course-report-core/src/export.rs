use crate::report::{
    CompletionChart, CompletionTable, CourseReport, PostsReport, ViewsReport, ViewsTable,
};
use course_report_common::Result;
use std::io::Write;
use std::path::Path;

// --- plain-text rendering ---

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Left-aligned columns separated by two spaces, header underlined.
fn write_table<W: Write>(
    out: &mut W,
    head: &[String],
    rows: &[Vec<String>],
    max_width: usize,
) -> Result<()> {
    let head: Vec<String> = head.iter().map(|h| truncate(h, max_width)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c, max_width)).collect())
        .collect();
    let mut widths: Vec<usize> = head.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    writeln!(out, "{}", line(&head))?;
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(out, "{}", line(&rule))?;
    for row in &rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

fn write_student_count<W: Write>(out: &mut W, students: u64) -> Result<()> {
    writeln!(out, "This course has {students} students.")?;
    Ok(())
}

pub fn write_completion_table<W: Write>(
    out: &mut W,
    table: &CompletionTable,
    max_width: usize,
) -> Result<()> {
    writeln!(out, "Activity completion table")?;
    write_student_count(out, table.student_count)?;
    if table.no_students() {
        writeln!(out, "There are no students enrolled in this course.")?;
        return Ok(());
    }
    let mut head = vec!["Course Section / Module Type".to_string()];
    head.extend(table.activity_types.iter().cloned());
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.section.clone()];
            cells.extend(r.cells.iter().map(|c| {
                c.entries
                    .iter()
                    .map(|e| format!("{}: {} ({}%)", e.module_name, e.completed, e.percentage))
                    .collect::<Vec<_>>()
                    .join("; ")
            }));
            cells
        })
        .collect();
    write_table(out, &head, &rows, max_width)
}

pub fn write_completion_chart<W: Write>(
    out: &mut W,
    chart: &CompletionChart,
    max_width: usize,
) -> Result<()> {
    writeln!(out, "{}", chart.title)?;
    write_student_count(out, chart.student_count)?;
    let mut head = vec!["Activity type".to_string()];
    head.extend(chart.labels.iter().cloned());
    let rows: Vec<Vec<String>> = chart
        .series
        .iter()
        .map(|s| {
            let mut cells = vec![s.name.clone()];
            cells.extend(s.values.iter().map(|v| v.to_string()));
            cells
        })
        .collect();
    write_table(out, &head, &rows, max_width)
}

fn views_rows(table: &ViewsTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.module_name.clone(), r.section.clone(), r.total_views.to_string()];
            cells.extend(r.histogram.counts().iter().map(|c| c.to_string()));
            cells
        })
        .collect()
}

pub fn write_views_report<W: Write>(
    out: &mut W,
    report: &ViewsReport,
    max_width: usize,
) -> Result<()> {
    writeln!(out, "Modules views")?;
    write_student_count(out, report.student_count)?;
    for table in &report.tables {
        writeln!(out)?;
        writeln!(out, "{} views", table.module_type)?;
        write_table(out, &table.headers(), &views_rows(table), max_width)?;
    }
    Ok(())
}

pub fn write_posts_report<W: Write>(
    out: &mut W,
    report: &PostsReport,
    max_width: usize,
) -> Result<()> {
    writeln!(out, "Modules posts")?;
    write_student_count(out, report.student_count)?;
    if report.tables.is_empty() {
        writeln!(out, "No posts have been recorded.")?;
    }
    let head = ["Module name", "Course section", "Total number of posts"].map(String::from);
    for table in &report.tables {
        writeln!(out)?;
        writeln!(out, "{} posts", table.module_type)?;
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|r| vec![r.module_name.clone(), r.section.clone(), r.total_posts.to_string()])
            .collect();
        write_table(out, &head, &rows, max_width)?;
    }
    Ok(())
}

// --- JSON export ---

pub fn export_json(output_path: &Path, report: &CourseReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    Ok(())
}

// --- CSV export of the views tables ---

fn csv_field(raw: &str) -> String {
    // wrap in quotes if contains comma, quote, or newline
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// One block per module type: a header line, then one line per instance.
pub fn write_views_csv<W: Write>(out: &mut W, report: &ViewsReport) -> Result<()> {
    for table in &report.tables {
        let mut head = vec!["module_type".to_string()];
        head.extend(table.headers());
        writeln!(out, "{}", head.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","))?;
        for row in views_rows(table) {
            let mut cells = vec![csv_field(&table.module_type)];
            cells.extend(row.iter().map(|c| csv_field(c)));
            writeln!(out, "{}", cells.join(","))?;
        }
    }
    Ok(())
}

pub fn export_views_csv(output_path: &Path, report: &ViewsReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_views_csv(&mut file, report)
}
