//! Terminal UI utilities.
//!
//! A small box-drawing table used for the end-of-run summary. Cell widths
//! are measured without ANSI color codes, and the widest columns are
//! narrowed until the table fits the terminal.

use crate::build::{BuildReport, UnitOutcome};
use colored::*;
use console::{Alignment, measure_text_width, pad_str, truncate_str};

/// Columns never shrink below this many characters.
const MIN_COL_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row.into_iter().map(|c| flatten(&c)).collect());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some(widest) = widths.iter_mut().max() else {
                break;
            };
            if *widest <= MIN_COL_WIDTH {
                break;
            }
            *widest -= 1;
        }
        widths
    }

    /// Renders the table as lines, fitted to `max_width` columns.
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = truncate_str(cell, width, "...");
                let text = pad_str(&text, width, Alignment::Left, None).into_owned();
                if bold {
                    out.push_str(&format!(" {} │", text.bold()));
                } else {
                    out.push_str(&format!(" {} │", text));
                }
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers, true)];
        lines.push(border("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(line(row, false));
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}

/// One row per unit plus the link step.
pub fn summary_table(report: &BuildReport) -> Table {
    let mut table = Table::new(&["Unit", "Status", "Reason", "Time"]);
    for unit in &report.units {
        let row = match &unit.outcome {
            UnitOutcome::Compiled { reason, elapsed } => vec![
                unit.name.clone(),
                "compiled".green().to_string(),
                reason.to_string(),
                format!("{} ms", elapsed.as_millis()),
            ],
            UnitOutcome::UpToDate => vec![
                unit.name.clone(),
                "up to date".dimmed().to_string(),
                String::new(),
                String::new(),
            ],
            UnitOutcome::WouldCompile(reason) => vec![
                unit.name.clone(),
                "stale".yellow().to_string(),
                reason.to_string(),
                String::new(),
            ],
        };
        table.add_row(row);
    }
    if report.link_command.is_some() {
        table.add_row(vec![
            "(link)".to_string(),
            match report.link_elapsed {
                Some(_) => "linked".green().to_string(),
                None => "pending".yellow().to_string(),
            },
            String::new(),
            report
                .link_elapsed
                .map(|d| format!("{} ms", d.as_millis()))
                .unwrap_or_default(),
        ]);
    }
    table
}
