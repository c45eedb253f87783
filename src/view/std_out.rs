use crate::view::{ResultDisplay, SailingRow, build_sailing_rows};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use derive_builder::Builder;
use tracing::info;
use wsf::TerminalCombo;

/// Tab separated, one sailing per line, so the output can be piped.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct StdoutDisplay {
    #[builder(default)]
    show_all: bool,
    #[builder(default = "Local::now()")]
    now: DateTime<Local>,
}

impl ResultDisplay for StdoutDisplay {
    fn display(&self, sailings: &TerminalCombo) -> anyhow::Result<()> {
        let rows = build_sailing_rows(sailings, &self.now, self.show_all);

        info!(
            "Got {} sailings from {} to {}. Display now.",
            rows.len(),
            sailings.departing_terminal_name,
            sailings.arriving_terminal_name
        );

        for row in &rows {
            println!("{}", sailing_line(row, sailings));
        }

        Ok(())
    }
}

fn sailing_line(row: &SailingRow, sailings: &TerminalCombo) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        color_time(row),
        sailings.departing_terminal_name,
        sailings.arriving_terminal_name,
        row.vessel
    )
}

fn color_time(row: &SailingRow) -> ColoredString {
    let time = row.depart.format("%H:%M:%S").to_string();
    if row.departed {
        time.dimmed()
    } else if row.next {
        time.green().bold()
    } else {
        time.normal()
    }
}
