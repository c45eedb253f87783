use crate::view::{ResultDisplay, SailingRow, build_sailing_rows};
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use derive_builder::Builder;
use std::collections::VecDeque;
use std::io::{self, Stdout, Write, stdout};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tui::layout::{Alignment, Constraint, Direction, Layout};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans, Text};
use tui::widgets::{Block, Borders, Paragraph};
use tui::{Terminal, backend::CrosstermBackend};
use unicode_width::UnicodeWidthStr;
use wsf::TerminalCombo;

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct TuiDisplay {
    #[builder(default)]
    show_all: bool,
    #[builder(default = "Local::now()")]
    now: DateTime<Local>,
    log_buffer: LogBuffer,
}

impl ResultDisplay for TuiDisplay {
    fn display(&self, sailings: &TerminalCombo) -> anyhow::Result<()> {
        let rows = build_sailing_rows(sailings, &self.now, self.show_all);
        let spans = create_spans(sailings, &rows, &self.now);

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.render(&spans, &mut terminal)?;

        loop {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    _ => {}
                },
                Event::Resize(_, _) => self.render(&spans, &mut terminal)?,
                _ => {}
            }
        }

        // restore terminal
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;

        Ok(())
    }
}

impl TuiDisplay {
    fn render(
        &self,
        spans: &[Spans<'static>],
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let logs: Vec<Spans> = self
            .log_buffer
            .lines()
            .into_iter()
            .map(|l| Spans::from(Span::raw(l)))
            .collect();
        let log_height = logs.len() as u16 + 2;

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(log_height)].as_ref())
                .split(f.size());

            let schedule = Paragraph::new(Text::from(spans.to_vec()))
                .block(Block::default().borders(Borders::ALL).title("Sailings"))
                .alignment(Alignment::Left);
            f.render_widget(schedule, chunks[0]);

            let log = Paragraph::new(Text::from(logs.clone()))
                .block(Block::default().borders(Borders::ALL).title("Log"))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(log, chunks[1]);
        })?;
        Ok(())
    }
}

fn create_spans(
    sailings: &TerminalCombo,
    rows: &[SailingRow],
    now: &DateTime<Local>,
) -> Vec<Spans<'static>> {
    let mut spans: Vec<Spans> = Vec::new();

    spans.push(Spans::from(Span::styled(
        format!("Current time: {}", now.format("%H:%M:%S")),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    spans.push(Spans::from(Span::raw("")));

    spans.push(Spans::from(Span::styled(
        format!(
            "{} → {}",
            sailings.departing_terminal_name, sailings.arriving_terminal_name
        ),
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED),
    )));

    if rows.is_empty() {
        spans.push(Spans::from(Span::raw("No more sailings today")));
    }

    let vessel_width = rows.iter().map(|r| r.vessel.width()).max().unwrap_or(0);

    for row in rows {
        let time_style = if row.departed {
            Style::default().fg(Color::DarkGray)
        } else if row.next {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let arrive = row
            .arrive
            .map(|a| format!("arr {}", a.format("%H:%M")))
            .unwrap_or_else(|| " ".repeat(9));

        let until = if row.departed {
            String::from("departed")
        } else {
            format!("{:2}min", row.mins_until)
        };

        spans.push(Spans::from(vec![
            Span::styled(row.depart.format("%H:%M").to_string(), time_style),
            Span::raw(format!(
                " | {} | {} | {}",
                pad(&row.vessel, vessel_width),
                arrive,
                until
            )),
        ]));
    }
    spans
}

/// Pads by display width, not by chars.
fn pad(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(s.width())))
}

/// Keeps the last `capacity` log lines for display inside the TUI.
#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push_back(line);
            while lines.len() > self.capacity {
                lines.pop_front();
            }
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogLineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogLineWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Splits whatever the subscriber writes into lines.
pub struct LogLineWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl Write for LogLineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.buffer
                .push(String::from_utf8_lossy(&line).trim_end().to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogLineWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.buffer
                .push(String::from_utf8_lossy(&rest).trim_end().to_string());
        }
    }
}
