use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::engine::{EngineSnapshot, Phase};
use crate::util::{seconds_to_minutes, seconds_to_time};

const VERTICAL_MARGIN: u16 = 2;

/// Accent color keyed on phase, standing in for the source theme's
/// working/resting body classes.
fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Idle => Color::Yellow,
        Phase::Working => Color::Red,
        Phase::ShortResting | Phase::LongResting => Color::Green,
    }
}

/// Window-title text for a given snapshot, mirroring the page title of the
/// source: a welcome while idle, otherwise phase and countdown.
pub fn window_title(snapshot: &EngineSnapshot) -> String {
    match snapshot.phase {
        Phase::Idle => "Welcome to PomoTime!".to_string(),
        phase => format!("{} | {}", phase, seconds_to_minutes(snapshot.remaining_secs)),
    }
}

/// Full-screen view of the timer, rendered purely from an engine snapshot.
pub struct TimerScreen {
    snapshot: EngineSnapshot,
}

impl TimerScreen {
    pub fn new(snapshot: EngineSnapshot) -> Self {
        Self { snapshot }
    }

    fn heading(&self) -> &'static str {
        match self.snapshot.phase {
            Phase::Idle => "Welcome to PomoTime!",
            Phase::Working => "Time to focus!",
            Phase::ShortResting | Phase::LongResting => "Time for a break!",
        }
    }

    fn status_line(&self) -> String {
        if self.snapshot.is_running {
            self.snapshot.phase.label().to_string()
        } else {
            format!("{} (paused)", self.snapshot.phase.label())
        }
    }

    fn stats_segments(&self) -> [String; 3] {
        [
            format!("completed cycles: {}", self.snapshot.completed_long_cycles),
            format!(
                "worked time: {}",
                seconds_to_time(self.snapshot.total_worked_secs)
            ),
            format!(
                "pomodoros: {}",
                self.snapshot.completed_work_intervals
            ),
        ]
    }

    fn legend(&self) -> &'static str {
        // The pause binding is not offered while Idle.
        if self.snapshot.phase == Phase::Idle {
            "(w)ork  (r)est  (R) long rest  (esc) quit"
        } else {
            "(w)ork  (r)est  (R) long rest  (space) pause/resume  (esc) quit"
        }
    }
}

impl Widget for &TimerScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let accent = Style::default()
            .fg(phase_color(self.snapshot.phase))
            .add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let italic = Style::default().add_modifier(Modifier::ITALIC);

        // Fold the footer onto extra rows when the terminal is too narrow
        // for one, keeping the counters in order; width is display columns,
        // not bytes.
        let mut stats_lines: Vec<String> = Vec::new();
        for segment in self.stats_segments() {
            match stats_lines.last_mut() {
                Some(last) if last.width() + 4 + segment.width() <= area.width as usize => {
                    *last = format!("{}    {}", last, segment);
                }
                _ => stats_lines.push(segment),
            }
        }

        let body_height = 6 + stats_lines.len() as u16;
        let top_pad = (area.height.saturating_sub(body_height)) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(top_pad.saturating_sub(VERTICAL_MARGIN)),
                Constraint::Length(1), // heading
                Constraint::Length(1),
                Constraint::Length(1), // clock
                Constraint::Length(1), // status
                Constraint::Length(1),
                Constraint::Length(stats_lines.len() as u16),
                Constraint::Length(1),
                Constraint::Length(1), // legend
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Span::styled(self.heading(), accent))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(
            seconds_to_minutes(self.snapshot.remaining_secs),
            accent,
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        if self.snapshot.phase != Phase::Idle {
            Paragraph::new(Span::styled(self.status_line(), italic))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        let stats_text: Vec<Line> = stats_lines
            .into_iter()
            .map(|line| Line::from(Span::styled(line, dim)))
            .collect();
        Paragraph::new(stats_text)
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        Paragraph::new(Span::styled(self.legend(), dim))
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
    }
}
