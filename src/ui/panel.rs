use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::light::LightMode;
use crate::util::{fit_line, LCD_COLUMNS};

use super::{MusicState, PanelState};

const HELP: &str = "1:+  2:next  3:-  4:back (hold: quit)  m:motion  f:PIR fault  q:quit";

/// One frame of the simulated board
pub struct PanelView<'a> {
    state: &'a PanelState,
    light: LightMode,
}

impl<'a> PanelView<'a> {
    pub fn new(state: &'a PanelState, light: LightMode) -> Self {
        Self { state, light }
    }

    fn lcd_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = self
            .state
            .text
            .lines()
            .take(2)
            .map(|l| Line::from(fit_line(l, LCD_COLUMNS)))
            .collect();
        lines.resize(2, Line::from(""));
        lines
    }

    fn status_line(&self) -> Line<'static> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let music = match self.state.music {
            MusicState::Playing => Span::styled("♪ playing", bold.fg(Color::Green)),
            MusicState::Paused => Span::styled("♪ paused", bold.fg(Color::Yellow)),
            MusicState::Stopped => Span::styled("♪ stopped", dim),
        };
        let buzzer = if self.state.buzzing {
            Span::styled("BEEP", bold.fg(Color::Red))
        } else {
            Span::styled("beep", dim)
        };
        let pir = match (self.state.pir_failing, self.state.motion) {
            (true, _) => Span::styled("PIR FAULT", bold.fg(Color::Red)),
            (false, true) => Span::styled("PIR motion", bold.fg(Color::Green)),
            (false, false) => Span::styled("PIR still", dim),
        };

        Line::from(vec![
            music,
            Span::raw("  "),
            buzzer,
            Span::raw("  "),
            pir,
        ])
    }

    fn led_line(&self) -> Line<'static> {
        let (left, right) = self.state.leds;
        Line::from(format!(
            "LED {:>3}% {:>3}%  ({})",
            left, right, self.light
        ))
    }
}

impl Widget for PanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let lcd_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LCD_COLUMNS as u16 + 2), Constraint::Min(0)])
            .split(rows[0])[0];

        let crate::hardware::Rgb(r, g, b) = self.state.color;
        Paragraph::new(self.lcd_lines())
            .style(Style::default().bg(Color::Rgb(r, g, b)).fg(Color::Black))
            .block(Block::bordered().title("LCD"))
            .render(lcd_area, buf);

        Paragraph::new(self.status_line()).render(rows[1], buf);
        Paragraph::new(self.led_line()).render(rows[2], buf);
        Paragraph::new(Span::styled(
            HELP,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(rows[3], buf);
    }
}
