// Bottom control bar: playback state, keybinding hints, and the right-hand
// panel where the rate selector's button lives.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::components::{Component, BRAILLE_SPINNER};
use crate::theme::Theme;

/// Width reserved on the right of the bar for plugins (the rate button).
pub const RIGHT_PANEL_WIDTH: u16 = 18;

/// Bottom bar showing playback state and keybinding hints.
#[derive(Default)]
pub struct PlayControls {
    action_tx: Option<UnboundedSender<Action>>,
    playing: bool,
    paused: bool,
    buffering: bool,
    visible: bool,
    frame_count: u64,
}

impl PlayControls {
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Split the bar into (left content, right panel) inside its border.
    pub fn panels(area: Rect) -> (Rect, Rect) {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let cols = Layout::horizontal([Constraint::Min(0), Constraint::Length(RIGHT_PANEL_WIDTH)])
            .split(inner);
        (cols[0], cols[1])
    }
}

impl Component for PlayControls {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) {
        self.action_tx = Some(tx);
    }

    fn update(&mut self, action: &Action) -> anyhow::Result<Vec<Action>> {
        match action {
            Action::Tick => {
                self.frame_count = self.frame_count.wrapping_add(1);
            }
            Action::PlaybackLoading => {
                self.buffering = true;
            }
            Action::PlaybackStarted { .. } => {
                self.playing = true;
                self.paused = false;
            }
            Action::PlaybackPosition(_) => {
                self.buffering = false;
            }
            Action::PlaybackFinished => {
                self.playing = false;
                self.paused = false;
                self.buffering = false;
            }
            Action::TogglePlayPause => {
                self.paused = !self.paused;
            }
            Action::ShowControls => self.visible = true,
            Action::HideControls => self.visible = false,
            _ => {}
        }
        Ok(vec![])
    }

    fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }

        let status = if self.buffering {
            let idx = (self.frame_count / 3) as usize % BRAILLE_SPINNER.len();
            BRAILLE_SPINNER[idx]
        } else if self.paused {
            "⏸"
        } else if self.playing {
            "▶"
        } else {
            "■"
        };

        let status_color = if self.buffering {
            theme.buffering
        } else if self.playing && !self.paused {
            theme.success
        } else {
            theme.text_dim
        };

        let border_color = if self.playing && !self.paused {
            theme.primary
        } else {
            theme.border
        };

        let div = Span::styled(" │ ", Style::default().fg(theme.border));
        let key_style = Style::default().fg(theme.text);
        let desc_style = Style::default().fg(theme.text_dim);

        let line1 = Line::from(vec![
            Span::styled(
                format!(" {} ", status),
                Style::default()
                    .fg(status_color)
                    .add_modifier(Modifier::BOLD),
            ),
            div.clone(),
            Span::styled("Space", key_style),
            Span::styled(" Play/Pause", desc_style),
            div.clone(),
            Span::styled("s", key_style),
            Span::styled(" Speed", desc_style),
            div.clone(),
            Span::styled("+ -", key_style),
            Span::styled(" Nudge", desc_style),
        ]);

        let line2 = Line::from(vec![
            Span::raw("   "),
            Span::styled("n p", key_style),
            Span::styled(" Next/Prev", desc_style),
            div.clone(),
            Span::styled("?", key_style),
            Span::styled(" Help", desc_style),
            div,
            Span::styled("q", key_style),
            Span::styled(" Quit", desc_style),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        frame.render_widget(block, area);

        let (left, _) = Self::panels(area);
        frame.render_widget(Paragraph::new(vec![line1, line2]), left);
    }
}
