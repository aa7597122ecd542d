// src/components/now_playing.rs

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::components::{format_time, Component, BRAILLE_SPINNER};
use crate::host::MediaKind;
use crate::theme::Theme;

/// Main panel: what is loaded, where playback is, and the playlist position.
#[derive(Default)]
pub struct NowPlaying {
    action_tx: Option<UnboundedSender<Action>>,
    pub title: Option<String>,
    pub kind: Option<MediaKind>,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub paused: bool,
    pub buffering: bool,
    playlist_pos: Option<usize>,
    playlist_len: usize,
    frame_count: u64,
}

impl NowPlaying {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&mut self, title: String, kind: Option<MediaKind>) {
        self.title = Some(title);
        self.kind = kind;
        self.position_secs = 0.0;
        self.duration_secs = None;
        self.paused = false;
    }

    pub fn set_playlist_info(&mut self, pos: Option<usize>, len: usize) {
        self.playlist_pos = pos;
        self.playlist_len = len;
    }

    pub fn is_playing(&self) -> bool {
        self.title.is_some()
    }
}

impl Component for NowPlaying {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) {
        self.action_tx = Some(tx);
    }

    fn update(&mut self, action: &Action) -> anyhow::Result<Vec<Action>> {
        match action {
            Action::Tick => self.frame_count = self.frame_count.wrapping_add(1),
            Action::PlaybackLoading => self.buffering = true,
            Action::PlaybackStarted { title } => {
                self.title = Some(title.clone());
                self.buffering = true;
            }
            Action::PlaybackPosition(pos) => {
                self.position_secs = *pos;
                self.buffering = false;
            }
            Action::PlaybackDuration(dur) => self.duration_secs = *dur,
            Action::TogglePlayPause => self.paused = !self.paused,
            Action::PlaybackFinished => {
                self.title = None;
                self.kind = None;
                self.buffering = false;
                self.paused = false;
                self.position_secs = 0.0;
                self.duration_secs = None;
            }
            _ => {}
        }
        Ok(vec![])
    }

    fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        let Some(title) = &self.title else {
            let idle = Paragraph::new(Line::from(Span::styled(
                "  Nothing playing",
                Style::default().fg(theme.text_dim),
            )));
            frame.render_widget(idle, rows[1]);
            return;
        };

        let kind = match self.kind {
            Some(MediaKind::Video) => "video",
            Some(MediaKind::Audio) => "audio",
            None => "media",
        };
        let title_line = Line::from(vec![
            Span::styled(
                format!("  {} ", title),
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("({})", kind), Style::default().fg(theme.secondary)),
        ]);
        frame.render_widget(Paragraph::new(title_line), rows[1]);

        let state = if self.buffering {
            let idx = (self.frame_count / 3) as usize % BRAILLE_SPINNER.len();
            format!("{} buffering", BRAILLE_SPINNER[idx])
        } else if self.paused {
            "⏸ paused".to_string()
        } else {
            "▶ playing".to_string()
        };
        let playlist = if self.playlist_len > 1 {
            format!(
                "  ·  item {}/{}",
                self.playlist_pos.unwrap_or(0) + 1,
                self.playlist_len
            )
        } else {
            String::new()
        };
        let state_line = Line::from(vec![
            Span::styled(format!("  {}", state), Style::default().fg(theme.text)),
            Span::styled(playlist, Style::default().fg(theme.text_dim)),
        ]);
        frame.render_widget(Paragraph::new(state_line), rows[2]);

        let label = match self.duration_secs {
            Some(dur) => format!("{} / {}", format_time(self.position_secs), format_time(dur)),
            None => format_time(self.position_secs),
        };
        let ratio = match self.duration_secs {
            Some(dur) if dur > 0.0 => (self.position_secs / dur).clamp(0.0, 1.0),
            _ => 0.0,
        };
        let progress_area = Rect {
            x: rows[3].x + 2,
            width: rows[3].width.saturating_sub(4),
            ..rows[3]
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.primary).bg(theme.selection_bg))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, progress_area);
    }
}
