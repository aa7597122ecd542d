// Layout and rendering: splits the terminal into the media panel and the
// control bar, then composites overlays (rate popups, help, error bar).

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::components::now_playing::NowPlaying;
use crate::components::play_controls::PlayControls;
use crate::components::rate_selector::RateSelector;
use crate::components::{centered_overlay, Component};
use crate::theme::Theme;

pub struct DrawState<'a> {
    pub now_playing: &'a NowPlaying,
    pub play_controls: &'a PlayControls,
    pub rate_selector: &'a RateSelector,
    pub error_message: &'a Option<String>,
    pub show_help: bool,
    pub theme: &'a Theme,
}

pub fn draw(frame: &mut Frame, state: &DrawState) {
    let theme = state.theme;
    let error_height = if state.error_message.is_some() { 1 } else { 0 };
    let outer = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(4),
    ])
    .split(frame.area());

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" rateplay ")
        .title_style(Style::default().fg(theme.primary));
    let content_area = outer_block.inner(outer[0]);
    frame.render_widget(outer_block, outer[0]);

    state.now_playing.draw(frame, content_area, theme);

    if let Some(ref msg) = state.error_message {
        let error_line = Line::from(vec![
            Span::styled(" ⚠ ", Style::default().fg(theme.error)),
            Span::styled(msg.as_str(), Style::default().fg(theme.warning)),
        ]);
        frame.render_widget(Paragraph::new(error_line), outer[1]);
    }

    if state.play_controls.is_visible() {
        state.play_controls.draw(frame, outer[2], theme);

        let (_, right_panel) = PlayControls::panels(outer[2]);
        let button = Rect {
            height: 1,
            ..right_panel
        };
        state.rate_selector.draw(frame, button, theme);
        let screen = frame.area();
        state.rate_selector.draw_popup(frame, button, screen, theme);
    }

    if state.show_help {
        draw_help_overlay(frame, theme);
    }
}

fn draw_help_overlay(frame: &mut Frame, theme: &Theme) {
    let keybindings = [
        ("q", "Quit"),
        ("Space", "Toggle play/pause"),
        ("n / p", "Next / previous item"),
        ("s", "Open or close the speed menu"),
        ("j k / ↑ ↓", "Move in the speed menu"),
        ("Enter", "Pick speed / open custom slider"),
        ("h l / ← →", "Adjust custom slider"),
        ("Esc", "Back from slider / close menu"),
        ("+ / -", "Nudge speed by one step"),
        ("?", "Toggle this help overlay"),
    ];

    let screen = frame.area();
    let overlay_area = centered_overlay(screen, 52, keybindings.len() as u16 + 6);
    frame.render_widget(Clear, overlay_area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            " Keybindings ",
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (key, desc) in &keybindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:12}", key), Style::default().fg(theme.accent)),
            Span::raw(*desc),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        Style::default().fg(theme.text_dim),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .title_alignment(Alignment::Center);
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, overlay_area);
}
