// Playback-rate control in the control bar: a button showing the current
// rate, a popup list of presets, and a custom-rate slider. Owns the
// RateController and its host-event subscriptions.

use std::cell::Cell;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::action::Action;
use crate::components::Component;
use crate::host::{is_eligible, Container, HostEvent, HostEvents, Subscription};
use crate::rate::config::CustomRangeCallback;
use crate::rate::{
    ActiveItem, DerivedView, MenuState, RateConfig, RateController, RateSettings, ToRate,
};
use crate::theme::Theme;

const SLIDER_WIDTH: u16 = 30;
const LISTENED_EVENTS: [HostEvent; 3] = [
    HostEvent::ContainerChanged,
    HostEvent::ControlsRendered,
    HostEvent::ControlsHidden,
];

/// Control-bar plugin for choosing the playback rate.
pub struct RateSelector {
    action_tx: Option<UnboundedSender<Action>>,
    host: Option<HostEvents>,
    subscriptions: Vec<Subscription>,
    host_rx: Option<UnboundedReceiver<HostEvent>>,
    settings: RateSettings,
    default_rate: Option<f64>,
    custom_range_callback: Option<CustomRangeCallback>,
    controller: Option<RateController>,
    /// Highlighted row in the preset list; the row after the presets is the
    /// custom entry.
    cursor: usize,
    /// Track row of the slider as last drawn, for mouse hit-testing.
    slider_track: Cell<Option<Rect>>,
}

impl RateSelector {
    pub fn new(settings: RateSettings) -> Self {
        Self {
            action_tx: None,
            host: None,
            subscriptions: Vec::new(),
            host_rx: None,
            settings,
            default_rate: None,
            custom_range_callback: None,
            controller: None,
            cursor: 0,
            slider_track: Cell::new(None),
        }
    }

    /// Override the configured default rate (normalized). Zero counts as
    /// unset, as it does for `default_value` in the config file.
    pub fn with_default_rate(mut self, raw: impl ToRate) -> Self {
        let rate = crate::rate::normalize(raw);
        self.default_rate = (rate != 0.0).then_some(rate);
        self
    }

    /// Hook run after every custom-slider pick; see
    /// [`RateController::select_custom_rate`].
    pub fn with_custom_range_callback(mut self, callback: CustomRangeCallback) -> Self {
        self.custom_range_callback = Some(callback);
        self
    }

    /// Start listening to the host's lifecycle events.
    pub fn attach(&mut self, host: HostEvents) {
        self.host = Some(host);
        self.bind_events();
    }

    fn bind_events(&mut self) {
        let Some(host) = &self.host else {
            return;
        };
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions = LISTENED_EVENTS
            .iter()
            .map(|event| host.listen_to(*event, tx.clone()))
            .collect();
        self.host_rx = Some(rx);
    }

    /// Drop every subscription (and anything still queued on them), then
    /// subscribe again.
    pub fn reload(&mut self) {
        self.subscriptions.clear();
        self.host_rx = None;
        self.bind_events();
        tracing::debug!("rate selector rebound to host events");
    }

    /// Handle queued host events against the currently active container.
    /// Returns how many were handled.
    pub fn process_host_events(&mut self, container: Option<&dyn Container>) -> usize {
        let mut handled = 0;
        loop {
            let Some(rx) = self.host_rx.as_mut() else {
                break;
            };
            let Ok(event) = rx.try_recv() else {
                break;
            };
            handled += 1;
            match event {
                HostEvent::ContainerChanged => self.reload(),
                HostEvent::ControlsRendered => self.render(container),
                HostEvent::ControlsHidden => self.hide_menus(),
            }
        }
        handled
    }

    /// Bind to `container` with a freshly loaded config, or detach when the
    /// container is not an audio/video element.
    pub fn render(&mut self, container: Option<&dyn Container>) {
        let Some(container) = container.filter(|c| is_eligible(*c)) else {
            if self.controller.take().is_some() {
                tracing::info!("active media is not audio/video, rate control detached");
            }
            return;
        };

        let config = self.rate_config();
        let sink = container.media_sink();
        match self.controller.as_mut() {
            Some(controller) => controller.bind(config, sink),
            None => self.controller = Some(RateController::new(config, sink)),
        }
        self.sync_cursor();
        tracing::info!(
            tag = container.tag_name(),
            rate = self.playback_rate(),
            "rate control bound"
        );
    }

    fn hide_menus(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.reset_all_menus();
        }
    }

    pub fn rate_config(&self) -> RateConfig {
        let mut config = self.settings.to_rate_config();
        if let Some(rate) = self.default_rate {
            config.default_value = rate;
        }
        if let Some(callback) = &self.custom_range_callback {
            config = config.with_custom_range_callback(callback.clone());
        }
        config
    }

    pub fn is_rendered(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&RateController> {
        self.controller.as_ref()
    }

    pub fn menu_state(&self) -> MenuState {
        self.controller
            .as_ref()
            .map_or(MenuState::Closed, RateController::menu_state)
    }

    /// True while either popup is showing.
    pub fn is_open(&self) -> bool {
        self.menu_state() != MenuState::Closed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn view(&self) -> Option<DerivedView> {
        self.controller.as_ref().map(RateController::compute_view)
    }

    pub fn playback_rate(&self) -> Option<f64> {
        self.controller.as_ref().map(RateController::playback_rate)
    }

    /// Apply a rate from outside the menus. `None` when nothing is bound.
    pub fn set_playback_rate(&mut self, raw: impl ToRate) -> Option<f64> {
        let rate = self.controller.as_mut()?.set_playback_rate(raw);
        self.sync_cursor();
        Some(rate)
    }

    fn sync_cursor(&mut self) {
        let Some(controller) = &self.controller else {
            return;
        };
        let presets = &controller.config().presets;
        let rate = controller.selected_rate();
        self.cursor = presets
            .iter()
            .position(|p| p.value == rate)
            .unwrap_or(presets.len());
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.action_tx {
            tx.send(action).ok();
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent, presets: &[f64]) {
        let count = presets.len() + 1;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1) % count;
            }
            KeyCode::Enter => match presets.get(self.cursor) {
                Some(value) => self.send(Action::SelectPresetRate(value.to_string())),
                None => self.send(Action::OpenCustomSlider),
            },
            KeyCode::Esc | KeyCode::Char('s') => self.send(Action::ToggleRateMenu),
            _ => {}
        }
    }

    fn handle_slider_key(&mut self, key: KeyEvent) {
        let Some(controller) = &self.controller else {
            return;
        };
        let range = controller.config().custom_range;
        let rate = controller.selected_rate();
        let target = match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(range.step_from(rate, -1)),
            KeyCode::Right | KeyCode::Char('l') => Some(range.step_from(rate, 1)),
            KeyCode::Home => Some(range.min),
            KeyCode::End => Some(range.max),
            KeyCode::Enter => {
                self.send(Action::CloseCustomSlider);
                None
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.send(Action::RateMenuBack);
                None
            }
            KeyCode::Char('s') => {
                self.send(Action::ToggleRateMenu);
                None
            }
            _ => None,
        };
        if let Some(value) = target {
            self.send(Action::CustomRateInput(value.to_string()));
        }
    }

    /// Press or drag on the slider track picks the rate under the pointer.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> bool {
        if self.menu_state() != MenuState::SliderOpen {
            return false;
        }
        if !matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        ) {
            return false;
        }
        let (Some(track), Some(controller)) = (self.slider_track.get(), &self.controller) else {
            return false;
        };
        if !track.contains(Position::new(mouse.column, mouse.row)) {
            return false;
        }

        let span = f64::from(track.width.saturating_sub(1).max(1));
        let fraction = f64::from(mouse.column - track.x) / span;
        let value = controller.config().custom_range.value_at(fraction);
        self.send(Action::CustomRateInput(value.to_string()));
        true
    }

    /// Draw whichever popup is open, stacked above `anchor` (the rate
    /// button) and kept inside `bounds`.
    pub fn draw_popup(&self, frame: &mut Frame, anchor: Rect, bounds: Rect, theme: &Theme) {
        let Some(controller) = &self.controller else {
            return;
        };
        match controller.menu_state() {
            MenuState::Closed => self.slider_track.set(None),
            MenuState::MenuOpen => {
                self.slider_track.set(None);
                self.draw_menu(frame, controller, anchor, bounds, theme);
            }
            MenuState::SliderOpen => self.draw_slider(frame, controller, anchor, bounds, theme),
        }
    }

    fn draw_menu(
        &self,
        frame: &mut Frame,
        controller: &RateController,
        anchor: Rect,
        bounds: Rect,
        theme: &Theme,
    ) {
        let config = controller.config();
        let view = controller.compute_view();

        let custom_text = match &view.custom_item_label {
            Some(label) => format!("{} ({})", config.custom_range_label, label),
            None => format!("{} ›", config.custom_range_label),
        };
        let mut rows: Vec<(String, bool)> = config
            .presets
            .iter()
            .map(|p| (p.label.clone(), view.active == ActiveItem::Preset(p.value)))
            .collect();
        rows.push((custom_text, view.active == ActiveItem::Custom));

        let lines: Vec<Line> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (label, active))| {
                let marker = if active { "● " } else { "  " };
                let mut style = if active {
                    Style::default()
                        .fg(theme.primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                if i == self.cursor {
                    style = style.bg(theme.selection_bg);
                }
                Line::from(Span::styled(format!(" {}{} ", marker, label), style))
            })
            .collect();

        let content_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let area = popup_above(anchor, bounds, content_width + 2, lines.len() as u16 + 2);
        if area.height < 3 {
            return;
        }

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" Speed ")
            .title_style(Style::default().fg(theme.primary));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_slider(
        &self,
        frame: &mut Frame,
        controller: &RateController,
        anchor: Rect,
        bounds: Rect,
        theme: &Theme,
    ) {
        let config = controller.config();
        let view = controller.compute_view();
        let area = popup_above(anchor, bounds, SLIDER_WIDTH, 5);
        if area.height < 5 || area.width < 6 {
            self.slider_track.set(None);
            return;
        }

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" ‹ {} ", config.custom_range_label))
            .title_style(Style::default().fg(theme.primary));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let track = Rect::new(inner.x, inner.y + 1, inner.width, 1);
        self.slider_track.set(Some(track));

        // Rates above the range max overflow the track; the thumb pins to the end.
        let width = usize::from(track.width);
        let fill = view.slider_fill_percent.clamp(0.0, 100.0) / 100.0;
        let thumb = (fill * (width - 1) as f64).round() as usize;
        let bar: Vec<Span> = (0..width)
            .map(|i| {
                if i < thumb {
                    Span::styled("━", Style::default().fg(theme.slider_fill))
                } else if i == thumb {
                    Span::styled("●", Style::default().fg(theme.slider_fill))
                } else {
                    Span::styled("─", Style::default().fg(theme.slider_track))
                }
            })
            .collect();

        let range = config.custom_range;
        let lines = vec![
            Line::from(Span::styled(
                view.slider_label.clone(),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::from(bar),
            Line::from(Span::styled(
                format!(
                    "{} ←→ {}",
                    config.format_rate(range.min),
                    config.format_rate(range.max)
                ),
                Style::default().fg(theme.text_dim),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Rectangle of at most `width` x `height`, right-aligned with `anchor` and
/// sitting directly above it, clipped to `bounds`.
fn popup_above(anchor: Rect, bounds: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(anchor.y.saturating_sub(bounds.y));
    let right = anchor.x.saturating_add(anchor.width);
    let x = right.saturating_sub(width).max(bounds.x);
    let y = anchor.y.saturating_sub(height);
    Rect::new(x, y, width, height)
}

impl Component for RateSelector {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) {
        self.action_tx = Some(tx);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        match self.menu_state() {
            MenuState::Closed => Ok(false),
            MenuState::MenuOpen => {
                let presets: Vec<f64> = self
                    .controller
                    .as_ref()
                    .map(|c| c.config().presets.iter().map(|p| p.value).collect())
                    .unwrap_or_default();
                self.handle_menu_key(key, &presets);
                Ok(true)
            }
            MenuState::SliderOpen => {
                self.handle_slider_key(key);
                Ok(true)
            }
        }
    }

    fn update(&mut self, action: &Action) -> anyhow::Result<Vec<Action>> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(vec![]);
        };
        match action {
            Action::ToggleRateMenu => {
                controller.toggle_menu();
                self.sync_cursor();
            }
            Action::SelectPresetRate(raw) => {
                controller.select_preset_rate(raw.as_str());
                self.sync_cursor();
            }
            Action::OpenCustomSlider => controller.open_custom_slider(),
            Action::CloseCustomSlider => controller.close_custom_slider(),
            Action::RateMenuBack => {
                controller.back();
                self.sync_cursor();
            }
            Action::CustomRateInput(raw) => {
                let result = controller.select_custom_rate(raw.as_str());
                self.sync_cursor();
                result?;
            }
            Action::NudgeRate(steps) => {
                let range = controller.config().custom_range;
                let target = range.step_from(controller.selected_rate(), *steps);
                controller.set_playback_rate(target);
                self.sync_cursor();
            }
            _ => {}
        }
        Ok(vec![])
    }

    /// Draws the rate button; popups are drawn by [`RateSelector::draw_popup`].
    fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(view) = self.view() else {
            return;
        };
        let style = if self.is_open() {
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let button = Line::from(vec![
            Span::styled("s ", Style::default().fg(theme.text_dim)),
            Span::styled(format!("[{}]", view.title), style),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(button), area);
    }
}
