// Central coordinator: owns all components, the mpv player, and the host
// event bus. Runs the event loop (key → Action → handle_action → component
// updates → draw).

mod input;
mod playback;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::Action;
use crate::components::now_playing::NowPlaying;
use crate::components::play_controls::PlayControls;
use crate::components::rate_selector::RateSelector;
use crate::components::Component;
use crate::config::Config;
use crate::host::{Container, HostEvent, HostEvents};
use crate::player::playlist::Playlist;
use crate::player::{MpvContainer, MpvPlayer};
use crate::rate::config::CustomRangeCallback;
use crate::theme::Theme;
use crate::tui::{Tui, TuiEvent};
use crate::ui;

/// Top-level coordinator: owns every component, the mpv player, and the
/// playlist. Acts as the host for the rate selector plugin.
pub struct App {
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,

    // Components
    pub now_playing: NowPlaying,
    pub play_controls: PlayControls,
    pub rate_selector: RateSelector,

    // State
    host: HostEvents,
    player: MpvPlayer,
    container: Option<MpvContainer>,
    pub playlist: Playlist,
    pub(crate) config: Config,
    theme: Theme,
    pub show_help: bool,
    pub error_message: Option<String>,
    /// Ticks since the last key or mouse input.
    idle_ticks: u64,
}

/// Custom-range hook installed on the rate selector: reports each slider
/// pick back into the event loop.
fn custom_rate_hook(tx: mpsc::UnboundedSender<Action>) -> CustomRangeCallback {
    Arc::new(move |rate: f64| -> anyhow::Result<()> {
        tx.send(Action::CustomRateChosen(rate))?;
        Ok(())
    })
}

impl App {
    /// `default_rate` overrides the configured `default_value`.
    pub fn new(
        config: Config,
        playlist: Playlist,
        default_rate: Option<f64>,
    ) -> anyhow::Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let host = HostEvents::new();

        let mut now_playing = NowPlaying::new();
        let mut play_controls = PlayControls::new();
        let mut rate_selector = RateSelector::new(config.playback_rate.clone())
            .with_custom_range_callback(custom_rate_hook(action_tx.clone()));
        if let Some(rate) = default_rate {
            rate_selector = rate_selector.with_default_rate(rate);
        }

        for component in [
            &mut now_playing as &mut dyn Component,
            &mut play_controls,
            &mut rate_selector,
        ] {
            component.register_action_handler(action_tx.clone());
        }
        rate_selector.attach(host.clone());
        now_playing.set_playlist_info(playlist.current_index(), playlist.len());

        let mut player = MpvPlayer::new();
        player.set_action_tx(action_tx.clone());

        let theme = Theme::from_name(&config.general.theme);

        Ok(Self {
            running: true,
            action_tx,
            action_rx,
            now_playing,
            play_controls,
            rate_selector,
            host,
            player,
            container: None,
            playlist,
            config,
            theme,
            show_help: false,
            error_message: None,
            idle_ticks: 0,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut tui = Tui::new(self.config.general.tick_rate())?;
        tui.enter()?;

        if !self.playlist.is_empty() {
            self.start_current_item().await?;
        }

        while self.running {
            let state = ui::DrawState {
                now_playing: &self.now_playing,
                play_controls: &self.play_controls,
                rate_selector: &self.rate_selector,
                error_message: &self.error_message,
                show_help: self.show_help,
                theme: &self.theme,
            };
            tui.draw(|frame| ui::draw(frame, &state))?;

            tokio::select! {
                Some(event) = tui.event_rx.recv() => {
                    match event {
                        TuiEvent::Key(key) => self.handle_key(key)?,
                        TuiEvent::Mouse(mouse) => self.handle_mouse(mouse)?,
                        TuiEvent::Resize => {} // ratatui redraws at correct size automatically
                        TuiEvent::Tick => { self.action_tx.send(Action::Tick)?; }
                    }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }
            }
        }

        tui.exit()?;
        Ok(())
    }

    pub async fn handle_action(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            // Lifecycle
            Action::Quit => {
                let _ = self.player.stop().await;
                self.running = false;
            }

            // Playback
            Action::TogglePlayPause => {
                let _ = self.player.toggle_pause().await;
                self.now_playing.update(&action)?;
                self.play_controls.update(&action)?;
            }
            Action::NextItem => self.play_playlist_item(Playlist::advance).await?,
            Action::PrevItem => self.play_playlist_item(Playlist::prev).await?,
            Action::PlaybackStarted { .. }
            | Action::PlaybackLoading
            | Action::PlaybackPosition(_)
            | Action::PlaybackDuration(_) => {
                self.now_playing.update(&action)?;
                self.play_controls.update(&action)?;
            }
            Action::PlaybackFinished => {
                self.now_playing.update(&action)?;
                self.play_controls.update(&action)?;
                self.play_playlist_item(Playlist::advance).await?;
            }

            // Rate selector
            Action::ToggleRateMenu
            | Action::SelectPresetRate(_)
            | Action::OpenCustomSlider
            | Action::CloseCustomSlider
            | Action::RateMenuBack
            | Action::CustomRateInput(_)
            | Action::NudgeRate(_) => {
                if let Err(e) = self.rate_selector.update(&action) {
                    tracing::warn!(error = %e, "custom playback-rate hook failed");
                    self.action_tx.send(Action::ShowError(e.to_string()))?;
                }
            }
            Action::CustomRateChosen(rate) => {
                tracing::info!(rate, "custom playback rate chosen");
            }

            // Control bar visibility
            Action::ShowControls => {
                self.idle_ticks = 0;
                self.play_controls.update(&action)?;
            }
            Action::HideControls => {
                self.play_controls.update(&action)?;
                self.emit_host_event(HostEvent::ControlsHidden);
            }

            // Errors & help
            Action::ShowError(msg) => {
                self.error_message = Some(msg);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                    tx.send(Action::ClearError).ok();
                });
            }
            Action::ClearError => self.error_message = None,
            Action::ShowHelp => self.show_help = true,
            Action::HideHelp => self.show_help = false,

            Action::Tick => {
                self.now_playing.update(&action)?;
                self.play_controls.update(&action)?;
                self.tick_idle()?;
            }
        }
        Ok(())
    }

    /// Hide the control bar once input has been idle for the configured time.
    fn tick_idle(&mut self) -> anyhow::Result<()> {
        let timeout = self.config.general.controls_timeout_secs;
        if timeout == 0 || !self.play_controls.is_visible() {
            return Ok(());
        }
        self.idle_ticks += 1;
        let limit = (timeout as f64 * self.config.general.tick_rate()).ceil() as u64;
        if self.idle_ticks >= limit {
            self.action_tx.send(Action::HideControls)?;
        }
        Ok(())
    }

    /// Broadcast a lifecycle event and let the plugins react to it before
    /// anything else happens.
    pub fn emit_host_event(&mut self, event: HostEvent) {
        self.host.emit(event);
        let container = self.container.as_ref().map(|c| c as &dyn Container);
        self.rate_selector.process_host_events(container);
    }

    pub fn host(&self) -> &HostEvents {
        &self.host
    }

    /// Used by integration tests to drain queued actions without a terminal.
    pub async fn flush_actions(&mut self) {
        while let Ok(action) = self.action_rx.try_recv() {
            let _ = self.handle_action(action).await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
