// Selection state for the playback-rate control: which rate is active, which
// popup is showing, and the display values derived from both.

use super::config::RateConfig;
use super::normalize::{normalize, ToRate};

/// Anything whose playback rate the selector drives (an mpv process, a test
/// recorder, ...). Replaced on every bind.
pub trait MediaSink {
    fn set_playback_rate(&mut self, rate: f64);
}

/// Which popup surface is showing. The preset list and the custom slider
/// are never open together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    MenuOpen,
    SliderOpen,
}

/// The entry highlighted in the preset list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveItem {
    Preset(f64),
    Custom,
}

/// Display values computed from the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    /// Rate button text.
    pub title: String,
    pub active: ActiveItem,
    /// Filled share of the slider track; can exceed 100 (see [`CustomRange::fill_percent`]).
    ///
    /// [`CustomRange::fill_percent`]: super::CustomRange::fill_percent
    pub slider_fill_percent: f64,
    /// Label shown next to the slider, e.g. `1.3x`.
    pub slider_label: String,
    /// Text of the custom list entry when the selected rate is not a preset.
    pub custom_item_label: Option<String>,
}

pub struct RateController {
    config: RateConfig,
    sink: Box<dyn MediaSink + Send>,
    selected_rate: f64,
    menu: MenuState,
}

impl RateController {
    pub fn new(config: RateConfig, sink: Box<dyn MediaSink + Send>) -> Self {
        let mut controller = Self {
            selected_rate: config.default_value,
            config,
            sink,
            menu: MenuState::Closed,
        };
        controller.apply(controller.selected_rate);
        controller
    }

    /// Attach to a (possibly new) media sink with a freshly loaded config.
    /// The selection restarts from the configured default, which is applied
    /// to the sink, and both popups close.
    pub fn bind(&mut self, config: RateConfig, sink: Box<dyn MediaSink + Send>) {
        self.selected_rate = config.default_value;
        self.config = config;
        self.sink = sink;
        self.menu = MenuState::Closed;
        self.apply(self.selected_rate);
    }

    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    pub fn selected_rate(&self) -> f64 {
        self.selected_rate
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu == MenuState::MenuOpen
    }

    pub fn is_custom_slider_open(&self) -> bool {
        self.menu == MenuState::SliderOpen
    }

    /// Pick a rate from the preset list. Closes the list.
    pub fn select_preset_rate(&mut self, raw: impl ToRate) -> DerivedView {
        self.set_rate(raw);
        if self.menu == MenuState::MenuOpen {
            self.menu = MenuState::Closed;
        }
        self.compute_view()
    }

    /// Pick a rate on the custom slider. The slider stays open.
    ///
    /// The configured `custom_range_callback` runs synchronously after the
    /// rate has been applied; its error is returned as-is.
    pub fn select_custom_rate(&mut self, raw: impl ToRate) -> anyhow::Result<DerivedView> {
        let rate = self.set_rate(raw);
        if let Some(callback) = &self.config.custom_range_callback {
            callback(rate)?;
        }
        Ok(self.compute_view())
    }

    /// Host-facing setter: applies a rate without touching either popup or
    /// the custom-rate hook. Returns the normalized rate.
    pub fn set_playback_rate(&mut self, raw: impl ToRate) -> f64 {
        self.set_rate(raw)
    }

    pub fn playback_rate(&self) -> f64 {
        self.selected_rate
    }

    pub fn toggle_menu(&mut self) {
        self.menu = match self.menu {
            MenuState::MenuOpen => MenuState::Closed,
            MenuState::Closed | MenuState::SliderOpen => MenuState::MenuOpen,
        };
    }

    pub fn open_custom_slider(&mut self) {
        self.menu = MenuState::SliderOpen;
    }

    pub fn close_custom_slider(&mut self) {
        if self.menu == MenuState::SliderOpen {
            self.menu = MenuState::Closed;
        }
    }

    /// Slider's back arrow: leave the slider and return to the preset list.
    pub fn back(&mut self) {
        self.close_custom_slider();
        self.toggle_menu();
    }

    pub fn reset_all_menus(&mut self) {
        self.menu = MenuState::Closed;
    }

    pub fn is_preset_rate(&self, raw: impl ToRate) -> bool {
        let rate = normalize(raw);
        self.config
            .presets
            .iter()
            .any(|preset| normalize(preset.value) == rate)
    }

    pub fn compute_view(&self) -> DerivedView {
        let rate = self.selected_rate;
        let is_preset = self.is_preset_rate(rate);
        DerivedView {
            title: self.title(),
            active: if is_preset {
                ActiveItem::Preset(rate)
            } else {
                ActiveItem::Custom
            },
            slider_fill_percent: self.config.custom_range.fill_percent(rate),
            slider_label: self.config.format_rate(rate),
            custom_item_label: (!is_preset).then(|| self.config.format_rate(rate)),
        }
    }

    fn title(&self) -> String {
        self.config
            .presets
            .iter()
            .find(|preset| preset.value == self.selected_rate)
            .map(|preset| self.config.format_label(&preset.label))
            .unwrap_or_else(|| self.config.format_rate(self.selected_rate))
    }

    fn set_rate(&mut self, raw: impl ToRate) -> f64 {
        let rate = normalize(raw);
        self.selected_rate = rate;
        self.apply(rate);
        rate
    }

    fn apply(&mut self, rate: f64) {
        tracing::debug!(rate, "applying playback rate");
        self.sink.set_playback_rate(rate);
    }
}
