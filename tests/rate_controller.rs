// Rate controller behavior: normalization fallback, popup exclusivity,
// titles, slider fill, and the documented selection scenarios.

use std::sync::{Arc, Mutex};

use rateplay::rate::config::{default_presets, CustomRange, RateConfig, RatePreset};
use rateplay::rate::{
    normalize, ActiveItem, MediaSink, MenuState, RateController, DEFAULT_PLAYBACK_RATE,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<f64>>>);

impl RecordingSink {
    fn last(&self) -> Option<f64> {
        self.0.lock().unwrap().last().copied()
    }

    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl MediaSink for RecordingSink {
    fn set_playback_rate(&mut self, rate: f64) {
        self.0.lock().unwrap().push(rate);
    }
}

fn bound(config: RateConfig) -> (RateController, RecordingSink) {
    let sink = RecordingSink::default();
    (RateController::new(config, Box::new(sink.clone())), sink)
}

fn assert_exclusive(controller: &RateController) {
    assert!(
        !(controller.is_menu_open() && controller.is_custom_slider_open()),
        "menu and slider open together: {:?}",
        controller.menu_state()
    );
}

// ── Normalization ────────────────────────────────────────────────────────────

#[test]
fn test_normalize_matches_numeric_reading() {
    for text in ["0.5", "1", "1.25", "2", "3.75", "-1", "1e-1", "+2"] {
        let expected: f64 = text.parse().unwrap();
        assert_eq!(normalize(text), expected, "input {:?}", text);
    }
    for value in [0.1, 0.5, 1.0, 1.7, 16.0] {
        assert_eq!(normalize(value), value);
    }
}

#[test]
fn test_normalize_non_numbers_use_system_default() {
    for text in ["abc", "fast", "1,5", "NaN", "Infinity", "-inf", "2x"] {
        assert_eq!(normalize(text), DEFAULT_PLAYBACK_RATE, "input {:?}", text);
    }
}

#[test]
fn test_invalid_preset_falls_back_to_one_not_configured_default() {
    let mut config = RateConfig::default();
    config.default_value = 1.5;
    let (mut controller, sink) = bound(config);

    let view = controller.select_preset_rate("abc");
    assert_eq!(controller.selected_rate(), 1.0);
    assert_eq!(sink.last(), Some(1.0));
    assert_eq!(view.title, "Normal");
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn test_select_preset_scenario() {
    let (mut controller, sink) = bound(RateConfig::default());
    controller.toggle_menu();

    controller.select_preset_rate(1.5);
    assert_eq!(controller.playback_rate(), 1.5);
    assert_eq!(sink.last(), Some(1.5));
    assert!(!controller.is_menu_open());
}

#[test]
fn test_custom_rate_fill_scenario() {
    let mut config = RateConfig::default();
    config.custom_range = CustomRange {
        min: 0.5,
        max: 2.0,
        step: 0.1,
    };
    let (mut controller, _) = bound(config);

    let view = controller.select_custom_rate(1.8).unwrap();
    assert!(
        (view.slider_fill_percent - 90.0).abs() < 1e-9,
        "fill was {}",
        view.slider_fill_percent
    );
}

#[test]
fn test_fill_percent_exceeds_hundred_above_max() {
    let (mut controller, _) = bound(RateConfig::default());
    controller.set_playback_rate(3.0);
    assert!((controller.compute_view().slider_fill_percent - 150.0).abs() < 1e-9);
}

// ── Popup exclusivity ────────────────────────────────────────────────────────

#[test]
fn test_selections_never_open_both_popups() {
    let (mut controller, _) = bound(RateConfig::default());

    controller.toggle_menu();
    controller.select_preset_rate(0.75);
    assert_exclusive(&controller);
    controller.open_custom_slider();
    controller.select_custom_rate(1.3).unwrap();
    assert_exclusive(&controller);
    controller.toggle_menu();
    controller.select_preset_rate(2);
    assert_exclusive(&controller);
    controller.back();
    assert_exclusive(&controller);
    controller.select_custom_rate("0.9").unwrap();
    assert_exclusive(&controller);
}

#[test]
fn test_every_event_sequence_keeps_exclusivity() {
    type Op = fn(&mut RateController);
    let ops: [Op; 6] = [
        |c| c.toggle_menu(),
        |c| c.open_custom_slider(),
        |c| c.close_custom_slider(),
        |c| c.back(),
        |c| c.reset_all_menus(),
        |c| {
            c.select_preset_rate(1.5);
        },
    ];
    for a in ops {
        for b in ops {
            for c in ops {
                let (mut controller, _) = bound(RateConfig::default());
                a(&mut controller);
                b(&mut controller);
                c(&mut controller);
                assert_exclusive(&controller);
            }
        }
    }
}

#[test]
fn test_reset_all_menus_idempotent() {
    let starts: [fn(&mut RateController); 3] = [
        |c| c.toggle_menu(),
        |c| c.open_custom_slider(),
        |_| {},
    ];
    for start in starts {
        let (mut controller, _) = bound(RateConfig::default());
        start(&mut controller);
        controller.reset_all_menus();
        let once = (controller.menu_state(), controller.selected_rate());
        controller.reset_all_menus();
        assert_eq!((controller.menu_state(), controller.selected_rate()), once);
        assert_eq!(once.0, MenuState::Closed);
    }
}

// ── Titles and active item ───────────────────────────────────────────────────

#[test]
fn test_title_round_trip_for_every_preset() {
    let mut presets = default_presets();
    presets.push(RatePreset::new(1.3, "Personalizado(1.3x)"));

    for preset in &presets {
        let mut config = RateConfig::default();
        config.presets = presets.clone();
        config.default_value = preset.value;
        let (controller, _) = bound(config.clone());
        assert_eq!(
            controller.compute_view().title,
            config.format_label(&preset.label)
        );
        assert_eq!(
            controller.compute_view().active,
            ActiveItem::Preset(preset.value)
        );
    }
}

#[test]
fn test_unknown_rate_title() {
    let (mut controller, _) = bound(RateConfig::default());
    controller.set_playback_rate(1.25);
    let view = controller.compute_view();
    assert_eq!(view.title, "1.25x");
    assert_eq!(view.active, ActiveItem::Custom);
    assert_eq!(view.custom_item_label.as_deref(), Some("1.25x"));
}

#[test]
fn test_suffix_is_configurable() {
    let mut config = RateConfig::default();
    config.rate_suffix = "×".to_string();
    let (mut controller, _) = bound(config);
    controller.set_playback_rate("1.1");
    assert_eq!(controller.compute_view().title, "1.1×");
    assert_eq!(controller.compute_view().slider_label, "1.1×");
}

#[test]
fn test_custom_label_formatter_hook() {
    let config = RateConfig::default()
        .with_label_formatter(Arc::new(|label: &str| label.to_uppercase()));
    let (controller, _) = bound(config);
    assert_eq!(controller.compute_view().title, "NORMAL");
}

#[test]
fn test_preset_match_accepts_text() {
    let (controller, _) = bound(RateConfig::default());
    assert!(controller.is_preset_rate("1"));
    assert!(controller.is_preset_rate("0.50"));
    assert!(!controller.is_preset_rate("1.1"));
    // Garbage reads as the system default, which is a preset.
    assert!(controller.is_preset_rate("abc"));
}

#[test]
fn test_compute_view_has_no_side_effects() {
    let (mut controller, sink) = bound(RateConfig::default());
    controller.toggle_menu();
    let before = (controller.menu_state(), controller.selected_rate(), sink.count());
    let first = controller.compute_view();
    let second = controller.compute_view();
    assert_eq!(first, second);
    assert_eq!(
        (controller.menu_state(), controller.selected_rate(), sink.count()),
        before
    );
}

// ── Binding ──────────────────────────────────────────────────────────────────

#[test]
fn test_rebind_discards_previous_selection() {
    let (mut controller, first_sink) = bound(RateConfig::default());
    controller.open_custom_slider();
    controller.select_custom_rate(1.7).unwrap();

    let second_sink = RecordingSink::default();
    controller.bind(RateConfig::default(), Box::new(second_sink.clone()));

    assert_eq!(controller.selected_rate(), 1.0);
    assert_eq!(controller.menu_state(), MenuState::Closed);
    assert_eq!(second_sink.last(), Some(1.0));

    controller.select_preset_rate(0.5);
    assert_eq!(first_sink.last(), Some(1.7));
    assert_eq!(second_sink.last(), Some(0.5));
}

#[test]
fn test_custom_hook_error_reaches_caller() {
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let config = RateConfig::default().with_custom_range_callback(Arc::new(
        move |_: f64| -> anyhow::Result<()> {
            *counter.lock().unwrap() += 1;
            anyhow::bail!("listener unavailable")
        },
    ));
    let (mut controller, sink) = bound(config);
    controller.open_custom_slider();

    let result = controller.select_custom_rate(1.4);
    assert!(result.is_err());
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(sink.last(), Some(1.4));
    assert!(controller.is_custom_slider_open());

    // Preset picks and host writes never call the hook.
    controller.select_preset_rate(1.0);
    controller.set_playback_rate(2.0);
    assert_eq!(*calls.lock().unwrap(), 1);
}
