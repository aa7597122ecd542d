// Rate selector lifecycle against the host event bus: binding, rebinding,
// eligibility, menu reset on hide, and key-driven actions.

use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use rateplay::action::Action;
use rateplay::components::rate_selector::RateSelector;
use rateplay::components::Component;
use rateplay::host::{Container, HostEvent, HostEvents, MediaKind};
use rateplay::player::MpvContainer;
use rateplay::rate::{MediaSink, MenuState, RateSettings};

// ── Helpers ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<f64>>>);

impl MediaSink for RecordingSink {
    fn set_playback_rate(&mut self, rate: f64) {
        self.0.lock().unwrap().push(rate);
    }
}

struct FakeContainer {
    tag: &'static str,
    sink: RecordingSink,
}

impl FakeContainer {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            sink: RecordingSink::default(),
        }
    }

    fn rates(&self) -> Vec<f64> {
        self.sink.0.lock().unwrap().clone()
    }
}

impl Container for FakeContainer {
    fn tag_name(&self) -> &str {
        self.tag
    }

    fn media_sink(&self) -> Box<dyn MediaSink + Send> {
        Box::new(self.sink.clone())
    }
}

fn attached() -> (RateSelector, HostEvents, mpsc::UnboundedReceiver<Action>) {
    let host = HostEvents::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut selector = RateSelector::new(RateSettings::default());
    selector.register_action_handler(tx);
    selector.attach(host.clone());
    (selector, host, rx)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Action>) -> Vec<Action> {
    let mut actions = Vec::new();
    while let Ok(action) = rx.try_recv() {
        actions.push(action);
    }
    actions
}

/// Emit and handle one host event, the way the app does.
fn emit(
    selector: &mut RateSelector,
    host: &HostEvents,
    event: HostEvent,
    container: Option<&dyn Container>,
) -> usize {
    host.emit(event);
    selector.process_host_events(container)
}

// ── Binding ──────────────────────────────────────────────────────────────────

#[test]
fn test_attach_subscribes_to_lifecycle_events() {
    let (_selector, host, _rx) = attached();
    assert_eq!(host.listener_count(), 3);
}

#[test]
fn test_dropping_selector_unsubscribes() {
    let (selector, host, _rx) = attached();
    drop(selector);
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.emit(HostEvent::ControlsRendered), 0);
}

#[test]
fn test_controls_rendered_binds_audio_and_video() {
    for tag in ["audio", "video"] {
        let (mut selector, host, _rx) = attached();
        let container = FakeContainer::new(tag);
        assert!(!selector.is_rendered());

        emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&container));
        assert!(selector.is_rendered(), "tag {}", tag);
        assert_eq!(selector.playback_rate(), Some(1.0));
        assert_eq!(container.rates(), vec![1.0]);
        assert_eq!(selector.view().unwrap().title, "Normal");
    }
}

#[test]
fn test_other_containers_get_no_control() {
    let (mut selector, host, _rx) = attached();
    let image = FakeContainer::new("img");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&image));
    assert!(!selector.is_rendered());
    assert!(image.rates().is_empty());

    emit(&mut selector, &host, HostEvent::ControlsRendered, None);
    assert!(!selector.is_rendered());
}

#[test]
fn test_switching_to_ineligible_container_detaches() {
    let (mut selector, host, _rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));
    assert!(selector.is_rendered());

    let object = FakeContainer::new("object");
    emit(&mut selector, &host, HostEvent::ContainerChanged, Some(&object));
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&object));
    assert!(!selector.is_rendered());
    assert_eq!(selector.set_playback_rate(1.5), None);
}

#[test]
fn test_container_change_keeps_single_subscription_set() {
    let (mut selector, host, _rx) = attached();
    for _ in 0..5 {
        emit(&mut selector, &host, HostEvent::ContainerChanged, None);
    }
    assert_eq!(host.listener_count(), 3);
}

#[test]
fn test_reload_discards_events_queued_before_it() {
    let (mut selector, host, _rx) = attached();
    let audio = FakeContainer::new("audio");

    host.emit(HostEvent::ContainerChanged);
    host.emit(HostEvent::ControlsRendered);
    let handled = selector.process_host_events(Some(&audio));

    assert_eq!(handled, 1);
    assert!(!selector.is_rendered());
}

#[test]
fn test_rerender_binds_new_container_with_defaults() {
    let (mut selector, host, _rx) = attached();
    let first = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&first));
    selector.update(&Action::ToggleRateMenu).unwrap();
    selector
        .update(&Action::SelectPresetRate("2".to_string()))
        .unwrap();
    selector.update(&Action::ToggleRateMenu).unwrap();

    let second = FakeContainer::new("video");
    emit(&mut selector, &host, HostEvent::ContainerChanged, Some(&second));
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&second));

    assert_eq!(selector.playback_rate(), Some(1.0));
    assert_eq!(selector.menu_state(), MenuState::Closed);
    assert_eq!(second.rates(), vec![1.0]);
    assert_eq!(first.rates(), vec![1.0, 2.0]);
}

#[test]
fn test_controls_hidden_closes_menus_and_keeps_rate() {
    let (mut selector, host, _rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));
    selector.update(&Action::OpenCustomSlider).unwrap();
    selector
        .update(&Action::CustomRateInput("1.6".to_string()))
        .unwrap();
    assert_eq!(selector.menu_state(), MenuState::SliderOpen);

    emit(&mut selector, &host, HostEvent::ControlsHidden, Some(&audio));
    assert_eq!(selector.menu_state(), MenuState::Closed);
    assert_eq!(selector.playback_rate(), Some(1.6));
}

#[test]
fn test_default_rate_override() {
    let host = HostEvents::new();
    let mut selector = RateSelector::new(RateSettings::default()).with_default_rate("1.5");
    selector.attach(host.clone());
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));

    assert_eq!(selector.playback_rate(), Some(1.5));
    assert_eq!(selector.view().unwrap().title, "1.5x");
}

#[test]
fn test_zero_default_rate_override_is_ignored() {
    let host = HostEvents::new();
    let settings = RateSettings {
        default_value: Some(1.5),
        ..RateSettings::default()
    };
    let mut selector = RateSelector::new(settings).with_default_rate("0");
    selector.attach(host.clone());
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));

    assert_eq!(selector.playback_rate(), Some(1.5));
    assert_eq!(audio.rates(), vec![1.5]);
}

#[test]
fn test_mpv_container_sink_forwards_rates() {
    let (mut selector, host, _rx) = attached();
    let (speed_tx, mut speed_rx) = mpsc::unbounded_channel();
    let container = MpvContainer::new(Some(MediaKind::Audio), speed_tx);
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&container));
    selector
        .update(&Action::SelectPresetRate("0.75".to_string()))
        .unwrap();

    assert_eq!(speed_rx.try_recv().ok(), Some(1.0));
    assert_eq!(speed_rx.try_recv().ok(), Some(0.75));
}

// ── Keys ─────────────────────────────────────────────────────────────────────

#[test]
fn test_closed_selector_ignores_keys() {
    let (mut selector, host, mut rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));

    assert!(!selector.handle_key_event(key(KeyCode::Enter)).unwrap());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_menu_keys_move_cursor_and_pick() {
    let (mut selector, host, mut rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));
    selector.update(&Action::ToggleRateMenu).unwrap();

    let start = selector.cursor();
    let preset_count = selector.rate_config().presets.len();
    assert_eq!(selector.rate_config().presets[start].value, 1.0);

    assert!(selector.handle_key_event(key(KeyCode::Down)).unwrap());
    assert_eq!(selector.cursor(), start + 1);
    selector.handle_key_event(key(KeyCode::Enter)).unwrap();
    let expected = selector.rate_config().presets[start + 1].value.to_string();
    assert_eq!(drain(&mut rx), vec![Action::SelectPresetRate(expected)]);

    // Wrapping up from the first row lands on the custom entry.
    for _ in 0..=start + 1 {
        selector.handle_key_event(key(KeyCode::Up)).unwrap();
    }
    assert_eq!(selector.cursor(), preset_count);
    selector.handle_key_event(key(KeyCode::Enter)).unwrap();
    assert_eq!(drain(&mut rx), vec![Action::OpenCustomSlider]);

    selector.handle_key_event(key(KeyCode::Esc)).unwrap();
    assert_eq!(drain(&mut rx), vec![Action::ToggleRateMenu]);
}

#[test]
fn test_slider_keys_step_and_go_back() {
    let (mut selector, host, mut rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));
    selector.update(&Action::OpenCustomSlider).unwrap();

    selector.handle_key_event(key(KeyCode::Right)).unwrap();
    selector.handle_key_event(key(KeyCode::End)).unwrap();
    selector.handle_key_event(key(KeyCode::Esc)).unwrap();
    let actions = drain(&mut rx);
    assert_eq!(actions.len(), 3);
    match &actions[0] {
        Action::CustomRateInput(raw) => assert!((raw.parse::<f64>().unwrap() - 1.1).abs() < 1e-9),
        other => panic!("unexpected action {:?}", other),
    }
    assert_eq!(actions[1], Action::CustomRateInput("2".to_string()));
    assert_eq!(actions[2], Action::RateMenuBack);

    selector.update(&Action::RateMenuBack).unwrap();
    assert_eq!(selector.menu_state(), MenuState::MenuOpen);
}

#[test]
fn test_nudge_clamps_to_custom_range() {
    let (mut selector, host, _rx) = attached();
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));

    for _ in 0..20 {
        selector.update(&Action::NudgeRate(1)).unwrap();
    }
    assert_eq!(selector.playback_rate(), Some(2.0));
    assert_eq!(selector.menu_state(), MenuState::Closed);
}

#[test]
fn test_custom_hook_error_surfaces_from_update() {
    let host = HostEvents::new();
    let mut selector = RateSelector::new(RateSettings::default())
        .with_custom_range_callback(Arc::new(|_: f64| -> anyhow::Result<()> {
            anyhow::bail!("no listener")
        }));
    selector.attach(host.clone());
    let audio = FakeContainer::new("audio");
    emit(&mut selector, &host, HostEvent::ControlsRendered, Some(&audio));
    selector.update(&Action::OpenCustomSlider).unwrap();

    let result = selector.update(&Action::CustomRateInput("1.2".to_string()));
    assert!(result.is_err());
    assert_eq!(selector.playback_rate(), Some(1.2));
}
