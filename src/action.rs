// Every user interaction, player report, and internal event is represented as
// an Action variant. The App event loop dispatches these to component handlers.

/// All events flowing through the app: key-driven commands, rate-selector
/// interactions, and mpv reports. The [`App`](crate::app::App) event loop
/// dispatches each variant to the appropriate handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,

    TogglePlayPause,
    NextItem,
    PrevItem,
    PlaybackStarted {
        title: String,
    },
    PlaybackLoading,
    PlaybackFinished,
    PlaybackPosition(f64),
    PlaybackDuration(Option<f64>),

    // Rate selector. Rate payloads are raw values as the list item or
    // slider produced them; the controller normalizes them.
    ToggleRateMenu,
    SelectPresetRate(String),
    OpenCustomSlider,
    CloseCustomSlider,
    RateMenuBack,
    CustomRateInput(String),
    /// Move the rate by whole custom-range steps without opening any popup.
    NudgeRate(i32),
    /// Reported by the custom-range hook after a slider pick.
    CustomRateChosen(f64),

    ShowControls,
    HideControls,

    ShowError(String),
    ClearError,
    ShowHelp,
    HideHelp,
    Tick,
}
