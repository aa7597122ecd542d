// Playback-rate selection core: input normalization, configuration and the
// controller that keeps the selection, popups and media sink in step.

pub mod config;
pub mod controller;
pub mod normalize;

pub use config::{CustomRange, RateConfig, RatePreset, RateSettings};
pub use controller::{ActiveItem, DerivedView, MediaSink, MenuState, RateController};
pub use normalize::{normalize, ToRate, DEFAULT_PLAYBACK_RATE};
