// Library root: re-exports all modules so integration tests can `use rateplay::*`.

pub mod action;
pub mod app;
pub mod components;
pub mod config;
pub mod host;
pub mod logging;
pub mod player;
pub mod rate;
pub mod theme;
pub mod tui;
pub mod ui;
