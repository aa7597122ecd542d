// Key and mouse handling: maps input to actions. Any input also counts as
// activity for the control bar's auto-hide.

use crate::action::Action;
use crate::app::App;
use crate::components::Component;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        use KeyCode::Char;

        self.note_activity()?;

        // Help overlay consumes all keys
        if self.show_help {
            return self.action_tx.send(Action::HideHelp).map_err(Into::into);
        }

        // An open speed menu or slider owns the keyboard
        if self.rate_selector.handle_key_event(key)? {
            return Ok(());
        }

        match key.code {
            Char('q') => self.action_tx.send(Action::Quit)?,
            Char('?') => self.action_tx.send(Action::ShowHelp)?,
            Char(' ') => self.action_tx.send(Action::TogglePlayPause)?,
            Char('n') => self.action_tx.send(Action::NextItem)?,
            Char('p') => self.action_tx.send(Action::PrevItem)?,
            Char('s') if self.rate_selector.is_rendered() => {
                self.action_tx.send(Action::ToggleRateMenu)?
            }
            Char('+') | Char('=') => self.action_tx.send(Action::NudgeRate(1))?,
            Char('-') => self.action_tx.send(Action::NudgeRate(-1))?,
            _ => {}
        }
        Ok(())
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> anyhow::Result<()> {
        self.note_activity()?;
        self.rate_selector.handle_mouse_event(mouse);
        Ok(())
    }

    fn note_activity(&mut self) -> anyhow::Result<()> {
        self.idle_ticks = 0;
        if !self.play_controls.is_visible() {
            self.action_tx.send(Action::ShowControls)?;
        }
        Ok(())
    }
}
