// Playlist navigation and loading items into mpv. Every load swaps the
// active container and tells the plugins about it.

use crate::action::Action;
use crate::app::App;
use crate::host::HostEvent;
use crate::player::playlist::{Playlist, PlaylistItem};
use crate::player::MpvContainer;

impl App {
    /// Move through the playlist and play the item landed on.
    pub(super) async fn play_playlist_item(
        &mut self,
        step: fn(&mut Playlist) -> Option<&PlaylistItem>,
    ) -> anyhow::Result<()> {
        if step(&mut self.playlist).is_some() {
            self.start_current_item().await?;
        }
        Ok(())
    }

    /// Start mpv on the playlist's current item.
    pub(super) async fn start_current_item(&mut self) -> anyhow::Result<()> {
        let Some(item) = self.playlist.current().cloned() else {
            return Ok(());
        };
        let title = item.display_title();

        self.now_playing.set_item(title.clone(), item.kind);
        self.now_playing
            .set_playlist_info(self.playlist.current_index(), self.playlist.len());

        match self.player.play(&item.location, item.kind).await {
            Ok(container) => {
                self.load_container(Some(container));
                self.action_tx.send(Action::PlaybackStarted { title })?;
            }
            Err(e) => {
                tracing::error!(location = %item.location, error = %e, "failed to start mpv");
                self.load_container(None);
                self.action_tx.send(Action::ShowError(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Make `container` the active one: plugins rebind their subscriptions,
    /// then re-render against it.
    pub fn load_container(&mut self, container: Option<MpvContainer>) {
        self.container = container;
        self.emit_host_event(HostEvent::ContainerChanged);
        self.emit_host_event(HostEvent::ControlsRendered);
    }
}
