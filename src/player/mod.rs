// mpv process management. Each media item gets its own mpv process with an
// IPC socket; the item's container hands out sinks that drive mpv's speed.

pub mod ipc;
pub mod playlist;

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::host::{Container, MediaKind};
use crate::rate::MediaSink;
use ipc::MpvProcess;

pub struct MpvPlayer {
    pub socket_path: PathBuf,
    action_tx: Option<mpsc::UnboundedSender<Action>>,
    child: MpvProcess,
}

impl Default for MpvPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MpvPlayer {
    pub fn new() -> Self {
        let pid = std::process::id();
        Self {
            socket_path: PathBuf::from(format!("/tmp/rateplay-mpv-{}.sock", pid)),
            action_tx: None,
            child: std::sync::Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    pub fn set_action_tx(&mut self, tx: mpsc::UnboundedSender<Action>) {
        self.action_tx = Some(tx);
    }

    /// Spawn mpv for `location` and return the container describing it.
    /// Audio items run with `--no-video`; video items get mpv's own window.
    pub async fn play(
        &mut self,
        location: &str,
        kind: Option<MediaKind>,
    ) -> anyhow::Result<MpvContainer> {
        if let Some(tx) = &self.action_tx {
            tx.send(Action::PlaybackLoading).ok();
        }

        self.stop().await?;
        let _ = std::fs::remove_file(&self.socket_path);

        let mut command = Command::new("mpv");
        if kind != Some(MediaKind::Video) {
            command.arg("--no-video");
        }
        let child = command
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .arg(location)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::info!(location, ?kind, "spawned mpv");

        *self.child.lock().await = Some(child);

        ipc::spawn_exit_monitor(self.child.clone(), self.action_tx.clone());
        ipc::spawn_position_poller(self.socket_path.clone(), self.action_tx.clone());

        let (speed_tx, speed_rx) = mpsc::unbounded_channel();
        ipc::spawn_speed_writer(self.socket_path.clone(), speed_rx);

        Ok(MpvContainer { kind, speed_tx })
    }

    /// Toggle pause via IPC.
    pub async fn toggle_pause(&self) -> anyhow::Result<()> {
        ipc::send_command(&self.socket_path, r#"{"command":["cycle","pause"]}"#).await?;
        Ok(())
    }

    /// Stop playback by quitting mpv.
    pub async fn stop(&self) -> anyhow::Result<()> {
        let _ = ipc::send_command(&self.socket_path, r#"{"command":["quit"]}"#).await;
        let _ = std::fs::remove_file(&self.socket_path);
        let mut guard = self.child.lock().await;
        if let Some(ref mut child) = *guard {
            let _ = child.kill().await;
        }
        *guard = None;
        Ok(())
    }
}

impl Drop for MpvPlayer {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.child.try_lock() {
            if let Some(ref mut child) = *guard {
                let _ = child.start_kill();
            }
            *guard = None;
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// One loaded mpv item. Sinks created from it feed that process's speed
/// writer; once the item is replaced their rates go nowhere.
#[derive(Debug, Clone)]
pub struct MpvContainer {
    kind: Option<MediaKind>,
    speed_tx: mpsc::UnboundedSender<f64>,
}

impl MpvContainer {
    pub fn new(kind: Option<MediaKind>, speed_tx: mpsc::UnboundedSender<f64>) -> Self {
        Self { kind, speed_tx }
    }
}

impl Container for MpvContainer {
    fn tag_name(&self) -> &str {
        self.kind.map_or("object", MediaKind::tag_name)
    }

    fn media_sink(&self) -> Box<dyn MediaSink + Send> {
        Box::new(MpvSink {
            speed_tx: self.speed_tx.clone(),
        })
    }
}

pub struct MpvSink {
    speed_tx: mpsc::UnboundedSender<f64>,
}

impl MediaSink for MpvSink {
    fn set_playback_rate(&mut self, rate: f64) {
        if self.speed_tx.send(rate).is_err() {
            tracing::debug!(rate, "mpv process gone, rate dropped");
        }
    }
}
