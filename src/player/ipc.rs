// Low-level mpv IPC: socket communication, and background tasks that watch
// the process, poll position/duration, and apply playback-rate changes.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::Child;
use tokio::sync::mpsc;

use crate::action::Action;

pub type MpvProcess = std::sync::Arc<tokio::sync::Mutex<Option<Child>>>;

// How long to wait for mpv's IPC socket to appear (20 * 100ms = 2s).
const SOCKET_POLL_ATTEMPTS: u32 = 20;
const SOCKET_POLL_INTERVAL_MS: u64 = 100;

/// Wait for the IPC socket to appear on disk (up to 2 seconds).
pub async fn wait_for_socket(path: &Path) {
    for _ in 0..SOCKET_POLL_ATTEMPTS {
        if path.exists() {
            return;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(SOCKET_POLL_INTERVAL_MS)).await;
    }
}

/// Send a single JSON command over a fresh IPC connection, return the response line.
pub async fn send_command(socket_path: &Path, cmd: &str) -> anyhow::Result<String> {
    let mut stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to mpv IPC socket: {}", e))?;
    let msg = format!("{}\n", cmd);
    stream.write_all(msg.as_bytes()).await?;
    let mut lines = BufReader::new(stream).lines();
    // mpv broadcasts events to every client; the reply is the first
    // line without an "event" key.
    while let Some(line) = lines.next_line().await? {
        if !is_event_line(&line) {
            return Ok(line);
        }
    }
    Err(anyhow::anyhow!("mpv closed the IPC connection without replying"))
}

fn is_event_line(line: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(line)
        .map(|val| val.get("event").is_some())
        .unwrap_or(false)
}

/// Read a numeric property, `None` when mpv has no value for it yet.
pub async fn get_number(socket_path: &Path, property: &str) -> anyhow::Result<Option<f64>> {
    let cmd = serde_json::json!({ "command": ["get_property", property] });
    let response = send_command(socket_path, &cmd.to_string()).await?;
    let val: serde_json::Value = serde_json::from_str(&response)?;
    Ok(val.get("data").and_then(|d| d.as_f64()))
}

/// `set_property speed` command for a playback rate.
pub fn speed_command(rate: f64) -> String {
    serde_json::json!({ "command": ["set_property", "speed", rate] }).to_string()
}

/// Check an mpv reply for `"error": "success"`.
pub fn ensure_success(response: &str) -> anyhow::Result<()> {
    let val: serde_json::Value = serde_json::from_str(response)?;
    match val.get("error").and_then(|e| e.as_str()) {
        Some("success") => Ok(()),
        Some(err) => Err(anyhow::anyhow!("mpv rejected command: {}", err)),
        None => Err(anyhow::anyhow!("malformed mpv reply: {}", response.trim())),
    }
}

/// Poll the child process and send PlaybackFinished when it exits.
pub fn spawn_exit_monitor(child: MpvProcess, tx: Option<mpsc::UnboundedSender<Action>>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            let mut guard = child.lock().await;
            match guard.as_mut().and_then(|c| c.try_wait().ok()) {
                Some(Some(_)) => {
                    *guard = None;
                    if let Some(tx) = &tx {
                        tx.send(Action::PlaybackFinished).ok();
                    }
                    break;
                }
                Some(None) => {} // still running
                None => break,   // no child or wait error
            }
        }
    });
}

/// Poll playback-time and duration once per second.
pub fn spawn_position_poller(socket_path: PathBuf, tx: Option<mpsc::UnboundedSender<Action>>) {
    tokio::spawn(async move {
        wait_for_socket(&socket_path).await;
        let mut last_duration = None;
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            let Ok(position) = get_number(&socket_path, "playback-time").await else {
                break;
            };
            let duration = get_number(&socket_path, "duration").await.ok().flatten();

            let Some(tx) = &tx else { continue };
            if let Some(pos) = position {
                tx.send(Action::PlaybackPosition(pos)).ok();
            }
            if duration != last_duration {
                last_duration = duration;
                tx.send(Action::PlaybackDuration(duration)).ok();
            }
        }
    });
}

/// Apply playback rates to mpv's `speed` property in arrival order. Rates
/// that pile up while a command is in flight collapse to the newest one.
/// Ends when every sender for this process is dropped.
pub fn spawn_speed_writer(socket_path: PathBuf, mut rx: mpsc::UnboundedReceiver<f64>) {
    tokio::spawn(async move {
        wait_for_socket(&socket_path).await;
        while let Some(mut rate) = rx.recv().await {
            while let Ok(newer) = rx.try_recv() {
                rate = newer;
            }
            let result = match send_command(&socket_path, &speed_command(rate)).await {
                Ok(response) => ensure_success(&response),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => tracing::debug!(rate, "mpv speed set"),
                Err(e) => tracing::warn!(rate, error = %e, "failed to set mpv speed"),
            }
        }
    });
}
