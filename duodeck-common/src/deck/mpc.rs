//! `mpc` command-line adapter for one MPD instance

use super::status::{parse_outputs, parse_position, parse_volume, OutputState};
use super::{DeckId, PlaybackPort, Track, TrackPosition, Volume};
use crate::config::DeckConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Playback port backed by the `mpc` client
#[derive(Debug, Clone)]
pub struct MpcPort {
    id: DeckId,
    host: Option<String>,
    program: String,
}

impl MpcPort {
    pub fn new(id: DeckId, host: Option<String>, program: impl Into<String>) -> Self {
        Self {
            id,
            host,
            program: program.into(),
        }
    }

    /// Build both deck adapters from configuration
    pub fn pair(config: &DeckConfig) -> [MpcPort; 2] {
        config
            .ports
            .map(|port| MpcPort::new(DeckId(port), config.host.clone(), config.mpc_program.clone()))
    }

    fn command_line(&self, args: &[&str]) -> Vec<String> {
        let mut line = Vec::with_capacity(args.len() + 4);
        if let Some(host) = &self.host {
            line.push("-h".to_string());
            line.push(host.clone());
        }
        line.push("-p".to_string());
        line.push(self.id.port().to_string());
        line.extend(args.iter().map(|a| a.to_string()));
        line
    }

    /// Run `mpc` with `args`, returning trimmed stdout
    ///
    /// A non-zero exit status becomes [`Error::Command`] carrying stderr.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let line = self.command_line(args);
        debug!(deck = %self.id, args = ?args, "mpc");

        let output = Command::new(&self.program)
            .args(&line)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Command {
                command: format!("{} {}", self.program, line.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn status(&self) -> Result<String> {
        self.run(&["status"]).await
    }
}

#[async_trait]
impl PlaybackPort for MpcPort {
    fn id(&self) -> DeckId {
        self.id
    }

    async fn play(&self, track: &Track) -> Result<()> {
        info!("[{}] play: {}", self.id, track);
        if let Err(e) = self.ensure_outputs_enabled().await {
            warn!("[{}] unable to check outputs: {}", self.id, e.diagnostic());
        }
        self.run(&["clear"]).await?;
        self.run(&["add", track.path()]).await?;
        self.run(&["play"]).await?;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("[{}] stop", self.id);
        self.run(&["stop"]).await?;
        self.run(&["clear"]).await?;
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.run(&["play"]).await.map(|_| ())
    }

    async fn pause_if_playing(&self) -> Result<()> {
        // Best effort: a refusal here only means there was nothing to pause
        match self.run(&["pause-if-playing"]).await {
            Ok(_) => Ok(()),
            Err(Error::Command { .. }) => {
                debug!("[{}] pause-if-playing: not playing", self.id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn set_volume(&self, volume: Volume) -> Result<()> {
        let level = volume.level().to_string();
        self.run(&["volume", &level]).await.map(|_| ())
    }

    async fn volume(&self) -> Result<Volume> {
        let status = self.status().await?;
        Ok(Volume::new(parse_volume(&status)))
    }

    async fn position(&self) -> Result<Option<TrackPosition>> {
        let status = self.status().await?;
        Ok(parse_position(&status))
    }

    async fn seek(&self, offset: Duration) -> Result<()> {
        let secs = offset.as_secs().to_string();
        self.run(&["seek", &secs]).await.map(|_| ())
    }

    async fn ensure_outputs_enabled(&self) -> Result<()> {
        let text = self.run(&["outputs"]).await?;
        let outputs = parse_outputs(&text);
        if outputs.is_empty() {
            warn!("[{}] unable to read outputs", self.id);
            return Ok(());
        }

        for output in outputs.iter().filter(|o| o.state == OutputState::Disabled) {
            info!("[{}] enabling output {} ({})", self.id, output.id, output.name);
            let id = output.id.to_string();
            if let Err(e) = self.run(&["enable", &id]).await {
                warn!("[{}] enabling output {} failed: {}", self.id, output.id, e.diagnostic());
            }
        }
        Ok(())
    }
}
