//! Process-control collaborators
//!
//! Skip delivery (HTTP control API or a signal to the controller's systemd
//! unit) and system power-off.

use async_trait::async_trait;
use duodeck_common::config::{ControlConfig, SkipTransport};
use duodeck_common::control::{SkipResponse, SKIP_PATH};
use duodeck_common::{Error, Result};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use crate::actions::{PowerControl, SkipTrigger};

/// `POST /skip` on the crossfade controller's control API
pub struct HttpSkipTrigger {
    client: reqwest::Client,
    url: String,
}

impl HttpSkipTrigger {
    pub fn new(config: &ControlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: format!("{}{}", config.controller_url.trim_end_matches('/'), SKIP_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SkipTrigger for HttpSkipTrigger {
    async fn request_skip(&self) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to reach {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("{} returned {}", self.url, status)));
        }

        let body: SkipResponse = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("Invalid response from {}: {}", self.url, e)))?;
        debug!("skip accepted={} pending={}", body.accepted, body.pending);
        Ok(())
    }
}

/// `systemctl`, optionally through sudo
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    use_sudo: bool,
}

impl Systemctl {
    pub fn new(use_sudo: bool) -> Self {
        Self::with_program("systemctl", use_sudo)
    }

    pub fn with_program(program: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            program: program.into(),
            use_sudo,
        }
    }

    /// Program and arguments for `systemctl <args>`
    pub fn command_line(&self, args: &[&str]) -> (String, Vec<String>) {
        let args = args.iter().map(|a| a.to_string());
        if self.use_sudo {
            let mut line = vec![self.program.clone()];
            line.extend(args);
            ("sudo".to_string(), line)
        } else {
            (self.program.clone(), args.collect())
        }
    }

    pub async fn run(&self, args: &[&str]) -> Result<()> {
        let (program, line) = self.command_line(args);
        debug!("{} {}", program, line.join(" "));

        let output = Command::new(&program)
            .args(&line)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Command {
                command: format!("{} {}", program, line.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// `systemctl kill -s <signal> <unit>`
pub struct ServiceSignalSkipTrigger {
    systemctl: Systemctl,
    service: String,
    signal: String,
}

impl ServiceSignalSkipTrigger {
    pub fn new(systemctl: Systemctl, service: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            systemctl,
            service: service.into(),
            signal: signal.into(),
        }
    }
}

#[async_trait]
impl SkipTrigger for ServiceSignalSkipTrigger {
    async fn request_skip(&self) -> Result<()> {
        self.systemctl
            .run(&["kill", "-s", &self.signal, &self.service])
            .await
    }
}

/// `systemctl poweroff`
pub struct SystemctlPower {
    systemctl: Systemctl,
}

impl SystemctlPower {
    pub fn new(systemctl: Systemctl) -> Self {
        Self { systemctl }
    }
}

#[async_trait]
impl PowerControl for SystemctlPower {
    async fn power_off(&self) -> Result<()> {
        self.systemctl.run(&["poweroff"]).await
    }
}

/// Skip trigger for the configured transport
pub fn skip_trigger(config: &ControlConfig) -> Result<Arc<dyn SkipTrigger>> {
    Ok(match config.skip_transport {
        SkipTransport::Http => Arc::new(HttpSkipTrigger::new(config)?),
        SkipTransport::Signal => Arc::new(ServiceSignalSkipTrigger::new(
            Systemctl::new(config.use_sudo),
            config.service_name.clone(),
            config.skip_signal.clone(),
        )),
    })
}
