//! Background dashboard server process.
//!
//! ```text
//! Stopped --start--> Starting --alive after grace--> Running { pid }
//!                        \--exited during grace---> Failed(reason)
//! Running --stop--> Stopped
//! Running --child exits--> Failed(reason)   (noticed on the next refresh)
//! ```

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::config::DATA_PATH_ENV;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running { pid: u32 },
    Failed(String),
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Starting => f.write_str("starting"),
            Self::Running { pid } => write!(f, "running (pid {pid})"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

pub struct ServerSupervisor {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    grace: Duration,
    child: Option<Child>,
    state: ServerState,
}

impl ServerSupervisor {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            grace: Duration::from_millis(1000),
            child: None,
            state: ServerState::Stopped,
        }
    }

    /// Supervise `<this executable> web`, pointed at `data_path`.
    pub fn for_dashboard(data_path: &Path) -> Result<Self> {
        let exe = std::env::current_exe().context("failed to locate current executable")?;
        Ok(Self::new(exe.to_string_lossy(), ["web"])
            .env(DATA_PATH_ENV, data_path.to_string_lossy()))
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Re-check a running child and move to `Failed` if it has exited.
    pub fn refresh(&mut self) -> &ServerState {
        if !matches!(self.state, ServerState::Running { .. }) {
            return &self.state;
        }
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::warn!(%status, "dashboard server exited");
                    self.child = None;
                    self.state = ServerState::Failed(format!("server exited ({status})"));
                }
                Ok(None) => {}
                Err(e) => {
                    self.state = ServerState::Failed(format!("failed to poll server: {e}"));
                }
            }
        }
        &self.state
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.refresh(), ServerState::Running { .. })
    }

    /// Spawn the server and wait out the grace period. Starting an already running server
    /// is a no-op that returns its pid.
    pub async fn start(&mut self) -> Result<u32> {
        if let ServerState::Running { pid } = *self.refresh() {
            tracing::info!(pid, "dashboard server already running");
            return Ok(pid);
        }

        self.state = ServerState::Starting;
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.state = ServerState::Failed(format!("failed to spawn: {e}"));
                bail!("failed to spawn {}: {e}", self.program);
            }
        };

        if let Some(stdout) = child.stdout.take() {
            forward_output(stdout, "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(stderr, "stderr");
        }

        tokio::time::sleep(self.grace).await;

        match child.try_wait() {
            Ok(None) => {
                let Some(pid) = child.id() else {
                    self.state = ServerState::Failed("server exited during startup".into());
                    bail!("dashboard server exited during startup");
                };
                tracing::info!(pid, "dashboard server started");
                self.child = Some(child);
                self.state = ServerState::Running { pid };
                Ok(pid)
            }
            Ok(Some(status)) => {
                let reason = format!("server exited during startup ({status})");
                self.state = ServerState::Failed(reason.clone());
                bail!("dashboard {reason}");
            }
            Err(e) => {
                self.state = ServerState::Failed(format!("failed to poll server: {e}"));
                bail!("failed to poll dashboard server: {e}");
            }
        }
    }

    /// Kill and reap the child, if any.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to kill dashboard server");
            }
            tracing::info!("dashboard server stopped");
        }
        self.state = ServerState::Stopped;
        Ok(())
    }
}

fn forward_output<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::info!(target: "contextbuddy::web_child", stream, "[web] {line}");
        }
    });
}
