//! Terminal menu standing in for a tray icon.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::agent;
use super::settings::{self, ShellSettings};
use super::supervisor::ServerSupervisor;
use crate::config::{expand_tilde, AppConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    OpenDashboard,
    ToggleServer,
    ConfigureAgent,
    ChangeDataFolder,
    RemoveAgent,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "o" | "open" => Some(Self::OpenDashboard),
            "2" | "s" | "server" => Some(Self::ToggleServer),
            "3" | "a" | "agent" => Some(Self::ConfigureAgent),
            "4" | "d" | "data" => Some(Self::ChangeDataFolder),
            "5" | "r" | "remove" => Some(Self::RemoveAgent),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Answer to "already registered": replace the entry, keep it, or back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentChoice {
    Update,
    Keep,
    Cancel,
}

impl AgentChoice {
    /// Empty input picks `Update`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "u" | "update" => Some(Self::Update),
            "k" | "keep" => Some(Self::Keep),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Interpret a yes/no answer, with empty input meaning `default`.
pub fn parse_yes_no(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

struct Shell {
    config: AppConfig,
    settings_path: PathBuf,
    registration_path: PathBuf,
    data_path: PathBuf,
    supervisor: ServerSupervisor,
    prompt: Prompt,
}

impl Shell {
    fn supervisor_for(config: &AppConfig, data_path: &Path) -> Result<ServerSupervisor> {
        Ok(ServerSupervisor::for_dashboard(data_path)?
            .grace_period(Duration::from_millis(config.shell.grace_period_ms)))
    }

    fn print_menu(&mut self) {
        let running = self.supervisor.is_running();
        println!();
        println!("ContextBuddy");
        println!("  data:   {}", self.data_path.display());
        println!("  server: {}", self.supervisor.state());
        println!(
            "  agent:  {}",
            if agent::is_registered(&self.registration_path) {
                "registered"
            } else {
                "not registered"
            }
        );
        println!();
        println!("  1) Open dashboard");
        println!("  2) {} server", if running { "Stop" } else { "Start" });
        println!("  3) Configure agent");
        println!("  4) Change data folder");
        println!("  5) Remove from agent");
        println!("  q) Quit");
    }

    async fn start_server(&mut self) {
        if let Err(e) = self.supervisor.start().await {
            tracing::error!(error = %e, "failed to start dashboard server");
            println!("Server failed to start: {e:#}");
        } else {
            println!("Dashboard at {}", self.config.dashboard_url());
        }
    }

    async fn toggle_server(&mut self) -> Result<()> {
        if self.supervisor.is_running() {
            self.supervisor.stop().await?;
        } else {
            self.start_server().await;
        }
        Ok(())
    }

    fn open_dashboard(&mut self) {
        let url = self.config.dashboard_url();
        if !self.supervisor.is_running() {
            println!("Server is not running; start it first.");
            return;
        }
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, url = %url, "failed to open browser");
            println!("Open {url} in your browser.");
        }
    }

    async fn configure_agent(&mut self) -> Result<()> {
        if agent::is_registered(&self.registration_path) {
            println!(
                "ContextBuddy is already in {}.",
                self.registration_path.display()
            );
            let answer = self
                .prompt
                .ask("[U]pdate to this install / [K]eep current / [C]ancel [U]: ")
                .await?;
            match answer.as_deref().and_then(AgentChoice::parse) {
                Some(AgentChoice::Update) => {}
                Some(AgentChoice::Keep) => {
                    println!("Kept the current entry.");
                    return Ok(());
                }
                Some(AgentChoice::Cancel) | None => return Ok(()),
            }
        }
        self.write_registration()
    }

    fn write_registration(&self) -> Result<()> {
        let registration = agent::Registration::for_current_exe(&self.data_path)?;
        let backup = agent::register(&self.registration_path, &registration)?;
        println!(
            "ContextBuddy added to {}.",
            self.registration_path.display()
        );
        if let Some(backup) = backup {
            println!("Previous file saved as {}.", backup.display());
        }
        Ok(())
    }

    fn remove_agent(&self) {
        match agent::unregister(&self.registration_path) {
            Ok(true) => println!(
                "ContextBuddy removed from {}.",
                self.registration_path.display()
            ),
            Ok(false) => println!("ContextBuddy was not registered."),
            Err(e) => println!("Could not update agent config: {e:#}"),
        }
    }

    async fn change_data_folder(&mut self) -> Result<()> {
        let Some(answer) = self
            .prompt
            .ask(&format!("Data folder [{}]: ", self.data_path.display()))
            .await?
        else {
            return Ok(());
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(());
        }

        self.data_path = expand_tilde(answer);
        settings::save(
            &self.settings_path,
            &ShellSettings {
                data_path: Some(self.data_path.to_string_lossy().into_owned()),
            },
        )?;

        let was_running = self.supervisor.is_running();
        self.supervisor.stop().await?;
        self.supervisor = Self::supervisor_for(&self.config, &self.data_path)?;
        if was_running {
            self.start_server().await;
        }
        if agent::is_registered(&self.registration_path) {
            self.write_registration()?;
        }
        Ok(())
    }

    async fn first_run(&mut self) -> Result<()> {
        println!("Welcome to ContextBuddy.");
        if let Some(answer) = self
            .prompt
            .ask(&format!(
                "Where should your notes live? [{}]: ",
                self.data_path.display()
            ))
            .await?
        {
            if !answer.trim().is_empty() {
                self.data_path = expand_tilde(answer.trim());
                self.supervisor = Self::supervisor_for(&self.config, &self.data_path)?;
            }
        }
        settings::save(
            &self.settings_path,
            &ShellSettings {
                data_path: Some(self.data_path.to_string_lossy().into_owned()),
            },
        )?;

        let register = self
            .prompt
            .ask("Register ContextBuddy with your agent (~/.mcp.json)? [Y/n]: ")
            .await?
            .is_some_and(|a| parse_yes_no(&a, true));
        if register {
            self.configure_agent().await?;
        }
        Ok(())
    }

    async fn run_menu(&mut self) -> Result<()> {
        loop {
            self.print_menu();
            let Some(input) = self.prompt.ask("> ").await? else {
                return Ok(());
            };
            match MenuChoice::parse(&input) {
                Some(MenuChoice::OpenDashboard) => self.open_dashboard(),
                Some(MenuChoice::ToggleServer) => self.toggle_server().await?,
                Some(MenuChoice::ConfigureAgent) => {
                    if let Err(e) = self.configure_agent().await {
                        println!("Could not update agent config: {e:#}");
                    }
                }
                Some(MenuChoice::RemoveAgent) => self.remove_agent(),
                Some(MenuChoice::ChangeDataFolder) => self.change_data_folder().await?,
                Some(MenuChoice::Quit) => return Ok(()),
                None => println!("Unknown choice: {}", input.trim()),
            }
        }
    }
}

/// Run the shell until the user quits or stdin closes. The dashboard server is started
/// on entry and always stopped on exit.
pub async fn run(config: AppConfig) -> Result<()> {
    let settings_path = expand_tilde(&config.shell.settings_path);
    let registration_path = expand_tilde(&config.shell.registration_path);
    let saved = settings::load(&settings_path);
    let data_path = saved
        .as_ref()
        .and_then(ShellSettings::data_path)
        .unwrap_or_else(|| config.resolved_data_path());

    let mut shell = Shell {
        supervisor: Shell::supervisor_for(&config, &data_path)?,
        config,
        settings_path,
        registration_path,
        data_path,
        prompt: Prompt::new(),
    };

    if saved.is_none() {
        shell.first_run().await?;
    }

    shell.start_server().await;
    let result = shell.run_menu().await;
    shell.supervisor.stop().await?;
    tracing::info!("shell exited");
    result
}
