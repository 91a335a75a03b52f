use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "catalog-watcher", version, about = "Emails when new products appear on a category page")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON); defaults to config/default if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub mail_host: Option<String>,
    #[arg(long, global = true)]
    pub mail_port: Option<u16>,
    /// Login user
    #[arg(long, global = true)]
    pub mail_user: Option<String>,
    /// Login password
    #[arg(long, global = true)]
    pub mail_password: Option<String>,
    #[arg(long, global = true)]
    pub mail_to: Option<String>,
    #[arg(long, global = true)]
    pub mail_cc: Option<String>,
    #[arg(long, global = true)]
    pub mail_from: Option<String>,

    /// Home Assistant URL (e.g. http://homeassistant:8123)
    #[arg(long, global = true)]
    pub ha_url: Option<String>,
    /// Home Assistant long-lived access token
    #[arg(long, global = true)]
    pub ha_token: Option<String>,
    /// Home Assistant entity ID
    #[arg(long, global = true)]
    pub ha_entity: Option<String>,

    /// Seconds between checks
    #[arg(long, global = true)]
    pub interval_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Poll the page until interrupted (default)
    Run,
    /// Fetch once, print the products and exit; exits 1 when the fetch fails
    Check,
    /// Connect and authenticate to the SMTP relay without sending mail
    TestSmtp,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Flags take precedence over file and environment settings.
    pub fn apply(&self, config: &mut AppConfig) {
        let smtp = &mut config.notifications.smtp;
        if let Some(host) = &self.mail_host {
            smtp.host = host.clone();
        }
        if let Some(port) = self.mail_port {
            smtp.port = port;
        }
        if let Some(user) = &self.mail_user {
            smtp.username = user.clone();
        }
        if let Some(password) = &self.mail_password {
            smtp.password = password.clone();
        }
        if let Some(to) = &self.mail_to {
            smtp.to_address = to.clone();
        }
        if let Some(cc) = &self.mail_cc {
            smtp.cc_address = Some(cc.clone());
        }
        if let Some(from) = &self.mail_from {
            smtp.from_address = from.clone();
        }

        let status = &mut config.status;
        if let Some(url) = &self.ha_url {
            status.base_url = Some(url.clone()).filter(|u| !u.is_empty());
        }
        if let Some(token) = &self.ha_token {
            status.token = Some(token.clone());
        }
        if let Some(entity) = &self.ha_entity {
            status.entity = entity.clone();
        }

        if let Some(interval) = self.interval_secs {
            config.scheduler.interval_secs = interval;
        }
    }
}
