use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub extractor: ExtractorConfig,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationsConfig,
    pub status: StatusConfig,
    pub logging: LoggingConfig,
}

/// The single category page being watched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    /// Prefix for the relative product links found on the page.
    pub origin: String,
    /// Appears once client-side rendering has finished.
    pub ready_selector: String,
    pub content_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub card_selector: String,
    pub name_selector: String,
    pub link_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub user_agent: Option<String>,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
    pub check_on_start: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub smtp: SmtpConfig,
    pub content: NotificationContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
    pub cc_address: Option<String>,
    pub use_tls: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    pub subject: String,
    pub heading: String,
    pub listing_label: String,
}

/// Home Assistant state reporting. Disabled while `base_url` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub entity: String,
    pub friendly_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://www.hofweb.nl/groente-aardappels/2e-klas-groentes".to_string(),
            origin: "https://www.hofweb.nl".to_string(),
            ready_selector: ".info-container-wrapper .name".to_string(),
            content_selector: ".category--products-wrapper".to_string(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            card_selector: ".product-card:not(.unavailable)".to_string(),
            name_selector: ".name".to_string(),
            link_selector: "a.image".to_string(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 60,
            user_agent: None,
            chrome_path: None,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            check_on_start: true,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: "user@example.com".to_string(),
            password: "secret".to_string(),
            from_address: "from@example.com".to_string(),
            to_address: "to@example.com".to_string(),
            cc_address: Some("cc@example.com".to_string()),
            use_tls: true,
            timeout_secs: 30,
        }
    }
}

impl Default for NotificationContent {
    fn default() -> Self {
        Self {
            subject: "Nieuwe 2e klas groentes beschikbaar op hofweb.nl".to_string(),
            heading: "Nieuwe 2e klas groentes bij Hofweb".to_string(),
            listing_label: "Alle producten".to_string(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            entity: "sensor.hofweb_checker".to_string(),
            friendly_name: "Hofweb checker".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "catalog_watcher=info".to_string(),
            directory: None,
            file_prefix: "catalog-watcher.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Layers built-in defaults, an optional config file and `WATCHER__*`
    /// environment variables. Not validated; callers run `validate` after
    /// applying command line overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let mut builder = Config::builder().add_source(defaults);
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("config/default").required(false)),
        };

        let s = builder
            // e.g. WATCHER__NOTIFICATIONS__SMTP__HOST=mail.example.org
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = std::env::var("CHROME_PATH").ok();
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.site.url).is_err() {
            return Err(ConfigError::Message("Invalid site URL format".into()));
        }

        if Url::parse(&self.site.origin).is_err() {
            return Err(ConfigError::Message("Invalid site origin format".into()));
        }

        for (name, selector) in [
            ("site.ready_selector", &self.site.ready_selector),
            ("site.content_selector", &self.site.content_selector),
            ("extractor.card_selector", &self.extractor.card_selector),
            ("extractor.name_selector", &self.extractor.name_selector),
            ("extractor.link_selector", &self.extractor.link_selector),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", name)));
            }
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler interval_secs must be greater than 0".into()));
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.notifications.smtp.timeout_secs == 0 {
            return Err(ConfigError::Message("SMTP timeout_secs must be greater than 0".into()));
        }

        if let Some(base_url) = &self.status.base_url {
            if Url::parse(base_url).is_err() {
                return Err(ConfigError::Message("Invalid status base_url format".into()));
            }
            if self.status.token.as_deref().is_none_or(|t| t.is_empty()) {
                return Err(ConfigError::Message("Status token is required when base_url is set".into()));
            }
            if self.status.entity.is_empty() {
                return Err(ConfigError::Message("Status entity must not be empty".into()));
            }
        }

        Ok(())
    }
}
