use crate::config::{NotificationContent, SiteConfig, SmtpConfig};
use crate::models::Product;
use crate::plugins::traits::{NotificationResult, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use config::ConfigError;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Port on which the relay expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct EmailNotifier {
    config: SmtpConfig,
    content: NotificationContent,
    site_url: String,
    origin: String,
    from: Mailbox,
    to: Mailbox,
    cc: Option<Mailbox>,
}

fn parse_mailbox(field: &str, value: &str) -> Result<Mailbox> {
    value
        .parse::<Mailbox>()
        .map_err(|e| AppError::Config(ConfigError::Message(format!("Invalid {} address '{}': {}", field, value, e))))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig, content: NotificationContent, site: &SiteConfig) -> Result<Self> {
        let from = parse_mailbox("from", &config.from_address)?;
        let to = parse_mailbox("to", &config.to_address)?;
        let cc = match config.cc_address.as_deref().filter(|cc| !cc.is_empty()) {
            Some(cc) => Some(parse_mailbox("cc", cc)?),
            None => None,
        };

        Ok(Self {
            config,
            content,
            site_url: site.url.clone(),
            origin: site.origin.clone(),
            from,
            to,
            cc,
        })
    }

    fn format_html_body(&self, products: &[Product]) -> String {
        let items = products
            .iter()
            .map(|p| {
                format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    escape_html(&p.absolute_url(&self.origin)),
                    escape_html(&p.name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<html><body><h1>{}</h1>
<p>{}: <a href="{}">{}</a></p>
<ul>
{}
</ul></body></html>"#,
            escape_html(&self.content.heading),
            escape_html(&self.content.listing_label),
            escape_html(&self.site_url),
            escape_html(&self.site_url),
            items
        )
    }

    fn format_text_body(&self, products: &[Product]) -> String {
        let mut text = String::new();

        text.push_str(&format!("{}\n\n", self.content.heading));
        text.push_str(&format!("{}: {}\n\n", self.content.listing_label, self.site_url));
        for product in products {
            text.push_str(&format!("- {} ({})\n", product.name, product.absolute_url(&self.origin)));
        }

        text
    }

    pub fn build_message(&self, products: &[Product]) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.content.subject.clone());
        if let Some(cc) = &self.cc {
            builder = builder.cc(cc.clone());
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_PLAIN)
                        .body(self.format_text_body(products)),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(self.format_html_body(products)),
                ),
        )?;

        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let builder = if !self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        } else if self.config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
        };

        Ok(builder
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build())
    }

    fn recipient_count(&self) -> usize {
        1 + usize::from(self.cc.is_some())
    }
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &str {
        "Email Notifier"
    }

    fn plugin_type(&self) -> &str {
        "email"
    }

    async fn notify(&self, products: &[Product]) -> Result<NotificationResult> {
        if products.is_empty() {
            return Err(AppError::Internal("notify called without products".to_string()));
        }

        let email = self.build_message(products)?;
        let mailer = self.transport()?;

        mailer.send(email).await?;
        tracing::debug!(
            "Sent {} products to {} via {}:{}",
            products.len(),
            self.to,
            self.config.host,
            self.config.port
        );

        Ok(NotificationResult {
            success: true,
            message_id: Some(format!("email-{}", chrono::Utc::now().timestamp())),
            recipients: self.recipient_count(),
        })
    }

    async fn test_connection(&self) -> Result<bool> {
        let mailer = self.transport()?;
        Ok(mailer.test_connection().await?)
    }
}
