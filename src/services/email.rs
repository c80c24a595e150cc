//! Email service for account notifications

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Welcome mail sent after sign-up
    pub async fn send_registration_confirmation(&self, to: &str, full_name: Option<&str>) -> AppResult<()> {
        let subject = "Welcome to Bookshelf";
        let body = registration_body(full_name);
        self.send_email(to, subject, &body).await
    }

    /// Fire-and-forget variant; failures are logged, never surfaced to the caller
    pub fn send_registration_confirmation_in_background(&self, to: String, full_name: Option<String>) {
        if !self.is_enabled() {
            tracing::debug!(to = %to, "Email disabled, skipping registration confirmation");
            return;
        }

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service
                .send_registration_confirmation(&to, full_name.as_deref())
                .await
            {
                tracing::warn!(to = %to, error = %e, "Failed to send registration confirmation");
            }
        });
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Bookshelf");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) = (
            &self.config.smtp_username,
            &self.config.smtp_password,
        ) {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Plain text wrapped in paragraphs; text is escaped since it carries user input
fn html_body(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<html><body><p>{}</p></body></html>",
        escaped.replace("\n\n", "</p><p>")
    )
}

fn registration_body(full_name: Option<&str>) -> String {
    let greeting = match full_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello {},", name),
        None => "Hello,".to_string(),
    };

    format!(
        r#"
{greeting}

Your Bookshelf account has been created. You can now sign in, browse the
catalog and request books to borrow.

If you did not create this account, please contact the library staff.
"#,
        greeting = greeting
    )
}
