//! Email notifier for session reminders

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::MultiPart, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;
use crate::services::reminder::{ReminderNotifier, SessionReminder};

/// SMTP-backed reminder notifier.
///
/// The transport is built once from configuration; every reminder goes
/// to the single configured recipient.
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    recipient: String,
}

impl EmailService {
    /// Build the SMTP transport from configuration.
    pub fn new(config: &EmailConfig, recipient: String) -> Result<Self> {
        if config.smtp_host.is_empty() {
            return Err(anyhow!(
                "SMTP host not configured. Set email.smtp_host or disable email."
            ));
        }

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .credentials(creds)
            .port(config.smtp_port)
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_address);

        Ok(Self {
            mailer,
            from,
            recipient,
        })
    }

    fn build_message(&self, reminder: &SessionReminder) -> Result<Message> {
        let subject = format!("Reminder: \"{}\" starts soon!", reminder.session_title);

        let resource_line = reminder
            .resource_title
            .as_deref()
            .map(|title| format!("Linked resource: {}\n", title))
            .unwrap_or_default();
        let text = format!(
            "Hi! Your study session \"{}\" starts at {}.\n{}Stay focused!",
            reminder.session_title,
            reminder.start_time.format("%H:%M"),
            resource_line,
        );

        let resource_html = reminder
            .resource_title
            .as_deref()
            .map(|title| format!("<p>Resource: {}</p>", title))
            .unwrap_or_default();
        let html = format!(
            "<div style=\"font-family: sans-serif;\">\
             <h2>Time to focus!</h2>\
             <p>Your session <b>\"{}\"</b> starts at {}.</p>\
             {}\
             <hr>\
             <p style=\"font-size: 12px;\">This is an automatic reminder from your Study Planner.</p>\
             </div>",
            reminder.session_title,
            reminder.start_time.format("%H:%M"),
            resource_html,
        );

        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(self
                .recipient
                .parse()
                .map_err(|e| anyhow!("Invalid recipient address: {}", e))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| anyhow!("Failed to build email: {}", e))
    }
}

#[async_trait]
impl ReminderNotifier for EmailService {
    async fn notify(&self, reminder: &SessionReminder) -> Result<()> {
        let email = self.build_message(reminder)?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

/// Logging stand-in used when email is disabled. Reminders still fire,
/// they just land in the log instead of a mailbox.
pub struct LogNotifier;

#[async_trait]
impl ReminderNotifier for LogNotifier {
    async fn notify(&self, reminder: &SessionReminder) -> Result<()> {
        match &reminder.resource_title {
            Some(resource) => tracing::info!(
                "Reminder (email disabled): session '{}' starts at {} (resource: {})",
                reminder.session_title,
                reminder.start_time,
                resource
            ),
            None => tracing::info!(
                "Reminder (email disabled): session '{}' starts at {}",
                reminder.session_title,
                reminder.start_time
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_name: "Study Planner".to_string(),
            from_address: "noreply@studyplan.local".to_string(),
        }
    }

    fn reminder(resource: Option<&str>) -> SessionReminder {
        SessionReminder {
            session_title: "Read Ch.4".to_string(),
            resource_title: resource.map(String::from),
            start_time: Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_new_requires_smtp_host() {
        let mut cfg = config();
        cfg.smtp_host = String::new();

        let result = EmailService::new(&cfg, "student@example.com".to_string());

        assert!(result.is_err());
    }

    #[test]
    fn test_build_message_with_resource() {
        let service =
            EmailService::new(&config(), "student@example.com".to_string()).expect("service");

        let message = service.build_message(&reminder(Some("Clean Code")));

        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let service = EmailService::new(&config(), "not an address".to_string()).expect("service");

        let message = service.build_message(&reminder(None));

        assert!(message.is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;

        notifier
            .notify(&reminder(Some("Clean Code")))
            .await
            .expect("Log notifier should not fail");
    }
}
