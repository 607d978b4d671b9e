use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox}, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let transport = match (&cfg.smtp_username, &cfg.smtp_password) {
            (Some(user), Some(pass)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
                    .context("smtp relay")?
                    .port(cfg.smtp_port)
                    .credentials(Credentials::new(user.clone(), pass.clone()))
                    .build()
            }
            // Local catchers (Mailpit, MailHog) speak plain SMTP without auth.
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.smtp_host)
                .port(cfg.smtp_port)
                .build(),
        };
        Ok(Self {
            transport,
            from_email: cfg.from_email.clone(),
        })
    }
}

fn build_message(from: &str, to: &str, subject: &str, body: &str) -> anyhow::Result<Message> {
    Message::builder()
        .from(from.parse::<Mailbox>().context("parse from address")?)
        .to(to.parse::<Mailbox>().context("parse to address")?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .context("build message")
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = build_message(&self.from_email, to, subject, body)?;
        self.transport.send(message).await.context("smtp send")?;
        debug!(%to, %subject, "mail sent");
        Ok(())
    }
}
