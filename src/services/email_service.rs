/// Outbound email: a transport trait, the SendGrid implementation, a no-op
/// implementation for environments without an API key, and the message templates.
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AppConfig, EmailConfig};
use crate::models::{admin, contact, testimonial};

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";
/// Upper bound on one delivery attempt, so a stalled provider cannot hold a request open
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to reach the email provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A rendered message, ready for any transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// SendGrid v3 mail/send over reqwest
pub struct SendGridMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from_email: String, from_name: String) -> Result<Self, EmailError> {
        Self::with_endpoint(SENDGRID_ENDPOINT.to_string(), SEND_TIMEOUT, api_key, from_email, from_name)
    }

    fn with_endpoint(
        endpoint: String,
        timeout: Duration,
        api_key: String,
        from_email: String,
        from_name: String,
    ) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(SendGridMailer {
            client,
            endpoint,
            api_key,
            from_email,
            from_name,
        })
    }
}

#[async_trait]
impl EmailSender for SendGridMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let reply_to = email.reply_to.as_deref().unwrap_or(&self.from_email);
        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "reply_to": { "email": reply_to },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %email.to, status = status.as_u16(), "email sent");
        Ok(())
    }
}

/// Used when no SendGrid key is configured; the message is only logged
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "email delivery disabled, message dropped");
        Ok(())
    }
}

/// Renders the site's messages and hands them to the configured transport
#[derive(Clone)]
pub struct EmailService {
    sender: Arc<dyn EmailSender>,
    frontend_url: String,
    admin_email: Option<String>,
    reset_ttl_minutes: i64,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>, app: &AppConfig, email: &EmailConfig, reset_ttl_minutes: i64) -> Self {
        EmailService {
            sender,
            frontend_url: app.frontend_url.trim_end_matches('/').to_string(),
            admin_email: email.admin_email.clone(),
            reset_ttl_minutes,
        }
    }

    /// SendGrid when an API key is present, otherwise the no-op transport
    pub fn from_config(app: &AppConfig, email: &EmailConfig, reset_ttl_minutes: i64) -> Result<Self, EmailError> {
        let sender: Arc<dyn EmailSender> = match &email.sendgrid_api_key {
            Some(key) => Arc::new(SendGridMailer::new(
                key.clone(),
                email.from_email.clone(),
                email.from_name.clone(),
            )?),
            None => {
                tracing::warn!("SENDGRID_API_KEY not set, outgoing emails will only be logged");
                Arc::new(NoopMailer)
            }
        };
        Ok(Self::new(sender, app, email, reset_ttl_minutes))
    }

    pub async fn send_password_reset(&self, admin: &admin::Model, raw_token: &str) -> Result<(), EmailError> {
        let link = format!(
            "{}/reset-password?token={}&email={}",
            self.frontend_url,
            raw_token,
            urlencoding::encode(&admin.email)
        );
        let email = OutgoingEmail {
            to: admin.email.clone(),
            subject: "Password Reset Request".to_string(),
            html: render_password_reset_html(&admin.first_name, &link, self.reset_ttl_minutes),
            text: format!(
                "Hello {},\n\nYou requested a password reset. Open the link below to choose a new password:\n\n{}\n\nThis link expires in {} minutes. If you did not request a reset, ignore this email.\n",
                admin.first_name, link, self.reset_ttl_minutes
            ),
            reply_to: None,
        };
        self.sender.send(email).await
    }

    pub async fn send_contact_notification(&self, contact: &contact::Model) -> Result<(), EmailError> {
        let Some(admin_email) = &self.admin_email else {
            tracing::debug!(contact_id = %contact.id, "ADMIN_EMAIL not set, skipping contact notification");
            return Ok(());
        };

        let subject = contact.subject.as_deref().unwrap_or("(no subject)");
        let fields = [
            ("Name", contact.name.as_str()),
            ("Email", contact.email.as_str()),
            ("Phone", contact.phone.as_deref().unwrap_or("-")),
            ("Subject", subject),
            ("Message", contact.message.as_str()),
        ];

        let email = OutgoingEmail {
            to: admin_email.clone(),
            subject: format!("New Contact: {}", subject),
            html: render_notification_html("New Contact Form Submission", "#4CAF50", &fields),
            text: render_notification_text("New Contact Form Submission", &fields),
            reply_to: Some(contact.email.clone()),
        };
        self.sender.send(email).await
    }

    pub async fn send_testimonial_notification(&self, testimonial: &testimonial::Model) -> Result<(), EmailError> {
        let Some(admin_email) = &self.admin_email else {
            tracing::debug!(testimonial_id = %testimonial.id, "ADMIN_EMAIL not set, skipping testimonial notification");
            return Ok(());
        };

        let rating = testimonial
            .rating
            .map(|r| {
                let r = r.clamp(0, 5) as usize;
                format!("{}{}", "★".repeat(r), "☆".repeat(5 - r))
            })
            .unwrap_or_else(|| "-".to_string());
        let fields = [
            ("Name", testimonial.name.as_str()),
            ("Email", testimonial.email.as_str()),
            ("Company", testimonial.company.as_deref().unwrap_or("-")),
            ("Rating", rating.as_str()),
            ("Message", testimonial.message.as_str()),
        ];

        let email = OutgoingEmail {
            to: admin_email.clone(),
            subject: format!("New Testimonial from {}", testimonial.name),
            html: render_notification_html("New Testimonial Submission", "#FF9800", &fields),
            text: render_notification_text("New Testimonial Submission", &fields),
            reply_to: Some(testimonial.email.clone()),
        };
        self.sender.send(email).await
    }
}

// ============================================================================
// Templates
// ============================================================================

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_password_reset_html(first_name: &str, link: &str, ttl_minutes: i64) -> String {
    let link = escape_html(link);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #2196F3; color: white; padding: 20px; text-align: center; }}
        .content {{ background-color: #f9f9f9; padding: 20px; border: 1px solid #ddd; }}
        .button {{ display: inline-block; background-color: #2196F3; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 20px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h2>Password Reset Request</h2></div>
        <div class="content">
            <p>Hello <strong>{name}</strong>,</p>
            <p>You requested a password reset. Click the button below to choose a new password:</p>
            <p style="text-align: center;"><a href="{link}" class="button">Reset Password</a></p>
            <p>Or copy and paste this link in your browser:</p>
            <p style="word-break: break-all;">{link}</p>
            <p style="color: #666; font-size: 14px;">This link expires in {ttl} minutes. If you did not request a reset, you can safely ignore this email.</p>
        </div>
    </div>
</body>
</html>"#,
        name = escape_html(first_name),
        link = link,
        ttl = ttl_minutes
    )
}

fn render_notification_html(title: &str, color: &str, fields: &[(&str, &str)]) -> String {
    let rows: String = fields
        .iter()
        .map(|(label, value)| {
            format!(
                r#"            <div class="field"><div class="label">{}:</div><div class="value">{}</div></div>
"#,
                label,
                escape_html(value).replace('\n', "<br>")
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: {color}; color: white; padding: 20px; text-align: center; }}
        .content {{ background-color: #f9f9f9; padding: 20px; border: 1px solid #ddd; }}
        .field {{ margin-bottom: 15px; }}
        .label {{ font-weight: bold; color: #555; }}
        .value {{ margin-top: 5px; padding: 10px; background-color: white; border-left: 3px solid {color}; }}
        .footer {{ margin-top: 20px; text-align: center; color: #777; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h2>{title}</h2></div>
        <div class="content">
{rows}        </div>
        <div class="footer"><p>This email was sent from the Raising African Children website</p></div>
    </div>
</body>
</html>"#,
        color = color,
        title = title,
        rows = rows
    )
}

fn render_notification_text(title: &str, fields: &[(&str, &str)]) -> String {
    let mut text = format!("{}\n\n", title);
    for (label, value) in fields {
        text.push_str(&format!("{}: {}\n", label, value));
    }
    text
}
