use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use shofy_domain::phone;

use crate::domain::repository::OtpSender;
use crate::error::AuthServiceError;

/// Approved message template carrying the code as its single body parameter.
const OTP_TEMPLATE: &str = "otp_notification";
const OTP_TEMPLATE_LANGUAGE: &str = "id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct TemplateMessage<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    template: Template<'a>,
}

#[derive(Debug, Serialize)]
struct Template<'a> {
    name: &'static str,
    language: Language,
    components: Vec<Component<'a>>,
}

#[derive(Debug, Serialize)]
struct Language {
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<Parameter<'a>>,
}

#[derive(Debug, Serialize)]
struct Parameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

fn otp_message<'a>(to: &'a str, code: &'a str) -> TemplateMessage<'a> {
    TemplateMessage {
        messaging_product: "whatsapp",
        recipient_type: "individual",
        to,
        kind: "template",
        template: Template {
            name: OTP_TEMPLATE,
            language: Language {
                code: OTP_TEMPLATE_LANGUAGE,
            },
            components: vec![Component {
                kind: "body",
                parameters: vec![Parameter { kind: "text", text: code }],
            }],
        },
    }
}

// ── WhatsApp Cloud API ────────────────────────────────────────────────────────

/// Sends login codes as WhatsApp template messages.
#[derive(Clone)]
pub struct WhatsAppSender {
    client: reqwest::Client,
    messages_url: String,
    access_token: String,
}

impl WhatsAppSender {
    pub fn new(api_base: &str, access_token: &str, phone_number_id: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build whatsapp http client")?;

        Ok(Self {
            client,
            messages_url: format!(
                "{}/{}/messages",
                api_base.trim_end_matches('/'),
                phone_number_id
            ),
            access_token: access_token.to_owned(),
        })
    }
}

impl OtpSender for WhatsAppSender {
    async fn send_otp(&self, destination: &str, code: &str) -> Result<(), AuthServiceError> {
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&otp_message(destination, code))
            .send()
            .await
            .context("send whatsapp message")
            .map_err(AuthServiceError::Delivery)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthServiceError::Delivery(anyhow::anyhow!(
                "whatsapp api returned {status}: {body}"
            )));
        }

        tracing::debug!(to = %phone::mask(destination), "whatsapp otp accepted");
        Ok(())
    }
}

// ── Log-only fallback ─────────────────────────────────────────────────────────

/// Used when no WhatsApp credentials are configured. Records that a code
/// would have been sent; the code itself is never logged.
#[derive(Clone, Default)]
pub struct LogOtpSender;

impl OtpSender for LogOtpSender {
    async fn send_otp(&self, destination: &str, _code: &str) -> Result<(), AuthServiceError> {
        tracing::warn!(
            to = %phone::mask(destination),
            "no otp channel configured, code not delivered"
        );
        Ok(())
    }
}

// ── Notifier ──────────────────────────────────────────────────────────────────

/// The configured delivery channel.
#[derive(Clone)]
pub enum Notifier {
    WhatsApp(WhatsAppSender),
    Log(LogOtpSender),
}

impl OtpSender for Notifier {
    async fn send_otp(&self, destination: &str, code: &str) -> Result<(), AuthServiceError> {
        match self {
            Self::WhatsApp(sender) => sender.send_otp(destination, code).await,
            Self::Log(sender) => sender.send_otp(destination, code).await,
        }
    }
}
