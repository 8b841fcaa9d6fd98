// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use roppo_app::{ReportError, ReportKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const ACCEPTED_STATUS: u16 = 202;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMessage {
    pub subject: String,
    pub body: String,
}

pub fn build_message(kind: ReportKind, url: &str) -> ReportMessage {
    ReportMessage {
        subject: format!("[会計監査六法] リンク報告: {}", kind.label()),
        body: format!(
            "会計監査六法の利用者からリンクの報告がありました。\n\n\
             報告の種類: {} ({})\n\
             対象URL: {}\n",
            kind.label(),
            kind.as_str(),
            url.trim()
        ),
    }
}

/// A fully addressed message, ready for a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers an envelope and returns the provider's HTTP status.
pub trait Notifier {
    fn send(&self, envelope: &Envelope) -> Result<u16, ReportError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, envelope: &Envelope) -> Result<u16, ReportError> {
        (**self).send(envelope)
    }
}

#[derive(Debug, Clone)]
pub struct SendGridClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    http: HttpClient,
}

impl SendGridClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("report.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            api_key: api_key.to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Notifier for SendGridClient {
    fn send(&self, envelope: &Envelope) -> Result<u16, ReportError> {
        let request = MailRequest::new(envelope);
        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|error| connection_error(&self.base_url, &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(status.as_u16())
    }
}

/// Addresses and credentials for report delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

impl ReportSettings {
    /// Names of the settings that still need a value.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("report.api_key", &self.api_key),
            ("report.from_address", &self.from_address),
            ("report.to_address", &self.to_address),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|value| value.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    fn envelope(&self, message: ReportMessage) -> Result<Envelope, ReportError> {
        if !self.enabled {
            return Err(ReportError::Configuration(
                "reporting is disabled -- set report.enabled = true".to_owned(),
            ));
        }
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ReportError::Configuration(format!(
                "set {} in the config file",
                missing.join(", ")
            )));
        }

        let address =
            |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();
        Ok(Envelope {
            from: address(&self.from_address),
            to: address(&self.to_address),
            subject: message.subject,
            body: message.body,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub status: u16,
}

pub struct ReportSubmitter<N> {
    settings: ReportSettings,
    notifier: N,
}

impl ReportSubmitter<SendGridClient> {
    pub fn sendgrid(settings: ReportSettings, base_url: &str, timeout: Duration) -> Result<Self> {
        let api_key = settings.api_key.clone().unwrap_or_default();
        let client = SendGridClient::new(base_url, api_key.trim(), timeout)?;
        Ok(Self::new(settings, client))
    }
}

impl<N: Notifier> ReportSubmitter<N> {
    pub fn new(settings: ReportSettings, notifier: N) -> Self {
        Self { settings, notifier }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        self.settings.enabled && self.settings.missing().is_empty()
    }

    /// Sends one report. Configuration is checked before anything goes on
    /// the wire; there is exactly one delivery attempt.
    pub fn submit(&self, kind: ReportKind, url: &str) -> Result<Accepted, ReportError> {
        let envelope = self.settings.envelope(build_message(kind, url))?;
        let status = self.notifier.send(&envelope).inspect_err(|error| {
            tracing::warn!(kind = kind.as_str(), %error, "report delivery failed");
        })?;

        if status != ACCEPTED_STATUS {
            tracing::warn!(kind = kind.as_str(), status, "report not accepted");
            return Err(ReportError::Transport(format!(
                "mail service answered {status}, expected {ACCEPTED_STATUS}"
            )));
        }
        tracing::info!(kind = kind.as_str(), url = url.trim(), "report accepted");
        Ok(Accepted { status })
    }
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> ReportError {
    let reason = if error.is_timeout() {
        "timed out"
    } else {
        "unreachable"
    };
    ReportError::Transport(format!(
        "mail service at {base_url} {reason} -- check the network and report.base_url ({error})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str) -> ReportError {
    if let Ok(parsed) = serde_json::from_str::<SendGridErrorEnvelope>(body)
        && let Some(error) = parsed.errors.into_iter().find(|error| !error.message.is_empty())
    {
        return ReportError::Transport(format!(
            "mail service error ({}): {}",
            status.as_u16(),
            error.message
        ));
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return ReportError::Transport(format!(
            "mail service error ({}): {}",
            status.as_u16(),
            body.trim()
        ));
    }

    ReportError::Transport(format!("mail service returned {}", status.as_u16()))
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

impl<'a> MailRequest<'a> {
    fn new(envelope: &'a Envelope) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address {
                    email: &envelope.to,
                }],
            }],
            from: Address {
                email: &envelope.from,
            },
            subject: &envelope.subject,
            content: [Content {
                kind: "text/plain",
                value: &envelope.body,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorEnvelope {
    #[serde(default)]
    errors: Vec<SendGridError>,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::{
        Envelope, MailRequest, Notifier, ReportSettings, ReportSubmitter, build_message,
        clean_error_response,
    };
    use anyhow::Result;
    use reqwest::StatusCode;
    use roppo_app::{ReportError, ReportKind};
    use std::cell::RefCell;

    struct RecordingNotifier {
        status: Result<u16, ReportError>,
        sent: RefCell<Vec<Envelope>>,
    }

    impl RecordingNotifier {
        fn answering(status: u16) -> Self {
            Self {
                status: Ok(status),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, envelope: &Envelope) -> Result<u16, ReportError> {
            self.sent.borrow_mut().push(envelope.clone());
            self.status.clone()
        }
    }

    fn configured() -> ReportSettings {
        ReportSettings {
            enabled: true,
            api_key: Some("SG.test".to_owned()),
            from_address: Some("noreply@example.com".to_owned()),
            to_address: Some("admin@example.com".to_owned()),
        }
    }

    #[test]
    fn message_embeds_kind_and_url() {
        let message = build_message(ReportKind::WrongLink, " https://a.example/x.pdf ");
        assert!(message.subject.contains("誤リンク"));
        assert!(message.body.contains("誤リンク"));
        assert!(message.body.contains("wrong_link"));
        assert!(message.body.contains("対象URL: https://a.example/x.pdf\n"));
    }

    #[test]
    fn accepted_status_is_success() -> Result<()> {
        let submitter = ReportSubmitter::new(configured(), RecordingNotifier::answering(202));
        let accepted = submitter.submit(ReportKind::BrokenLink, "https://a.example/x.pdf")?;
        assert_eq!(accepted.status, 202);

        let sent = submitter.notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "noreply@example.com");
        assert_eq!(sent[0].to, "admin@example.com");
        assert!(sent[0].subject.contains("リンク切れ"));
        Ok(())
    }

    #[test]
    fn other_success_statuses_are_not_accepted() {
        let submitter = ReportSubmitter::new(configured(), RecordingNotifier::answering(200));
        let error = submitter
            .submit(ReportKind::StaleLink, "https://a.example")
            .expect_err("200 is not 202");
        assert!(matches!(error, ReportError::Transport(_)));
        assert!(error.to_string().contains("200"));
    }

    #[test]
    fn missing_credentials_never_reach_the_notifier() {
        for settings in [
            ReportSettings {
                api_key: None,
                ..configured()
            },
            ReportSettings {
                to_address: Some("  ".to_owned()),
                ..configured()
            },
            ReportSettings {
                enabled: false,
                ..configured()
            },
        ] {
            let submitter = ReportSubmitter::new(settings, RecordingNotifier::answering(202));
            assert!(!submitter.is_configured());
            let error = submitter
                .submit(ReportKind::BrokenLink, "https://a.example")
                .expect_err("misconfigured submitter should fail");
            assert!(error.is_configuration(), "{error}");
            assert!(submitter.notifier.sent.borrow().is_empty());
        }
    }

    #[test]
    fn missing_lists_every_absent_setting() {
        let settings = ReportSettings {
            enabled: true,
            ..ReportSettings::default()
        };
        assert_eq!(
            settings.missing(),
            vec!["report.api_key", "report.from_address", "report.to_address"]
        );
    }

    #[test]
    fn transport_errors_pass_through_once() {
        let notifier = RecordingNotifier {
            status: Err(ReportError::Transport("connection refused".to_owned())),
            sent: RefCell::new(Vec::new()),
        };
        let submitter = ReportSubmitter::new(configured(), notifier);
        let error = submitter
            .submit(ReportKind::BrokenLink, "https://a.example")
            .expect_err("transport failure should surface");
        assert!(error.to_string().contains("connection refused"));
        assert_eq!(submitter.notifier.sent.borrow().len(), 1);
    }

    #[test]
    fn mail_request_matches_sendgrid_shape() -> Result<()> {
        let envelope = Envelope {
            from: "noreply@example.com".to_owned(),
            to: "admin@example.com".to_owned(),
            subject: "subject".to_owned(),
            body: "body".to_owned(),
        };
        let json = serde_json::to_value(MailRequest::new(&envelope))?;
        assert_eq!(
            json,
            serde_json::json!({
                "personalizations": [{"to": [{"email": "admin@example.com"}]}],
                "from": {"email": "noreply@example.com"},
                "subject": "subject",
                "content": [{"type": "text/plain", "value": "body"}],
            })
        );
        Ok(())
    }

    #[test]
    fn error_response_prefers_provider_message() {
        let error = clean_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"errors":[{"message":"The provided authorization grant is invalid","field":null}]}"#,
        );
        assert_eq!(
            error.to_string(),
            "report delivery failed: mail service error (401): The provided authorization grant is invalid"
        );

        let error = clean_error_response(StatusCode::BAD_GATEWAY, "<html>{oops}</html>");
        assert_eq!(
            error.to_string(),
            "report delivery failed: mail service returned 502"
        );
    }
}
