// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use roppo_app::{ReportError, ReportKind};
use roppo_notify::{ReportSettings, ReportSubmitter};
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

struct Captured {
    url: String,
    authorization: Option<String>,
    body: serde_json::Value,
}

fn settings() -> ReportSettings {
    ReportSettings {
        enabled: true,
        api_key: Some("SG.secret".to_owned()),
        from_address: Some("noreply@example.com".to_owned()),
        to_address: Some("admin@example.com".to_owned()),
    }
}

fn serve_once(
    status: u16,
    body: &'static str,
) -> Result<(String, mpsc::Receiver<Captured>, thread::JoinHandle<()>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        let mut raw = String::new();
        request
            .as_reader()
            .read_to_string(&mut raw)
            .expect("request body should be readable");
        let authorization = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Authorization"))
            .map(|header| header.value.as_str().to_owned());
        tx.send(Captured {
            url: request.url().to_owned(),
            authorization,
            body: serde_json::from_str(&raw).expect("request body should be JSON"),
        })
        .expect("capture should send");

        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    Ok((addr, rx, handle))
}

#[test]
fn accepted_report_posts_sendgrid_payload() -> Result<()> {
    let (addr, rx, handle) = serve_once(202, "")?;
    let submitter = ReportSubmitter::sendgrid(settings(), &addr, Duration::from_secs(2))?;

    let accepted = submitter
        .submit(ReportKind::BrokenLink, "https://a.example/kansa.pdf")
        .map_err(|error| anyhow!("submit failed: {error}"))?;
    assert_eq!(accepted.status, 202);

    let captured = rx.recv()?;
    assert_eq!(captured.url, "/v3/mail/send");
    assert_eq!(captured.authorization.as_deref(), Some("Bearer SG.secret"));
    assert_eq!(
        captured.body["personalizations"][0]["to"][0]["email"],
        "admin@example.com"
    );
    assert_eq!(captured.body["from"]["email"], "noreply@example.com");
    assert_eq!(captured.body["content"][0]["type"], "text/plain");
    let text = captured.body["content"][0]["value"]
        .as_str()
        .ok_or_else(|| anyhow!("content value should be a string"))?;
    assert!(text.contains("リンク切れ"));
    assert!(text.contains("https://a.example/kansa.pdf"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rejected_report_surfaces_provider_message() -> Result<()> {
    let (addr, _rx, handle) = serve_once(
        401,
        r#"{"errors":[{"message":"The provided authorization grant is invalid"}]}"#,
    )?;
    let submitter = ReportSubmitter::sendgrid(settings(), &addr, Duration::from_secs(2))?;

    let error = submitter
        .submit(ReportKind::WrongLink, "https://a.example")
        .expect_err("401 should fail");
    assert!(matches!(error, ReportError::Transport(_)));
    assert!(error.to_string().contains("authorization grant is invalid"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_error_is_a_transport_failure() -> Result<()> {
    let (addr, _rx, handle) = serve_once(500, "")?;
    let submitter = ReportSubmitter::sendgrid(settings(), &addr, Duration::from_secs(2))?;

    let error = submitter
        .submit(ReportKind::StaleLink, "https://a.example")
        .expect_err("500 should fail");
    assert_eq!(
        error.to_string(),
        "report delivery failed: mail service returned 500"
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_service_names_the_remedy() -> Result<()> {
    let submitter =
        ReportSubmitter::sendgrid(settings(), "http://127.0.0.1:1", Duration::from_millis(200))?;

    let error = submitter
        .submit(ReportKind::BrokenLink, "https://a.example")
        .expect_err("unreachable service should fail");
    assert!(matches!(error, ReportError::Transport(_)));
    assert!(error.to_string().contains("report.base_url"));
    Ok(())
}

#[test]
fn missing_api_key_sends_nothing() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    let submitter = ReportSubmitter::sendgrid(
        ReportSettings {
            api_key: None,
            ..settings()
        },
        &addr,
        Duration::from_secs(1),
    )?;

    let error = submitter
        .submit(ReportKind::BrokenLink, "https://a.example")
        .expect_err("missing api key should fail");
    assert!(error.is_configuration());
    assert!(server.try_recv()?.is_none());
    Ok(())
}
