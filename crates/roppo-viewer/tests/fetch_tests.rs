// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use roppo_app::RenderError;
use roppo_viewer::DocumentFetcher;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n%roppo fixture\n";

fn serve_once(status: u16, body: &'static [u8]) -> Result<(String, thread::JoinHandle<()>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/docs/kansa.pdf");
        let response = Response::from_data(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/pdf")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    Ok((format!("{addr}/docs/kansa.pdf"), handle))
}

#[test]
fn fetched_document_is_removed_on_drop() -> Result<()> {
    let (url, handle) = serve_once(200, PDF_BYTES)?;
    let fetcher = DocumentFetcher::new(Duration::from_secs(2))?;

    let document = fetcher.fetch(&url)?;
    let path = document.path().to_path_buf();
    assert_eq!(fs::read(&path)?, PDF_BYTES);
    assert_eq!(document.len(), PDF_BYTES.len() as u64);
    assert_eq!(document.source_url(), url);
    assert!(path.extension().is_some_and(|ext| ext == "pdf"));

    drop(document);
    assert!(!path.exists());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn with_fetched_cleans_up_when_consumer_fails() -> Result<()> {
    let (url, handle) = serve_once(200, PDF_BYTES)?;
    let fetcher = DocumentFetcher::new(Duration::from_secs(2))?;

    let mut seen: Option<PathBuf> = None;
    let result: Result<(), RenderError> = fetcher.with_fetched(&url, |document| {
        seen = Some(document.path().to_path_buf());
        Err(RenderError::ViewerExited {
            command: "zathura".to_owned(),
            code: Some(1),
        })
    });

    assert!(matches!(result, Err(RenderError::ViewerExited { .. })));
    let path = seen.ok_or_else(|| anyhow!("consumer never ran"))?;
    assert!(!path.exists());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_success_status_is_a_fetch_error() -> Result<()> {
    let (url, handle) = serve_once(404, b"not found")?;
    let fetcher = DocumentFetcher::new(Duration::from_secs(2))?;

    let mut consumed = false;
    let result = fetcher.with_fetched(&url, |_| {
        consumed = true;
        Ok(())
    });

    let error = result.expect_err("404 should fail");
    assert!(matches!(error, RenderError::Fetch { .. }));
    assert!(error.to_string().contains("404"));
    assert!(!consumed);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_host_is_a_fetch_error() -> Result<()> {
    let fetcher = DocumentFetcher::new(Duration::from_millis(200))?;
    let error = fetcher
        .fetch("http://127.0.0.1:1/missing.pdf")
        .expect_err("unreachable host should fail");
    assert!(matches!(error, RenderError::Fetch { ref url, .. } if url.ends_with("missing.pdf")));
    Ok(())
}

#[cfg(unix)]
#[test]
fn local_mode_waits_for_viewer_then_cleans_up() -> Result<()> {
    use roppo_app::ViewInstruction;
    use roppo_viewer::{DocumentViewer, ExternalViewer, Opener, RenderMode};

    let (url, handle) = serve_once(200, PDF_BYTES)?;
    let mut viewer = ExternalViewer::new(
        Opener::new("test", &["-s"]),
        RenderMode::Local,
        roppo_viewer::DEFAULT_PDF_VIEWER_BASE,
        Duration::from_secs(2),
    )?;

    viewer
        .render(&ViewInstruction::Pdf {
            primary_url: url,
            secondary_url: None,
        })
        .map_err(|error| anyhow!("render failed: {error}"))?;

    handle.join().expect("server thread should join");
    Ok(())
}
