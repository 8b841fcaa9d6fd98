// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client as HttpClient;
use roppo_app::{RenderError, ViewInstruction};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;

pub const DEFAULT_PDF_VIEWER_BASE: &str = "https://docs.google.com/viewer";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Hand the viewer a URL and let it fetch the document.
    Remote,
    /// Download the PDF first and give the viewer a local file.
    Local,
}

impl RenderMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(Self::Remote),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

/// Anything that can put a resolved document in front of the user.
pub trait DocumentViewer {
    fn render(&mut self, instruction: &ViewInstruction) -> Result<(), RenderError>;
    fn open_external(&mut self, url: &str) -> Result<(), RenderError>;

    /// What `render` would hand to the viewer, for display.
    fn targets(&self, instruction: &ViewInstruction) -> Vec<String> {
        vec![instruction.primary_url().to_owned()]
    }
}

/// Wraps a document URL in an embeddable PDF viewer URL.
pub fn pdf_viewer_url(base: &Url, document_url: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("url", document_url)
        .append_pair("embedded", "true");
    url.into()
}

pub fn parse_viewer_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid PDF viewer URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("PDF viewer URL {raw:?} must use http or https");
    }
    Ok(url)
}

/// External command that receives the target URL or path as its last
/// argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    program: String,
    args: Vec<String>,
}

impl Opener {
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("open", &[])
        } else if cfg!(windows) {
            Self::new("cmd", &["/C", "start", ""])
        } else {
            Self::new("xdg-open", &[])
        }
    }

    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }

    /// Splits a configured command on whitespace, e.g. `zathura --fork`.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("viewer command must not be empty"))?;
        Ok(Self {
            program: program.to_owned(),
            args: parts.map(str::to_owned).collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, target: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    /// Starts the command and returns without waiting for it.
    pub fn launch(&self, target: &str) -> Result<(), RenderError> {
        let mut child = self
            .command(target)
            .spawn()
            .map_err(|error| self.launch_error(error))?;
        tracing::info!(program = %self.program, target, "viewer launched");
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    /// Runs the command and waits for it to exit.
    pub fn run_to_completion(&self, target: &str) -> Result<(), RenderError> {
        let status = self
            .command(target)
            .status()
            .map_err(|error| self.launch_error(error))?;
        if !status.success() {
            return Err(RenderError::ViewerExited {
                command: self.program.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn launch_error(&self, error: std::io::Error) -> RenderError {
        RenderError::Launch {
            command: self.program.clone(),
            detail: error.to_string(),
        }
    }
}

/// A downloaded document. The backing file is deleted on drop.
#[derive(Debug)]
pub struct FetchedDocument {
    file: NamedTempFile,
    source_url: String,
    len: u64,
}

impl FetchedDocument {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for FetchedDocument {
    fn drop(&mut self) {
        tracing::debug!(
            path = %self.file.path().display(),
            url = %self.source_url,
            "releasing fetched document"
        );
    }
}

#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    http: HttpClient,
    timeout: Duration,
}

impl DocumentFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch(&self, url: &str) -> Result<FetchedDocument, RenderError> {
        let fetch_error = |detail: String| RenderError::Fetch {
            url: url.to_owned(),
            detail,
        };

        let mut response = self
            .http
            .get(url)
            .send()
            .map_err(|error| fetch_error(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("server returned {}", status.as_u16())));
        }

        let mut file = tempfile::Builder::new()
            .prefix("roppo-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|error| fetch_error(format!("create temp file: {error}")))?;
        let len = response
            .copy_to(file.as_file_mut())
            .map_err(|error| fetch_error(format!("download body: {error}")))?;
        tracing::debug!(url, bytes = len, path = %file.path().display(), "document fetched");

        Ok(FetchedDocument {
            file,
            source_url: url.to_owned(),
            len,
        })
    }

    /// Fetches `url`, hands the local copy to `consume`, then removes it on
    /// every path out, including `consume` failing.
    pub fn with_fetched<T>(
        &self,
        url: &str,
        consume: impl FnOnce(&FetchedDocument) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let document = self.fetch(url)?;
        consume(&document)
    }
}

pub struct ExternalViewer {
    opener: Opener,
    mode: RenderMode,
    pdf_viewer_base: Url,
    fetcher: DocumentFetcher,
}

impl ExternalViewer {
    pub fn new(
        opener: Opener,
        mode: RenderMode,
        pdf_viewer_base: &str,
        fetch_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            opener,
            mode,
            pdf_viewer_base: parse_viewer_base(pdf_viewer_base)?,
            fetcher: DocumentFetcher::new(fetch_timeout)?,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Targets the viewer would be pointed at in remote mode.
    pub fn remote_targets(&self, instruction: &ViewInstruction) -> Vec<String> {
        match instruction {
            ViewInstruction::EmbeddedPage { url } => vec![url.clone()],
            ViewInstruction::Pdf {
                primary_url,
                secondary_url,
            } => std::iter::once(primary_url)
                .chain(secondary_url)
                .map(|url| pdf_viewer_url(&self.pdf_viewer_base, url))
                .collect(),
        }
    }

    fn render_pdf(&self, url: &str) -> Result<(), RenderError> {
        match self.mode {
            RenderMode::Remote => self
                .opener
                .launch(&pdf_viewer_url(&self.pdf_viewer_base, url)),
            RenderMode::Local => self.fetcher.with_fetched(url, |document| {
                self.opener
                    .run_to_completion(&document.path().to_string_lossy())
            }),
        }
    }
}

impl DocumentViewer for ExternalViewer {
    fn render(&mut self, instruction: &ViewInstruction) -> Result<(), RenderError> {
        match instruction {
            ViewInstruction::EmbeddedPage { url } => self.opener.launch(url),
            ViewInstruction::Pdf {
                primary_url,
                secondary_url,
            } => {
                self.render_pdf(primary_url)?;
                if let Some(secondary_url) = secondary_url {
                    self.render_pdf(secondary_url)?;
                }
                Ok(())
            }
        }
    }

    fn open_external(&mut self, url: &str) -> Result<(), RenderError> {
        self.opener.launch(url)
    }

    fn targets(&self, instruction: &ViewInstruction) -> Vec<String> {
        match (self.mode, instruction) {
            (RenderMode::Remote, _) | (_, ViewInstruction::EmbeddedPage { .. }) => {
                self.remote_targets(instruction)
            }
            (
                RenderMode::Local,
                ViewInstruction::Pdf {
                    primary_url,
                    secondary_url,
                },
            ) => std::iter::once(primary_url)
                .chain(secondary_url)
                .map(|url| format!("{url} (downloaded, opened with {})", self.opener.program()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_PDF_VIEWER_BASE, DocumentViewer, ExternalViewer, Opener, RenderMode,
        parse_viewer_base, pdf_viewer_url,
    };
    use anyhow::Result;
    use roppo_app::ViewInstruction;
    use std::time::Duration;

    #[test]
    fn pdf_viewer_url_encodes_document_url() -> Result<()> {
        let base = parse_viewer_base("https://docs.google.com/viewer")?;
        let url = pdf_viewer_url(&base, "https://example.com/a b.pdf?x=1&y=2");
        assert_eq!(
            url,
            "https://docs.google.com/viewer?url=https%3A%2F%2Fexample.com%2Fa+b.pdf%3Fx%3D1%26y%3D2&embedded=true"
        );
        Ok(())
    }

    #[test]
    fn remote_targets_wrap_pdfs_but_not_pages() -> Result<()> {
        let viewer = ExternalViewer::new(
            Opener::platform_default(),
            RenderMode::Remote,
            DEFAULT_PDF_VIEWER_BASE,
            Duration::from_secs(1),
        )?;

        let pdf = ViewInstruction::Pdf {
            primary_url: "https://a.example/one.pdf".to_owned(),
            secondary_url: Some("https://a.example/two.pdf".to_owned()),
        };
        let targets = viewer.remote_targets(&pdf);
        assert_eq!(targets.len(), 2);
        assert!(targets[0].starts_with("https://docs.google.com/viewer?url="));
        assert!(targets[1].contains("two.pdf"));

        let page = ViewInstruction::EmbeddedPage {
            url: "https://a.example/law".to_owned(),
        };
        assert_eq!(viewer.remote_targets(&page), vec!["https://a.example/law"]);
        Ok(())
    }

    #[test]
    fn local_targets_name_the_download_and_command() -> Result<()> {
        let viewer = ExternalViewer::new(
            Opener::new("zathura", &[]),
            RenderMode::Local,
            DEFAULT_PDF_VIEWER_BASE,
            Duration::from_secs(1),
        )?;

        let pdf = ViewInstruction::Pdf {
            primary_url: "https://a.example/one.pdf".to_owned(),
            secondary_url: None,
        };
        assert_eq!(
            viewer.targets(&pdf),
            vec!["https://a.example/one.pdf (downloaded, opened with zathura)"]
        );

        let page = ViewInstruction::EmbeddedPage {
            url: "https://a.example/law".to_owned(),
        };
        assert_eq!(viewer.targets(&page), vec!["https://a.example/law"]);
        Ok(())
    }

    #[test]
    fn viewer_base_must_be_http() {
        assert!(parse_viewer_base("ftp://example.com/viewer").is_err());
        assert!(parse_viewer_base("not a url").is_err());
    }

    #[test]
    fn render_mode_parse_matches_as_str() {
        for mode in [RenderMode::Remote, RenderMode::Local] {
            assert_eq!(RenderMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(RenderMode::parse("inline"), None);
    }

    #[test]
    fn opener_parse_splits_program_and_args() -> Result<()> {
        let opener = Opener::parse("zathura  --fork")?;
        assert_eq!(opener, Opener::new("zathura", &["--fork"]));
        assert_eq!(opener.program(), "zathura");
        assert!(Opener::parse("   ").is_err());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_to_completion_reports_exit_status() {
        assert!(Opener::new("true", &[]).run_to_completion("ignored").is_ok());

        let error = Opener::new("false", &[])
            .run_to_completion("ignored")
            .expect_err("false exits non-zero");
        assert!(error.to_string().contains("exited with status"));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let error = Opener::new("roppo-definitely-not-installed", &[])
            .launch("https://example.com")
            .expect_err("missing program should fail");
        assert!(error.to_string().contains("launch viewer"));
    }
}
