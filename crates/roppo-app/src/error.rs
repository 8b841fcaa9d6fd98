// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// The viewer could not fetch or display a document. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("fetch {url}: {detail}")]
    Fetch { url: String, detail: String },
    #[error("launch viewer `{command}`: {detail}")]
    Launch { command: String, detail: String },
    #[error("viewer `{command}` exited with status {code:?}")]
    ViewerExited { command: String, code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Credentials or addresses are missing; nothing was sent.
    #[error("report delivery is not configured: {0}")]
    Configuration(String),
    /// A send was attempted and did not come back accepted.
    #[error("report delivery failed: {0}")]
    Transport(String),
}

impl ReportError {
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
