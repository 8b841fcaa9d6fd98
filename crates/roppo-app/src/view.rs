// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::CatalogItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewInstruction {
    Pdf {
        primary_url: String,
        secondary_url: Option<String>,
    },
    EmbeddedPage {
        url: String,
    },
}

impl ViewInstruction {
    pub fn primary_url(&self) -> &str {
        match self {
            Self::Pdf { primary_url, .. } => primary_url,
            Self::EmbeddedPage { url } => url,
        }
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Pdf { .. } => "pdf",
            Self::EmbeddedPage { .. } => "page",
        }
    }
}

/// Picks the viewer for an item from the literal suffix of its URL, so a
/// query string after `.pdf` means an embedded page.
pub fn resolve(item: &CatalogItem) -> ViewInstruction {
    if is_pdf_url(&item.url) {
        ViewInstruction::Pdf {
            primary_url: item.url.clone(),
            secondary_url: item.secondary_url().map(str::to_owned),
        }
    } else {
        ViewInstruction::EmbeddedPage {
            url: item.url.clone(),
        }
    }
}

pub fn is_pdf_url(url: &str) -> bool {
    url.to_lowercase().ends_with(".pdf")
}
