// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Option<CatalogItemId>,
    pub section_name: String,
    pub section_order: Option<f64>,
    pub title: String,
    pub url: String,
    pub url2: Option<String>,
    /// Zero-based data row in the source file.
    pub row: usize,
}

impl CatalogItem {
    /// Secondary location, if it carries anything beyond whitespace.
    pub fn secondary_url(&self) -> Option<&str> {
        self.url2
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivePanel {
    None,
    CatalogItem,
    Assistant,
}

impl ActivePanel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "home",
            Self::CatalogItem => "item",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Focus {
    Sidebar,
    Search,
    ReportForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    BrokenLink,
    WrongLink,
    StaleLink,
}

impl ReportKind {
    pub const ALL: [Self; 3] = [Self::BrokenLink, Self::WrongLink, Self::StaleLink];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrokenLink => "broken_link",
            Self::WrongLink => "wrong_link",
            Self::StaleLink => "stale_link",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "broken_link" => Some(Self::BrokenLink),
            "wrong_link" => Some(Self::WrongLink),
            "stale_link" => Some(Self::StaleLink),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BrokenLink => "リンク切れ",
            Self::WrongLink => "誤リンク",
            Self::StaleLink => "リンクが古い",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNote {
    pub date: Date,
    pub title: String,
    pub url: String,
}
