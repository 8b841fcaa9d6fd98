// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{CatalogItem, ReportKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Kind,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub url: String,
}

/// Editable state behind the link report form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportForm {
    pub kind: ReportKind,
    pub url: String,
    pub field: ReportField,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            kind: ReportKind::BrokenLink,
            url: String::new(),
            field: ReportField::Kind,
        }
    }
}

impl ReportForm {
    /// Starts a form pre-filled with the item's primary URL.
    pub fn for_item(item: Option<&CatalogItem>) -> Self {
        Self {
            url: item.map(|item| item.url.clone()).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn cycle_kind(&mut self, delta: isize) {
        let kinds = ReportKind::ALL;
        let current = kinds
            .iter()
            .position(|kind| *kind == self.kind)
            .unwrap_or(0) as isize;
        let len = kinds.len() as isize;
        self.kind = kinds[(current + delta).rem_euclid(len) as usize];
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            ReportField::Kind => ReportField::Url,
            ReportField::Url => ReportField::Kind,
        };
    }

    pub fn push_char(&mut self, ch: char) {
        if self.field == ReportField::Url {
            self.url.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if self.field == ReportField::Url {
            self.url.pop();
        }
    }

    pub fn validate(&self) -> Result<ReportRequest> {
        let url = self.url.trim();
        if url.is_empty() {
            bail!("report URL is required -- enter the link you are reporting and retry");
        }
        Ok(ReportRequest {
            kind: self.kind,
            url: url.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportField, ReportForm};
    use crate::{CatalogItem, ReportKind};

    fn sample_item() -> CatalogItem {
        CatalogItem {
            id: None,
            section_name: "監査基準".to_owned(),
            section_order: Some(1.0),
            title: "監査基準".to_owned(),
            url: "https://example.com/kansa.pdf".to_owned(),
            url2: None,
            row: 0,
        }
    }

    #[test]
    fn form_prefills_selected_url() {
        let form = ReportForm::for_item(Some(&sample_item()));
        assert_eq!(form.url, "https://example.com/kansa.pdf");
        assert_eq!(form.kind, ReportKind::BrokenLink);

        let blank = ReportForm::for_item(None);
        assert!(blank.url.is_empty());
    }

    #[test]
    fn kind_cycles_in_both_directions() {
        let mut form = ReportForm::default();
        form.cycle_kind(1);
        assert_eq!(form.kind, ReportKind::WrongLink);
        form.cycle_kind(1);
        assert_eq!(form.kind, ReportKind::StaleLink);
        form.cycle_kind(1);
        assert_eq!(form.kind, ReportKind::BrokenLink);
        form.cycle_kind(-1);
        assert_eq!(form.kind, ReportKind::StaleLink);
    }

    #[test]
    fn typing_only_edits_url_field() {
        let mut form = ReportForm::default();
        form.push_char('x');
        assert!(form.url.is_empty());

        form.toggle_field();
        assert_eq!(form.field, ReportField::Url);
        form.push_char('h');
        form.push_char('x');
        form.pop_char();
        assert_eq!(form.url, "h");
    }

    #[test]
    fn validate_trims_and_requires_url() {
        let mut form = ReportForm::default();
        let error = form.validate().expect_err("blank url should fail");
        assert!(error.to_string().contains("report URL is required"));

        form.url = "  http://x  ".to_owned();
        form.kind = ReportKind::StaleLink;
        let request = form.validate().expect("valid form");
        assert_eq!(request.url, "http://x");
        assert_eq!(request.kind, ReportKind::StaleLink);
    }
}
