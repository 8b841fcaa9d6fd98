// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use roppo_app::{CatalogItem, CatalogItemId};
use std::path::{Path, PathBuf};

pub const CATALOG_HEADER: [&str; 6] = [
    "ID",
    "セクション内番号",
    "セクション名",
    "項目名",
    "URL",
    "URL2",
];

const SAMPLE_ROWS: [(i64, &str, i64, &str, &str, &str); 8] = [
    (
        1,
        "会計基準",
        2,
        "企業会計原則",
        "https://www.fsa.go.jp/kigyou-kaikei-gensoku.pdf",
        "",
    ),
    (
        2,
        "会計基準",
        1,
        "収益認識に関する会計基準",
        "https://www.asb-j.jp/jp/wp-content/uploads/sites/4/shueki29.pdf",
        "https://www.asb-j.jp/jp/wp-content/uploads/sites/4/shueki29_2.pdf",
    ),
    (
        3,
        "監査基準",
        1,
        "監査基準",
        "https://www.fsa.go.jp/singi/kansa/kansa-kijun.PDF",
        "   ",
    ),
    (
        4,
        "監査基準",
        2,
        "監査に関する品質管理基準",
        "https://www.fsa.go.jp/singi/kansa/hinshitsu.html",
        "",
    ),
    (
        5,
        "法令",
        1,
        "会社法",
        "https://laws.e-gov.go.jp/law/417AC0000000086",
        "",
    ),
    (
        6,
        "法令",
        3,
        "金融商品取引法",
        "https://laws.e-gov.go.jp/law/323AC0000000025",
        "",
    ),
    (
        7,
        "法令",
        2,
        "財務諸表等規則",
        "https://laws.e-gov.go.jp/law/338M50000040059",
        "",
    ),
    (
        8,
        "実務指針",
        1,
        "監査基準報告書 200",
        "https://jicpa.or.jp/specialized_field/files/kansa200.pdf?rev=2",
        "",
    ),
];

/// One CSV row, kept as raw cells so tests can feed malformed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub id: String,
    pub section_order: String,
    pub section_name: String,
    pub title: String,
    pub url: String,
    pub url2: String,
}

impl CatalogRow {
    pub fn new(id: i64, section_name: &str, section_order: i64, title: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            section_order: section_order.to_string(),
            section_name: section_name.to_owned(),
            title: title.to_owned(),
            url: url.to_owned(),
            url2: String::new(),
        }
    }

    pub fn with_url2(mut self, url2: &str) -> Self {
        self.url2 = url2.to_owned();
        self
    }

    pub fn with_raw_id(mut self, id: &str) -> Self {
        self.id = id.to_owned();
        self
    }

    pub fn with_raw_order(mut self, section_order: &str) -> Self {
        self.section_order = section_order.to_owned();
        self
    }

    fn cells(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.section_order.as_str(),
            self.section_name.as_str(),
            self.title.as_str(),
            self.url.as_str(),
            self.url2.as_str(),
        ]
    }
}

pub fn sample_rows() -> Vec<CatalogRow> {
    SAMPLE_ROWS
        .iter()
        .map(|(id, section, order, title, url, url2)| {
            CatalogRow::new(*id, section, *order, title, url).with_url2(url2)
        })
        .collect()
}

/// The parsed form of [`sample_rows`].
pub fn sample_items() -> Vec<CatalogItem> {
    SAMPLE_ROWS
        .iter()
        .enumerate()
        .map(|(row, (id, section, order, title, url, url2))| CatalogItem {
            id: Some(CatalogItemId::new(*id)),
            section_name: (*section).to_owned(),
            section_order: Some(*order as f64),
            title: (*title).to_owned(),
            url: (*url).to_owned(),
            url2: Some(url2.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
            row,
        })
        .collect()
}

pub fn catalog_item(
    id: i64,
    section_name: &str,
    order: f64,
    title: &str,
    url: &str,
) -> CatalogItem {
    CatalogItem {
        id: Some(CatalogItemId::new(id)),
        section_name: section_name.to_owned(),
        section_order: Some(order),
        title: title.to_owned(),
        url: url.to_owned(),
        url2: None,
        row: 0,
    }
}

pub fn catalog_csv(rows: &[CatalogRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CATALOG_HEADER)
        .context("write catalog header")?;
    for row in rows {
        writer.write_record(row.cells()).context("write catalog row")?;
    }
    let bytes = writer.into_inner().context("flush catalog csv")?;
    String::from_utf8(bytes).context("catalog csv is not UTF-8")
}

pub fn write_catalog(dir: &Path, rows: &[CatalogRow]) -> Result<PathBuf> {
    let path = dir.join("catalog.csv");
    std::fs::write(&path, catalog_csv(rows)?)
        .with_context(|| format!("write catalog fixture {}", path.display()))?;
    Ok(path)
}

pub fn temp_catalog(rows: &[CatalogRow]) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = write_catalog(dir.path(), rows)?;
    Ok((dir, path))
}
