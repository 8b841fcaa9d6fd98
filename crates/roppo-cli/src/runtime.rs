// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use roppo_app::{CatalogItem, RenderError, ReportError, ReportRequest, ViewInstruction};
use roppo_catalog::CatalogStore;
use roppo_notify::{Notifier, ReportSubmitter};
use roppo_tui::PanelContent;
use roppo_viewer::DocumentViewer;
use std::sync::Arc;

pub struct CatalogRuntime<V, N> {
    store: CatalogStore,
    viewer: V,
    reports: ReportSubmitter<N>,
    content: PanelContent,
}

impl<V: DocumentViewer, N: Notifier> CatalogRuntime<V, N> {
    pub fn new(
        store: CatalogStore,
        viewer: V,
        reports: ReportSubmitter<N>,
        content: PanelContent,
    ) -> Self {
        Self {
            store,
            viewer,
            reports,
            content,
        }
    }
}

impl<V: DocumentViewer, N: Notifier> roppo_tui::AppRuntime for CatalogRuntime<V, N> {
    fn catalog(&mut self) -> Arc<[CatalogItem]> {
        self.store.items()
    }

    fn reload_catalog(&mut self) -> Result<bool> {
        self.store.refresh().with_context(|| {
            format!(
                "reload catalog {} -- fix the file and press R again",
                self.store.path().display()
            )
        })
    }

    fn render_view(&mut self, instruction: &ViewInstruction) -> Result<(), RenderError> {
        self.viewer.render(instruction)
    }

    fn viewer_targets(&self, instruction: &ViewInstruction) -> Vec<String> {
        self.viewer.targets(instruction)
    }

    fn open_external(&mut self, url: &str) -> Result<(), RenderError> {
        self.viewer.open_external(url)
    }

    fn submit_report(&mut self, request: &ReportRequest) -> Result<(), ReportError> {
        self.reports
            .submit(request.kind, &request.url)
            .map(|accepted| {
                tracing::debug!(status = accepted.status, "report submitted");
            })
    }

    fn panel_content(&self) -> &PanelContent {
        &self.content
    }
}
