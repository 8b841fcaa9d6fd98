// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ActivePanel, CatalogItemId, Focus};

/// Which catalog item or auxiliary panel the session is looking at.
///
/// The fields only move through [`select_item`](Self::select_item),
/// [`select_assistant`](Self::select_assistant) and [`clear`](Self::clear),
/// so `active_panel() == CatalogItem` holds exactly when an item is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    selected_item: Option<CatalogItemId>,
    active_panel: ActivePanel,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_item: None,
            active_panel: ActivePanel::None,
        }
    }
}

impl SelectionState {
    #[must_use]
    pub const fn select_item(self, id: CatalogItemId) -> Self {
        Self {
            selected_item: Some(id),
            active_panel: ActivePanel::CatalogItem,
        }
    }

    #[must_use]
    pub const fn select_assistant(self) -> Self {
        Self {
            selected_item: None,
            active_panel: ActivePanel::Assistant,
        }
    }

    #[must_use]
    pub const fn clear(self) -> Self {
        Self {
            selected_item: None,
            active_panel: ActivePanel::None,
        }
    }

    pub const fn selected_item(self) -> Option<CatalogItemId> {
        self.selected_item
    }

    pub const fn active_panel(self) -> ActivePanel {
        self.active_panel
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub selection: SelectionState,
    pub search_term: String,
    pub focus: Focus,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selection: SelectionState::default(),
            search_term: String::new(),
            focus: Focus::Sidebar,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SelectItem(CatalogItemId),
    SelectAssistant,
    ClearSelection,
    FocusSearch,
    FocusSidebar,
    OpenReportForm,
    CloseReportForm,
    PushSearchChar(char),
    PopSearchChar,
    ClearSearch,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SelectionChanged(SelectionState),
    FocusChanged(Focus),
    SearchChanged(String),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SelectItem(id) => self.set_selection(self.selection.select_item(id)),
            AppCommand::SelectAssistant => self.set_selection(self.selection.select_assistant()),
            AppCommand::ClearSelection => self.set_selection(self.selection.clear()),
            AppCommand::FocusSearch => self.set_focus(Focus::Search),
            AppCommand::FocusSidebar => self.set_focus(Focus::Sidebar),
            AppCommand::OpenReportForm => {
                if self.selection.active_panel() != ActivePanel::CatalogItem {
                    return vec![self.set_status("select an item before reporting")];
                }
                self.set_focus(Focus::ReportForm)
            }
            AppCommand::CloseReportForm => self.set_focus(Focus::Sidebar),
            AppCommand::PushSearchChar(ch) => {
                self.search_term.push(ch);
                vec![AppEvent::SearchChanged(self.search_term.clone())]
            }
            AppCommand::PopSearchChar => {
                if self.search_term.pop().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::SearchChanged(self.search_term.clone())]
            }
            AppCommand::ClearSearch => {
                if self.search_term.is_empty() {
                    return Vec::new();
                }
                self.search_term.clear();
                vec![AppEvent::SearchChanged(String::new())]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_selection(&mut self, next: SelectionState) -> Vec<AppEvent> {
        if next == self.selection {
            return Vec::new();
        }
        self.selection = next;
        vec![AppEvent::SelectionChanged(next)]
    }

    fn set_focus(&mut self, focus: Focus) -> Vec<AppEvent> {
        if focus == self.focus {
            return Vec::new();
        }
        self.focus = focus;
        vec![AppEvent::FocusChanged(focus)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
