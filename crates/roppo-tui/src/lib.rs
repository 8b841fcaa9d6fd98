// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use roppo_app::{
    ActivePanel, AppCommand, AppState, CatalogItem, CatalogItemId, Focus, NavigationIndex,
    RenderError, ReportError, ReportField, ReportForm, ReportKind, ReportRequest, UpdateNote,
    ViewInstruction, item_label, resolve,
};
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const APP_TITLE: &str = "俺の会計監査六法 ver.2025";
const HOME_LABEL: &str = "ホーム";
const ASSISTANT_LABEL: &str = "🤖に質問する";
const ASSISTANT_TITLE: &str = "🤖日本の会計基準に詳しい君2号";
const SECTION_OPEN: &str = "▼";
const SECTION_CLOSED: &str = "▶";
const HALF_PAGE_ROWS: isize = 10;

/// Static text and links for the home and assistant panels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelContent {
    pub assistant_url: String,
    pub sister_site_url: String,
    pub updates: Vec<UpdateNote>,
}

pub trait AppRuntime {
    fn catalog(&mut self) -> Arc<[CatalogItem]>;
    /// Re-reads the catalog source; `Ok(true)` when the snapshot changed.
    fn reload_catalog(&mut self) -> Result<bool>;
    fn render_view(&mut self, instruction: &ViewInstruction) -> Result<(), RenderError>;
    /// Where the viewer would send the user for `instruction`.
    fn viewer_targets(&self, instruction: &ViewInstruction) -> Vec<String>;
    fn open_external(&mut self, url: &str) -> Result<(), RenderError>;
    fn submit_report(&mut self, request: &ReportRequest) -> Result<(), ReportError>;
    fn panel_content(&self) -> &PanelContent;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SidebarEntry {
    Home,
    Assistant,
    Section {
        name: String,
        count: usize,
        expanded: bool,
    },
    Item {
        id: Option<CatalogItemId>,
        section: String,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SidebarModel {
    entries: Vec<SidebarEntry>,
    match_count: usize,
    searching: bool,
}

impl SidebarModel {
    fn build(items: &[CatalogItem], search_term: &str, expanded: &BTreeSet<String>) -> Self {
        let index = NavigationIndex::build(items, search_term);
        let searching = index.is_searching();
        let mut entries = vec![SidebarEntry::Home, SidebarEntry::Assistant];
        for group in index.groups() {
            // Searching opens every section, like an expander defaulting open.
            let is_open = searching || expanded.contains(group.name);
            entries.push(SidebarEntry::Section {
                name: group.name.to_owned(),
                count: group.items.len(),
                expanded: is_open,
            });
            if is_open {
                entries.extend(group.items.iter().map(|item| SidebarEntry::Item {
                    id: item.id,
                    section: group.name.to_owned(),
                    label: item_label(item),
                }));
            }
        }
        Self {
            entries,
            match_count: index.match_count(),
            searching,
        }
    }

    fn is_empty(&self) -> bool {
        self.match_count == 0
    }
}

#[derive(Debug, Clone, Default)]
struct ViewData {
    catalog: Arc<[CatalogItem]>,
    cursor: usize,
    expanded: BTreeSet<String>,
    report_form: Option<ReportForm>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn sidebar(&self, state: &AppState) -> SidebarModel {
        SidebarModel::build(&self.catalog, &state.search_term, &self.expanded)
    }

    fn item(&self, id: CatalogItemId) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| item.id == Some(id))
    }

    fn selected_item(&self, state: &AppState) -> Option<&CatalogItem> {
        state.selection.selected_item().and_then(|id| self.item(id))
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        catalog: runtime.catalog(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, runtime, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    match state.focus {
        Focus::Search => {
            handle_search_key(state, view_data, key);
            false
        }
        Focus::ReportForm => {
            handle_report_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
        Focus::Sidebar => handle_sidebar_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter | KeyCode::Esc | KeyCode::Down | KeyCode::Tab, _) => {
            state.dispatch(AppCommand::FocusSidebar);
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::ClearSearch);
            view_data.cursor = 0;
        }
        (KeyCode::Backspace, _) => {
            state.dispatch(AppCommand::PopSearchChar);
            view_data.cursor = 0;
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::PushSearchChar(ch));
            view_data.cursor = 0;
        }
        _ => {}
    }
}

fn handle_sidebar_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let sidebar = view_data.sidebar(state);
    let last = sidebar.entries.len().saturating_sub(1);

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('j') | KeyCode::Down, _) => move_cursor(view_data, last, 1),
        (KeyCode::Char('k') | KeyCode::Up, _) => move_cursor(view_data, last, -1),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
            move_cursor(view_data, last, HALF_PAGE_ROWS);
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
            move_cursor(view_data, last, -HALF_PAGE_ROWS);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => view_data.cursor = 0,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => view_data.cursor = last,
        (KeyCode::Char('/'), _) => {
            state.dispatch(AppCommand::FocusSearch);
        }
        (KeyCode::Esc, _) => {
            if state.dispatch(AppCommand::ClearSearch).is_empty() {
                state.dispatch(AppCommand::ClearSelection);
            }
            view_data.cursor = 0;
        }
        (KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right, _) => {
            if let Some(entry) = sidebar.entries.get(view_data.cursor).cloned() {
                activate_entry(state, runtime, view_data, internal_tx, entry);
            }
        }
        (KeyCode::Char('h') | KeyCode::Left, _) => {
            collapse_at_cursor(state, view_data, &sidebar, internal_tx);
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            match view_data.selected_item(state).cloned() {
                Some(item) => render_item(state, runtime, view_data, internal_tx, &item),
                None => emit_status(state, view_data, internal_tx, "select an item to view"),
            }
        }
        (KeyCode::Char('o'), KeyModifiers::NONE) => {
            open_active_panel_externally(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            open_report_form(state, view_data, internal_tx);
        }
        (KeyCode::Char('R'), _) => reload_catalog(state, runtime, view_data, internal_tx),
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn move_cursor(view_data: &mut ViewData, last: usize, delta: isize) {
    let next = view_data.cursor.saturating_add_signed(delta);
    view_data.cursor = next.min(last);
}

fn activate_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    entry: SidebarEntry,
) {
    match entry {
        SidebarEntry::Home => {
            state.dispatch(AppCommand::ClearSelection);
        }
        SidebarEntry::Assistant => {
            state.dispatch(AppCommand::SelectAssistant);
        }
        SidebarEntry::Section { name, .. } => {
            if state.search_term.is_empty() && !view_data.expanded.remove(&name) {
                view_data.expanded.insert(name);
            }
        }
        SidebarEntry::Item { id: None, label, .. } => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{label} has no numeric ID in the catalog and cannot be opened"),
            );
        }
        SidebarEntry::Item { id: Some(id), .. } => {
            state.dispatch(AppCommand::SelectItem(id));
            if let Some(item) = view_data.item(id).cloned() {
                render_item(state, runtime, view_data, internal_tx, &item);
            }
        }
    }
}

fn collapse_at_cursor(
    state: &mut AppState,
    view_data: &mut ViewData,
    sidebar: &SidebarModel,
    internal_tx: &Sender<InternalEvent>,
) {
    let section = match sidebar.entries.get(view_data.cursor) {
        Some(SidebarEntry::Section { name, .. }) => name.clone(),
        Some(SidebarEntry::Item { section, .. }) => section.clone(),
        _ => return,
    };
    if sidebar.searching {
        emit_status(state, view_data, internal_tx, "clear the search to collapse sections");
        return;
    }
    view_data.expanded.remove(&section);
    if let Some(header) = sidebar.entries.iter().position(
        |entry| matches!(entry, SidebarEntry::Section { name, .. } if *name == section),
    ) {
        view_data.cursor = header;
    }
}

fn render_item<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    item: &CatalogItem,
) {
    let instruction = resolve(item);
    match runtime.render_view(&instruction) {
        Ok(()) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("{} opened: {}", instruction.kind_label(), item.title),
        ),
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error}")),
    }
}

fn open_active_panel_externally<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let content = runtime.panel_content();
    let url = match state.selection.active_panel() {
        ActivePanel::CatalogItem => view_data.selected_item(state).map(|item| item.url.clone()),
        ActivePanel::Assistant => Some(content.assistant_url.clone()),
        ActivePanel::None => Some(content.sister_site_url.clone()),
    };
    let Some(url) = url.filter(|url| !url.trim().is_empty()) else {
        emit_status(state, view_data, internal_tx, "nothing to open");
        return;
    };

    match runtime.open_external(&url) {
        Ok(()) => emit_status(state, view_data, internal_tx, format!("opened {url}")),
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error}")),
    }
}

fn open_report_form(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(AppCommand::OpenReportForm);
    if state.focus == Focus::ReportForm {
        view_data.report_form = Some(ReportForm::for_item(view_data.selected_item(state)));
        return;
    }
    if !events.is_empty() {
        // Refused; restart the clear timer for the dispatcher's message.
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn close_report_form(state: &mut AppState, view_data: &mut ViewData) {
    state.dispatch(AppCommand::CloseReportForm);
    view_data.report_form = None;
}

fn handle_report_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.report_form.as_mut() else {
        state.dispatch(AppCommand::CloseReportForm);
        return;
    };

    match (key.code, key.modifiers, form.field) {
        (KeyCode::Esc, _, _) => {
            close_report_form(state, view_data);
            emit_status(state, view_data, internal_tx, "report canceled");
        }
        (KeyCode::Tab | KeyCode::BackTab, _, _) => form.toggle_field(),
        (KeyCode::Enter, _, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL, _) => {
            submit_report_form(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Left | KeyCode::Up, _, ReportField::Kind)
        | (KeyCode::Char('h' | 'k'), _, ReportField::Kind) => form.cycle_kind(-1),
        (KeyCode::Right | KeyCode::Down, _, ReportField::Kind)
        | (KeyCode::Char('l' | 'j' | ' '), _, ReportField::Kind) => form.cycle_kind(1),
        (KeyCode::Char(digit @ '1'..='3'), _, ReportField::Kind) => {
            let index = digit as usize - '1' as usize;
            form.kind = ReportKind::ALL[index];
        }
        (KeyCode::Backspace, _, ReportField::Url) => form.pop_char(),
        (KeyCode::Char('u'), KeyModifiers::CONTROL, ReportField::Url) => form.url.clear(),
        (KeyCode::Char(ch), modifiers, ReportField::Url)
            if !modifiers.contains(KeyModifiers::CONTROL) =>
        {
            form.push_char(ch);
        }
        _ => {}
    }
}

fn submit_report_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.report_form.as_ref() else {
        return;
    };
    let request = match form.validate() {
        Ok(request) => request,
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("{error}"));
            return;
        }
    };

    match runtime.submit_report(&request) {
        Ok(()) => {
            close_report_form(state, view_data);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("報告を送信しました: {}", request.kind.label()),
            );
        }
        // The form stays open so nothing typed is lost.
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error}")),
    }
}

fn reload_catalog<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.reload_catalog() {
        Ok(false) => emit_status(state, view_data, internal_tx, "catalog unchanged"),
        Ok(true) => {
            view_data.catalog = runtime.catalog();
            if let Some(id) = state.selection.selected_item()
                && view_data.item(id).is_none()
            {
                state.dispatch(AppCommand::ClearSelection);
            }
            let last = view_data.sidebar(state).entries.len().saturating_sub(1);
            view_data.cursor = view_data.cursor.min(last);
            let count = view_data.catalog.len();
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("catalog reloaded: {count} items"),
            );
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("reload failed, keeping previous catalog: {error:#}"),
        ),
    }
}

fn render<R: AppRuntime>(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    runtime: &R,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state)).block(
        Block::default()
            .title(APP_TITLE)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(layout[1]);
    render_sidebar(frame, body[0], state, view_data);

    let (title, text) = match state.selection.active_panel() {
        ActivePanel::None => ("home", render_home_text(runtime.panel_content())),
        ActivePanel::Assistant => (
            "assistant",
            render_assistant_text(runtime.panel_content()),
        ),
        ActivePanel::CatalogItem => (
            "document",
            view_data
                .selected_item(state)
                .map(|item| render_detail_text(item, &runtime.viewer_targets(&resolve(item))))
                .unwrap_or_else(|| "selected item is no longer in the catalog".to_owned()),
        ),
    };
    let main = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(main, body[1]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = &view_data.report_form {
        let area = centered_rect(64, 40, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_report_form_text(form))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("リンクの不具合を報告")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(72, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_text(state: &AppState) -> String {
    let cursor = if state.focus == Focus::Search {
        "_"
    } else {
        ""
    };
    format!("項目名を検索: {}{cursor}", state.search_term)
}

fn render_sidebar(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let sidebar = view_data.sidebar(state);
    let lines = sidebar_lines(&sidebar, state, view_data.cursor);

    let visible = usize::from(area.height.saturating_sub(2));
    // Keep the cursor row on screen; the two header lines scroll with it.
    let cursor_line = view_data.cursor + 2;
    let offset = cursor_line.saturating_sub(visible.saturating_sub(1));
    let list = Paragraph::new(lines)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
        .block(Block::default().title("catalog").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn sidebar_lines(sidebar: &SidebarModel, state: &AppState, cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(format!("表示件数: {}件", sidebar.match_count))];
    if sidebar.is_empty() {
        lines.push(Line::from("該当する項目がありません"));
    } else {
        lines.push(Line::from("─".repeat(24)));
    }

    for (index, entry) in sidebar.entries.iter().enumerate() {
        let is_active = match entry {
            SidebarEntry::Home => state.selection.active_panel() == ActivePanel::None,
            SidebarEntry::Assistant => state.selection.active_panel() == ActivePanel::Assistant,
            SidebarEntry::Item { id: Some(id), .. } => state.selection.selected_item() == Some(*id),
            _ => false,
        };
        let text = sidebar_entry_text(entry, is_active);
        let mut style = Style::default();
        if matches!(entry, SidebarEntry::Section { .. }) {
            style = style.add_modifier(Modifier::BOLD);
        }
        if matches!(entry, SidebarEntry::Item { id: None, .. }) {
            style = style.fg(Color::DarkGray);
        }
        if index == cursor && state.focus == Focus::Sidebar {
            style = style.fg(Color::Black).bg(Color::Cyan);
        }
        lines.push(Line::styled(text, style));
    }
    lines
}

fn sidebar_entry_text(entry: &SidebarEntry, is_active: bool) -> String {
    let marker = if is_active { "•" } else { " " };
    match entry {
        SidebarEntry::Home => format!("{marker} {HOME_LABEL}"),
        SidebarEntry::Assistant => format!("{marker} {ASSISTANT_LABEL}"),
        SidebarEntry::Section {
            name,
            count,
            expanded,
        } => {
            let arrow = if *expanded {
                SECTION_OPEN
            } else {
                SECTION_CLOSED
            };
            format!("{arrow} {name} ({count})")
        }
        SidebarEntry::Item { label, .. } => format!("  {marker} {label}"),
    }
}

fn render_detail_text(item: &CatalogItem, viewer_targets: &[String]) -> String {
    let instruction = resolve(item);
    let mut lines = vec![
        item.title.clone(),
        String::new(),
        format!("section: {}", item.section_name),
        format!("entry:   {}", item_label(item)),
        format!("type:    {}", instruction.kind_label()),
        format!("URL:     {}", item.url),
    ];
    if let Some(secondary) = item.secondary_url() {
        lines.push(format!("URL2:    {secondary}"));
    }
    if !viewer_targets.is_empty() {
        lines.push(String::new());
        lines.push("viewer:".to_owned());
        lines.extend(viewer_targets.iter().map(|target| format!("  {target}")));
    }
    lines.push(String::new());
    lines.push("v view again | o 新しいタブで開く | r リンクの不具合を報告".to_owned());
    lines.join("\n")
}

fn render_home_text(content: &PanelContent) -> String {
    let mut lines = vec![
        "サイドバーから表示したい項目を選択してください。".to_owned(),
        String::new(),
    ];
    if !content.sister_site_url.trim().is_empty() {
        lines.push(format!(
            "姉妹サイト：俺の監査実務ハンドブック {}",
            content.sister_site_url
        ));
        lines.push("(o で開く)".to_owned());
        lines.push(String::new());
    }
    lines.push("📋 更新履歴".to_owned());
    lines.push("以下の更新を反映しました。".to_owned());
    if content.updates.is_empty() {
        lines.push("  (なし)".to_owned());
    }
    for update in &content.updates {
        lines.push(format!(
            "  {}  {}  {}",
            format_update_date(update),
            update.title,
            update.url
        ));
    }
    lines.join("\n")
}

fn format_update_date(update: &UpdateNote) -> String {
    format!(
        "{:04}/{:02}/{:02}",
        update.date.year(),
        u8::from(update.date.month()),
        update.date.day()
    )
}

fn render_assistant_text(content: &PanelContent) -> String {
    [
        format!("### {ASSISTANT_TITLE}"),
        String::new(),
        "ヘルプ：使い方".to_owned(),
        "シークレットコードを入力し、「Start Chat」を押してください。会計基準等に則って回答してくれます。"
            .to_owned(),
        String::new(),
        "🚨 機密情報の入力は避けてください。また、回答内容は必ずご自身でレビューしてください。"
            .to_owned(),
        String::new(),
        format!("chatbot: {}", content.assistant_url),
        "o でブラウザを開く".to_owned(),
    ]
    .join("\n")
}

fn render_report_form_text(form: &ReportForm) -> String {
    let focus_mark = |field: ReportField| if form.field == field { ">" } else { " " };
    let kinds = ReportKind::ALL
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let mark = if *kind == form.kind { "(•)" } else { "( )" };
            format!("{mark} {} {}", index + 1, kind.label())
        })
        .collect::<Vec<_>>()
        .join("  ");
    [
        "リンク切れ等を見つけた場合は、以下のフォームから報告してください。".to_owned(),
        String::new(),
        format!("{} 報告の種類: {kinds}", focus_mark(ReportField::Kind)),
        format!("{} 対象URL:   {}", focus_mark(ReportField::Url), form.url),
        String::new(),
        "tab field | ←/→ or 1-3 reason | enter send | esc cancel".to_owned(),
    ]
    .join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
sidebar: j/k move | g/G top/bottom | ctrl+d/u or pgdn/pgup half page\n\
sidebar: enter/l open item or toggle section | h collapse | / search | esc clear search\n\
item: v view again | o open externally | r report a link problem\n\
catalog: R reload from disk\n\
search: type to filter titles | backspace delete | ctrl+u clear | enter/esc back\n\
report: tab field | ←/→ or 1-3 reason | type URL | enter send | esc cancel"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let (mode, hints) = match state.focus {
        Focus::Sidebar => (
            "NAV",
            "j/k move | enter open | / search | o open | r report | R reload | ? help | q quit",
        ),
        Focus::Search => ("SEARCH", "type to filter | ctrl+u clear | enter done"),
        Focus::ReportForm => ("REPORT", "tab field | enter send | esc cancel"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
