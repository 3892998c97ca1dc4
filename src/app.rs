//! Event-driven application state.
//!
//! All mutation goes through [`AppState::update`], which returns the side
//! effects (network calls) for the caller to run. Completions come back as
//! messages on the same loop, so no locking is involved.

use chrono::{DateTime, Local};

use crate::api::ApiError;
use crate::catalog::CategoryCatalog;
use crate::config::{Config, LOCATIONS};
use crate::models::{Category, Partition, SearchResult};
use crate::paginate::ResultPaginator;
use crate::request::{RequestHints, SearchRequest};
use crate::selection::{KeywordKind, SelectionState};
use crate::viewport::{ViewMode, ViewportClassifier};

pub const SEARCH_FAILED: &str = "Search failed: check that the backend server is running";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Category,
    Core,
    Aux,
    Regions,
    Matched,
    Excluded,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Category,
        Focus::Core,
        Focus::Aux,
        Focus::Regions,
        Focus::Matched,
        Focus::Excluded,
    ];

    pub fn keyword_kind(self) -> Option<KeywordKind> {
        match self {
            Focus::Core => Some(KeywordKind::Core),
            Focus::Aux => Some(KeywordKind::Aux),
            _ => None,
        }
    }

    pub fn partition(self) -> Option<Partition> {
        match self {
            Focus::Matched => Some(Partition::Matched),
            Focus::Excluded => Some(Partition::Excluded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Modal; swallows the next key press.
    Blocking(String),
    /// Shown in the status line until replaced.
    Status(String),
}

#[derive(Debug)]
pub enum Msg {
    CatalogLoaded(Result<Vec<Category>, ApiError>),
    Resized { columns: u16 },
    FocusNext,
    FocusPrev,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Toggle the chip under the cursor.
    Toggle,
    ToggleAll,
    Search,
    SearchDone {
        seq: u64,
        result: Result<SearchResult, ApiError>,
    },
    ToggleExcluded,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Compact-mode scroll position of a partition's reveal trigger.
    Scrolled {
        partition: Partition,
        viewport_bottom_row: usize,
        trigger_row: usize,
    },
    /// Open the posting under the cursor in the system browser.
    OpenLink,
    LinkOpenFailed(String),
    DismissNotice,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCatalog,
    Search { seq: u64, request: SearchRequest },
    OpenLink(String),
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    catalog: CategoryCatalog,
    selection: SelectionState,
    viewport: ViewportClassifier,
    paginator: ResultPaginator,
    hints: RequestHints,
    has_result: bool,
    searched_at: Option<DateTime<Local>>,
    busy: bool,
    search_seq: u64,
    show_excluded: bool,
    focus: Focus,
    core_cursor: usize,
    aux_cursor: usize,
    region_cursor: usize,
    matched_cursor: usize,
    excluded_cursor: usize,
    notice: Option<Notice>,
}

impl AppState {
    /// Builds the initial state and the startup effects.
    pub fn new(config: &Config, columns: u16) -> (Self, Vec<Effect>) {
        let state = Self {
            catalog: CategoryCatalog::default(),
            selection: SelectionState::new(),
            viewport: ViewportClassifier::new(columns, config.cell_width_px),
            paginator: ResultPaginator::new(
                SearchResult::default(),
                config.page_size,
                config.reveal_margin_rows,
            ),
            hints: RequestHints::from(config),
            has_result: false,
            searched_at: None,
            busy: false,
            search_seq: 0,
            show_excluded: false,
            focus: Focus::Category,
            core_cursor: 0,
            aux_cursor: 0,
            region_cursor: 0,
            matched_cursor: 0,
            excluded_cursor: 0,
            notice: None,
        };
        (state, vec![Effect::LoadCatalog])
    }

    // --- Accessors for rendering ---

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn mode(&self) -> ViewMode {
        self.viewport.mode()
    }

    pub fn viewport_width_px(&self) -> u32 {
        self.viewport.width_px()
    }

    pub fn result(&self) -> Option<&ResultPaginator> {
        self.has_result.then_some(&self.paginator)
    }

    pub fn searched_at(&self) -> Option<DateTime<Local>> {
        self.searched_at
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_search(&self) -> bool {
        !self.busy && self.selection.category_id().is_some()
    }

    pub fn show_excluded(&self) -> bool {
        self.show_excluded
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn has_blocking_notice(&self) -> bool {
        matches!(self.notice, Some(Notice::Blocking(_)))
    }

    pub fn chip_cursor(&self, focus: Focus) -> usize {
        match focus {
            Focus::Core => self.core_cursor,
            Focus::Aux => self.aux_cursor,
            Focus::Regions => self.region_cursor,
            _ => 0,
        }
    }

    /// Cursor within the visible slice of `partition`.
    pub fn result_cursor(&self, partition: Partition) -> usize {
        let visible = self.visible_len(partition);
        let cursor = match partition {
            Partition::Matched => self.matched_cursor,
            Partition::Excluded => self.excluded_cursor,
        };
        cursor.min(visible.saturating_sub(1))
    }

    // --- Update ---

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::CatalogLoaded(Ok(categories)) => {
                tracing::info!(count = categories.len(), "category catalog loaded");
                self.catalog = CategoryCatalog::new(categories);
                if let Some(first) = self.catalog.first().map(|c| c.id.clone()) {
                    self.select_category(&first);
                }
            }
            Msg::CatalogLoaded(Err(e)) => {
                tracing::warn!(error = %e, "category catalog unavailable");
            }
            Msg::Resized { columns } => {
                if self.viewport.resize(columns) {
                    tracing::info!(mode = ?self.viewport.mode(), "presentation mode changed");
                }
            }
            Msg::FocusNext => self.cycle_focus(1),
            Msg::FocusPrev => self.cycle_focus(-1),
            Msg::CursorLeft => self.move_horizontal(-1),
            Msg::CursorRight => self.move_horizontal(1),
            Msg::CursorUp => self.move_vertical(-1),
            Msg::CursorDown => self.move_vertical(1),
            Msg::Toggle => self.toggle_under_cursor(),
            Msg::ToggleAll => {
                if let Some(kind) = self.focus.keyword_kind() {
                    self.selection.toggle_all_keywords(kind);
                }
            }
            Msg::Search => return self.begin_search(),
            Msg::SearchDone { seq, result } => self.finish_search(seq, result),
            Msg::ToggleExcluded => {
                self.show_excluded = !self.show_excluded;
                if !self.show_excluded && self.focus == Focus::Excluded {
                    self.focus = Focus::Matched;
                }
            }
            Msg::NextPage => self.turn_page(ResultPaginator::next_page),
            Msg::PrevPage => self.turn_page(ResultPaginator::prev_page),
            Msg::FirstPage => self.turn_page(ResultPaginator::first_page),
            Msg::LastPage => self.turn_page(ResultPaginator::last_page),
            Msg::Scrolled {
                partition,
                viewport_bottom_row,
                trigger_row,
            } => {
                if self.has_result
                    && self.mode() == ViewMode::Compact
                    && self.paginator.on_scroll(partition, viewport_bottom_row, trigger_row)
                {
                    tracing::debug!(
                        ?partition,
                        visible = self.paginator.pager(partition).reveal.visible_count(),
                        "revealed more results"
                    );
                }
            }
            Msg::OpenLink => {
                let Some(partition) = self.focus.partition() else {
                    return Vec::new();
                };
                let cursor = self.result_cursor(partition);
                let link = self
                    .result()
                    .and_then(|r| r.visible(partition, self.mode()).get(cursor))
                    .map(|job| job.link.clone());
                if let Some(link) = link {
                    self.notice = Some(Notice::Status(link.clone()));
                    return vec![Effect::OpenLink(link)];
                }
            }
            Msg::LinkOpenFailed(link) => {
                self.notice = Some(Notice::Status(format!("Could not open a browser: {link}")));
            }
            Msg::DismissNotice => self.notice = None,
            Msg::Quit => return vec![Effect::Quit],
        }
        Vec::new()
    }

    fn select_category(&mut self, id: &str) {
        if self.selection.set_category(&self.catalog, id) {
            self.core_cursor = 0;
            self.aux_cursor = 0;
        }
    }

    fn begin_search(&mut self) -> Vec<Effect> {
        if self.busy {
            return Vec::new();
        }
        let request = match SearchRequest::from_selection(&self.selection, self.hints) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "search ignored");
                return Vec::new();
            }
        };

        self.search_seq += 1;
        self.busy = true;
        self.has_result = false;
        tracing::info!(
            seq = self.search_seq,
            category = %request.category,
            location = ?request.location,
            keywords = request.allowed_keywords.as_ref().map(Vec::len),
            "search issued"
        );
        vec![Effect::Search {
            seq: self.search_seq,
            request,
        }]
    }

    fn finish_search(&mut self, seq: u64, result: Result<SearchResult, ApiError>) {
        if seq != self.search_seq {
            tracing::warn!(seq, latest = self.search_seq, "discarding stale search response");
            return;
        }
        self.busy = false;
        match result {
            Ok(result) => {
                tracing::info!(
                    seq,
                    matched = result.matched.len(),
                    excluded = result.excluded.len(),
                    "search completed"
                );
                self.paginator.install(result);
                self.has_result = true;
                self.searched_at = Some(Local::now());
                self.matched_cursor = 0;
                self.excluded_cursor = 0;
            }
            Err(e) => {
                tracing::error!(seq, error = %e, "search failed");
                self.notice = Some(Notice::Blocking(SEARCH_FAILED.to_string()));
            }
        }
    }

    fn cycle_focus(&mut self, step: isize) {
        let order: Vec<Focus> = Focus::ORDER
            .into_iter()
            .filter(|f| *f != Focus::Excluded || self.show_excluded)
            .collect();
        let len = order.len() as isize;
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        self.focus = order[(current + step).rem_euclid(len) as usize];
    }

    fn move_horizontal(&mut self, step: isize) {
        match self.focus {
            Focus::Category => {
                let next = self
                    .selection
                    .category_id()
                    .and_then(|id| self.catalog.cycle_from(id, step))
                    .or_else(|| self.catalog.first())
                    .map(|c| c.id.clone());
                if let Some(id) = next {
                    self.select_category(&id);
                }
            }
            Focus::Core | Focus::Aux | Focus::Regions => {
                let len = self.chip_count(self.focus);
                if len == 0 {
                    return;
                }
                let cursor = self.chip_cursor(self.focus) as isize;
                let next = (cursor + step).rem_euclid(len as isize) as usize;
                match self.focus {
                    Focus::Core => self.core_cursor = next,
                    Focus::Aux => self.aux_cursor = next,
                    _ => self.region_cursor = next,
                }
            }
            Focus::Matched | Focus::Excluded => {
                if step > 0 {
                    self.turn_page(ResultPaginator::next_page);
                } else {
                    self.turn_page(ResultPaginator::prev_page);
                }
            }
        }
    }

    fn move_vertical(&mut self, step: isize) {
        let Some(partition) = self.focus.partition() else {
            return;
        };
        let visible = self.visible_len(partition);
        if visible == 0 {
            return;
        }
        let cursor = self.result_cursor(partition) as isize;
        let next = (cursor + step).clamp(0, visible as isize - 1) as usize;
        match partition {
            Partition::Matched => self.matched_cursor = next,
            Partition::Excluded => self.excluded_cursor = next,
        }
    }

    fn toggle_under_cursor(&mut self) {
        let cursor = self.chip_cursor(self.focus);
        match self.focus {
            Focus::Core | Focus::Aux => {
                let Some(kind) = self.focus.keyword_kind() else { return };
                if let Some(keyword) = self.selection.vocabulary(kind).get(cursor).cloned() {
                    self.selection.toggle_keyword(kind, &keyword);
                }
            }
            Focus::Regions => {
                if let Some(region) = LOCATIONS.get(cursor) {
                    self.selection.toggle_location(region);
                }
            }
            _ => {}
        }
    }

    fn turn_page(&mut self, turn: fn(&mut ResultPaginator, Partition)) {
        if !self.has_result || self.mode() != ViewMode::Regular {
            return;
        }
        let Some(partition) = self.focus.partition() else {
            return;
        };
        turn(&mut self.paginator, partition);
        match partition {
            Partition::Matched => self.matched_cursor = 0,
            Partition::Excluded => self.excluded_cursor = 0,
        }
    }

    fn chip_count(&self, focus: Focus) -> usize {
        match focus {
            Focus::Core => self.selection.vocabulary(KeywordKind::Core).len(),
            Focus::Aux => self.selection.vocabulary(KeywordKind::Aux).len(),
            Focus::Regions => LOCATIONS.len(),
            _ => 0,
        }
    }

    fn visible_len(&self, partition: Partition) -> usize {
        self.result()
            .map(|r| r.visible(partition, self.mode()).len())
            .unwrap_or(0)
    }
}
