use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::io::stdout;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::api::JobBoard;
use crate::app::{AppState, Effect, Focus, Msg, Notice};
use crate::card::JobCard;
use crate::config::{Config, LOCATIONS};
use crate::models::Partition;
use crate::paginate::{PageItem, PageSelector};
use crate::selection::KeywordKind;
use crate::viewport::ViewMode;

const HELP: &str = " tab:focus  ←/→:move  space:toggle  a:all  enter:search/open  s:search  x:excluded  [/]:page  q:quit";

/// Where a compact-mode reveal trigger sits relative to its pane's viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RevealProbe {
    partition: Partition,
    viewport_bottom_row: usize,
    trigger_row: usize,
}

pub async fn run_browse(config: &Config, board: Arc<dyn JobBoard>) -> Result<()> {
    let (columns, _) = terminal::size()?;
    let (mut state, effects) = AppState::new(config, columns);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, board, effects).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    board: Arc<dyn JobBoard>,
    startup: Vec<Effect>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Msg>();
    let mut events = EventStream::new();
    let mut last_probes: Vec<RevealProbe> = Vec::new();

    if run_effects(startup, &board, &tx) {
        return Ok(());
    }

    loop {
        let mut probes = Vec::new();
        terminal.draw(|frame| probes = draw(frame, state))?;

        let mut pending = reveal_messages(&probes, &last_probes);
        last_probes = probes;

        if pending.is_empty() {
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => pending.extend(map_event(state, event)),
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(msg) = rx.recv() => pending.push(msg),
            }
        }

        for msg in pending {
            if run_effects(state.update(msg), &board, &tx) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// A trigger only reports when its position changes, like an intersection
/// observer firing on entry.
fn reveal_messages(probes: &[RevealProbe], last: &[RevealProbe]) -> Vec<Msg> {
    probes
        .iter()
        .filter(|probe| !last.contains(probe))
        .map(|probe| Msg::Scrolled {
            partition: probe.partition,
            viewport_bottom_row: probe.viewport_bottom_row,
            trigger_row: probe.trigger_row,
        })
        .collect()
}

/// Spawns network effects; returns true when the app should exit.
fn run_effects(effects: Vec<Effect>, board: &Arc<dyn JobBoard>, tx: &UnboundedSender<Msg>) -> bool {
    for effect in effects {
        match effect {
            Effect::LoadCatalog => {
                let board = Arc::clone(board);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = board.categories().await;
                    let _ = tx.send(Msg::CatalogLoaded(result));
                });
            }
            Effect::Search { seq, request } => {
                let board = Arc::clone(board);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = board.search(&request).await;
                    let _ = tx.send(Msg::SearchDone { seq, result });
                });
            }
            Effect::OpenLink(link) => {
                if let Err(e) = open::that_detached(&link) {
                    tracing::warn!(error = %e, %link, "could not open browser");
                    let _ = tx.send(Msg::LinkOpenFailed(link));
                }
            }
            Effect::Quit => return true,
        }
    }
    false
}

fn map_event(state: &AppState, event: Event) -> Option<Msg> {
    match event {
        Event::Resize(columns, _) => Some(Msg::Resized { columns }),
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if state.has_blocking_notice() {
                return Some(Msg::DismissNotice);
            }
            map_key(state, key)
        }
        _ => None,
    }
}

fn map_key(state: &AppState, key: KeyEvent) -> Option<Msg> {
    let in_results = state.focus().partition().is_some();
    let msg = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Msg::Quit,
        KeyCode::Tab => Msg::FocusNext,
        KeyCode::BackTab => Msg::FocusPrev,
        KeyCode::Left | KeyCode::Char('h') => Msg::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Msg::CursorRight,
        KeyCode::Up | KeyCode::Char('k') => Msg::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Msg::CursorDown,
        KeyCode::Char(' ') => Msg::Toggle,
        KeyCode::Char('a') => Msg::ToggleAll,
        KeyCode::Enter if in_results => Msg::OpenLink,
        KeyCode::Enter | KeyCode::Char('s') => Msg::Search,
        KeyCode::Char('x') => Msg::ToggleExcluded,
        KeyCode::Char(']') | KeyCode::PageDown => Msg::NextPage,
        KeyCode::Char('[') | KeyCode::PageUp => Msg::PrevPage,
        KeyCode::Char('g') => Msg::FirstPage,
        KeyCode::Char('G') => Msg::LastPage,
        _ => return None,
    };
    Some(msg)
}

fn draw(frame: &mut Frame, state: &AppState) -> Vec<RevealProbe> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let mode_label = match state.mode() {
        ViewMode::Compact => "compact",
        ViewMode::Regular => "regular",
    };
    let header = Line::from(vec![
        Span::styled(" Job Finder ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("[{} · {}px]", mode_label, state.viewport_width_px()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let filters = build_filters(state);
    let (filter_area, results_area) = match state.mode() {
        ViewMode::Regular => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(rows[1]);
            (cols[0], cols[1])
        }
        ViewMode::Compact => {
            let wanted = filters.lines.len() as u16 + 2;
            let height = wanted.min(rows[1].height / 2);
            let stacked = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(height), Constraint::Min(0)])
                .split(rows[1]);
            (stacked[0], stacked[1])
        }
    };

    let filter_widget = Paragraph::new(filters)
        .block(Block::default().borders(Borders::ALL).title(" Filters "))
        .wrap(Wrap { trim: false });
    frame.render_widget(filter_widget, filter_area);

    let probes = draw_results(frame, state, results_area);

    // Footer: status notice or help
    let footer = match state.notice() {
        Some(Notice::Status(text)) => Paragraph::new(format!(" {}", text)).style(Style::default().fg(Color::Cyan)),
        _ => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[2]);

    if let Some(Notice::Blocking(text)) = state.notice() {
        draw_modal(frame, text);
    }

    probes
}

fn build_filters(state: &AppState) -> Text<'static> {
    let selection = state.selection();
    let focus = state.focus();
    let mut lines: Vec<Line> = Vec::new();

    let catalog = state.catalog();
    let category = match selection.category() {
        Some(c) => {
            let position = catalog.position(&c.id).map(|p| p + 1).unwrap_or(0);
            format!("{} ({}/{})", c.name, position, catalog.categories().len())
        }
        None if catalog.is_empty() => "(no categories)".to_string(),
        None => "(none)".to_string(),
    };
    lines.push(Line::from(vec![
        section_label("Category", focus == Focus::Category),
        Span::raw(format!("  < {} >", category)),
    ]));
    lines.push(Line::from(""));

    if selection.category().is_some() {
        for (kind, label, group) in [
            (KeywordKind::Core, "Core keywords", Focus::Core),
            (KeywordKind::Aux, "Aux keywords", Focus::Aux),
        ] {
            let toggle_label = if selection.is_all_selected(kind) { "clear all" } else { "select all" };
            lines.push(Line::from(vec![
                section_label(label, focus == group),
                Span::styled(format!("  (a: {})", toggle_label), Style::default().fg(Color::DarkGray)),
            ]));
            let chips = selection.vocabulary(kind).iter().map(|kw| {
                (kw.as_str(), selection.is_keyword_selected(kind, kw))
            });
            lines.push(chip_line(chips, (focus == group).then(|| state.chip_cursor(group))));
            lines.push(Line::from(""));
        }
    }

    lines.push(Line::from(section_label("Regions", focus == Focus::Regions)));
    let regions = LOCATIONS
        .iter()
        .map(|region| (*region, selection.is_location_selected(region)));
    lines.push(chip_line(regions, (focus == Focus::Regions).then(|| state.chip_cursor(Focus::Regions))));
    lines.push(Line::from(""));

    let (label, style) = if state.is_busy() {
        ("[ Searching... ]", Style::default().fg(Color::DarkGray))
    } else if state.can_search() {
        ("[ Search ]", Style::default().fg(Color::White).bg(Color::Blue))
    } else {
        ("[ Search ]", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(Span::styled(label, style)));

    Text::from(lines)
}

fn section_label(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Span::styled(label.to_string(), style)
}

fn chip_line<'a>(chips: impl Iterator<Item = (&'a str, bool)>, cursor: Option<usize>) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (label, selected)) in chips.enumerate() {
        let mark = if selected { "✓" } else { "✕" };
        let mut style = if selected {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if cursor == Some(i) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!("{} {}", label, mark), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn draw_results(frame: &mut Frame, state: &AppState, area: Rect) -> Vec<RevealProbe> {
    let Some(paginator) = state.result() else {
        let hint = if state.is_busy() {
            "Searching..."
        } else {
            "Choose filters and press Enter to search"
        };
        let widget = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Results "));
        frame.render_widget(widget, area);
        return Vec::new();
    };

    let result = paginator.result();
    let mut summary = format!(
        " matched {} | excluded {}",
        result.count_label(Partition::Matched),
        result.count_label(Partition::Excluded)
    );
    if let Some(at) = state.searched_at() {
        summary.push_str(&format!("  ·  {}", at.format("%H:%M:%S")));
    }
    let arrow = if state.show_excluded() { "▼" } else { "▶" };
    let toggle = format!(" {} Excluded postings ({})  x", arrow, paginator.len(Partition::Excluded));

    let mut constraints = vec![Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)];
    if state.show_excluded() {
        constraints.push(Constraint::Min(3));
    }
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(
        Paragraph::new(summary).style(Style::default().fg(Color::Gray)),
        panes[0],
    );

    let mut probes = Vec::new();
    probes.extend(draw_partition(frame, state, Partition::Matched, panes[1]));
    frame.render_widget(
        Paragraph::new(toggle).style(Style::default().fg(Color::DarkGray)),
        panes[2],
    );
    if state.show_excluded() {
        probes.extend(draw_partition(frame, state, Partition::Excluded, panes[3]));
    }
    probes
}

fn draw_partition(frame: &mut Frame, state: &AppState, partition: Partition, area: Rect) -> Option<RevealProbe> {
    let paginator = state.result()?;
    let mode = state.mode();
    let focused = state.focus().partition() == Some(partition);
    let cursor = state.result_cursor(partition);
    let jobs = paginator.visible(partition, mode);
    let selector = paginator.selector(partition);
    let width = area.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_row = 0;
    for (i, job) in jobs.iter().enumerate() {
        if i == cursor {
            cursor_row = lines.len();
        }
        lines.extend(JobCard::new(job, partition).lines(width, focused && i == cursor));
    }
    if jobs.is_empty() && partition == Partition::Matched {
        lines.push(Line::styled("No matching postings", Style::default().fg(Color::DarkGray)));
    }

    let mut trigger_row = None;
    if mode == ViewMode::Compact && paginator.has_trigger(partition) {
        trigger_row = Some(lines.len());
        lines.push(Line::styled("Loading more...", Style::default().fg(Color::DarkGray)));
    }

    let show_selector = mode == ViewMode::Regular && selector.total > 1;
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if show_selector { 1 } else { 0 }),
        ])
        .split(area);

    let label = match partition {
        Partition::Matched => "Matched",
        Partition::Excluded => "Excluded",
    };
    let mut title = format!(" {} ({}) ", label, paginator.len(partition));
    if mode == ViewMode::Regular {
        let page = paginator.pager(partition).pages.current_page();
        title.push_str(&format!("page {}/{} ", page, selector.total));
    }
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let inner_height = split[0].height.saturating_sub(2) as usize;
    let scroll = cursor_row.saturating_sub(inner_height / 3);
    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title))
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(widget, split[0]);

    if show_selector {
        frame.render_widget(Paragraph::new(selector_line(&selector)).centered(), split[1]);
    }

    trigger_row.map(|trigger_row| RevealProbe {
        partition,
        viewport_bottom_row: scroll + inner_height,
        trigger_row,
    })
}

fn selector_line(selector: &PageSelector) -> Line<'static> {
    let arrow = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        Span::styled(label, style)
    };

    let mut spans = vec![arrow("‹ ", selector.prev_enabled)];
    for item in &selector.items {
        match item {
            PageItem::Page(p) if *p == selector.current => spans.push(Span::styled(
                format!(" {} ", p),
                Style::default().fg(Color::White).bg(Color::Blue),
            )),
            PageItem::Page(p) => spans.push(Span::styled(format!(" {} ", p), Style::default().fg(Color::Gray))),
            PageItem::Ellipsis => spans.push(Span::styled(" … ", Style::default().fg(Color::DarkGray))),
        }
    }
    spans.push(arrow(" ›", selector.next_enabled));
    Line::from(spans)
}

fn draw_modal(frame: &mut Frame, text: &str) {
    let area = frame.area();
    let width = area.width.saturating_sub(4).min(64);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height.saturating_sub(5) / 2,
        width,
        height: 5.min(area.height),
    };
    let body = Text::from(vec![
        Line::from(text.to_string()),
        Line::from(""),
        Line::styled("press any key", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Error ").border_style(Style::default().fg(Color::Red))),
        popup,
    );
}
