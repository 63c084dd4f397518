mod help;
mod state;

use crate::cli::Cli;
use crate::dashboard::PublicationController;
use crate::model::{DashboardEvent, Paper, UiCommand};
use crate::orchestrator;
use crate::store::PaperStore;
use crate::styling::{compute_style, parse_hex_rgb, tint};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Terminal,
};
use state::{FormField, FormMode, FormState, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const ACCENT: Color = Color::Rgb(0x00, 0xf2, 0xff);
const MAX_TITLE_LINES: usize = 3;

pub async fn run<S: PaperStore + 'static>(
    args: Cli,
    controller: PublicationController<S>,
) -> Result<()> {
    // Unbounded channels: the UI never waits on the store.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<DashboardEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let mut initial = UiState {
        paper_goal: controller.progress().goal,
        ..Default::default()
    };
    if let Some(term) = args.search.clone() {
        initial.view.search = term;
    }

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(initial, event_rx, cmd_tx));

    orchestrator::run_controller(controller, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    match join_res {
        Ok(Ok(res)) => res,
        Ok(Err(_)) => Err(anyhow::anyhow!("TUI thread panicked")),
        Err(e) => Err(anyhow::anyhow!("TUI join failed: {e}")),
    }
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<DashboardEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now() - tick_rate;

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(&mut state, k, &cmd_tx) == KeyFlow::Quit {
                    let _ = cmd_tx.send(UiCommand::Quit);
                    break Ok(());
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

#[derive(Debug, PartialEq, Eq)]
enum KeyFlow {
    Continue,
    Quit,
}

fn send_sync(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>, cmd: UiCommand) {
    if cmd_tx.send(cmd).is_ok() {
        state.pending += 1;
    }
}

fn handle_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) -> KeyFlow {
    if (k.modifiers, k.code) == (KeyModifiers::CONTROL, KeyCode::Char('c')) {
        return KeyFlow::Quit;
    }
    if state.form.is_some() {
        handle_form_key(state, k, cmd_tx);
        return KeyFlow::Continue;
    }
    if state.search_editing {
        handle_search_key(state, k);
        return KeyFlow::Continue;
    }

    match k.code {
        KeyCode::Char('q') => return KeyFlow::Quit,
        KeyCode::Tab => state.tab = (state.tab + 1) % 2,
        KeyCode::Char('?') => state.tab = 1,
        KeyCode::Esc if state.tab == 1 => state.tab = 0,
        _ if state.tab != 0 => {}
        KeyCode::Char('r') => {
            state.info = "Refreshing…".into();
            send_sync(state, cmd_tx, UiCommand::Refresh);
        }
        KeyCode::Char('/') => state.search_editing = true,
        KeyCode::Char('n') | KeyCode::Char('a') => {
            state.form = Some(FormState::add());
            let _ = cmd_tx.send(UiCommand::OpenAddForm);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(form) = state.selected_paper().map(FormState::edit) {
                if let FormMode::Edit(id) = form.mode {
                    let _ = cmd_tx.send(UiCommand::BeginEdit { id });
                }
                state.form = Some(form);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = state.selected_paper().map(|p| p.id) {
                state.info = format!("Deleting #{id}…");
                send_sync(state, cmd_tx, UiCommand::Delete { id });
            }
        }
        KeyCode::Up | KeyCode::Char('k') => state.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => state.select_next(),
        _ => {}
    }
    KeyFlow::Continue
}

fn handle_search_key(state: &mut UiState, k: KeyEvent) {
    match k.code {
        KeyCode::Esc => {
            state.set_search(String::new());
            state.search_editing = false;
        }
        KeyCode::Enter => state.search_editing = false,
        KeyCode::Backspace => {
            let mut term = state.view.search.clone();
            term.pop();
            state.set_search(term);
        }
        KeyCode::Char(c) => {
            let mut term = state.view.search.clone();
            term.push(c);
            state.set_search(term);
        }
        _ => {}
    }
}

fn handle_form_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) {
    let Some(form) = state.form.as_mut() else {
        return;
    };
    let save = match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => true,
        (_, KeyCode::Enter) if form.field == FormField::Status => true,
        (_, KeyCode::Enter) => {
            form.title.push('\n');
            false
        }
        (_, KeyCode::Esc) => {
            state.form = None;
            let _ = cmd_tx.send(UiCommand::CancelForms);
            return;
        }
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
            form.toggle_field();
            false
        }
        (_, KeyCode::Backspace) => {
            form.active_buffer().pop();
            false
        }
        (_, KeyCode::Char(c)) => {
            form.active_buffer().push(c);
            false
        }
        _ => false,
    };
    if !save {
        return;
    }

    // Blank titles are rejected without closing the form.
    if matches!(form.mode, FormMode::Add) && form.title.trim().is_empty() {
        state.info = "Title is required".into();
        return;
    }
    let cmd = match form.mode {
        FormMode::Add => UiCommand::Add {
            title: form.title.clone(),
            status: form.status.clone(),
        },
        FormMode::Edit(id) => UiCommand::Edit {
            id,
            title: form.title.clone(),
            status: form.status.clone(),
        },
    };
    state.form = None;
    state.info = "Saving…".into();
    send_sync(state, cmd_tx, cmd);
}

fn rgb(hex: &str) -> Color {
    parse_hex_rgb(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(ACCENT)
}

/// Terminal rendering of a status badge.
fn badge_style(p: &Paper) -> Style {
    let style = compute_style(&p.status, p.color.as_deref(), p.font_color.as_deref());
    let mut s = Style::default().fg(rgb(&style.text_color));
    if let Some(base) = parse_hex_rgb(&style.base_color) {
        let (r, g, b) = tint(base, 0.2);
        s = s.bg(Color::Rgb(r, g, b));
    }
    if style.glow {
        s = s.add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
    }
    s
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let tabs = Tabs::new(vec!["Dashboard", "Help"])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("Research Portfolio"))
        .highlight_style(Style::default().fg(ACCENT));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_dashboard(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }

    draw_status_line(chunks[2], f, state);

    if let Some(form) = state.form.as_ref() {
        draw_form(area, f, form);
    }
}

fn draw_dashboard(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let r = &state.view.researcher;
    let mut header = vec![Line::from(vec![
        Span::styled(r.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if r.credentials.is_empty() {
            String::new()
        } else {
            format!(", {}", r.credentials)
        }),
    ])];
    if !r.guide.trim().is_empty() {
        header.push(Line::from(vec![
            Span::styled("Guided by ", Style::default().fg(Color::Gray)),
            Span::styled(r.guide.clone(), Style::default().fg(ACCENT)),
            Span::styled(
                if r.guide_credentials.is_empty() {
                    String::new()
                } else {
                    format!("  {}", r.guide_credentials)
                },
                Style::default().fg(Color::Gray),
            ),
        ]));
    }
    f.render_widget(
        Paragraph::new(header)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Researcher")),
        rows[0],
    );

    let progress = state.progress();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Total Papers"))
        .gauge_style(Style::default().fg(ACCENT))
        .ratio(progress.ratio)
        .label(format!(
            "{} / {}  ({}%)",
            progress.count, progress.goal, progress.percent
        ));
    f.render_widget(gauge, rows[1]);

    let search_style = if state.search_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let search_text = if state.view.search.is_empty() && !state.search_editing {
        Line::from(Span::styled(
            "Search papers or status... (press /)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::raw(state.view.search.clone()),
            Span::styled(if state.search_editing { "▏" } else { "" }, search_style),
        ])
    };
    f.render_widget(
        Paragraph::new(search_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(search_style),
        ),
        rows[2],
    );

    draw_table(rows[3], f, state);
}

fn draw_table(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let visible = state.visible();
    let header = Row::new(vec!["ID", "Publication Title", "Journal Status"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|p| {
            let title_lines: Vec<Line> = p
                .title
                .lines()
                .take(MAX_TITLE_LINES)
                .map(|l| Line::from(l.to_string()))
                .collect();
            let height = title_lines.len().max(1) as u16;
            let row_style = if p.is_highlighted() {
                Style::default().bg(Color::Rgb(0x1a, 0x20, 0x2c))
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("#{}", p.id))
                    .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Cell::from(Text::from(title_lines)),
                Cell::from(Span::styled(
                    format!(" {} ", p.status.to_uppercase()),
                    badge_style(p),
                )),
            ])
            .height(height)
            .style(row_style)
        })
        .collect();

    let title = if visible.len() == state.view.papers.len() {
        format!("Publications ({})", visible.len())
    } else {
        format!(
            "Publications ({} of {})",
            visible.len(),
            state.view.papers.len()
        )
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(60),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut table_state = TableState::default();
    if !visible.is_empty() {
        table_state.select(Some(state.selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_status_line(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut spans = Vec::new();
    if state.pending > 0 {
        spans.push(Span::styled("⟳ Syncing  ", Style::default().fg(Color::Yellow)));
    }
    if !state.info.is_empty() {
        spans.push(Span::raw(state.info.clone()));
        spans.push(Span::raw("  "));
    }
    if let Some(t) = state.last_synced.as_deref() {
        spans.push(Span::styled(
            format!("last sync {t}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled("n", Style::default().fg(Color::Magenta)));
    spans.push(Span::raw(" new  "));
    spans.push(Span::styled("e", Style::default().fg(Color::Magenta)));
    spans.push(Span::raw(" edit  "));
    spans.push(Span::styled("d", Style::default().fg(Color::Magenta)));
    spans.push(Span::raw(" delete  "));
    spans.push(Span::styled("?", Style::default().fg(Color::Magenta)));
    spans.push(Span::raw(" help"));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered rect of `width` x `height`, clipped to `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, form: &FormState) {
    let popup = centered(area, 70, 13);
    f.render_widget(Clear, popup);

    let heading = match form.mode {
        FormMode::Add => "Add New Paper".to_string(),
        FormMode::Edit(id) => format!("Edit Publication #{id}"),
    };
    let outer = Block::default().borders(Borders::ALL).title(heading);
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let field_style = |field: FormField| {
        if form.field == field {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let cursor = |field: FormField| if form.field == field { "▏" } else { "" };

    let mut title_text = Text::from(form.title.clone());
    title_text.push_span(Span::styled(cursor(FormField::Title), field_style(FormField::Title)));
    f.render_widget(
        Paragraph::new(title_text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Publication Title")
                .border_style(field_style(FormField::Title)),
        ),
        parts[0],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(form.status.clone()),
            Span::styled(cursor(FormField::Status), field_style(FormField::Status)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Journal Status")
                .border_style(field_style(FormField::Status)),
        ),
        parts[1],
    );

    let save_label = match form.mode {
        FormMode::Add => " Add Publication",
        FormMode::Edit(_) => " Save Changes",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Ctrl-S", Style::default().fg(Color::Magenta)),
            Span::raw(save_label),
            Span::raw("   "),
            Span::styled("tab", Style::default().fg(Color::Magenta)),
            Span::raw(" switch field   "),
            Span::styled("esc", Style::default().fg(Color::Magenta)),
            Span::raw(" cancel"),
        ])),
        parts[2],
    );
}
