// services/log-viewer/src/ui.rs
//
// Terminal rendering: header, filter controls, log list, detail pane, footer

use chrono::Local;
use ratatui::{prelude::*, widgets::*};

use svckit::{LogLevel, LogRecord};

use crate::app::App;
use crate::classify::{classify, flow_label, FlowKind};
use crate::detail::{DetailSection, SectionBody, Tone};
use crate::filter::LevelFilter;
use crate::state::{InputMode, ViewState};

// Color palette: Red, White, Silver, Gold
pub mod colors {
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(220, 50, 47);
    pub const DARK_RED: Color = Color::Rgb(139, 0, 0);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const GOLD: Color = Color::Rgb(255, 193, 37);
    pub const DARK_GOLD: Color = Color::Rgb(184, 134, 11);
    pub const CYAN: Color = Color::Rgb(42, 161, 152);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const BG_FOCUS: Color = Color::Rgb(20, 50, 64);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
    pub const ERROR: Color = Color::Rgb(220, 50, 47);
}

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let state = &app.state;

    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Controls
            Constraint::Min(8),    // List + detail
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    draw_controls(frame, chunks[1], state);
    draw_main_content(frame, chunks[2], state);
    draw_footer(frame, chunks[3], state);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;

    let (mode_text, mode_color) = if app.demo {
        ("DEMO", colors::GOLD)
    } else if state.connected {
        ("LIVE", colors::SUCCESS)
    } else if state.polls_applied == 0 && state.last_error.is_none() {
        ("CONNECTING", colors::SILVER)
    } else {
        ("DISCONNECTED", colors::RED)
    };

    let mut spans = vec![
        Span::styled(
            " PROXY LOG VIEWER ",
            Style::default().fg(colors::WHITE).bg(colors::DARK_RED).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            app.source_label.clone(),
            Style::default().fg(colors::SILVER),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", mode_text),
            Style::default().fg(mode_color).bold(),
        ),
        Span::raw("  "),
    ];

    match &state.health {
        Some(health) => {
            let status_color = if health.status == "healthy" {
                colors::SUCCESS
            } else {
                colors::GOLD
            };
            spans.push(Span::styled(
                format!("● {}", health.status),
                Style::default().fg(status_color),
            ));
            spans.push(Span::raw("  "));
            spans.push(stat("Users", health.active_users));
            spans.push(Span::raw("  "));
            spans.push(stat("Connections", health.active_connections));
            if let Some(buffered) = health.log_buffer_size {
                spans.push(Span::raw("  "));
                spans.push(stat("Buffered", buffered));
            }
        }
        None => spans.push(Span::styled(
            "health unknown",
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(header, area);
}

fn stat(label: &str, value: u64) -> Span<'static> {
    Span::styled(
        format!("{}: {}", label, value),
        Style::default().fg(colors::WHITE),
    )
}

fn draw_controls(frame: &mut Frame, area: Rect, state: &ViewState) {
    let searching = state.input_mode == InputMode::Search;
    let border_color = if searching { colors::GOLD } else { colors::SILVER };

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(colors::SILVER)),
        Span::styled(
            if state.filter().search().is_empty() && !searching {
                "(press /)".to_string()
            } else {
                state.filter().search().to_string()
            },
            Style::default().fg(colors::WHITE),
        ),
    ];
    if searching {
        spans.push(Span::styled("▏", Style::default().fg(colors::GOLD)));
    }
    spans.push(Span::raw("   "));

    let counts = state.counts();
    let active = state.filter().level();
    for choice in LevelFilter::CHOICES {
        let label = format!(" {} ({}) ", choice.label(), counts.for_filter(choice));
        let style = if choice == active {
            Style::default().fg(colors::BG_DARK).bg(level_filter_color(choice)).bold()
        } else {
            Style::default().fg(level_filter_color(choice))
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("  "));
    spans.push(if state.auto_refresh {
        Span::styled("[AUTO ⟳]", Style::default().fg(colors::SUCCESS).bold())
    } else {
        Span::styled("[PAUSED]", Style::default().fg(colors::GOLD).bold())
    });

    let controls = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors::BG_PANEL)),
    );

    frame.render_widget(controls, area);
}

fn draw_main_content(frame: &mut Frame, area: Rect, state: &ViewState) {
    if state.selected().is_none() {
        draw_log_list(frame, area, state);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_log_list(frame, chunks[0], state);
    draw_detail_panel(frame, chunks[1], state);
}

fn draw_log_list(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .title(Span::styled(
            format!(" LOGS {}/{} ", state.filtered_len(), state.counts().total),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    if state.filtered_len() == 0 {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No logs to display",
                Style::default().fg(colors::WHITE).bold(),
            )),
            Line::from(Span::styled(
                "Logs will appear here as requests are processed",
                Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = state
        .filtered()
        .map(|record| log_item(record, state.upstream()))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(colors::BG_FOCUS).bold())
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected(Some(state.cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn log_item<'a>(record: &'a LogRecord, upstream: &str) -> ListItem<'a> {
    let level = record.presentation_level();
    let kind = classify(&record.message);

    let mut header = vec![
        Span::styled(
            format!("{} ", format_time(record)),
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        ),
        Span::styled(format!("{} ", kind.glyph()), Style::default().fg(flow_color(kind))),
        Span::styled(
            format!("{:<5} ", record.level),
            Style::default().fg(level_color(level)).bold(),
        ),
    ];
    if let Some(label) = flow_label(kind, upstream) {
        header.push(Span::styled(
            format!("{}  ", label),
            Style::default().fg(flow_color(kind)),
        ));
    }

    let mut lines = vec![Line::from(header)];

    let mut message = vec![Span::styled(
        record.message.as_str(),
        Style::default().fg(colors::WHITE),
    )];
    let fields = record.data_field_count();
    if fields > 0 {
        message.push(Span::styled(
            format!("  [{} field{}]", fields, if fields == 1 { "" } else { "s" }),
            Style::default().fg(colors::DARK_GOLD),
        ));
    }
    lines.push(Line::from(message));

    ListItem::new(lines)
}

fn draw_detail_panel(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut title = vec![Span::styled(
        " LOG DETAILS ",
        Style::default().fg(colors::GOLD).bold(),
    )];
    if state.selection_is_stale() {
        title.push(Span::styled(
            "(not in current list) ",
            Style::default().fg(colors::SILVER).add_modifier(Modifier::ITALIC),
        ));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::DARK_GOLD))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let sections = state.detail_sections();
    let mut lines: Vec<Line> = Vec::new();
    let mut focused_start = 0;
    for (idx, section) in sections.iter().enumerate() {
        let focused = idx == state.detail_cursor;
        if focused {
            focused_start = lines.len();
        }
        section_lines(section, focused, &mut lines);
        lines.push(Line::from(""));
    }

    let scroll = u16::try_from(focused_start.saturating_sub(1)).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

fn section_lines(section: &DetailSection, focused: bool, lines: &mut Vec<Line<'static>>) {
    let label_style = if focused {
        Style::default().fg(colors::BG_DARK).bg(colors::GOLD).bold()
    } else {
        Style::default().fg(colors::GOLD).bold()
    };
    let marker = if focused { "▶ " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(colors::GOLD)),
        Span::styled(format!(" {} ", section.label), label_style),
    ]));

    let body_color = tone_color(section.tone);
    push_body(&section.body, body_color, lines);

    if let Some((label, body)) = &section.attachment {
        lines.push(Line::from(Span::styled(
            format!("  {}:", label),
            Style::default().fg(colors::SILVER).bold(),
        )));
        push_body(body, body_color, lines);
    }
}

fn push_body(body: &SectionBody, color: Color, lines: &mut Vec<Line<'static>>) {
    let style = match body {
        SectionBody::Plain(_) => Style::default().fg(color),
        SectionBody::Structured(_) => Style::default().fg(color).add_modifier(Modifier::DIM),
    };
    for text in body.text().lines() {
        lines.push(Line::from(Span::styled(format!("    {}", text), style)));
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match (state.input_mode, &state.notice) {
        (InputMode::ConfirmClear, _) => Line::from(vec![
            Span::styled(
                " Clear logs? This re-fetches from the proxy; its buffer is not emptied. ",
                Style::default().fg(colors::WHITE),
            ),
            Span::styled(" [Y] ", Style::default().fg(colors::BG_DARK).bg(colors::RED)),
            Span::styled(" Confirm ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [ANY] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Cancel ", Style::default().fg(colors::SILVER)),
        ]),
        (InputMode::Search, _) => Line::from(vec![
            Span::styled(" [ENTER/ESC] ", Style::default().fg(colors::BG_DARK).bg(colors::GOLD)),
            Span::styled(" Done ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [CTRL-U] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Clear search ", Style::default().fg(colors::SILVER)),
        ]),
        (InputMode::Normal, Some(notice)) => Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(colors::GOLD).bold(),
        )),
        (InputMode::Normal, None) => help_line(state),
    };

    let footer = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(footer, area);
}

fn help_line(state: &ViewState) -> Line<'static> {
    let mut keys = vec![
        ("[Q]", "Quit", colors::RED),
        ("[/]", "Search", colors::GOLD),
        ("[L]", "Level", colors::GOLD),
        ("[SPACE]", "Auto-refresh", colors::WHITE),
        ("[ENTER]", "Details", colors::SILVER),
    ];
    if state.selected().is_some() {
        keys.extend([
            ("[X]", "Close", colors::SILVER),
            ("[ [ / ] ]", "Section", colors::SILVER),
            ("[Y]", "Copy", colors::SILVER),
            ("[SHIFT-Y]", "Copy data", colors::SILVER),
        ]);
    }
    keys.extend([
        ("[D]", "Download", colors::SILVER),
        ("[C]", "Clear", colors::SILVER),
    ]);

    let mut spans = Vec::with_capacity(keys.len() * 3);
    for (key, action, color) in keys {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(colors::BG_DARK).bg(color),
        ));
        spans.push(Span::styled(
            format!(" {} ", action),
            Style::default().fg(colors::SILVER),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Local wall-clock time with milliseconds, or the raw timestamp text when
/// it does not parse.
pub fn format_time(record: &LogRecord) -> String {
    record
        .instant()
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| record.timestamp_text())
}

pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => colors::ERROR,
        LogLevel::Warn => colors::GOLD,
        LogLevel::Info => colors::SUCCESS,
        LogLevel::Debug => colors::SILVER,
    }
}

fn level_filter_color(filter: LevelFilter) -> Color {
    match filter {
        LevelFilter::All => colors::WHITE,
        LevelFilter::Only(level) => level_color(level),
    }
}

pub fn flow_color(kind: FlowKind) -> Color {
    match kind {
        FlowKind::Request => colors::GOLD,
        FlowKind::Response => colors::SUCCESS,
        FlowKind::Stream => colors::CYAN,
        FlowKind::Error => colors::RED,
        FlowKind::Unclassified => colors::SILVER,
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Neutral => colors::WHITE,
        Tone::Flow => colors::CYAN,
        Tone::Success => colors::SUCCESS,
        Tone::Failure => colors::ERROR,
        Tone::Level(level) => level_color(level),
    }
}
