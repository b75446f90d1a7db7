use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, Wrap,
    },
    Frame,
};

use crate::error::FolderRole;
use crate::host::DirectoryLister;
use super::app::App;
use super::models::Focus;
use super::utils::centered_rect;

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub fn ui<L: DirectoryLister>(f: &mut Frame, app: &App<L>) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(body[0]);

    render_folder_input(f, left[0], app, FolderRole::Reference, "Reference Folder");
    render_folder_input(f, left[1], app, FolderRole::Foreign, "Foreign Folder");
    render_folder_input(f, left[2], app, FolderRole::Output, "Output Folder");
    render_rules(f, left[3], app);

    render_preview(f, body[1], app);
    render_status_bar(f, chunks[2], app);

    if app.show_help {
        render_help_popup(f);
    }
}

pub fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("Episode Matcher")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::White))
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn render_folder_input<L: DirectoryLister>(
    f: &mut Frame,
    area: Rect,
    app: &App<L>,
    role: FolderRole,
    title: &str,
) {
    let focused = app.focus == Focus::Folder(role);
    let value = app.folder_input(role);

    let (text, style) = if value.is_empty() {
        ("[not set]", Style::default().fg(Color::DarkGray))
    } else if focused {
        (value, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        (value, Style::default().fg(Color::White))
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(focus_style(focused)),
    );
    f.render_widget(input, area);
}

fn render_rules<L: DirectoryLister>(f: &mut Frame, area: Rect, app: &App<L>) {
    let rules_focused = matches!(app.focus, Focus::Rule(_));

    let items: Vec<ListItem> = app
        .session
        .rules
        .rules()
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let focused = app.focus == Focus::Rule(i);
            let number = Span::styled(format!("{:>2}. ", i), Style::default().fg(Color::Gray));
            let pattern = if rule.trim().is_empty() {
                Span::styled("<empty, skipped>", Style::default().fg(Color::DarkGray))
            } else if focused {
                Span::styled(
                    rule.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(rule.clone(), Style::default().fg(Color::White))
            };
            let marker = if focused { "> " } else { "  " };
            ListItem::new(Line::from(vec![Span::raw(marker), number, pattern]))
        })
        .collect();

    let rules = List::new(items).block(
        Block::default()
            .title("Rules (applied top to bottom)")
            .borders(Borders::ALL)
            .border_style(focus_style(rules_focused)),
    );
    f.render_widget(rules, area);
}

fn render_preview<L: DirectoryLister>(f: &mut Frame, area: Rect, app: &App<L>) {
    let rows = app.preview();

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let line = match &row.foreign_name {
                Some(foreign) => Line::from(vec![
                    Span::styled("[MATCHED] ", Style::default().fg(Color::Green)),
                    Span::styled(row.reference_name.clone(), Style::default().fg(Color::White)),
                    Span::styled(" <- ", Style::default().fg(Color::Gray)),
                    Span::styled(foreign.clone(), Style::default().fg(Color::Cyan)),
                ]),
                None => Line::from(vec![
                    Span::styled("[NO MATCH] ", Style::default().fg(Color::Yellow)),
                    Span::styled(row.reference_name.clone(), Style::default().fg(Color::White)),
                ]),
            };
            let key = Line::from(Span::styled(
                format!("           key: {}", row.key),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(vec![line, key])
        })
        .collect();

    let title = format!(
        "Preview - {} matched, {} unmatched",
        app.stats.matched, app.stats.unmatched
    );

    let preview = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(if app.focus == Focus::Preview {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Blue)
                }),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(preview, area, &mut app.list_state.clone());

    // Two lines per row.
    if rows.len() * 2 > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_status_bar<L: DirectoryLister>(f: &mut Frame, area: Rect, app: &App<L>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let (text, style) = match &app.status_message {
        Some(message) if message.is_error => {
            (format!("Error: {}", message.text), Style::default().fg(Color::Red))
        }
        Some(message) => (message.text.clone(), Style::default().fg(Color::Cyan)),
        None => (
            format!(
                "{} pending from last match, {} queued",
                app.session.pending().len(),
                app.queued_total
            ),
            Style::default().fg(Color::Green),
        ),
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[0]);

    let controls = Paragraph::new("F5 match, F6 queue, F1 help, Esc quit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

pub fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Episode Matcher - Help",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Tab/Shift+Tab - Next/previous field"),
        Line::from("  Type          - Edit focused folder or rule"),
        Line::from("  F2            - Add a rule"),
        Line::from("  F3/Delete     - Remove focused rule"),
        Line::from(""),
        Line::from("Matching:"),
        Line::from("  F5/Enter      - Match reference against foreign"),
        Line::from("  Up/Down       - Browse preview"),
        Line::from("  F6            - Queue matched pairs"),
        Line::from("  F8            - Clear the queue"),
        Line::from(""),
        Line::from("Each filename is lowercased, every rule match is removed"),
        Line::from("in order, and files with equal results are paired."),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press Esc or F1 to close",
            Style::default().fg(Color::Gray),
        )]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
