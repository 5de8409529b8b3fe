use crate::app::{App, Mode};
use commentdesk::view::ViewModel;
use commentdesk::LoadState;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(size);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" commentdesk ", Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}", app.api_base)),
    ]));
    f.render_widget(header, chunks[0]);

    match app.dashboard.state() {
        LoadState::Loading => render_message(f, chunks[2], "Loading", "Fetching comments and posts…", Color::Yellow),
        LoadState::Failed(err) => {
            let text = format!("{err}\n\nPress r to try again, q to quit.");
            render_message(f, chunks[2], "Error", &text, Color::Red);
        }
        LoadState::Ready => {
            let view = app.view();
            render_search(f, app, chunks[1]);
            if view.is_empty() {
                let text = format!("No comments match \"{}\".", app.dashboard.search().trim());
                render_message(f, chunks[2], "Comments", &text, Color::DarkGray);
            } else {
                render_table(f, app, &view, chunks[2]);
            }
            render_pagination(f, &view, chunks[3]);
            if app.mode == Mode::Editing {
                render_edit_modal(f, app);
            }
        }
    }

    let (text, color) = if let Some(status) = &app.status {
        (status.msg.clone(), status.color)
    } else {
        (help_text(app.mode).to_string(), Color::Gray)
    };
    let status = Paragraph::new(text).style(Style::default().fg(color));
    f.render_widget(status, chunks[4]);
}

fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => "q quit · / search · ↑↓ select · ←→ page · 1-5 jump · n edit name · b edit body · r reload",
        Mode::Search => "type to filter · enter/esc done",
        Mode::Editing => "enter save · esc cancel",
    }
}

fn panel_block(title: &str, focused: bool) -> Block {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn render_message(f: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(panel_block(title, false));
    f.render_widget(paragraph, area);
}

fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode == Mode::Search;
    let mut spans = vec![Span::raw(app.dashboard.search().to_string())];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    } else if app.dashboard.search().is_empty() {
        spans.push(Span::styled("press / to search by email, name or body", Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(panel_block("Search", focused)), area);
}

fn render_table(f: &mut Frame, app: &App, view: &ViewModel, area: Rect) {
    let header = Row::new(["#", "Post", "Name", "Email", "Body"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.comment.id.to_string()),
                Cell::from(row.post_title.clone()),
                Cell::from(row.comment.name.clone()),
                Cell::from(row.comment.email.clone()),
                Cell::from(single_line(&row.comment.body)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(20),
        Constraint::Percentage(22),
        Constraint::Percentage(18),
        Constraint::Percentage(40),
    ];
    let title = format!("Comments ({} of {})", view.filtered_count, view.total_count);
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(&title, app.mode == Mode::Normal))
        .highlight_style(Style::default().bg(Color::Blue));
    let mut state = TableState::default();
    state.select(Some(app.selection));
    f.render_stateful_widget(table, area, &mut state);
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_pagination(f: &mut Frame, view: &ViewModel, area: Rect) {
    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled("◀ Prev ", if view.has_prev() { enabled } else { disabled })];
    for page in &view.page_window {
        let style = if *page == view.page {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            enabled
        };
        spans.push(Span::styled(format!(" {page} "), style));
    }
    spans.push(Span::styled(" Next ▶", if view.has_next() { enabled } else { disabled }));
    if !view.is_empty() {
        spans.push(Span::raw(format!(
            "   Showing {}–{} of {} (page {}/{})",
            view.first_index(),
            view.last_index(),
            view.filtered_count,
            view.page,
            view.total_pages
        )));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(panel_block("Pages", false)), area);
}

fn render_edit_modal(f: &mut Frame, app: &App) {
    let Some(edit) = app.dashboard.edit() else {
        return;
    };
    let area = centered_rect(70, 30, f.size());
    f.render_widget(Clear, area);
    let title = format!("Edit {} of comment #{}", edit.field, edit.id);
    let draft_style = if edit.draft.trim().is_empty() { Style::default().fg(Color::Red) } else { Style::default() };
    let lines = vec![
        Line::from(vec![Span::styled(edit.draft.clone(), draft_style), Span::styled("▏", Style::default().fg(Color::Yellow))]),
        Line::raw(""),
        Line::styled("[Enter] Save  [Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(panel_block(&title, true));
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
