use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::app::AppState;
use crate::form::{EditForm, FormField};

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let users = app.store.filtered_users();
    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(users.len());
    let slice = &users[start.min(end)..end];

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.address.city.clone()),
        ])
        .style(style)
    });

    let widths = [Constraint::Percentage(35), Constraint::Percentage(40), Constraint::Percentage(25)];
    let header = Row::new(vec!["NAME", "EMAIL", "CITY"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!("Users ({})", users.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "Name: {}\nUsername: {}\nEmail: {}\nPhone: {}\nWebsite: {}\n\nAddress: {} {}\n         {} {}\n\nCompany: {}\n  \"{}\"",
            u.name,
            u.username,
            u.email,
            u.phone,
            u.website,
            u.address.street,
            u.address.suite,
            u.address.zipcode,
            u.address.city,
            u.company.name,
            u.company.catch_phrase,
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

pub fn render_edit_dialog(f: &mut Frame, area: Rect, app: &AppState, form: &EditForm) {
    let rect = crate::ui::components::edit_dialog_rect(area);
    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let focused = field == form.focus;
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "_" } else { "" };
        let label_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<6}", field.label()), label_style),
            Span::raw(format!("{}{cursor}", form.value(field))),
        ]));
        match form.errors.get(field) {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("        {err}"),
                Style::default().fg(app.theme.error),
            ))),
            None => lines.push(Line::raw("")),
        }
    }
    lines.push(Line::from(Span::styled(
        "Enter: save  Tab/Up/Down: field  Esc: cancel",
        Style::default().fg(app.theme.muted),
    )));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Edit User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
