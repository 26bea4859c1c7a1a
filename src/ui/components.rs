//! Shared UI components (control bar, status bar, placeholders, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::app::{AppState, InputMode};

pub const ALL_CITIES: &str = "All Cities";

/// Search box and selected city.
pub fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let cursor = if app.input_mode == InputMode::Search { "_" } else { "" };
    let city = match app.store.city_filter() {
        "" => ALL_CITIES,
        c => c,
    };
    let search = if app.store.search_query().is_empty() && app.input_mode != InputMode::Search {
        "Search by name...".to_string()
    } else {
        format!("{}{cursor}", app.store.search_query())
    };
    let style = if app.input_mode == InputMode::Search {
        Style::default().fg(app.theme.highlight_fg)
    } else {
        Style::default().fg(app.theme.text)
    };
    let p = Paragraph::new(format!("Search: {search}    City: {city}"))
        .style(style)
        .block(
            Block::default()
                .title("Filter")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// Render the bottom status bar with mode and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::CityPicker => "CITY",
        InputMode::Edit => "EDIT",
    };
    let state = if app.store.loading() {
        "loading"
    } else if app.store.error().is_some() {
        "error"
    } else {
        "ready"
    };
    let msg = format!(
        "mode: {mode}  {state}  users:{}/{}  cities:{}  rows/page:{}",
        app.store.filtered_users().len(),
        app.store.users().len(),
        app.store.cities().len(),
        app.rows_per_page
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Centered message in place of the list (loading, error, no matches).
pub fn render_placeholder(f: &mut Frame, area: Rect, app: &AppState, message: &str, is_error: bool) {
    let fg = if is_error { app.theme.error } else { app.theme.muted };
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

pub fn render_city_picker(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let cities = app.store.cities();
    let width = 40u16.min(area.width.saturating_sub(4)).max(24);
    let height = ((cities.len() + 3) as u16).min(area.height.saturating_sub(4)).max(5);
    let rect = centered_rect(width, height, area);

    let visible = rect.height.saturating_sub(2) as usize;
    let offset = (selected + 1).saturating_sub(visible);
    let options = std::iter::once(ALL_CITIES).chain(cities.iter().map(String::as_str));
    let items: Vec<ListItem> = options
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, label)| {
            let active = match idx {
                0 => app.store.city_filter().is_empty(),
                _ => app.store.city_filter() == label,
            };
            let marker = if idx == selected { "▶ " } else { "  " };
            let check = if active { " ✓" } else { "" };
            let style = if idx == selected {
                Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text)
            };
            ListItem::new(format!("{marker}{label}{check}")).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title("Filter by city")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(list, rect);
}

pub fn edit_dialog_rect(area: Rect) -> Rect {
    let width = 56u16.min(area.width.saturating_sub(4)).max(30);
    centered_rect(width, 10, area)
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
