pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    app.last_area = area;
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let hint = match app.input_mode {
        InputMode::Search => "typing filters by name; Enter/Esc: done",
        InputMode::CityPicker => "Up/Down: choose  Enter: apply  Esc: close",
        InputMode::Edit => "Tab: next field  Enter: save  Esc: cancel",
        InputMode::Normal => "/: search  c: city  x: clear  Enter: edit  q: quit",
    };
    let header = Paragraph::new(format!("User Management  |  {hint}"))
        .block(
            Block::default()
                .title("user-dashboard")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(header, root[0]);

    if app.store.loading() {
        components::render_placeholder(f, root[2], app, "Loading users...", false);
    } else if let Some(err) = app.store.error() {
        let retry = app.keymap.keys_for(crate::app::keymap::KeyAction::Reload).join("/");
        let msg = format!("Error: {err}\n\nPress {retry} to try again.");
        components::render_placeholder(f, root[2], app, &msg, true);
    } else {
        components::render_controls(f, root[1], app);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(root[2]);
        if app.store.filtered_users().is_empty() {
            components::render_placeholder(f, body[0], app, "No users found matching your criteria.", false);
        } else {
            users::render_users_table(f, body[0], app);
        }
        users::render_user_details(f, body[1], app);
    }

    components::render_status_bar(f, root[3], app);

    if let Some(state) = app.modal.clone() {
        match state {
            ModalState::CityPicker { selected } => components::render_city_picker(f, area, app, selected),
            ModalState::Edit(form) => users::render_edit_dialog(f, area, app, &form),
        }
    }
}
