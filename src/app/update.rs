use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};
use crate::form::EditForm;
use crate::ui;

const IDLE_POLL: Duration = Duration::from_millis(100);

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        if app.store.tick() {
            app.clamp_selection();
        }

        terminal.draw(|f| ui::render(f, app)).context("draw frame")?;

        if event::poll(poll_timeout(app, Instant::now())).context("poll event")? {
            match event::read().context("read event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }
    }
    info!("shutting down");
    app.store.shutdown();
    Ok(())
}

/// Wake no later than the pending search commit.
fn poll_timeout(app: &AppState, now: Instant) -> Duration {
    match app.store.search_deadline() {
        Some(at) => at.saturating_duration_since(now).min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

/// Apply one key press. Returns `true` when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    // Chords bound to Quit work in every mode, including text entry.
    if app.input_mode != InputMode::Normal
        && key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        && app.keymap.resolve(&key) == Some(KeyAction::Quit)
    {
        return true;
    }
    let quit = match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Search => {
            handle_search_key(app, key);
            false
        }
        InputMode::CityPicker | InputMode::Edit => {
            handle_modal_key(app, key);
            false
        }
    };
    app.clamp_selection();
    quit
}

/// Printable input: plain or shifted characters only.
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return false;
    };
    let len = app.store.filtered_users().len();
    match action {
        KeyAction::Quit => return true,
        KeyAction::StartSearch => {
            if !app.store.loading() && app.store.error().is_none() {
                app.input_mode = InputMode::Search;
            }
        }
        KeyAction::OpenCityFilter => {
            if !app.store.loading() && app.store.error().is_none() {
                let selected = app
                    .store
                    .cities()
                    .iter()
                    .position(|c| c == app.store.city_filter())
                    .map_or(0, |i| i + 1);
                app.modal = Some(ModalState::CityPicker { selected });
                app.input_mode = InputMode::CityPicker;
            }
        }
        KeyAction::ClearFilters => {
            app.store.clear_filters();
            app.selected_index = 0;
        }
        KeyAction::EditSelected => {
            if let Some(user) = app.selected_user() {
                debug!(id = user.id, "opening edit dialog");
                app.modal = Some(ModalState::Edit(EditForm::open(user)));
                app.input_mode = InputMode::Edit;
            }
        }
        KeyAction::Reload => {
            if app.store.error().is_some() {
                info!("retrying user load");
                app.store.reload(app.source.clone(), &app.runtime);
            }
        }
        KeyAction::MoveUp => {
            app.selected_index = app.selected_index.saturating_sub(1);
        }
        KeyAction::MoveDown => {
            if app.selected_index + 1 < len {
                app.selected_index += 1;
            }
        }
        KeyAction::PageUp => {
            app.selected_index = app.selected_index.saturating_sub(app.rows_per_page.max(1));
        }
        KeyAction::PageDown => {
            app.selected_index = (app.selected_index + app.rows_per_page.max(1)).min(len.saturating_sub(1));
        }
        KeyAction::Ignore => {}
    }
    false
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            let mut q = app.store.search_query().to_string();
            q.pop();
            app.store.set_search_query(q);
            app.selected_index = 0;
        }
        _ => {
            if let Some(c) = typed_char(&key) {
                let mut q = app.store.search_query().to_string();
                q.push(c);
                app.store.set_search_query(q);
                app.selected_index = 0;
            }
        }
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    let Some(modal) = app.modal.as_mut() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match modal {
        ModalState::CityPicker { selected } => {
            let options = app.store.cities().len() + 1;
            match key.code {
                KeyCode::Esc => app.close_modal(),
                KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected + 1 < options {
                        *selected += 1;
                    }
                }
                KeyCode::Enter => {
                    let city = match *selected {
                        0 => String::new(),
                        i => app.store.cities().get(i - 1).cloned().unwrap_or_default(),
                    };
                    debug!(%city, "city filter selected");
                    app.store.set_city_filter(city);
                    app.selected_index = 0;
                    app.close_modal();
                }
                _ => {}
            }
        }
        ModalState::Edit(form) => match key.code {
            KeyCode::Esc => app.close_modal(),
            KeyCode::Enter => {
                if let Some((id, data)) = form.submit() {
                    info!(id, "saving user edit");
                    app.store.update_user(id, &data);
                    app.close_modal();
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            _ => {
                if let Some(c) = typed_char(&key) {
                    form.insert_char(c);
                }
            }
        },
    }
}

/// A left click outside the open edit dialog cancels it.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        return;
    }
    if let Some(ModalState::Edit(_)) = app.modal {
        let rect = ui::components::edit_dialog_rect(app.last_area);
        let inside = mouse.column >= rect.x
            && mouse.column < rect.x + rect.width
            && mouse.row >= rect.y
            && mouse.row < rect.y + rect.height;
        if !inside {
            debug!("edit dialog dismissed by outside click");
            app.close_modal();
        }
    }
}
