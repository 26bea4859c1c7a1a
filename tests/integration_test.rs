// Integration tests for user-dashboard

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use user_dashboard::api::{CachingSource, HttpUserSource, UserCache, UserSource};
use user_dashboard::app::update::handle_key;
use user_dashboard::app::{AppState, InputMode, ModalState};
use user_dashboard::store::{DEFAULT_DEBOUNCE, UserStore};
use user_dashboard::{User, ui};

const USERS_JSON: &str = r#"[
  {"id":1,"name":"Leanne Graham","username":"Bret","email":"Sincere@april.biz",
   "address":{"street":"Kulas Light","suite":"Apt. 556","city":"Gwenborough","zipcode":"92998-3874","geo":{"lat":"-37.3159","lng":"81.1496"}},
   "phone":"1-770-736-8031 x56442","website":"hildegard.org",
   "company":{"name":"Romaguera-Crona","catchPhrase":"Multi-layered client-server neural-net","bs":"harness real-time e-markets"}},
  {"id":2,"name":"Ervin Howell","username":"Antonette","email":"Shanna@melissa.tv",
   "address":{"street":"Victor Plains","suite":"Suite 879","city":"Wisokiburgh","zipcode":"90566-7771","geo":{"lat":"-43.9509","lng":"-34.4618"}},
   "phone":"010-692-6593 x09125","website":"anastasia.net",
   "company":{"name":"Deckow-Crist","catchPhrase":"Proactive didactic contingency","bs":"synergize scalable supply-chains"}}
]"#;

/// Serve a single canned HTTP response on a random local port.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
        }
    });
    format!("http://{addr}")
}

/// Accept connections and never answer.
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });
    format!("http://{addr}")
}

fn http(base: &str) -> HttpUserSource {
    HttpUserSource::new(base, Duration::from_secs(5)).unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut AppState, text: &str) {
    for c in text.chars() {
        handle_key(app, key(KeyCode::Char(c)));
    }
}

fn seeded_app() -> AppState {
    let users: Vec<User> = serde_json::from_str(USERS_JSON).unwrap();
    let store = UserStore::new(users, DEFAULT_DEBOUNCE);
    let source: Arc<dyn UserSource> = Arc::new(http("http://127.0.0.1:9"));
    AppState::new(store, source, Handle::current())
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}

// 1) Fetcher against a live socket
#[tokio::test]
async fn http_source_decodes_user_list() {
    let base = serve_once("200 OK", USERS_JSON).await;
    let users = http(&base).fetch_users(CancellationToken::new()).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "Ervin Howell");
    assert_eq!(users[1].address.city, "Wisokiburgh");
}

#[tokio::test]
async fn http_source_reports_non_success_status() {
    let base = serve_once("500 Internal Server Error", "oops").await;
    let err = http(&base).fetch_users(CancellationToken::new()).await.unwrap_err();
    assert!(!err.is_abort());
    assert_eq!(err.to_string(), "Failed to fetch users: status 500");
}

#[tokio::test]
async fn http_source_reports_bad_body() {
    let base = serve_once("200 OK", "{\"not\":\"a list\"}").await;
    let err = http(&base).fetch_users(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, user_dashboard::FetchError::Decode(_)));
}

#[tokio::test]
async fn http_source_cancellation_is_abort() {
    let base = serve_silence().await;
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });
    let err = http(&base).fetch_users(token).await.unwrap_err();
    assert!(err.is_abort());
}

// 2) Store initialization through HTTP
#[tokio::test]
async fn store_fetch_500_leaves_error_and_empty_list() {
    let base = serve_once("500 Internal Server Error", "").await;
    let source: Arc<dyn UserSource> = Arc::new(http(&base));
    let mut store = UserStore::initialize(Vec::new(), source, &Handle::current(), DEFAULT_DEBOUNCE);
    assert!(store.loading());
    store.settle().await;

    assert!(!store.loading());
    assert!(!store.error().unwrap_or_default().is_empty());
    assert!(store.filtered_users().is_empty());
}

#[tokio::test]
async fn store_loads_and_writes_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserCache::new_with_dir(dir.path());
    let base = serve_once("200 OK", USERS_JSON).await;
    let source: Arc<dyn UserSource> = Arc::new(CachingSource::new(http(&base), cache.clone()));

    let mut store = UserStore::initialize(Vec::new(), source, &Handle::current(), DEFAULT_DEBOUNCE);
    store.settle().await;
    assert_eq!(store.cities(), ["Gwenborough", "Wisokiburgh"]);

    // Next start seeds from the cache and skips the fetch entirely.
    let seeded = cache.load_fresh(Duration::from_secs(3600)).unwrap();
    let unreachable: Arc<dyn UserSource> = Arc::new(http("http://127.0.0.1:9"));
    let store2 = UserStore::initialize(seeded, unreachable, &Handle::current(), DEFAULT_DEBOUNCE);
    assert!(!store2.loading());
    assert_eq!(store2.users().len(), 2);
}

// 3) Key-driven flows
#[tokio::test]
async fn search_via_keys_filters_after_debounce() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('/')));
    assert_eq!(app.input_mode, InputMode::Search);
    type_text(&mut app, "erv");
    handle_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.store.search_query(), "erv");
    assert_eq!(app.store.filtered_users().len(), 2);

    app.store.tick_at(Instant::now() + Duration::from_millis(400));
    let ids: Vec<u64> = app.store.filtered_users().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn city_picker_selects_and_clears() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('c')));
    assert!(matches!(app.modal, Some(ModalState::CityPicker { selected: 0 })));
    handle_key(&mut app, key(KeyCode::Down));
    handle_key(&mut app, key(KeyCode::Down));
    handle_key(&mut app, key(KeyCode::Enter));
    assert!(app.modal.is_none());
    assert_eq!(app.store.city_filter(), "Wisokiburgh");

    handle_key(&mut app, key(KeyCode::Char('x')));
    assert_eq!(app.store.city_filter(), "");
}

#[tokio::test]
async fn edit_flow_validates_then_saves() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('c')));
    handle_key(&mut app, key(KeyCode::Down));
    handle_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.store.city_filter(), "Gwenborough");

    handle_key(&mut app, key(KeyCode::Enter));
    assert!(matches!(app.modal, Some(ModalState::Edit(_))));

    // Email field: wipe and type an invalid address.
    handle_key(&mut app, key(KeyCode::Tab));
    for _ in 0.."Sincere@april.biz".len() {
        handle_key(&mut app, key(KeyCode::Backspace));
    }
    type_text(&mut app, "l@x");
    handle_key(&mut app, key(KeyCode::Enter));
    match &app.modal {
        Some(ModalState::Edit(form)) => assert_eq!(form.errors.email.as_deref(), Some("Invalid email format")),
        other => panic!("edit dialog should stay open, got {other:?}"),
    }

    type_text(&mut app, ".com");
    handle_key(&mut app, key(KeyCode::Tab));
    for _ in 0.."Gwenborough".len() {
        handle_key(&mut app, key(KeyCode::Backspace));
    }
    type_text(&mut app, "Elsewhere");
    handle_key(&mut app, key(KeyCode::Enter));

    assert!(app.modal.is_none());
    let user = app.store.find_user(1).unwrap();
    assert_eq!(user.email, "l@x.com");
    assert_eq!(user.address.city, "Elsewhere");
    assert_eq!(user.address.street, "Kulas Light");
    // Last Gwenborough user moved away: filter resets.
    assert_eq!(app.store.city_filter(), "");
    assert!(!app.store.cities().iter().any(|c| c == "Gwenborough"));
}

#[tokio::test]
async fn escape_discards_edit() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Enter));
    type_text(&mut app, " Jr");
    handle_key(&mut app, key(KeyCode::Esc));
    assert!(app.modal.is_none());
    assert_eq!(app.store.find_user(1).unwrap().name, "Leanne Graham");
}

#[tokio::test]
async fn quit_key_stops_the_loop() {
    let mut app = seeded_app();
    assert!(!handle_key(&mut app, key(KeyCode::Char('j'))));
    assert_eq!(app.selected_index, 1);
    assert!(!handle_key(&mut app, key(KeyCode::Char('j'))));
    assert_eq!(app.selected_index, 1);
    assert!(handle_key(&mut app, key(KeyCode::Char('q'))));
}

#[tokio::test]
async fn ctrl_c_quits_from_every_mode() {
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('/')));
    assert_eq!(app.input_mode, InputMode::Search);
    assert!(handle_key(&mut app, ctrl_c));
    assert_eq!(app.store.search_query(), "");

    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('c')));
    assert_eq!(app.input_mode, InputMode::CityPicker);
    assert!(handle_key(&mut app, ctrl_c));

    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.input_mode, InputMode::Edit);
    assert!(handle_key(&mut app, ctrl_c));
    match &app.modal {
        Some(ModalState::Edit(form)) => assert_eq!(form.data.name, "Leanne Graham"),
        other => panic!("edit dialog should be untouched, got {other:?}"),
    }
}

#[tokio::test]
async fn chords_are_not_typed_as_text() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('/')));
    assert!(!handle_key(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)));
    assert!(!handle_key(&mut app, KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT)));
    handle_key(&mut app, KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT));
    assert_eq!(app.store.search_query(), "E");
    assert_eq!(app.input_mode, InputMode::Search);

    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Enter));
    handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    handle_key(&mut app, KeyEvent::new(KeyCode::Char('!'), KeyModifiers::SHIFT));
    match &app.modal {
        Some(ModalState::Edit(form)) => assert_eq!(form.data.name, "Leanne Graham!"),
        other => panic!("edit dialog should stay open, got {other:?}"),
    }
}

#[tokio::test]
async fn modal_modes_follow_the_open_dialog() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('c')));
    assert_eq!(app.input_mode, InputMode::CityPicker);
    handle_key(&mut app, key(KeyCode::Esc));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.modal.is_none());

    handle_key(&mut app, key(KeyCode::Char('e')));
    assert_eq!(app.input_mode, InputMode::Edit);
    handle_key(&mut app, key(KeyCode::Esc));
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[tokio::test]
async fn selection_stays_in_range_when_list_shrinks() {
    let mut app = seeded_app();
    handle_key(&mut app, key(KeyCode::Char('j')));
    assert_eq!(app.selected_user().map(|u| u.id), Some(2));

    // Debounced search drops the selected row, then the loop clamps.
    let t0 = Instant::now();
    app.store.set_search_query_at("leanne", t0);
    assert!(app.store.tick_at(t0 + Duration::from_millis(400)));
    app.clamp_selection();
    assert_eq!(app.selected_index, 0);
    assert_eq!(app.selected_user().map(|u| u.id), Some(1));

    // Nothing matches: selection parks at zero with no user.
    app.store.set_search_query_at("nobody", t0);
    app.store.tick_at(t0 + Duration::from_millis(800));
    handle_key(&mut app, key(KeyCode::Char('j')));
    assert_eq!(app.selected_index, 0);
    assert!(app.selected_user().is_none());
}

#[tokio::test]
async fn editing_away_the_selected_row_clamps_selection() {
    let mut app = seeded_app();
    // Search "n" keeps both rows (Leanne Graham, Ervin Howell).
    handle_key(&mut app, key(KeyCode::Char('/')));
    type_text(&mut app, "n");
    handle_key(&mut app, key(KeyCode::Enter));
    app.store.tick_at(Instant::now() + Duration::from_millis(400));
    assert_eq!(app.store.filtered_users().len(), 2);

    handle_key(&mut app, key(KeyCode::Char('j')));
    assert_eq!(app.selected_index, 1);

    // Rename Ervin Howell so the search no longer matches.
    handle_key(&mut app, key(KeyCode::Enter));
    for _ in 0.."Ervin Howell".len() {
        handle_key(&mut app, key(KeyCode::Backspace));
    }
    type_text(&mut app, "Zak");
    handle_key(&mut app, key(KeyCode::Enter));
    assert!(app.modal.is_none());

    assert_eq!(app.store.filtered_users().len(), 1);
    assert_eq!(app.selected_index, 0);
    assert_eq!(app.selected_user().map(|u| u.id), Some(1));
}

#[tokio::test]
async fn reload_key_retries_after_failure() {
    let failing = serve_once("503 Service Unavailable", "").await;
    let source: Arc<dyn UserSource> = Arc::new(http(&failing));
    let mut store = UserStore::initialize(Vec::new(), source, &Handle::current(), DEFAULT_DEBOUNCE);
    store.settle().await;
    assert!(store.error().is_some());

    let ok = serve_once("200 OK", USERS_JSON).await;
    let mut app = AppState::new(store, Arc::new(http(&ok)), Handle::current());
    handle_key(&mut app, key(KeyCode::Char('r')));
    assert!(app.store.loading());
    app.store.settle().await;
    assert!(app.store.error().is_none());
    assert_eq!(app.store.users().len(), 2);
}

// 4) Rendering
#[tokio::test]
async fn renders_ready_list_and_edit_dialog() {
    let mut app = seeded_app();
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|f| ui::render(f, &mut app)).unwrap();
    let text = screen_text(&terminal);
    assert!(text.contains("Leanne Graham"));
    assert!(text.contains("Wisokiburgh"));
    assert!(text.contains("All Cities"));

    handle_key(&mut app, key(KeyCode::Enter));
    terminal.draw(|f| ui::render(f, &mut app)).unwrap();
    let text = screen_text(&terminal);
    assert!(text.contains("Edit User"));
    assert!(text.contains("mode: EDIT"));
}

#[tokio::test]
async fn renders_empty_and_error_states() {
    let mut app = seeded_app();
    app.store.set_search_query_at("zzz", Instant::now());
    app.store.tick_at(Instant::now() + Duration::from_secs(1));
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|f| ui::render(f, &mut app)).unwrap();
    assert!(screen_text(&terminal).contains("No users found matching your criteria."));

    let base = serve_once("500 Internal Server Error", "").await;
    let source: Arc<dyn UserSource> = Arc::new(http(&base));
    let mut store = UserStore::initialize(Vec::new(), source.clone(), &Handle::current(), DEFAULT_DEBOUNCE);
    store.settle().await;
    let mut app = AppState::new(store, source, Handle::current());
    terminal.draw(|f| ui::render(f, &mut app)).unwrap();
    assert!(screen_text(&terminal).contains("status 500"));
}
