//! Library crate for user-dashboard.
//!
//! This crate exposes the building blocks of the TUI:
//! - User records and the edit projection (`model`)
//! - Fetching the user list over HTTP, with an on-disk cache (`api`)
//! - Trailing-edge debounce (`debounce`)
//! - The user state store with its derived views (`store`)
//! - Edit dialog state and validation (`form`)
//! - Application state, keymap and event loop (`app`)
//! - UI rendering and widgets (`ui`)
//! - Command-line configuration (`config`) and error types (`error`)
//!
//! It is used by the `user-dashboard` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod model;
pub mod store;
pub mod ui;

pub use error::{CacheError, FetchError};
pub use model::{User, UserFormData};
pub use store::UserStore;
