//! HTTP host for the job board.
//!
//! Requests reach a single axum fallback which hands them to the [`jobboard::Router`]
//! built in [`routes::build`]. Controllers answer JSON; form submissions use
//! `application/x-www-form-urlencoded` bodies with an optional `_method` override.

pub mod app;
pub mod config;
pub mod context;
pub mod controllers;
pub mod routes;

pub use app::{AppState, app, dispatch};
pub use config::AppConfig;
