// Library interface for the board client
#[macro_use]
pub mod logging;

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod notify;
pub mod post_view;
pub mod server_config;
pub mod session;
pub mod share;
pub mod terminal;
pub mod ui;
pub mod validation;
