#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod app;
pub mod cache;
pub mod config;
pub mod database;
pub mod feed;
pub mod http;
pub mod schema;
pub mod types;
pub mod util;

pub use app::App;

pub(crate) mod internal;
