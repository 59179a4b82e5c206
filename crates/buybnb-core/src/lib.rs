//! Core library for the BuyBnB client.
//!
//! - `auth`: the session store and its persistence backends
//! - `api`: the authenticated request gateway to the listings API
//! - `navigation`: routes and the navigation sink used for redirects
//! - `models`: user, credential and property records
//! - `config`: on-disk configuration and environment overrides
//! - `utils`: display formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResponse, HttpTransport, RequestOptions, Transport};
pub use auth::{Session, SessionError, SessionState, SessionStorage, SessionStore, StorageError};
pub use config::Config;
pub use navigation::{route_channel, Navigator, Route, RouteSender};
