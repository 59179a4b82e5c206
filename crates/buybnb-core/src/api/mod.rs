//! Authenticated request gateway for the BuyBnB listings API.
//!
//! `ApiClient` joins paths onto the configured base address, attaches the
//! session's bearer token, and turns a 401 from the server into a signed-out
//! session plus a redirect to the sign-in page. The HTTP layer sits behind
//! the `Transport` trait; `HttpTransport` is the reqwest implementation.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, RequestOptions};
pub use error::ApiError;
pub use transport::{ApiResponse, HttpRequest, HttpTransport, Transport};
