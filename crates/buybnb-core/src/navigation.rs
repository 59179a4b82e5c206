//! Routes and the navigation sink.
//!
//! Sign-out and session expiry redirect to the sign-in page as a side
//! effect. The session store reports those redirects through a
//! `Navigator`; the terminal client receives them over a channel and
//! switches pages on its next tick.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A page the client can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Search { city: Option<String> },
    Login,
    Profile,
}

impl Route {
    /// Path form used in logs.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Search { city: Some(city) } => format!("/search?city={}", city),
            Route::Search { city: None } => "/search".to_string(),
            Route::Login => "/login".to_string(),
            Route::Profile => "/profile".to_string(),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// `Navigator` that forwards routes to a channel receiver.
#[derive(Debug, Clone)]
pub struct RouteSender {
    tx: mpsc::UnboundedSender<Route>,
}

impl Navigator for RouteSender {
    fn navigate(&self, route: Route) {
        debug!(path = %route.path(), "Navigating");
        if self.tx.send(route).is_err() {
            warn!("Route receiver dropped, navigation ignored");
        }
    }
}

/// Create a connected navigator and receiver.
pub fn route_channel() -> (RouteSender, mpsc::UnboundedReceiver<Route>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RouteSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_sender_delivers_in_order() {
        let (nav, mut rx) = route_channel();
        nav.navigate(Route::Login);
        nav.navigate(Route::Search { city: Some("Pune".to_string()) });

        assert_eq!(rx.try_recv().unwrap(), Route::Login);
        assert_eq!(
            rx.try_recv().unwrap(),
            Route::Search { city: Some("Pune".to_string()) }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_navigate_after_receiver_dropped() {
        let (nav, rx) = route_channel();
        drop(rx);
        // Must not panic
        nav.navigate(Route::Home);
    }

    #[test]
    fn test_route_path() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::Search { city: None }.path(), "/search");
        assert_eq!(
            Route::Search { city: Some("Delhi".to_string()) }.path(),
            "/search?city=Delhi"
        );
    }
}
