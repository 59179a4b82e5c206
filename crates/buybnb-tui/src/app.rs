//! Application state management for the BuyBnB terminal client.
//!
//! This module contains the core `App` struct that manages all application
//! state: the current page, form inputs, search results, the globe view and
//! the coordination of background API requests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use buybnb_core::auth::SessionStorage;
use buybnb_core::models::{Credentials, PropertyListing, UserRecord};
use buybnb_core::{
    route_channel, ApiClient, ApiError, Config, HttpTransport, Route, SessionState, SessionStore,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// One search plus the destination counts and a profile load fit with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the city search box.
const MAX_SEARCH_LENGTH: usize = 80;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum concurrent API requests for destination counts.
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Cities featured on the home page.
pub const POPULAR_DESTINATIONS: [&str; 4] = ["Mumbai", "Bangalore", "Delhi", "Pune"];

// ============================================================================
// Globe
// ============================================================================

/// Initial point of view: centered on India, zoomed out.
const INITIAL_LAT: f64 = 20.5937;
const INITIAL_LNG: f64 = 78.9629;
const INITIAL_ALTITUDE: f64 = 2.0;

/// Altitude used when flying to a selected listing.
const SELECTED_ALTITUDE: f64 = 1.5;

/// Degrees of longitude the globe turns per tick while auto-rotating.
const AUTO_ROTATE_SPEED: f64 = 0.5;

/// Degrees of longitude / latitude visible on each side of center per unit of altitude.
const LNG_SPAN_PER_ALTITUDE: f64 = 45.0;
const LAT_SPAN_PER_ALTITUDE: f64 = 22.5;

/// Point of view over the world map on the search page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeView {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub auto_rotate: bool,
}

impl Default for GlobeView {
    fn default() -> Self {
        Self {
            lat: INITIAL_LAT,
            lng: INITIAL_LNG,
            altitude: INITIAL_ALTITUDE,
            auto_rotate: true,
        }
    }
}

impl GlobeView {
    pub fn point_of_view(&mut self, lat: f64, lng: f64, altitude: f64) {
        self.lat = lat.clamp(-90.0, 90.0);
        self.lng = wrap_longitude(lng);
        self.altitude = altitude;
    }

    /// Advance auto-rotation by one tick.
    pub fn tick(&mut self) {
        if self.auto_rotate {
            self.lng = wrap_longitude(self.lng + AUTO_ROTATE_SPEED);
        }
    }

    /// Visible longitude range for the map canvas.
    pub fn x_bounds(&self) -> [f64; 2] {
        let half = (LNG_SPAN_PER_ALTITUDE * self.altitude).min(180.0);
        [self.lng - half, self.lng + half]
    }

    /// Visible latitude range, kept within the poles.
    pub fn y_bounds(&self) -> [f64; 2] {
        let half = (LAT_SPAN_PER_ALTITUDE * self.altitude).min(90.0);
        let center = self.lat.clamp(-90.0 + half, 90.0 - half);
        [center - half, center + half]
    }
}

/// Normalize a longitude into [-180, 180).
fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Search,
    Login,
    Profile,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    EditingSearch,
    UserMenu,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Entries of the signed-in user menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMenuItem {
    Profile,
    SignOut,
}

impl UserMenuItem {
    pub const ALL: [UserMenuItem; 2] = [UserMenuItem::Profile, UserMenuItem::SignOut];

    pub fn label(&self) -> &'static str {
        match self {
            UserMenuItem::Profile => "My Profile",
            UserMenuItem::SignOut => "Sign out",
        }
    }
}

/// A featured city and its live listing count.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub name: &'static str,
    pub count: Option<usize>,
}

/// Everything the search page shows.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub city: Option<String>,
    pub properties: Vec<PropertyListing>,
    pub loading: bool,
    /// Cursor position in the list
    pub selection: usize,
    /// Listing whose detail card is open
    pub selected: Option<usize>,
    pub globe: GlobeView,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Incremented per search so late responses for an old search are dropped
    generation: u64,
}

impl SearchState {
    pub fn title(&self) -> String {
        match self.city {
            Some(ref city) => format!("Properties in {} ({})", city, self.properties.len()),
            None => format!("All properties ({})", self.properties.len()),
        }
    }

    pub fn loading_message(&self) -> String {
        match self.city {
            Some(ref city) => format!("Loading properties in {}…", city),
            None => "Loading properties…".to_string(),
        }
    }

    pub fn selected_property(&self) -> Option<&PropertyListing> {
        self.selected.and_then(|i| self.properties.get(i))
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned API requests.
enum BackgroundResult {
    /// Listings for the search with the given generation
    Properties {
        generation: u64,
        result: Result<Vec<PropertyListing>, String>,
    },
    /// Number of listings in a featured city (None if the request failed)
    DestinationCount { city: &'static str, count: Option<usize> },
    /// The signed-in user's profile
    Profile(Result<UserRecord, String>),
}

// ============================================================================
// Services
// ============================================================================

/// The session store, gateway and redirect receiver the app runs on.
pub struct Services {
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub routes: mpsc::UnboundedReceiver<Route>,
}

impl Services {
    /// Build services from configuration and load the persisted session.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, backend = ?config.session_backend, "Session storage configured");
        Ok(Self::new(
            config.session_storage(&cache_dir),
            config.api_base_url(),
            HttpTransport::new(Some(config.request_timeout()))?,
        ))
    }

    pub fn new(
        storage: Box<dyn SessionStorage>,
        base_url: String,
        transport: HttpTransport,
    ) -> Self {
        let (navigator, routes) = route_channel();
        let session = Arc::new(SessionStore::new(storage, Arc::new(navigator)));
        let state = session.initialize();
        debug!(authenticated = state.is_authenticated(), base_url = %base_url, "Services ready");

        let api = ApiClient::new(base_url, Arc::new(transport), session.clone());
        Self {
            session,
            api,
            routes,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    routes: mpsc::UnboundedReceiver<Route>,
    session_changes: watch::Receiver<SessionState>,

    // UI State
    pub page: Page,
    pub state: AppState,
    pub user_menu_selection: usize,
    pub status_message: Option<String>,

    // Home page
    pub search_input: String,
    pub destinations: Vec<Destination>,
    pub destination_selection: usize,

    // Search page
    pub search: SearchState,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Profile page
    pub profile: Option<UserRecord>,
    pub profile_loading: bool,
    pub profile_error: Option<String>,

    // Background task communication
    bg_tx: mpsc::Sender<BackgroundResult>,
    bg_rx: mpsc::Receiver<BackgroundResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, services: Services) -> Self {
        let (bg_tx, bg_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Get username from env var or config
        let login_username = std::env::var("BUYBNB_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let destinations = POPULAR_DESTINATIONS
            .iter()
            .map(|&name| Destination { name, count: None })
            .collect();

        let session_changes = services.session.subscribe();

        Self {
            config,
            session: services.session,
            api: services.api,
            routes: services.routes,
            session_changes,

            page: Page::Home,
            state: AppState::Normal,
            user_menu_selection: 0,
            status_message: None,

            search_input: String::new(),
            destinations,
            destination_selection: 0,

            search: SearchState::default(),

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            profile: None,
            profile_loading: false,
            profile_error: None,

            bg_tx,
            bg_rx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The signed-in user, if the session is still valid.
    pub fn current_user(&self) -> Option<UserRecord> {
        if self.is_authenticated() {
            self.session.user()
        } else {
            None
        }
    }

    /// Show the sign-in page
    pub fn start_login(&mut self) {
        self.page = Page::Login;
        self.state = AppState::Normal;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        let response = match self.api.login(&Credentials::new(&username, &password)).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                return Err(e.into());
            }
        };

        if let Err(e) = self.session.login(&response.token, response.user) {
            error!(error = %e, "Failed to store session");
            self.login_error = Some(format!("Could not save session: {}", e));
            return Err(e.into());
        }

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.login_password.clear();
        info!("Login successful");
        self.navigate(Route::Home);
        Ok(())
    }

    /// Sign out; the session store redirects to the sign-in page.
    pub fn sign_out(&mut self) {
        self.state = AppState::Normal;
        self.session.logout();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, route: Route) {
        debug!(path = %route.path(), "Page change");
        self.status_message = None;
        match route {
            Route::Home => {
                self.page = Page::Home;
                self.state = AppState::Normal;
            }
            Route::Search { city } => self.start_search(city),
            Route::Login => self.start_login(),
            Route::Profile => {
                if self.is_authenticated() {
                    self.load_profile();
                } else {
                    self.start_login();
                }
            }
        }
    }

    /// Apply redirects issued by the session store.
    pub fn check_routes(&mut self) {
        while let Ok(route) = self.routes.try_recv() {
            self.navigate(route);
        }
    }

    /// React to sign-in state changes, wherever they came from.
    pub fn check_session(&mut self) {
        if !matches!(self.session_changes.has_changed(), Ok(true)) {
            return;
        }
        let state = self.session_changes.borrow_and_update().clone();
        if !state.is_authenticated() {
            debug!("Session ended, dropping profile");
            self.profile = None;
            self.profile_error = None;
            if self.state == AppState::UserMenu {
                self.state = AppState::Normal;
            }
        }
    }

    /// Submit the home page search box.
    pub fn submit_search(&mut self) {
        let city = self.search_input.trim().to_string();
        if city.is_empty() {
            return;
        }
        self.state = AppState::Normal;
        self.navigate(Route::Search { city: Some(city) });
    }

    pub fn open_user_menu(&mut self) {
        if self.is_authenticated() {
            self.state = AppState::UserMenu;
            self.user_menu_selection = 0;
        }
    }

    pub fn activate_user_menu_item(&mut self) {
        self.state = AppState::Normal;
        match UserMenuItem::ALL.get(self.user_menu_selection) {
            Some(UserMenuItem::Profile) => self.navigate(Route::Profile),
            Some(UserMenuItem::SignOut) => self.sign_out(),
            None => {}
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Switch to the search page and fetch listings in the background.
    pub fn start_search(&mut self, city: Option<String>) {
        self.page = Page::Search;
        self.search.generation += 1;
        self.search.city = city.clone();
        self.search.properties.clear();
        self.search.loading = true;
        self.search.selection = 0;
        self.search.selected = None;
        self.search.globe = GlobeView::default();

        let generation = self.search.generation;
        let api = self.api.clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_properties(city.as_deref())
                .await
                .map(|properties| properties.into_iter().map(PropertyListing::from).collect())
                .map_err(|e| e.to_string());
            Self::send_result(&tx, BackgroundResult::Properties { generation, result }).await;
        });
    }

    pub fn select_property(&mut self, index: usize) {
        let Some(property) = self.search.properties.get(index) else {
            return;
        };
        let (lat, lng) = (property.lat, property.lng);
        self.search.selection = index;
        self.search.selected = Some(index);
        self.search.globe.point_of_view(lat, lng, SELECTED_ALTITUDE);
    }

    pub fn close_property_card(&mut self) {
        self.search.selected = None;
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.search.globe.auto_rotate = !self.search.globe.auto_rotate;
    }

    /// Fetch listing counts for the featured cities.
    pub fn refresh_destinations(&mut self) {
        let api = self.api.clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let mut counts = stream::iter(POPULAR_DESTINATIONS)
                .map(|city| {
                    let api = api.clone();
                    async move {
                        let count = match api.count_properties(city).await {
                            Ok(count) => Some(count),
                            Err(e) => {
                                debug!(city, error = %e, "Destination count unavailable");
                                None
                            }
                        };
                        (city, count)
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_REQUESTS)
                .boxed();

            while let Some((city, count)) = counts.next().await {
                Self::send_result(&tx, BackgroundResult::DestinationCount { city, count }).await;
            }
        });
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub fn load_profile(&mut self) {
        self.page = Page::Profile;
        self.profile_loading = true;
        self.profile_error = None;

        let api = self.api.clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_profile()
                .await
                .map_err(|e| profile_error_message(&e));
            Self::send_result(&tx, BackgroundResult::Profile(result)).await;
        });
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            warn!("Background result dropped, app is shutting down");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.bg_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Properties { generation, result } => {
                if generation != self.search.generation {
                    debug!(generation, current = self.search.generation, "Ignoring stale search results");
                    return;
                }
                self.search.loading = false;
                match result {
                    Ok(properties) => {
                        info!(count = properties.len(), city = ?self.search.city, "Search complete");
                        self.search.properties = properties;
                        self.search.fetched_at = Some(Utc::now());
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to fetch properties");
                        self.search.properties.clear();
                    }
                }
            }
            BackgroundResult::DestinationCount { city, count } => {
                if let Some(dest) = self.destinations.iter_mut().find(|d| d.name == city) {
                    dest.count = count;
                }
            }
            BackgroundResult::Profile(result) => {
                self.profile_loading = false;
                match result {
                    Ok(profile) => self.profile = Some(profile),
                    Err(e) => {
                        warn!(error = %e, "Failed to load profile");
                        self.profile_error = Some(e);
                    }
                }
            }
        }
    }

    /// Per-frame housekeeping: globe rotation.
    pub fn tick(&mut self) {
        if self.page == Page::Search && self.search.selected.is_none() && !self.search.loading {
            self.search.globe.tick();
        }
    }
}

/// User-facing message for a failed sign-in
fn login_error_message(error: &ApiError) -> String {
    match error {
        ApiError::LoginRejected(message) => message.clone(),
        ApiError::Network(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        other => format!("Login failed: {}", other),
    }
}

/// User-facing message for a failed profile load
fn profile_error_message(error: &ApiError) -> String {
    if error.is_unauthorized() {
        "Your session has expired. Please sign in again.".to_string()
    } else {
        error.to_string()
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a search box character should be accepted
pub fn can_add_search_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SEARCH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use buybnb_core::auth::{MemoryStorage, TOKEN_KEY, USER_KEY};

    /// App wired to in-memory session storage and an address nothing listens on.
    pub(crate) fn test_app(storage: MemoryStorage) -> App {
        let services = Services::new(
            Box::new(storage),
            "http://127.0.0.1:9".to_string(),
            HttpTransport::new(None).unwrap(),
        );
        let mut app = App::new(Config::default(), services);
        app.login_username.clear();
        app
    }

    fn listing(id: &str, lat: f64, lng: f64) -> PropertyListing {
        PropertyListing {
            id: id.to_string(),
            name: format!("Listing {}", id),
            city: "Pune".to_string(),
            price: "₹50.0 L".to_string(),
            lat,
            lng,
            beds: Some(2.0),
            baths: Some(1.0),
            sqft: Some(900.0),
            image: None,
        }
    }

    // -------------------------------------------------------------------------
    // Globe Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_globe_initial_point_of_view() {
        let globe = GlobeView::default();
        assert_eq!(globe.lat, 20.5937);
        assert_eq!(globe.lng, 78.9629);
        assert_eq!(globe.altitude, 2.0);
        assert!(globe.auto_rotate);
        assert_eq!(globe.x_bounds(), [78.9629 - 90.0, 78.9629 + 90.0]);
    }

    #[test]
    fn test_globe_rotation_wraps() {
        let mut globe = GlobeView::default();
        globe.point_of_view(0.0, 179.8, 2.0);
        globe.tick();
        assert!((globe.lng - (-179.7)).abs() < 1e-9);

        globe.auto_rotate = false;
        globe.tick();
        assert!((globe.lng - (-179.7)).abs() < 1e-9);
    }

    #[test]
    fn test_globe_y_bounds_stay_within_poles() {
        let mut globe = GlobeView::default();
        globe.point_of_view(85.0, 0.0, 1.5);
        let [low, high] = globe.y_bounds();
        assert!(high <= 90.0);
        assert!((high - low - 67.5).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(180.0), -180.0);
    }

    // -------------------------------------------------------------------------
    // Page Flow Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_search_trims_and_ignores_blank() {
        let mut app = test_app(MemoryStorage::new());

        app.search_input = "   ".to_string();
        app.submit_search();
        assert_eq!(app.page, Page::Home);

        app.search_input = "  Pune ".to_string();
        app.state = AppState::EditingSearch;
        app.submit_search();
        assert_eq!(app.page, Page::Search);
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.search.city.as_deref(), Some("Pune"));
        assert!(app.search.loading);
        assert_eq!(app.search.loading_message(), "Loading properties in Pune…");
    }

    #[tokio::test]
    async fn test_stale_search_results_ignored() {
        let mut app = test_app(MemoryStorage::new());
        app.start_search(Some("Mumbai".to_string()));
        let stale = app.search.generation;
        app.start_search(Some("Delhi".to_string()));

        app.process_result(BackgroundResult::Properties {
            generation: stale,
            result: Ok(vec![listing("1", 19.0, 72.8)]),
        });
        assert!(app.search.loading);
        assert!(app.search.properties.is_empty());

        app.process_result(BackgroundResult::Properties {
            generation: app.search.generation,
            result: Ok(vec![listing("2", 28.6, 77.2), listing("3", 28.5, 77.1)]),
        });
        assert!(!app.search.loading);
        assert_eq!(app.search.title(), "Properties in Delhi (2)");
        assert!(app.search.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_search_shows_empty_list() {
        let mut app = test_app(MemoryStorage::new());
        app.start_search(None);
        app.process_result(BackgroundResult::Properties {
            generation: app.search.generation,
            result: Err("Network error: refused".to_string()),
        });
        assert!(!app.search.loading);
        assert_eq!(app.search.title(), "All properties (0)");
    }

    #[tokio::test]
    async fn test_select_property_flies_to_listing() {
        let mut app = test_app(MemoryStorage::new());
        app.start_search(Some("Pune".to_string()));
        app.process_result(BackgroundResult::Properties {
            generation: app.search.generation,
            result: Ok(vec![listing("1", 18.52, 73.85), listing("2", 18.6, 73.9)]),
        });

        app.select_property(1);
        assert_eq!(app.search.selected_property().map(|p| p.id.as_str()), Some("2"));
        assert_eq!(app.search.globe.lat, 18.6);
        assert_eq!(app.search.globe.lng, 73.9);
        assert_eq!(app.search.globe.altitude, 1.5);

        // Globe holds still while a card is open
        app.tick();
        assert_eq!(app.search.globe.lng, 73.9);

        app.close_property_card();
        assert!(app.search.selected_property().is_none());

        app.select_property(7);
        assert!(app.search.selected.is_none());
    }

    #[tokio::test]
    async fn test_logout_redirect_reaches_login_page() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, r#"{"id":1,"username":"ana"}"#).unwrap();
        let mut app = test_app(storage);
        assert!(app.is_authenticated());

        app.open_user_menu();
        assert_eq!(app.state, AppState::UserMenu);
        app.user_menu_selection = 1;
        app.activate_user_menu_item();

        assert!(!app.is_authenticated());
        assert_eq!(app.page, Page::Home);
        app.check_routes();
        assert_eq!(app.page, Page::Login);
        assert_eq!(app.login_focus, LoginFocus::Username);
    }

    #[tokio::test]
    async fn test_user_menu_requires_session() {
        let mut app = test_app(MemoryStorage::new());
        app.open_user_menu();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn test_profile_route_when_anonymous_goes_to_login() {
        let mut app = test_app(MemoryStorage::new());
        app.navigate(Route::Profile);
        assert_eq!(app.page, Page::Login);
    }

    #[tokio::test]
    async fn test_destination_counts_update() {
        let mut app = test_app(MemoryStorage::new());
        app.process_result(BackgroundResult::DestinationCount {
            city: "Delhi",
            count: Some(12),
        });
        let delhi = app.destinations.iter().find(|d| d.name == "Delhi").unwrap();
        assert_eq!(delhi.count, Some(12));
    }

    #[tokio::test]
    async fn test_attempt_login_requires_both_fields() {
        let mut app = test_app(MemoryStorage::new());
        app.login_username = "ana".to_string();
        app.login_password.clear();
        assert!(app.attempt_login().await.is_err());
        assert_eq!(app.login_error.as_deref(), Some("Username and password required"));
    }

    #[tokio::test]
    async fn test_session_end_drops_profile() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, r#"{"id":1,"username":"ana"}"#).unwrap();
        let mut app = test_app(storage);

        let user = app.session.user().unwrap();
        app.process_result(BackgroundResult::Profile(Ok(user)));
        assert!(app.profile.is_some());

        // Nothing changed yet, so the profile stays
        app.check_session();
        assert!(app.profile.is_some());

        app.state = AppState::UserMenu;
        app.session.expire();
        app.check_session();
        assert!(app.profile.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_profile_error_message() {
        assert!(profile_error_message(&ApiError::Unauthorized).contains("sign in again"));
        assert_eq!(
            profile_error_message(&ApiError::Network("refused".to_string())),
            ApiError::Network("refused".to_string()).to_string()
        );
    }

    #[test]
    fn test_login_error_message() {
        assert_eq!(
            login_error_message(&ApiError::LoginRejected("invalid credentials".to_string())),
            "invalid credentials"
        );
        assert!(login_error_message(&ApiError::Network("refused".to_string()))
            .starts_with("Unable to connect"));
    }

    // -------------------------------------------------------------------------
    // Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Username.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Username);
        assert_eq!(LoginFocus::Username.prev(), LoginFocus::Button);
        assert_eq!(LoginFocus::Password.prev(), LoginFocus::Username);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(63, 'z'));
        assert!(!can_add_username_char(64, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_search_char() {
        assert!(can_add_search_char(0, 'B'));
        assert!(can_add_search_char(0, ' '));
        assert!(!can_add_search_char(80, 'a'));
        assert!(!can_add_search_char(0, '\x1b'));
    }
}
