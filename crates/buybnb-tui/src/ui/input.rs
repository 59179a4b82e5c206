//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use buybnb_core::Route;

use crate::app::{
    can_add_password_char, can_add_search_char, can_add_username_char, App, AppState,
    LoginFocus, Page, UserMenuItem, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // The sign-in form owns the keyboard
    if app.page == Page::Login && app.state == AppState::Normal {
        return handle_login_input(app, key).await;
    }

    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::EditingSearch => return handle_search_box_input(app, key),
        AppState::UserMenu => return handle_user_menu_input(app, key),
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('h') => {
            app.navigate(Route::Home);
            return Ok(false);
        }
        KeyCode::Char('e') => {
            app.navigate(Route::Search { city: None });
            return Ok(false);
        }
        KeyCode::Char('s') if !app.is_authenticated() => {
            app.navigate(Route::Login);
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.open_user_menu();
            return Ok(false);
        }
        _ => {}
    }

    match app.page {
        Page::Home => handle_home_input(app, key),
        Page::Search => handle_search_page_input(app, key),
        Page::Profile => handle_profile_input(app, key),
        Page::Login => {}
    }
    Ok(false)
}

fn handle_search_box_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_search();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_search_char(app.search_input.chars().count(), c) {
                app.search_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_user_menu_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let last = UserMenuItem::ALL.len() - 1;
    match key.code {
        KeyCode::Esc | KeyCode::Char('u') => {
            app.state = AppState::Normal;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.user_menu_selection = app.user_menu_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.user_menu_selection = (app.user_menu_selection + 1).min(last);
        }
        KeyCode::Enter => {
            app.activate_user_menu_item();
        }
        _ => {}
    }
    Ok(false)
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    let last = app.destinations.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.state = AppState::EditingSearch;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.destination_selection = app.destination_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.destination_selection = (app.destination_selection + 1).min(last);
        }
        KeyCode::Enter => {
            if let Some(dest) = app.destinations.get(app.destination_selection) {
                let city = dest.name.to_string();
                app.navigate(Route::Search { city: Some(city) });
            }
        }
        _ => {}
    }
}

fn handle_search_page_input(app: &mut App, key: KeyEvent) {
    let count = app.search.properties.len();
    let last = count.saturating_sub(1);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.search.selection = app.search.selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.search.selection = (app.search.selection + 1).min(last);
        }
        KeyCode::PageUp => {
            app.search.selection = app.search.selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.search.selection = (app.search.selection + PAGE_SCROLL_SIZE).min(last);
        }
        KeyCode::Home => {
            app.search.selection = 0;
        }
        KeyCode::End => {
            app.search.selection = last;
        }
        KeyCode::Enter => {
            app.select_property(app.search.selection);
        }
        KeyCode::Char('r') => {
            app.toggle_auto_rotate();
        }
        KeyCode::Char('/') => {
            app.navigate(Route::Home);
            app.state = AppState::EditingSearch;
        }
        KeyCode::Esc => {
            if app.search.selected.is_some() {
                app.close_property_card();
            } else {
                app.navigate(Route::Home);
            }
        }
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.navigate(Route::Profile),
        KeyCode::Esc => app.navigate(Route::Home),
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.login_error = None;
            app.navigate(Route::Home);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set and the form stays up
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use buybnb_core::auth::MemoryStorage;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_home_search_box_flow() {
        let mut app = test_app(MemoryStorage::new());
        handle_input(&mut app, press(KeyCode::Char('/'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingSearch);

        // Global keys are plain text while editing
        type_text(&mut app, "Pune q").await;
        handle_input(&mut app, press(KeyCode::Backspace)).await.unwrap();
        handle_input(&mut app, press(KeyCode::Backspace)).await.unwrap();
        assert_eq!(app.search_input, "Pune");

        handle_input(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.page, Page::Search);
        assert_eq!(app.search.city.as_deref(), Some("Pune"));
    }

    #[tokio::test]
    async fn test_destination_enter_searches_city() {
        let mut app = test_app(MemoryStorage::new());
        handle_input(&mut app, press(KeyCode::Down)).await.unwrap();
        handle_input(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.page, Page::Search);
        assert_eq!(app.search.city.as_deref(), Some("Bangalore"));
    }

    #[tokio::test]
    async fn test_login_form_input_and_escape() {
        let mut app = test_app(MemoryStorage::new());
        handle_input(&mut app, press(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.page, Page::Login);

        // 'q' and 'h' are typed into the form, not treated as shortcuts
        type_text(&mut app, "qh").await;
        assert_eq!(app.login_username, "qh");
        assert_eq!(app.page, Page::Login);

        handle_input(&mut app, press(KeyCode::Tab)).await.unwrap();
        type_text(&mut app, "pw").await;
        assert_eq!(app.login_password, "pw");

        handle_input(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.page, Page::Home);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app(MemoryStorage::new());
        assert!(!handle_input(&mut app, press(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, press(KeyCode::Char('n'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(handle_input(&mut app, press(KeyCode::Char('y'))).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_search_page_escape_returns_home() {
        let mut app = test_app(MemoryStorage::new());
        handle_input(&mut app, press(KeyCode::Char('e'))).await.unwrap();
        assert_eq!(app.page, Page::Search);
        assert!(app.search.city.is_none());

        handle_input(&mut app, press(KeyCode::Char('r'))).await.unwrap();
        assert!(!app.search.globe.auto_rotate);

        handle_input(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.page, Page::Home);
    }
}
