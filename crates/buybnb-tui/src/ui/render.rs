use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use buybnb_core::utils::age_display;

use crate::app::{App, AppState, Page, UserMenuItem};

use super::pages::{home, login, profile, search};
use super::styles;

/// Brand logo, 18 columns wide.
pub(crate) const LOGO: [&str; 3] = [
    "╔╗ ╦ ╦╦ ╦╔╗ ╔╗╔╔╗ ",
    "╠╩╗║ ║╚╦╝╠╩╗║║║╠╩╗",
    "╚═╝╚═╝ ╩ ╚═╝╝╚╝╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Navbar
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_navbar(frame, app, chunks[0]);
    render_page(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::UserMenu => render_user_menu(frame, app, chunks[0]),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_navbar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("  BuyBnB", styles::title_style()),
        Span::raw("    "),
        Span::styled(
            "[e] Explore Properties",
            styles::nav_style(app.page == Page::Search),
        ),
        Span::styled(" | ", styles::muted_style()),
        Span::styled("[h] Home", styles::nav_style(app.page == Page::Home)),
    ];

    let right: Vec<Span> = match app.current_user() {
        Some(user) => vec![
            Span::styled(format!(" {} ", user.initials()), styles::avatar_style()),
            Span::raw(" "),
            Span::styled(user.display_name(), styles::list_item_style()),
            Span::styled(" [u] ", styles::muted_style()),
        ],
        None => vec![Span::styled(
            "[s] Sign in ",
            styles::nav_style(app.page == Page::Login),
        )],
    };

    let used: usize = spans
        .iter()
        .chain(right.iter())
        .map(|s| s.content.chars().count())
        .sum();
    spans.push(Span::raw(" ".repeat((area.width as usize).saturating_sub(used + 1))));
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_page(frame: &mut Frame, app: &App, area: Rect) {
    match app.page {
        Page::Home => home::render(frame, app, area),
        Page::Search => search::render(frame, app, area),
        Page::Login => login::render(frame, app, area),
        Page::Profile => profile::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[?] help | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match (app.page, app.search.fetched_at) {
            (Page::Search, Some(fetched_at)) => format!(" Updated {} ", age_display(fetched_at)),
            _ => format!(" {} ", app.api.base_url()),
        }
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Dropdown under the avatar in the navbar
fn render_user_menu(frame: &mut Frame, app: &App, navbar: Rect) {
    const WIDTH: u16 = 22;
    let height = UserMenuItem::ALL.len() as u16 + 2;
    let area = Rect::new(
        navbar.x + navbar.width.saturating_sub(WIDTH + 1),
        navbar.y + navbar.height.saturating_sub(1),
        WIDTH.min(navbar.width),
        height,
    )
    .intersection(frame.area());

    frame.render_widget(Clear, area);

    let lines: Vec<Line> = UserMenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let base = match item {
                UserMenuItem::SignOut => styles::error_style(),
                UserMenuItem::Profile => styles::list_item_style(),
            };
            let style = if i == app.user_menu_selection {
                base.patch(styles::selected_style())
            } else {
                base
            };
            Line::from(Span::styled(format!(" {:<18}", item.label()), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Logo lines indented to sit centered in an interior of `width` columns.
pub(crate) fn logo_lines(width: u16) -> Vec<Line<'static>> {
    let indent = " ".repeat((width as usize).saturating_sub(18) / 2);
    LOGO.iter()
        .map(|row| Line::from(Span::styled(format!("{}{}", indent, row), styles::title_style())))
        .collect()
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 29, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines(50);
    help_text.extend([
        Line::from(Span::styled(
            format!("{:^50}", format!("version {}", version)),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("h", "Home"),
        help_line("e", "Explore all properties"),
        help_line("s", "Sign in"),
        help_line("u", "User menu (profile, sign out)"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Home", styles::highlight_style())),
        help_line("/", "Search by city"),
        help_line("↑/↓", "Choose a destination"),
        help_line("Enter", "Search the destination"),
        Line::from(""),
        Line::from(Span::styled(" Search", styles::highlight_style())),
        help_line("↑/↓", "Navigate listings"),
        help_line("Enter", "Show listing on the globe"),
        help_line("r", "Toggle globe rotation"),
        Line::from(""),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    // Fixed size dialog matching the sign-in form
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines(44);
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
