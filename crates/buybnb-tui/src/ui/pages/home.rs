use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::render::LOGO;
use crate::ui::styles;

const SEARCH_PLACEHOLDER: &str = "Search by city, neighborhood, or address...";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Hero
            Constraint::Length(3), // Search box
            Constraint::Min(6),    // Popular destinations
            Constraint::Length(3), // Call to action
        ])
        .split(area);

    render_hero(frame, chunks[0]);
    render_search_box(frame, app, chunks[1]);
    render_destinations(frame, app, chunks[2]);
    render_call_to_action(frame, app, chunks[3]);
}

fn render_hero(frame: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from("")];
    lines.extend(
        LOGO.iter()
            .map(|row| Line::from(Span::styled(*row, styles::title_style()))),
    );
    lines.push(Line::from(Span::styled(
        "Find your perfect property",
        styles::list_item_style(),
    )));
    lines.push(Line::from(Span::styled(
        "Discover homes and apartments across India's most popular cities",
        styles::muted_style(),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::EditingSearch;

    let content = if editing {
        Line::from(vec![
            Span::styled(app.search_input.as_str(), styles::search_style()),
            Span::styled("▌", styles::search_style()),
        ])
    } else if app.search_input.is_empty() {
        Line::from(Span::styled(SEARCH_PLACEHOLDER, styles::muted_style()))
    } else {
        Line::from(Span::styled(app.search_input.as_str(), styles::list_item_style()))
    };

    let title = if editing {
        " Search - [Enter] go  [Esc] cancel "
    } else {
        " Search - [/] type a city "
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    let width = area.width.min(72);
    let x = area.x + (area.width - width) / 2;
    frame.render_widget(
        Paragraph::new(content).block(block),
        Rect::new(x, area.y, width, area.height),
    );
}

fn render_destinations(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .destinations
        .iter()
        .map(|dest| {
            let count = match dest.count {
                Some(1) => "1 property".to_string(),
                Some(n) => format!("{} properties", n),
                None => "…".to_string(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<14}", dest.name), styles::list_item_style()),
                Span::styled(count, styles::muted_style()),
            ]))
        })
        .collect();

    let focused = app.state == AppState::Normal;
    let list = List::new(items)
        .block(
            Block::default()
                .title(" Popular Destinations - [Enter] explore ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    state.select(Some(app.destination_selection));

    let width = area.width.min(72);
    let x = area.x + (area.width - width) / 2;
    frame.render_stateful_widget(list, Rect::new(x, area.y, width, area.height), &mut state);
}

fn render_call_to_action(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.is_authenticated() {
        Line::from(vec![
            Span::styled("Browse every listing: ", styles::muted_style()),
            Span::styled("[e] Explore Properties", styles::help_key_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("Ready to find your dream property? ", styles::muted_style()),
            Span::styled("[s] Get Started", styles::help_key_style()),
        ])
    };

    frame.render_widget(
        Paragraph::new(vec![Line::from(""), line]).alignment(Alignment::Center),
        area,
    );
}
