use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};

use buybnb_core::models::PropertyListing;
use buybnb_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Width of the listing panel
const LIST_WIDTH: u16 = 44;

/// Detail card dimensions
const CARD_WIDTH: u16 = 46;
const CARD_HEIGHT: u16 = 9;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.search.loading {
        render_loading(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
        .split(area);

    render_listing_panel(frame, app, chunks[0]);
    render_globe(frame, app, chunks[1]);

    if let Some(property) = app.search.selected_property() {
        render_detail_card(frame, property, chunks[1]);
    }
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(app.search.loading_message(), styles::highlight_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn render_listing_panel(frame: &mut Frame, app: &App, area: Rect) {
    let name_width = (LIST_WIDTH as usize).saturating_sub(6);

    let items: Vec<ListItem> = app
        .search
        .properties
        .iter()
        .enumerate()
        .map(|(i, property)| {
            let marker = if app.search.selected == Some(i) { "● " } else { "  " };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, styles::search_style()),
                    Span::styled(
                        truncate_string(&property.name, name_width),
                        styles::list_item_style(),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(property.price.clone(), styles::price_style()),
                    Span::styled(format!("  {}", property.city), styles::muted_style()),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(property.summary(), styles::muted_style()),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", app.search.title()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if !app.search.properties.is_empty() {
        state.select(Some(app.search.selection));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let globe = app.search.globe;
    let coords: Vec<(f64, f64)> = app
        .search
        .properties
        .iter()
        .map(|p| (p.lng, p.lat))
        .collect();
    let selected = app.search.selected_property();

    let rotate_hint = if globe.auto_rotate { "[r] stop" } else { "[r] rotate" };
    let title = format!(
        " Globe {:.1}°, {:.1}° - {} ",
        globe.lat, globe.lng, rotate_hint
    );

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .marker(Marker::Braille)
        .x_bounds(globe.x_bounds())
        .y_bounds(globe.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                color: styles::LAND,
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &coords,
                color: styles::MARKER,
            });
            if let Some(property) = selected {
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[(property.lng, property.lat)],
                    color: styles::MARKER_SELECTED,
                });
                ctx.print(
                    property.lng,
                    property.lat,
                    Line::styled(format!(" {}", property.name), styles::highlight_style()),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn render_detail_card(frame: &mut Frame, property: &PropertyListing, area: Rect) {
    let width = CARD_WIDTH.min(area.width.saturating_sub(2));
    let height = CARD_HEIGHT.min(area.height.saturating_sub(2));
    let card = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    );

    frame.render_widget(Clear, card);

    let mut lines = vec![
        Line::from(Span::styled(property.name.clone(), styles::title_style())),
        Line::from(Span::styled(property.price.clone(), styles::price_style())),
        Line::from(Span::styled(property.summary(), styles::list_item_style())),
        Line::from(Span::styled(property.city.clone(), styles::muted_style())),
    ];
    if let Some(ref image) = property.image {
        lines.push(Line::from(Span::styled(image.clone(), styles::muted_style())));
    }

    let block = Block::default()
        .title(" [Esc] close ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        card,
    );
}
