use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use buybnb_core::models::UserRecord;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lines = if app.profile_loading {
        vec![Line::from(Span::styled("Loading profile…", styles::highlight_style()))]
    } else if let Some(ref error) = app.profile_error {
        vec![
            Line::from(Span::styled("Could not load your profile", styles::error_style())),
            Line::from(Span::styled(error.clone(), styles::muted_style())),
            Line::from(""),
            Line::from(Span::styled("[r] retry", styles::help_key_style())),
        ]
    } else if let Some(ref profile) = app.profile {
        profile_lines(profile)
    } else {
        vec![Line::from(Span::styled("No profile loaded", styles::muted_style()))]
    };

    let block = Block::default()
        .title(" My Profile - [r] reload [Esc] back ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", format!("{}:", label)), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}

fn profile_lines(profile: &UserRecord) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", profile.initials()), styles::avatar_style()),
            Span::raw(" "),
            Span::styled(
                profile.full_name().unwrap_or_else(|| profile.display_name()),
                styles::title_style(),
            ),
        ]),
        Line::from(""),
    ];

    if let Some(ref username) = profile.username {
        lines.push(field("Username", username.clone()));
    }
    if let Some(ref id) = profile.id {
        lines.push(field("Id", value_text(id)));
    }
    for (key, value) in &profile.extra {
        lines.push(field(key, value_text(value)));
    }
    lines
}

/// Render a JSON value without quotes around plain strings.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
