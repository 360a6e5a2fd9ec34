//! UI rendering module for the Pokédex
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. The list and detail screens
//! are functions of a query snapshot plus a little local view state.

pub mod help_overlay;
pub mod pokemon_detail;
pub mod pokemon_list;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::query::QuerySnapshot;

pub const LOADING_TEXT: &str = "loading, please wait";
pub const ERROR_TEXT: &str = "something went wrong";

/// Renders the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let snapshot = app.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(3),    // Screen body
            Constraint::Length(1), // Key hints and freshness
        ])
        .split(area);

    render_title(frame, chunks[0]);

    match &app.state {
        AppState::ListView => {
            pokemon_list::render(frame, chunks[1], &snapshot, app.selected_index);
        }
        AppState::DetailView(name) => {
            pokemon_detail::render(frame, chunks[1], name, &snapshot);
        }
    }

    render_status_bar(frame, chunks[2], &app.state, &snapshot);

    if app.show_help {
        help_overlay::render(frame);
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "My Pokedex",
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, area);
}

/// Placeholder shown instead of a screen body while loading or after an error
///
/// Returns `None` once data is available.
pub fn status_placeholder(snapshot: &QuerySnapshot) -> Option<Paragraph<'static>> {
    let (text, color) = if snapshot.is_loading() || snapshot.is_uninitialized() {
        (LOADING_TEXT, Color::Cyan)
    } else if snapshot.is_error() {
        (ERROR_TEXT, Color::Red)
    } else {
        return None;
    };

    Some(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
    )
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &QuerySnapshot) {
    let hints = match state {
        AppState::ListView => "↑/↓ move  Enter open  r refresh  ? help  q quit",
        AppState::DetailView(_) => "Esc back  r refresh  ? help  q quit",
    };

    let freshness = if snapshot.is_fetching && snapshot.is_success() {
        "refreshing...".to_string()
    } else {
        snapshot
            .updated_at
            .map(|at| format!("updated {}", at.format("%H:%M:%S")))
            .unwrap_or_default()
    };

    let line = Line::from(vec![
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(freshness, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Flattens a rendered buffer into a string for assertions
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    buffer.content().iter().map(|cell| cell.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use crate::query::stub::{listing, StaticFetcher};
    use crate::query::{QueryError, QueryKey, QueryStatus};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_placeholder_for_loading_and_uninitialized() {
        for status in [QueryStatus::Loading, QueryStatus::Uninitialized] {
            let snapshot = QuerySnapshot {
                status,
                ..Default::default()
            };
            assert!(status_placeholder(&snapshot).is_some());
        }
    }

    #[test]
    fn test_no_placeholder_on_success() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Success(listing(&["mew"]).into()),
            ..Default::default()
        };
        assert!(status_placeholder(&snapshot).is_none());
    }

    #[test]
    fn test_error_placeholder_renders_generic_message() {
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let snapshot = QuerySnapshot {
            status: QueryStatus::Error(QueryError::new("https://pokeapi.co returned 503")),
            ..Default::default()
        };

        terminal
            .draw(|frame| {
                let placeholder = status_placeholder(&snapshot).unwrap();
                frame.render_widget(placeholder, frame.area());
            })
            .unwrap();

        let content = buffer_text(terminal.backend().buffer());
        assert!(content.contains(ERROR_TEXT));
        assert!(!content.contains("503"), "error cause should not be shown");
    }

    #[tokio::test]
    async fn test_render_shows_title_and_list_hints() {
        let fetcher = StaticFetcher::default().with(
            QueryKey::pokemon_list(9),
            listing(&["bulbasaur", "ivysaur"]),
        );
        let mut app = crate::app::App::with_fetcher(fetcher, &StartupConfig::default());
        app.next_update().await;

        let backend = TestBackend::new(80, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_text(terminal.backend().buffer());
        assert!(content.contains("My Pokedex"));
        assert!(content.contains("bulbasaur"));
        assert!(content.contains("Enter open"));
        assert!(content.contains("updated"));
    }

    #[tokio::test]
    async fn test_render_help_overlay_when_requested() {
        let mut app =
            crate::app::App::with_fetcher(StaticFetcher::default(), &StartupConfig::default());
        app.show_help = true;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_text(terminal.backend().buffer());
        assert!(content.contains("Keyboard Shortcuts"));
    }
}
