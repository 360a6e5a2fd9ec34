//! Pokémon list screen rendering
//!
//! Renders the overview: a numbered list of Pokémon in the order the API
//! returned them, with the highlighted row marked by a cursor.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::status_placeholder;
use crate::data::PokemonListing;
use crate::query::QuerySnapshot;

/// Renders the list screen
///
/// Shows a loading or error placeholder until the listing is available.
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `area` - Region of the frame for the list
/// * `snapshot` - State of the list query
/// * `selected` - Index of the highlighted row
pub fn render(frame: &mut Frame, area: Rect, snapshot: &QuerySnapshot, selected: usize) {
    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(listing) = snapshot.listing() else {
        if let Some(placeholder) = status_placeholder(snapshot) {
            frame.render_widget(placeholder.block(block), area);
        }
        return;
    };

    let lines = entry_lines(listing, selected);

    // Keep the highlighted row on screen
    let visible_rows = area.height.saturating_sub(2) as usize;
    let scroll = if visible_rows > 0 && selected >= visible_rows {
        (selected + 1 - visible_rows) as u16
    } else {
        0
    };

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// One line per listing entry, numbered from 1
pub fn entry_lines(listing: &PokemonListing, selected: usize) -> Vec<Line<'static>> {
    let number_width = listing.results.len().to_string().len();

    listing
        .results
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let is_selected = index == selected;
            let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space

            let name_style = if is_selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:>width$}. ", index + 1, width = number_width),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.name.clone(), name_style),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::stub::listing;
    use crate::query::{QueryError, QueryStatus};
    use crate::ui::{buffer_text, ERROR_TEXT, LOADING_TEXT};
    use ratatui::{backend::TestBackend, Terminal};

    fn success(names: &[&str]) -> QuerySnapshot {
        QuerySnapshot {
            status: QueryStatus::Success(listing(names).into()),
            ..Default::default()
        }
    }

    fn render_to_string(snapshot: &QuerySnapshot, selected: usize, height: u16) -> String {
        let backend = TestBackend::new(60, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), snapshot, selected))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_two_results_render_two_entries_in_order() {
        let data = listing(&["bulbasaur", "ivysaur"]);
        let lines = entry_lines(&data, 0);
        assert_eq!(lines.len(), 2);

        let content = render_to_string(&success(&["bulbasaur", "ivysaur"]), 0, 10);
        let first = content.find("1. bulbasaur").expect("first entry missing");
        let second = content.find("2. ivysaur").expect("second entry missing");
        assert!(first < second);
        assert!(!content.contains("3."));
    }

    #[test]
    fn test_selected_row_has_cursor() {
        let data = listing(&["bulbasaur", "ivysaur"]);
        let lines = entry_lines(&data, 1);

        assert_eq!(lines[0].spans[0].content, "  ");
        assert_eq!(lines[1].spans[0].content, "\u{25B8} ");
    }

    #[test]
    fn test_numbers_are_right_aligned_for_two_digit_lists() {
        let names: Vec<String> = (1..=10).map(|i| format!("mon{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let lines = entry_lines(&listing(&refs), 0);

        assert_eq!(lines[0].spans[1].content, " 1. ");
        assert_eq!(lines[9].spans[1].content, "10. ");
    }

    #[test]
    fn test_loading_shows_placeholder() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Loading,
            is_fetching: true,
            ..Default::default()
        };
        let content = render_to_string(&snapshot, 0, 10);
        assert!(content.contains(LOADING_TEXT));
    }

    #[test]
    fn test_error_shows_placeholder() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Error(QueryError::new("timeout")),
            ..Default::default()
        };
        let content = render_to_string(&snapshot, 0, 10);
        assert!(content.contains(ERROR_TEXT));
        assert!(!content.contains(LOADING_TEXT));
    }

    #[test]
    fn test_scrolls_to_keep_selection_visible() {
        let names: Vec<String> = (1..=20).map(|i| format!("mon{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        // 6 rows tall: 4 visible entries inside the border
        let content = render_to_string(&success(&refs), 19, 6);

        assert!(content.contains("mon20"));
        assert!(!content.contains("mon1 "));
    }
}
