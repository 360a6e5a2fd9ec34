//! Pokémon detail screen rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::status_placeholder;
use crate::data::{conjunction_list, PokemonDetailData};
use crate::query::QuerySnapshot;

/// Renders the detail screen for `name`
///
/// The block is titled with the requested name so it is visible while
/// loading; once loaded the API's canonical name is used as the heading.
pub fn render(frame: &mut Frame, area: Rect, name: &str, snapshot: &QuerySnapshot) {
    let block = Block::default()
        .title(format!(" {} ", name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(detail) = snapshot.detail() else {
        if let Some(placeholder) = status_placeholder(snapshot) {
            frame.render_widget(placeholder.block(block), area);
        }
        return;
    };

    let paragraph = Paragraph::new(detail_lines(detail))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Human-readable list of the Pokémon's types, e.g. "grass and poison"
pub fn types_text(detail: &PokemonDetailData) -> String {
    conjunction_list(&detail.type_names())
}

fn detail_lines(detail: &PokemonDetailData) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);

    let image = match &detail.sprites.front_default {
        Some(url) => Span::styled(
            url.clone(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ),
        None => Span::styled("no sprite", Style::default().fg(Color::DarkGray)),
    };

    vec![
        Line::from(Span::styled(
            detail.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("image: ", label), image]),
        Line::from(vec![
            Span::styled("id: ", label),
            Span::raw(detail.id.to_string()),
        ]),
        Line::from(vec![
            Span::styled("height: ", label),
            Span::raw(detail.height.to_string()),
        ]),
        Line::from(vec![
            Span::styled("weight: ", label),
            Span::raw(detail.weight.to_string()),
        ]),
        Line::from(vec![
            Span::styled("types: ", label),
            Span::styled(types_text(detail), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled("[Esc] back", Style::default().fg(Color::Cyan))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sprites;
    use crate::query::stub::detail;
    use crate::query::{QueryError, QueryStatus};
    use crate::ui::{buffer_text, ERROR_TEXT, LOADING_TEXT};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(name: &str, snapshot: &QuerySnapshot) -> String {
        let backend = TestBackend::new(100, 14);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), name, snapshot))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn success(data: PokemonDetailData) -> QuerySnapshot {
        QuerySnapshot {
            status: QueryStatus::Success(data.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_types_text_joins_grass_and_poison() {
        let data = detail(1, "bulbasaur", &["grass", "poison"]);
        assert_eq!(types_text(&data), "grass and poison");
    }

    #[test]
    fn test_renders_all_fields() {
        let data = detail(1, "bulbasaur", &["grass", "poison"]);
        let content = render_to_string("bulbasaur", &success(data));

        assert!(content.contains("bulbasaur"));
        assert!(content.contains("id: 1"));
        assert!(content.contains("height: 7"));
        assert!(content.contains("weight: 69"));
        assert!(content.contains("types: grass and poison"));
        assert!(content.contains("sprites/pokemon/1.png"));
        assert!(content.contains("[Esc] back"));
    }

    #[test]
    fn test_single_type_has_no_conjunction() {
        let data = detail(4, "charmander", &["fire"]);
        let content = render_to_string("charmander", &success(data));
        assert!(content.contains("types: fire"));
        assert!(!content.contains(" and "));
    }

    #[test]
    fn test_missing_sprite_is_labelled() {
        let mut data = detail(10001, "deoxys-attack", &["psychic"]);
        data.sprites = Sprites::default();

        let content = render_to_string("deoxys-attack", &success(data));

        assert!(content.contains("image: no sprite"));
    }

    #[test]
    fn test_loading_keeps_requested_name_in_title() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Loading,
            is_fetching: true,
            ..Default::default()
        };
        let content = render_to_string("pikachu", &snapshot);

        assert!(content.contains("pikachu"));
        assert!(content.contains(LOADING_TEXT));
    }

    #[test]
    fn test_error_shows_placeholder() {
        let snapshot = QuerySnapshot {
            status: QueryStatus::Error(QueryError::new("404")),
            ..Default::default()
        };
        let content = render_to_string("missingno", &snapshot);

        assert!(content.contains(ERROR_TEXT));
        assert!(!content.contains("id:"));
    }
}
