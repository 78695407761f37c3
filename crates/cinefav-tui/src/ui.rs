//! TUI rendering logic.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap};

use crate::app::{AppState, InputMode, Tab};
use crate::screens::{DetailViewModel, Notice};

/// Draws the whole UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(5),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_tabs(frame, chunks[0], state);

    if let Some(detail) = &state.detail {
        draw_detail(frame, chunks[1], detail);
    } else {
        match state.tab {
            Tab::Search => draw_search(frame, chunks[1], state),
            Tab::Favorites => draw_favorites(frame, chunks[1], state),
        }
    }

    draw_footer(frame, chunks[2], state);

    if let Some(notice) = &state.notice {
        draw_notice(frame, notice);
    }
}

fn draw_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let selected = match state.tab {
        Tab::Search => 0,
        Tab::Favorites => 1,
    };
    let tabs = Tabs::new(vec![" Search ", " Favorites "])
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title(" cinefav "));
    frame.render_widget(tabs, area);
}

/// Draws the query box and the result list.
#[allow(clippy::indexing_slicing)]
fn draw_search(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input_style = if state.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(state.search.query())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(input, chunks[0]);

    let search = &mut state.search;
    let placeholder = if search.is_loading() && search.results().is_empty() {
        Some("Searching...")
    } else if search.shows_no_results() {
        Some("No results found.")
    } else if search.query().is_empty() {
        Some("Type a title to search OMDb.")
    } else {
        None
    };

    let title = if search.results().is_empty() {
        String::from(" Results ")
    } else {
        format!(
            " Results ({} of {}) ",
            search.results().len(),
            search.total_results()
        )
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = search
        .results()
        .iter()
        .map(|movie| {
            ListItem::new(Line::from(vec![
                Span::raw(movie.title.clone()),
                Span::styled(
                    format!(" ({})", movie.year),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("  [{}]", movie.media_type),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, chunks[1], &mut search.list_state);
}

fn draw_favorites(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let favorites = &mut state.favorites;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Favorites ({}) ", favorites.entries().len()));

    if favorites.entries().is_empty() {
        let paragraph = Paragraph::new("No favorites yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = favorites
        .entries()
        .iter()
        .map(|movie| {
            ListItem::new(Line::from(vec![
                Span::raw(movie.title.clone()),
                Span::styled(
                    format!(" ({})", movie.year),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, area, &mut favorites.list_state);
}

fn draw_detail(frame: &mut Frame, area: Rect, detail: &DetailViewModel) {
    let movie = detail.movie();
    let label = Style::default().fg(Color::Yellow);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} ({})", movie.title, movie.year),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(if detail.is_favorite() {
            Span::styled("\u{2605} In favorites", Style::default().fg(Color::Green))
        } else {
            Span::styled("\u{2606} Not in favorites", Style::default().fg(Color::DarkGray))
        }),
        Line::default(),
    ];

    let fields = [
        ("Type", Some(movie.media_type.as_str())),
        ("Rated", movie.rated.as_deref()),
        ("Released", movie.released.as_deref()),
        ("Runtime", movie.runtime.as_deref()),
        ("Genre", movie.genre.as_deref()),
        ("Director", movie.director.as_deref()),
        ("Writer", movie.writer.as_deref()),
        ("Actors", movie.actors.as_deref()),
        ("Language", movie.language.as_deref()),
        ("Country", movie.country.as_deref()),
        ("Awards", movie.awards.as_deref()),
        ("IMDb rating", movie.imdb_rating.as_deref()),
        ("IMDb votes", movie.imdb_votes.as_deref()),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            lines.push(Line::from(vec![
                Span::styled(format!("{name:<12}"), label),
                Span::raw(String::from(value)),
            ]));
        }
    }

    lines.push(Line::default());
    match (&movie.plot, detail.is_loaded()) {
        (Some(plot), _) => lines.push(Line::from(plot.clone())),
        (None, false) => lines.push(Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(Color::DarkGray),
        ))),
        (None, true) => {}
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", movie.imdb_id))
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(paragraph, area);
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let help_text = if state.notice.is_some() {
        "any key: dismiss"
    } else if let Some(detail) = &state.detail {
        if detail.is_favorite() {
            "f: Remove from Favorites  o: open IMDb  Esc: back  q: quit"
        } else {
            "f: Add to Favorites  o: open IMDb  Esc: back  q: quit"
        }
    } else {
        match (state.tab, state.input_mode) {
            (Tab::Search, InputMode::Editing) => {
                "Type to search | Enter/Esc: done | \u{2193}: results"
            }
            (Tab::Search, InputMode::Normal) => {
                "Tab: favorites  \u{2191}\u{2193}/j/k: move  Enter: details  /: search  q: quit"
            }
            (Tab::Favorites, _) => {
                "Tab: search  \u{2191}\u{2193}/j/k: move  Enter: details  q: quit"
            }
        }
    };

    let footer = Paragraph::new(Line::from(help_text)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Draws the acknowledgement popup over the current screen.
fn draw_notice(frame: &mut Frame, notice: &Notice) {
    let [area] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(area);

    let popup = Paragraph::new(notice.body.as_str())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", notice.title))
                .border_style(Style::default().fg(Color::Green)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
