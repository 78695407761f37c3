//! Terminal session and event loop.
//!
//! Key handling is synchronous and returns an [`Action`]; the loop performs
//! the action against the API and the favorites store. Lookups run
//! concurrently with input and are routed back to the screen that asked
//! for them.
#![allow(clippy::future_not_send)]

use std::io;

use anyhow::{Context, Result};
use cinefav_api::omdb::{LocalOmdbApi, MovieDetail, SearchPage};
use cinefav_db::{FavoritesStore, LocalKvStore};
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::screens::{
    DetailViewModel, FavoritesViewModel, Notice, SearchRequest, SearchViewModel,
    detail_from_favorite,
};
use crate::ui;

/// Top-level tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Search screen.
    Search,
    /// Favorites screen.
    Favorites,
}

/// Input mode for the search tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation keys.
    Normal,
    /// Typing into the query box.
    Editing,
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do beyond redrawing.
    None,
    /// Leave the application.
    Quit,
    /// Issue a search lookup.
    Search(SearchRequest),
    /// Open the detail screen for a record.
    OpenDetail(MovieDetail),
    /// Close the detail screen.
    CloseDetail,
    /// Add or remove the record on the detail screen.
    ToggleFavorite,
    /// Re-read the favorites list.
    ReloadFavorites,
    /// Open a page in the system browser.
    OpenUrl(String),
}

/// Result of a lookup running in the background.
enum Message {
    /// Search lookup finished.
    Search {
        seq: u64,
        result: Result<SearchPage>,
    },
    /// Detail lookup finished.
    Detail {
        generation: u64,
        result: Result<MovieDetail>,
    },
}

/// Whole-application state.
#[derive(Debug)]
pub struct AppState {
    /// Active tab.
    pub tab: Tab,
    /// Input mode of the search tab.
    pub input_mode: InputMode,
    /// Search screen.
    pub search: SearchViewModel,
    /// Favorites screen.
    pub favorites: FavoritesViewModel,
    /// Detail screen, when open.
    pub detail: Option<DetailViewModel>,
    /// Acknowledgement popup, when shown.
    pub notice: Option<Notice>,
    /// Bumped every time a detail screen is opened.
    detail_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates the initial state: search tab, empty query.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tab: Tab::Search,
            input_mode: InputMode::Editing,
            search: SearchViewModel::new(),
            favorites: FavoritesViewModel::new(),
            detail: None,
            notice: None,
            detail_generation: 0,
        }
    }

    /// Opens the detail screen and returns its generation.
    pub fn open_detail(&mut self, movie: MovieDetail) -> u64 {
        self.detail_generation = self.detail_generation.saturating_add(1);
        self.detail = Some(DetailViewModel::new(movie));
        self.detail_generation
    }

    /// Applies a detail lookup if it belongs to the open detail screen.
    /// Returns `false` if the result was dropped.
    pub fn apply_detail(&mut self, generation: u64, result: Result<MovieDetail>) -> bool {
        match self.detail.as_mut() {
            Some(detail) if generation == self.detail_generation => {
                detail.apply_detail(result);
                true
            }
            _ => {
                tracing::debug!(
                    generation,
                    current = self.detail_generation,
                    "dropping detail response for a closed screen"
                );
                false
            }
        }
    }

    /// Routes a finished lookup to the screen that asked for it.
    ///
    /// Returns `false` if the result was stale and dropped.
    fn deliver(&mut self, message: Message) -> bool {
        match message {
            Message::Search { seq, result } => self.search.apply(seq, result),
            Message::Detail { generation, result } => self.apply_detail(generation, result),
        }
    }

    /// Maps a key press to an action.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        if self.notice.take().is_some() {
            return Action::None;
        }
        if let Some(detail) = &self.detail {
            return match code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => Action::CloseDetail,
                KeyCode::Char('f') => Action::ToggleFavorite,
                KeyCode::Char('o') => Action::OpenUrl(detail.movie().imdb_url()),
                KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            };
        }
        if self.tab == Tab::Search && self.input_mode == InputMode::Editing {
            return self.handle_editing_key(code);
        }
        self.handle_normal_key(code)
    }

    fn handle_editing_key(&mut self, code: KeyCode) -> Action {
        let request = match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Down => {
                self.input_mode = InputMode::Normal;
                self.search.move_down();
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.input_mode = InputMode::Normal;
                return self.switch_tab();
            }
            KeyCode::Backspace => self.search.pop_char(),
            KeyCode::Char(ch) => self.search.push_char(ch),
            _ => None,
        };
        request.map_or(Action::None, Action::Search)
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Tab | KeyCode::BackTab => self.switch_tab(),
            KeyCode::Char('1') => self.select_tab(Tab::Search),
            KeyCode::Char('2') => self.select_tab(Tab::Favorites),
            KeyCode::Char('/' | 'i') if self.tab == Tab::Search => {
                self.input_mode = InputMode::Editing;
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                match self.tab {
                    Tab::Search => self.search.move_up(),
                    Tab::Favorites => self.favorites.move_up(),
                }
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                match self.tab {
                    Tab::Search => self.search.move_down(),
                    Tab::Favorites => self.favorites.move_down(),
                }
                Action::None
            }
            KeyCode::Enter | KeyCode::Right => {
                let movie = match self.tab {
                    Tab::Search => self.search.selected().cloned().map(MovieDetail::from),
                    Tab::Favorites => self.favorites.selected().map(detail_from_favorite),
                };
                movie.map_or(Action::None, Action::OpenDetail)
            }
            _ => Action::None,
        }
    }

    fn switch_tab(&mut self) -> Action {
        let next = match self.tab {
            Tab::Search => Tab::Favorites,
            Tab::Favorites => Tab::Search,
        };
        self.select_tab(next)
    }

    fn select_tab(&mut self, tab: Tab) -> Action {
        self.tab = tab;
        match tab {
            Tab::Search => Action::None,
            Tab::Favorites => Action::ReloadFavorites,
        }
    }
}

/// Runs the interactive UI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_app<A, S>(api: &A, favorites: &FavoritesStore<S>) -> Result<()>
where
    A: LocalOmdbApi,
    S: LocalKvStore,
{
    let mut state = AppState::new();
    state.favorites.reload(favorites).await;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut state, api, favorites).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<A, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    api: &A,
    favorites: &FavoritesStore<S>,
) -> Result<()>
where
    A: LocalOmdbApi,
    S: LocalKvStore,
{
    let mut events = EventStream::new();
    let mut dispatcher = Dispatcher::new(api, favorites);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("failed to draw TUI")?;

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else {
                    return Ok(());
                };
                if let Event::Key(key) = event.context("failed to read event")?
                    && key.kind == KeyEventKind::Press
                {
                    let action = state.handle_key(key.code, key.modifiers);
                    if action == Action::Quit {
                        return Ok(());
                    }
                    dispatcher.perform(action, state).await;
                }
            }
            Some(message) = dispatcher.next_message(), if dispatcher.has_pending() => {
                state.deliver(message);
            }
        }
    }
}

/// Carries out key actions against the API and the favorites store.
///
/// Lookups are queued as futures and polled by the event loop alongside
/// terminal input.
struct Dispatcher<'a, A, S> {
    /// OMDb API.
    api: &'a A,
    /// Favorites store.
    favorites: &'a FavoritesStore<S>,
    /// Lookups still running.
    in_flight: FuturesUnordered<LocalBoxFuture<'a, Message>>,
}

impl<'a, A, S> Dispatcher<'a, A, S>
where
    A: LocalOmdbApi,
    S: LocalKvStore,
{
    fn new(api: &'a A, favorites: &'a FavoritesStore<S>) -> Self {
        Self {
            api,
            favorites,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// Returns whether any lookup is still running.
    fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Waits for the next lookup to finish.
    async fn next_message(&mut self) -> Option<Message> {
        self.in_flight.next().await
    }

    /// Carries out `action`. Store operations complete before returning;
    /// lookups are queued.
    async fn perform(&mut self, action: Action, state: &mut AppState) {
        let api = self.api;
        match action {
            Action::None | Action::Quit => {}
            Action::Search(request) => {
                self.in_flight.push(
                    async move {
                        let result = request.fetch(api).await;
                        Message::Search {
                            seq: request.seq,
                            result,
                        }
                    }
                    .boxed_local(),
                );
            }
            Action::OpenDetail(movie) => {
                let generation = state.open_detail(movie);
                if let Some(detail) = state.detail.as_mut() {
                    detail.sync_favorite(self.favorites).await;
                    let params = detail.detail_params();
                    self.in_flight.push(
                        async move {
                            let result = api.details(&params).await;
                            Message::Detail { generation, result }
                        }
                        .boxed_local(),
                    );
                }
            }
            Action::CloseDetail => {
                state.detail = None;
                if state.tab == Tab::Favorites {
                    state.favorites.reload(self.favorites).await;
                }
            }
            Action::ToggleFavorite => {
                if let Some(detail) = state.detail.as_mut() {
                    state.notice = detail.toggle_favorite(self.favorites).await;
                }
            }
            Action::ReloadFavorites => state.favorites.reload(self.favorites).await,
            Action::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    tracing::warn!("failed to open {url}: {e}");
                }
            }
        }
    }
}
