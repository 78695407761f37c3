//! View models for the search, detail, and favorites screens.

mod detail;
mod favorites;
mod search;

#[allow(clippy::module_name_repetitions)]
pub use detail::{DetailViewModel, Notice, favorite_from_detail};
#[allow(clippy::module_name_repetitions)]
pub use favorites::{FavoritesViewModel, detail_from_favorite};
#[allow(clippy::module_name_repetitions)]
pub use search::{SearchRequest, SearchViewModel};
