//! Listing and ranking engine: query state mirrored in the URL, debounced
//! search, appendable pagination and the trending score.

pub mod controller;
pub mod debounce;
pub mod paginator;
pub mod query_state;
pub mod trending;

pub use controller::{FetchKind, FetchTicket, ListingController, ListingStatus};
pub use query_state::{QueryState, QueryString, SortOrder};
pub use trending::{trending_score, TrendingRange, TrendingView};
