use std::collections::BTreeSet;
use std::time::Duration;

use spdlog::{debug, error, info};
use tokio::sync::mpsc;

use crate::api::error::ApiError;
use crate::api::types::{BlogListResponse, BlogQuery, BlogSummary};
use crate::api::BlogSource;
use crate::listing::debounce::Debouncer;
use crate::listing::paginator::PageCursor;
use crate::listing::query_state::{normalize_category, QueryState, QueryString, SortOrder};
use crate::mutation::LikeToggle;
use crate::notify::Notifications;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Page 1 after a filter, sort or search change. Replaces the collection.
    Reset,
    /// The next page. Appends to the collection.
    More,
}

/// One issued listing request. Only the ticket of the latest request is
/// accepted back by [`ListingController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub kind: FetchKind,
    pub query: BlogQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Idle,
    Fetching(FetchKind),
    /// Last request failed with this user message.
    Error(String),
}

pub struct ListingController {
    query: QueryState,
    url: QueryString,
    search_input: String,
    search: Debouncer<String>,
    blogs: Vec<BlogSummary>,
    cursor: PageCursor,
    facets: BTreeSet<String>,
    generation: u64,
    in_flight: Option<FetchKind>,
    status: ListingStatus,
    likes: LikeToggle,
    pub notifications: Notifications,
}

impl ListingController {
    /// Builds the controller from the current URL query. Committed search
    /// values come out of the returned receiver once typing pauses.
    pub fn new(url_query: &str, page_size: u32, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let mut url = QueryString::from(url_query);
        let mut query = QueryState::decode(&url, page_size);
        // Pages are loaded by appending, a shared link always starts at the top
        query.page = 1;
        query.encode_into(&mut url);
        let (search, committed) = Debouncer::new(debounce);

        let controller = ListingController {
            search_input: query.search.clone(),
            query,
            url,
            search,
            blogs: vec![],
            cursor: PageCursor::default(),
            facets: BTreeSet::new(),
            generation: 0,
            in_flight: None,
            status: ListingStatus::Idle,
            likes: LikeToggle::new(),
            notifications: Notifications::new(),
        };
        (controller, committed)
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// The URL query string reflecting the committed filters.
    pub fn url_query(&self) -> String {
        self.url.to_string()
    }

    pub fn blogs(&self) -> &[BlogSummary] {
        &self.blogs
    }

    pub fn status(&self) -> &ListingStatus {
        &self.status
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Tags seen across every loaded page, sorted.
    pub fn facets(&self) -> impl Iterator<Item = &str> {
        self.facets.iter().map(String::as_str)
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn remaining(&self) -> u64 {
        self.cursor.remaining()
    }

    pub fn total(&self) -> u64 {
        self.cursor.total()
    }

    pub fn active_filter_count(&self) -> usize {
        self.query.active_filter_count()
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// A failed first page leaves nothing to show but a retry button.
    pub fn needs_retry(&self) -> bool {
        matches!(self.status, ListingStatus::Error(_)) && self.blogs.is_empty()
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.likes.is_liked(id)
    }

    /// A typed search value is waiting for the debounce delay.
    pub fn is_debouncing(&self) -> bool {
        self.search.is_pending()
    }

    /// Records a keystroke in the search box. Nothing is fetched until the
    /// value is committed.
    pub fn type_search(&mut self, text: &str) {
        self.search_input = text.to_string();
        self.search.push(text.to_string());
    }

    fn filters_changed(&mut self) -> FetchTicket {
        self.query.page = 1;
        self.query.encode_into(&mut self.url);
        debug!("Listing filters changed, URL query is now '{}'", self.url);
        self.begin_reset()
    }

    /// Applies a value delivered by the search debouncer. A value that no
    /// longer matches the search box was overtaken by a clear or a newer
    /// keystroke and is dropped.
    pub fn commit_debounced(&mut self, value: &str) -> Option<FetchTicket> {
        if value != self.search_input {
            debug!("Dropping debounced search '{}', the search box holds '{}'", value, self.search_input);
            return None;
        }
        self.commit_search(value)
    }

    /// Applies a search value right away, bypassing the debouncer.
    pub fn commit_search(&mut self, search: &str) -> Option<FetchTicket> {
        self.search_input = search.to_string();
        if self.query.search == search {
            return None;
        }
        self.query.search = search.to_string();
        Some(self.filters_changed())
    }

    pub fn set_category(&mut self, category: Option<&str>) -> Option<FetchTicket> {
        let category = normalize_category(category);
        if self.query.category == category {
            return None;
        }
        self.query.category = category;
        Some(self.filters_changed())
    }

    pub fn toggle_tag(&mut self, tag: &str) -> Option<FetchTicket> {
        let before = self.query.tags.len();
        self.query.toggle_tag(tag);
        if self.query.tags.len() == before {
            return None;
        }
        Some(self.filters_changed())
    }

    pub fn set_sort(&mut self, sort: SortOrder) -> Option<FetchTicket> {
        if self.query.sort == sort {
            return None;
        }
        self.query.sort = sort;
        Some(self.filters_changed())
    }

    /// Back to the default query; every filter key leaves the URL.
    pub fn clear_filters(&mut self) -> FetchTicket {
        self.search.cancel();
        self.search_input.clear();
        self.query = QueryState::with_page_size(self.query.page_size);
        self.filters_changed()
    }

    /// Issues a page 1 request. Any earlier request becomes stale.
    pub fn begin_reset(&mut self) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(FetchKind::Reset);
        self.status = ListingStatus::Fetching(FetchKind::Reset);

        let mut query = self.query.clone();
        query.page = 1;
        FetchTicket {
            generation: self.generation,
            kind: FetchKind::Reset,
            query: query.to_blog_query(),
        }
    }

    /// Issues a request for the next page, unless any request is already in
    /// flight or there is nothing more to load.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            debug!("Load more ignored, a listing request is in flight");
            return None;
        }
        let next = self.cursor.next_page()?;

        self.generation += 1;
        self.in_flight = Some(FetchKind::More);
        self.status = ListingStatus::Fetching(FetchKind::More);

        let mut query = self.query.clone();
        query.page = next;
        Some(FetchTicket {
            generation: self.generation,
            kind: FetchKind::More,
            query: query.to_blog_query(),
        })
    }

    /// Applies the outcome of `ticket`. Returns false for stale responses,
    /// which are dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<BlogListResponse, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Dropping stale listing response (generation {}, latest {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(response) => {
                for blog in &response.blogs {
                    self.facets.extend(blog.tags.iter().cloned());
                }
                let (pages, total) = (response.pages, response.total);
                let cursor = PageCursor::from(&response, ticket.query.page, 0);
                match ticket.kind {
                    FetchKind::Reset => self.blogs = response.blogs,
                    FetchKind::More => self.blogs.extend(response.blogs),
                }
                self.cursor = cursor.with_loaded(self.blogs.len());
                self.status = ListingStatus::Idle;
                info!("Loaded page {} of {} ({} of {} blogs)", ticket.query.page, pages, self.blogs.len(), total);
            }
            Err(e) => {
                error!("Loading page {} failed: {}", ticket.query.page, e);
                if ticket.kind == FetchKind::Reset {
                    self.blogs.clear();
                    self.cursor = PageCursor::default();
                }
                let message = e.user_message();
                self.notifications.error(message.clone());
                self.status = ListingStatus::Error(message);
            }
        }
        true
    }

    /// Fetches `ticket` and applies the result.
    pub async fn run<S: BlogSource>(&mut self, api: &S, ticket: FetchTicket) -> bool {
        let result = api.list_blogs(&ticket.query).await;
        self.complete(ticket, result)
    }

    pub async fn refresh<S: BlogSource>(&mut self, api: &S) -> bool {
        let ticket = self.begin_reset();
        self.run(api, ticket).await
    }

    pub async fn load_more<S: BlogSource>(&mut self, api: &S) -> bool {
        match self.begin_load_more() {
            Some(ticket) => self.run(api, ticket).await,
            None => false,
        }
    }

    pub async fn like<S: BlogSource>(&mut self, api: &S, id: &str) -> bool {
        self.likes.toggle(api, id, &mut self.blogs, &mut self.notifications).await
    }
}
