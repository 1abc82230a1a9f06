//! Server confirmed mutations of list items.
//!
//! Nothing is changed locally before the server answers: a request is issued,
//! and only a successful response applies its transform to the collection. A
//! failed request leaves the collection untouched. At most one mutation per
//! item id is in flight; further calls for a busy id are ignored.

use std::collections::HashSet;

use spdlog::{debug, error};

use crate::api::error::ApiError;
use crate::api::types::{BlogSummary, LikeResponse};
use crate::api::BlogSource;
use crate::notify::Notifications;

/// Ids of the items with a request in flight.
#[derive(Debug, Default)]
pub struct InFlight {
    ids: HashSet<String>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` busy. Returns false when it already was.
    pub fn try_begin(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            debug!("Ignoring mutation of {}, one is already in flight", id);
            return false;
        }
        self.ids.insert(id.to_string());
        true
    }

    pub fn finish(&mut self, id: &str) {
        self.ids.remove(id);
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_idle(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Like state of the items of a listing, as last reported by the server.
#[derive(Debug, Default)]
pub struct LikeToggle {
    in_flight: InFlight,
    liked: HashSet<String>,
}

impl LikeToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.liked.contains(id)
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight.is_busy(id)
    }

    /// Marks the start of a like request for `id`.
    pub fn begin(&mut self, id: &str) -> bool {
        self.in_flight.try_begin(id)
    }

    /// Applies the server's answer to the item with `id`, if still listed.
    pub fn finish(
        &mut self,
        id: &str,
        result: Result<LikeResponse, ApiError>,
        blogs: &mut [BlogSummary],
        notifications: &mut Notifications,
    ) -> bool {
        self.in_flight.finish(id);
        match result {
            Ok(res) => {
                if let Some(blog) = blogs.iter_mut().find(|b| b.id == id) {
                    blog.like_count = res.like_count;
                }
                if res.is_liked {
                    self.liked.insert(id.to_string());
                } else {
                    self.liked.remove(id);
                }
                true
            }
            Err(e) => {
                error!("Like of {} failed: {}", id, e);
                notifications.error(e.user_message());
                false
            }
        }
    }

    pub async fn toggle<S: BlogSource>(
        &mut self,
        api: &S,
        id: &str,
        blogs: &mut [BlogSummary],
        notifications: &mut Notifications,
    ) -> bool {
        if !self.begin(id) {
            return false;
        }
        let result = api.like_blog(id).await;
        self.finish(id, result, blogs, notifications)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::blog;

    use super::*;

    #[test]
    fn test_in_flight_rejects_reentry() {
        let mut in_flight = InFlight::new();
        assert!(in_flight.try_begin("a"));
        assert!(!in_flight.try_begin("a"));
        assert!(in_flight.try_begin("b"));
        in_flight.finish("a");
        assert!(!in_flight.is_busy("a"));
        assert!(in_flight.try_begin("a"));
    }

    #[test]
    fn test_like_applies_server_counts() {
        let mut likes = LikeToggle::new();
        let mut blogs = vec![blog("a", &[]), blog("b", &[])];
        let mut notes = Notifications::new();

        assert!(likes.begin("a"));
        assert!(!likes.begin("a"));
        let res = Ok(LikeResponse { like_count: 7, is_liked: true });
        assert!(likes.finish("a", res, &mut blogs, &mut notes));
        assert_eq!(blogs[0].like_count, 7);
        assert_eq!(blogs[1].like_count, 0);
        assert!(likes.is_liked("a"));
        assert!(!likes.is_busy("a"));
    }

    #[test]
    fn test_failed_like_changes_nothing() {
        let mut likes = LikeToggle::new();
        let mut blogs = vec![blog("a", &[])];
        let before = blogs.clone();
        let mut notes = Notifications::new();

        assert!(likes.begin("a"));
        let res = Err(ApiError::Transport("offline".to_string()));
        assert!(!likes.finish("a", res, &mut blogs, &mut notes));
        assert_eq!(blogs, before);
        assert!(!likes.is_busy("a"));
        assert_eq!(notes.last().unwrap().message, "Request failed");
    }
}
