use chrono::{DateTime, Utc};
use spdlog::{error, info, warn};

use crate::api::error::{ApiError, ValidationError};
use crate::api::types::{AdminStats, BlogStatus, BlogSummary};
use crate::api::ModerationApi;
use crate::mutation::InFlight;
use crate::notify::Notifications;

/// Phrase the admin has to type before a post is deleted.
pub const DELETE_CONFIRMATION: &str = "DELETE";

const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Blog,
    User,
}

/// One line of the dashboard activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub action: String,
    pub at: DateTime<Utc>,
    pub kind: ActivityKind,
}

/// Admin dashboard state: aggregate counters, the review queue and the full
/// post table.
pub struct ModerationBoard {
    stats: AdminStats,
    stats_failed: bool,
    pending: Vec<BlogSummary>,
    all: Vec<BlogSummary>,
    status_filter: Option<BlogStatus>,
    page_size: u32,
    in_flight: InFlight,
    pub notifications: Notifications,
}

impl ModerationBoard {
    pub fn new(page_size: u32) -> Self {
        ModerationBoard {
            stats: AdminStats::default(),
            stats_failed: false,
            pending: vec![],
            all: vec![],
            status_filter: None,
            page_size: page_size.max(1),
            in_flight: InFlight::new(),
            notifications: Notifications::new(),
        }
    }

    pub fn stats(&self) -> &AdminStats {
        &self.stats
    }

    pub fn pending(&self) -> &[BlogSummary] {
        &self.pending
    }

    /// Submissions followed by sign-ups, as the server ordered them, capped
    /// at ten entries.
    pub fn recent_activity(&self) -> Vec<ActivityItem> {
        let activity = &self.stats.recent_activity;
        let blogs = activity.blogs.iter().map(|blog| ActivityItem {
            id: format!("blog-{}", blog.id),
            name: blog.author.display_name(),
            avatar: blog.author.avatar.clone(),
            action: format!("submitted \"{}\" for review", blog.title),
            at: blog.created_at,
            kind: ActivityKind::Blog,
        });
        let users = activity.users.iter().map(|user| ActivityItem {
            id: format!("user-{}", user.id),
            name: user.display_name(),
            avatar: None,
            action: "joined the platform".to_string(),
            at: user.created_at,
            kind: ActivityKind::User,
        });

        blogs.chain(users).take(RECENT_ACTIVITY_LIMIT).collect()
    }

    pub fn all(&self) -> &[BlogSummary] {
        &self.all
    }

    pub fn status_filter(&self) -> Option<BlogStatus> {
        self.status_filter
    }

    /// The dashboard could not be loaded, offer a retry.
    pub fn needs_retry(&self) -> bool {
        self.stats_failed
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight.is_busy(id)
    }

    /// Loads the counters and the review queue together. Each result is
    /// applied on its own, whichever arrives first.
    pub async fn load_dashboard<A: ModerationApi>(&mut self, api: &A) {
        let (stats, pending) = tokio::join!(api.dashboard(), api.pending_blogs(1, self.page_size));

        match stats {
            Ok(stats) => {
                self.stats = stats;
                self.stats_failed = false;
            }
            Err(e) => {
                error!("Loading dashboard stats failed: {}", e);
                self.stats = AdminStats::default();
                self.stats_failed = true;
                self.notifications.error(e.user_message());
            }
        }

        match pending {
            Ok(res) => {
                info!("{} blogs waiting for review", res.blogs.len());
                self.pending = res.blogs;
            }
            Err(e) => {
                error!("Loading pending blogs failed: {}", e);
                self.pending.clear();
                self.stats_failed = true;
                self.notifications.error(e.user_message());
            }
        }
    }

    /// Loads the post table, optionally restricted to one status.
    pub async fn load_all<A: ModerationApi>(&mut self, api: &A, status: Option<BlogStatus>) -> bool {
        self.status_filter = status;
        match api.admin_blogs(1, self.page_size, status).await {
            Ok(res) => {
                self.all = res.blogs;
                true
            }
            Err(e) => {
                error!("Loading blogs failed: {}", e);
                self.all.clear();
                self.notifications.error(e.user_message());
                false
            }
        }
    }

    fn replace_in_all(&mut self, blog: BlogSummary) {
        if let Some(existing) = self.all.iter_mut().find(|b| b.id == blog.id) {
            *existing = blog;
        }
    }

    /// Runs `request` for `id` unless one is already in flight. The in-flight
    /// mark is cleared on every outcome.
    async fn mutate<T>(
        &mut self,
        id: &str,
        action: &str,
        request: impl std::future::Future<Output = Result<T, ApiError>>,
    ) -> Option<T> {
        if !self.in_flight.try_begin(id) {
            return None;
        }
        let result = request.await;
        self.in_flight.finish(id);

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Failed to {} blog {}: {}", action, id, e);
                self.notifications.error(e.user_message());
                None
            }
        }
    }

    pub async fn approve<A: ModerationApi>(&mut self, api: &A, id: &str) -> bool {
        let Some(blog) = self.mutate(id, "approve", api.approve_blog(id)).await else {
            return false;
        };

        self.pending.retain(|b| b.id != id);
        self.stats.blogs.pending = self.stats.blogs.pending.saturating_sub(1);
        self.stats.blogs.published += 1;
        self.replace_in_all(blog);
        self.notifications.success("Blog approved successfully!");
        true
    }

    pub async fn reject<A: ModerationApi>(&mut self, api: &A, id: &str, reason: &str) -> bool {
        let reason = reason.trim();
        if reason.is_empty() {
            self.notifications.error(ValidationError::EmptyRejectionReason.to_string());
            return false;
        }
        let Some(blog) = self.mutate(id, "reject", api.reject_blog(id, reason)).await else {
            return false;
        };

        self.pending.retain(|b| b.id != id);
        self.stats.blogs.pending = self.stats.blogs.pending.saturating_sub(1);
        self.stats.blogs.rejected += 1;
        self.replace_in_all(blog);
        self.notifications.success("Blog rejected successfully!");
        true
    }

    pub async fn toggle_hide<A: ModerationApi>(&mut self, api: &A, id: &str) -> bool {
        if self.mutate(id, "toggle visibility of", api.toggle_hide_blog(id)).await.is_none() {
            return false;
        }

        for blog in self.all.iter_mut().chain(self.pending.iter_mut()).filter(|b| b.id == id) {
            blog.is_hidden = !blog.is_hidden;
        }
        self.notifications.success("Blog visibility toggled successfully!");
        true
    }

    pub async fn delete<A: ModerationApi>(&mut self, api: &A, id: &str, confirmation: &str) -> bool {
        if confirmation != DELETE_CONFIRMATION {
            warn!("Delete of {} not confirmed", id);
            self.notifications.error(
                ValidationError::ConfirmationMismatch {
                    expected: DELETE_CONFIRMATION,
                }
                .to_string(),
            );
            return false;
        }
        if self.mutate(id, "delete", api.delete_blog(id)).await.is_none() {
            return false;
        }

        self.all.retain(|b| b.id != id);
        self.pending.retain(|b| b.id != id);
        self.notifications.success("Blog deleted successfully!");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::api::types::{Author, BlogCounters, BlogListResponse, RecentActivity, RecentBlog, RecentUser, Total};
    use crate::notify::NoticeLevel;
    use crate::test_data::{blog, page, pending_blog};

    use super::*;

    #[derive(Default)]
    struct FakeModeration {
        fail: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeModeration {
        fn failing() -> Self {
            FakeModeration {
                fail: true,
                ..Default::default()
            }
        }

        fn answer<T>(&self, call: String, value: T) -> Result<T, ApiError> {
            self.calls.borrow_mut().push(call);
            if self.fail {
                Err(ApiError::Server {
                    status: 500,
                    message: "Moderation unavailable".to_string(),
                    field_errors: vec![],
                })
            } else {
                Ok(value)
            }
        }
    }

    fn stats() -> AdminStats {
        AdminStats {
            blogs: BlogCounters {
                total: 10,
                published: 6,
                pending: 3,
                rejected: 1,
            },
            users: Total { total: 4 },
            comments: Total { total: 12 },
            ..Default::default()
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        format!("2024-05-{:02}T08:00:00Z", day).parse().unwrap()
    }

    fn recent_user(n: u32) -> RecentUser {
        RecentUser {
            id: format!("u{}", n),
            username: format!("user{}", n),
            first_name: "".to_string(),
            last_name: "".to_string(),
            created_at: at(n),
        }
    }

    #[test]
    fn test_recent_activity_merges_and_caps() {
        let mut board = ModerationBoard::new(50);
        assert!(board.recent_activity().is_empty());

        board.stats.recent_activity = RecentActivity {
            blogs: vec![RecentBlog {
                id: "p1".to_string(),
                title: "Async Rust".to_string(),
                status: "pending".to_string(),
                created_at: at(20),
                author: Author {
                    id: "".to_string(),
                    username: "ana".to_string(),
                    first_name: "Ana".to_string(),
                    last_name: "Lima".to_string(),
                    avatar: Some("/a.png".to_string()),
                },
            }],
            users: (1..=12).map(recent_user).collect(),
        };

        let feed = board.recent_activity();
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].id, "blog-p1");
        assert_eq!(feed[0].name, "Ana Lima");
        assert_eq!(feed[0].avatar.as_deref(), Some("/a.png"));
        assert_eq!(feed[0].action, "submitted \"Async Rust\" for review");
        assert_eq!(feed[0].kind, ActivityKind::Blog);
        assert_eq!(feed[1].id, "user-u1");
        assert_eq!(feed[1].name, "user1");
        assert_eq!(feed[1].action, "joined the platform");
        assert_eq!(feed[1].at, at(1));
        assert_eq!(feed[9].id, "user-u9");
    }

    impl ModerationApi for FakeModeration {
        async fn dashboard(&self) -> Result<AdminStats, ApiError> {
            self.answer("dashboard".to_string(), stats())
        }

        async fn pending_blogs(&self, page_no: u32, limit: u32) -> Result<BlogListResponse, ApiError> {
            let blogs = vec![pending_blog("p1"), pending_blog("p2"), pending_blog("p3")];
            self.answer(format!("pending {} {}", page_no, limit), page(blogs, 1, 1, 3))
        }

        async fn admin_blogs(&self, _page: u32, _limit: u32, status: Option<BlogStatus>) -> Result<BlogListResponse, ApiError> {
            let blogs = vec![blog("a1", &[]), pending_blog("p1")];
            let status = status.map(|s| s.as_str()).unwrap_or("all");
            self.answer(format!("all {}", status), page(blogs, 1, 1, 2))
        }

        async fn approve_blog(&self, id: &str) -> Result<BlogSummary, ApiError> {
            self.answer(format!("approve {}", id), blog(id, &[]))
        }

        async fn reject_blog(&self, id: &str, reason: &str) -> Result<BlogSummary, ApiError> {
            let mut rejected = blog(id, &[]);
            rejected.status = BlogStatus::Rejected;
            rejected.rejection_reason = Some(reason.to_string());
            self.answer(format!("reject {} {}", id, reason), rejected)
        }

        async fn toggle_hide_blog(&self, id: &str) -> Result<BlogSummary, ApiError> {
            self.answer(format!("hide {}", id), blog(id, &[]))
        }

        async fn delete_blog(&self, id: &str) -> Result<(), ApiError> {
            self.answer(format!("delete {}", id), ())
        }
    }

    async fn loaded(api: &FakeModeration) -> ModerationBoard {
        let mut board = ModerationBoard::new(50);
        board.load_dashboard(api).await;
        board.load_all(api, None).await;
        board
    }

    #[tokio::test]
    async fn test_approve_moves_one_blog_between_counters() {
        let api = FakeModeration::default();
        let mut board = loaded(&api).await;
        let before = board.stats().clone();

        assert!(board.approve(&api, "p2").await);

        let ids: Vec<_> = board.pending().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        let after = board.stats();
        assert_eq!(after.blogs.pending, before.blogs.pending - 1);
        assert_eq!(after.blogs.published, before.blogs.published + 1);
        assert_eq!(after.blogs.total, before.blogs.total);
        assert_eq!(after.blogs.rejected, before.blogs.rejected);
        assert_eq!(after.users, before.users);
        assert_eq!(after.comments, before.comments);
        assert_eq!(board.notifications.last().unwrap().message, "Blog approved successfully!");
    }

    #[tokio::test]
    async fn test_dashboard_loads_both() {
        let api = FakeModeration::default();
        let board = loaded(&api).await;
        assert_eq!(board.stats().blogs.pending, 3);
        assert_eq!(board.pending().len(), 3);
        assert!(!board.needs_retry());
        assert!(api.calls.borrow().contains(&"pending 1 50".to_string()));
    }

    #[tokio::test]
    async fn test_dashboard_failure_falls_back_to_zero() {
        let api = FakeModeration::failing();
        let mut board = ModerationBoard::new(50);
        board.load_dashboard(&api).await;
        assert_eq!(*board.stats(), AdminStats::default());
        assert!(board.pending().is_empty());
        assert!(board.needs_retry());
        assert_eq!(board.notifications.drain()[0].message, "Moderation unavailable");
    }

    #[tokio::test]
    async fn test_failed_mutation_changes_nothing() {
        let ok = FakeModeration::default();
        let mut board = loaded(&ok).await;
        let failing = FakeModeration::failing();
        let (stats, pending, all) = (board.stats().clone(), board.pending().to_vec(), board.all().to_vec());

        assert!(!board.approve(&failing, "p1").await);
        assert!(!board.reject(&failing, "p1", "spam").await);
        assert!(!board.toggle_hide(&failing, "a1").await);
        assert!(!board.delete(&failing, "a1", "DELETE").await);

        assert_eq!(*board.stats(), stats);
        assert_eq!(board.pending(), pending.as_slice());
        assert_eq!(board.all(), all.as_slice());
        assert!(!board.is_busy("p1"));
        assert!(!board.is_busy("a1"));
        let notes = board.notifications.drain();
        assert!(notes.iter().all(|n| n.level == NoticeLevel::Error));
        assert_eq!(failing.calls.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let api = FakeModeration::default();
        let mut board = loaded(&api).await;
        let calls = api.calls.borrow().len();

        assert!(!board.reject(&api, "p1", "   ").await);
        assert_eq!(api.calls.borrow().len(), calls);
        assert_eq!(board.notifications.last().unwrap().message, "Please provide a reason for rejection");

        assert!(board.reject(&api, "p1", " Off topic ").await);
        assert_eq!(api.calls.borrow().last().unwrap(), "reject p1 Off topic");
        assert_eq!(board.stats().blogs.rejected, 2);
        assert_eq!(board.stats().blogs.pending, 2);
        assert_eq!(board.all()[1].status, BlogStatus::Rejected);
    }

    #[tokio::test]
    async fn test_toggle_hide_flips_flag() {
        let api = FakeModeration::default();
        let mut board = loaded(&api).await;
        assert!(board.toggle_hide(&api, "a1").await);
        assert!(board.all()[0].is_hidden);
        assert!(board.toggle_hide(&api, "a1").await);
        assert!(!board.all()[0].is_hidden);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let api = FakeModeration::default();
        let mut board = loaded(&api).await;

        assert!(!board.delete(&api, "p1", "delete").await);
        assert_eq!(board.all().len(), 2);
        assert!(board.delete(&api, "p1", "DELETE").await);
        assert_eq!(board.all().len(), 1);
        assert!(board.pending().iter().all(|b| b.id != "p1"));
        assert_eq!(api.calls.borrow().last().unwrap(), "delete p1");
    }

    #[tokio::test]
    async fn test_busy_id_is_ignored() {
        let api = FakeModeration::default();
        let mut board = loaded(&api).await;
        assert!(board.in_flight.try_begin("p1"));
        let calls = api.calls.borrow().len();

        assert!(!board.approve(&api, "p1").await);
        assert_eq!(api.calls.borrow().len(), calls);
        assert_eq!(board.pending().len(), 3);
    }
}
