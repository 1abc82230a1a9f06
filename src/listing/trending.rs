use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use spdlog::{debug, error, info};

use crate::api::error::ApiError;
use crate::api::types::BlogSummary;
use crate::api::BlogSource;
use crate::mutation::LikeToggle;
use crate::notify::Notifications;

const MS_PER_DAY: i64 = 86_400_000;

/// Whole days since `published`, rounded up and never below one.
pub fn age_days(published: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = (now - published).num_milliseconds();
    if ms <= 0 {
        return 1;
    }
    ((ms + MS_PER_DAY - 1) / MS_PER_DAY).max(1) as u64
}

/// Likes count twice, comments three times, each view once.
pub fn engagement(blog: &BlogSummary) -> u64 {
    blog.like_count
        .saturating_mul(2)
        .saturating_add(blog.views)
        .saturating_add(blog.comment_count.saturating_mul(3))
}

/// Engagement per day of age, rounded half up.
pub fn trending_score(blog: &BlogSummary, now: DateTime<Utc>) -> u64 {
    let age = age_days(blog.effective_instant(), now) as u128;
    let engagement = engagement(blog) as u128;
    ((2 * engagement + age) / (2 * age)) as u64
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedBlog<'a> {
    pub rank: usize,
    pub score: u64,
    pub blog: &'a BlogSummary,
}

/// Annotates server ordered results with their rank and score. The order is
/// the server's and is never changed here.
pub fn rank_trending(blogs: &[BlogSummary], now: DateTime<Utc>) -> Vec<RankedBlog<'_>> {
    blogs
        .iter()
        .enumerate()
        .map(|(idx, blog)| RankedBlog {
            rank: idx + 1,
            score: trending_score(blog, now),
            blog,
        })
        .collect()
}

/// Time window of the trending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingRange {
    #[default]
    Week,
    TwoWeeks,
    Month,
}

impl TrendingRange {
    pub fn days(&self) -> u32 {
        match self {
            TrendingRange::Week => 7,
            TrendingRange::TwoWeeks => 14,
            TrendingRange::Month => 30,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(TrendingRange::Week),
            14 => Some(TrendingRange::TwoWeeks),
            30 => Some(TrendingRange::Month),
            _ => None,
        }
    }
}

impl Display for TrendingRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days", self.days())
    }
}

impl FromStr for TrendingRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(TrendingRange::from_days)
            .ok_or_else(|| format!("Trending range must be 7, 14 or 30 days, got {}", s))
    }
}

/// The trending page: server ranked posts for a time window.
pub struct TrendingView {
    range: TrendingRange,
    limit: u32,
    blogs: Vec<BlogSummary>,
    generation: u64,
    loading: bool,
    error: Option<String>,
    likes: LikeToggle,
    pub notifications: Notifications,
}

impl TrendingView {
    pub fn new(range: TrendingRange, limit: u32) -> Self {
        TrendingView {
            range,
            limit: limit.max(1),
            blogs: vec![],
            generation: 0,
            loading: false,
            error: None,
            likes: LikeToggle::new(),
            notifications: Notifications::new(),
        }
    }

    pub fn range(&self) -> TrendingRange {
        self.range
    }

    pub fn blogs(&self) -> &[BlogSummary] {
        &self.blogs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.likes.is_liked(id)
    }

    /// Returns true when the range changed and the list must be reloaded.
    pub fn set_range(&mut self, range: TrendingRange) -> bool {
        if self.range == range {
            return false;
        }
        self.range = range;
        true
    }

    /// Issues a request, making any earlier one stale.
    pub fn begin(&mut self) -> (u64, u32, u32) {
        self.generation += 1;
        self.loading = true;
        (self.generation, self.limit, self.range.days())
    }

    pub fn complete(&mut self, generation: u64, result: Result<Vec<BlogSummary>, ApiError>) -> bool {
        if generation != self.generation {
            debug!("Dropping stale trending response (generation {}, latest {})", generation, self.generation);
            return false;
        }
        self.loading = false;

        match result {
            Ok(blogs) => {
                info!("Loaded {} trending blogs for {}", blogs.len(), self.range);
                self.blogs = blogs;
                self.error = None;
            }
            Err(e) => {
                error!("Loading trending blogs failed: {}", e);
                self.blogs.clear();
                let message = e.user_message();
                self.notifications.error(message.clone());
                self.error = Some(message);
            }
        }
        true
    }

    pub async fn load<S: BlogSource>(&mut self, api: &S) -> bool {
        let (generation, limit, days) = self.begin();
        let result = api.trending_blogs(limit, days).await;
        self.complete(generation, result)
    }

    pub async fn like<S: BlogSource>(&mut self, api: &S, id: &str) -> bool {
        self.likes.toggle(api, id, &mut self.blogs, &mut self.notifications).await
    }

    /// The loaded posts in server order, with rank and score.
    pub fn ranked(&self, now: DateTime<Utc>) -> Vec<RankedBlog<'_>> {
        rank_trending(&self.blogs, now)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Duration;

    use crate::api::types::{BlogListResponse, BlogQuery, LikeResponse};
    use crate::test_data::blog_at;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-10T12:00:00Z").unwrap().into()
    }

    fn scored(likes: u64, views: u64, comments: u64, age: Duration) -> u64 {
        let mut blog = blog_at("b", &[], now() - age);
        blog.like_count = likes;
        blog.views = views;
        blog.comment_count = comments;
        trending_score(&blog, now())
    }

    #[test]
    fn test_age_days() {
        assert_eq!(age_days(now(), now()), 1);
        assert_eq!(age_days(now() + Duration::hours(5), now()), 1);
        assert_eq!(age_days(now() - Duration::milliseconds(1), now()), 1);
        assert_eq!(age_days(now() - Duration::days(1), now()), 1);
        assert_eq!(age_days(now() - Duration::days(1) - Duration::milliseconds(1), now()), 2);
        assert_eq!(age_days(now() - Duration::days(3), now()), 3);
    }

    #[test]
    fn test_three_days_old() {
        assert_eq!(scored(10, 100, 5, Duration::days(3)), 45);
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(scored(0, 3, 0, Duration::days(2)), 2);
        assert_eq!(scored(0, 5, 0, Duration::days(4)), 1);
        assert_eq!(scored(0, 0, 0, Duration::days(9)), 0);
    }

    #[test]
    fn test_monotonicity() {
        for age in 1..40 {
            for comments in 0..20 {
                let age = Duration::days(age);
                assert!(scored(3, 17, comments + 1, age) >= scored(3, 17, comments, age));
            }
        }
        for age in 1..60 {
            assert!(scored(7, 40, 2, Duration::days(age + 1)) <= scored(7, 40, 2, Duration::days(age)));
        }
    }

    #[test]
    fn test_falls_back_to_created_at() {
        let mut blog = blog_at("b", &[], now() - Duration::days(10));
        blog.published_at = None;
        blog.created_at = now() - Duration::days(2);
        blog.views = 10;
        assert_eq!(trending_score(&blog, now()), 5);
    }

    #[test]
    fn test_rank_keeps_server_order() {
        let mut low = blog_at("low", &[], now() - Duration::days(1));
        low.views = 1;
        let mut high = blog_at("high", &[], now() - Duration::days(1));
        high.views = 100;

        let blogs = vec![low, high];
        let ranked = rank_trending(&blogs, now());
        assert_eq!(ranked[0].blog.id, "low");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].score, 100);
    }

    struct FakeTrending {
        asked: RefCell<Vec<(u32, u32)>>,
        result: RefCell<Option<Result<Vec<BlogSummary>, ApiError>>>,
    }

    impl BlogSource for FakeTrending {
        async fn list_blogs(&self, _query: &BlogQuery) -> Result<BlogListResponse, ApiError> {
            Err(ApiError::Transport("unused".to_string()))
        }

        async fn trending_blogs(&self, limit: u32, days: u32) -> Result<Vec<BlogSummary>, ApiError> {
            self.asked.borrow_mut().push((limit, days));
            self.result.borrow_mut().take().unwrap_or_else(|| Ok(vec![]))
        }

        async fn like_blog(&self, _id: &str) -> Result<LikeResponse, ApiError> {
            Ok(LikeResponse { like_count: 1, is_liked: true })
        }
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("14".parse::<TrendingRange>(), Ok(TrendingRange::TwoWeeks));
        assert_eq!(TrendingRange::Month.days(), 30);
        assert!("10".parse::<TrendingRange>().is_err());
        assert_eq!(TrendingRange::default().to_string(), "7 days");
    }

    #[tokio::test]
    async fn test_view_loads_range() {
        let api = FakeTrending {
            asked: RefCell::new(vec![]),
            result: RefCell::new(Some(Ok(vec![blog_at("a", &[], now()), blog_at("b", &[], now())]))),
        };
        let mut view = TrendingView::new(TrendingRange::Week, 20);
        assert!(view.load(&api).await);
        assert_eq!(view.blogs().len(), 2);
        assert_eq!(view.ranked(now())[1].rank, 2);

        assert!(!view.set_range(TrendingRange::Week));
        assert!(view.set_range(TrendingRange::Month));
        view.load(&api).await;
        assert_eq!(*api.asked.borrow(), vec![(20, 7), (20, 30)]);
        assert!(view.blogs().is_empty());
    }

    #[test]
    fn test_view_drops_stale_and_reports_errors() {
        let mut view = TrendingView::new(TrendingRange::Week, 5);
        let (old, _, _) = view.begin();
        let (latest, _, days) = view.begin();
        assert_eq!(days, 7);

        assert!(view.complete(latest, Err(ApiError::Transport("offline".to_string()))));
        assert!(!view.complete(old, Ok(vec![blog_at("a", &[], now())])));
        assert!(view.blogs().is_empty());
        assert_eq!(view.error(), Some("Request failed"));
        assert!(!view.is_loading());
    }
}
