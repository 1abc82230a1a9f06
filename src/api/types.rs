use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub avatar: Option<String>,
}

fn display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let full = format!("{} {}", first_name, last_name);
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

impl Author {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Pending,
    Published,
    Rejected,
    Hidden,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Pending => "pending",
            BlogStatus::Published => "published",
            BlogStatus::Rejected => "rejected",
            BlogStatus::Hidden => "hidden",
        }
    }
}

/// List-view projection of a post. Unknown fields of the full post are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: BlogStatus,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub is_hidden: bool,
    pub rejection_reason: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub read_time: Option<u32>,
}

impl BlogSummary {
    /// Publish instant, falling back to creation time for unpublished posts.
    pub fn effective_instant(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Draft,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub status: DraftState,
}

/// A full post, as returned by the single-post endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub summary: BlogSummary,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogResponse<B = BlogSummary> {
    pub blog: B,
}

/// Query parameters of `GET /blogs`. Tags travel comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub blogs: Vec<BlogSummary>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub blogs: Vec<BlogSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub like_count: u64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    pub content: String,
    pub author: Author,
    pub blog: String,
    pub parent_comment: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub reply_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default, alias = "replies")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct BlogCounters {
    pub total: u64,
    pub published: u64,
    pub pending: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Total {
    pub total: u64,
}

/// A blog recently submitted for review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBlog {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl RecentUser {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RecentActivity {
    pub blogs: Vec<RecentBlog>,
    pub users: Vec<RecentUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonthlyCount {
    #[serde(rename = "_id")]
    pub month: YearMonth,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analytics {
    pub blogs_by_category: Vec<CategoryCount>,
    pub monthly_stats: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub blogs: BlogCounters,
    #[serde(default)]
    pub users: Total,
    #[serde(default)]
    pub comments: Total,
    #[serde(default)]
    pub recent_activity: RecentActivity,
    #[serde(default)]
    pub analytics: Analytics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardResponse {
    pub stats: AdminStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBlogStats {
    pub total: u64,
    pub published: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: User,
    pub blog_stats: UserBlogStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub users: Vec<UserWithStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_blogs: u64,
    pub total_comments: u64,
    pub total_likes: u64,
    pub total_views: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub data: PlatformStats,
}

/// Fields every response carries, read before the typed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::test_data::BLOG_JSON;

    use super::*;

    #[test]
    fn test_blog_summary_from_full_blog() {
        let blog: BlogSummary = serde_json::from_str(BLOG_JSON).unwrap();
        assert_eq!(blog.id, "b1");
        assert_eq!(blog.status, BlogStatus::Published);
        assert_eq!(blog.like_count, 10);
        assert_eq!(blog.comment_count, 5);
        assert_eq!(blog.author.display_name(), "Ana Lima");
        assert_eq!(blog.effective_instant(), blog.published_at.unwrap());
    }

    #[test]
    fn test_effective_instant_falls_back_to_created() {
        let json = BLOG_JSON.replace(r#""publishedAt": "2024-05-01T10:00:00.000Z""#, r#""publishedAt": null"#);
        let blog: BlogSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(blog.effective_instant(), blog.created_at);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let author = Author {
            id: "u".to_string(),
            username: "ghost".to_string(),
            first_name: "".to_string(),
            last_name: " ".to_string(),
            avatar: None,
        };
        assert_eq!(author.display_name(), "ghost");
    }

    #[test]
    fn test_create_request_shape() {
        let req = CreateBlogRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            category: "General".to_string(),
            tags: vec!["a".to_string()],
            excerpt: "C".to_string(),
            cover_image: None,
            status: DraftState::Pending,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("coverImage").is_none());
    }

    #[test]
    fn test_dashboard_with_activity_and_analytics() {
        let json = r#"{"success":true,"stats":{
            "blogs":{"total":10,"published":6,"pending":3,"rejected":1},
            "users":{"total":4},"comments":{"total":12},
            "recentActivity":{
                "blogs":[{"_id":"p1","title":"Async Rust","status":"pending","createdAt":"2024-05-02T08:00:00.000Z",
                          "author":{"username":"ana","firstName":"Ana","lastName":"Lima"}}],
                "users":[{"_id":"u9","username":"bo","firstName":"","lastName":"","createdAt":"2024-05-01T08:00:00.000Z"}]
            },
            "analytics":{
                "blogsByCategory":[{"_id":"Technology","count":5}],
                "monthlyStats":[{"_id":{"year":2024,"month":5},"count":7}]
            }}}"#;
        let stats = serde_json::from_str::<DashboardResponse>(json).unwrap().stats;
        assert_eq!(stats.blogs.pending, 3);
        assert_eq!(stats.recent_activity.blogs[0].author.display_name(), "Ana Lima");
        assert_eq!(stats.recent_activity.users[0].display_name(), "bo");
        assert_eq!(stats.analytics.blogs_by_category[0], CategoryCount { category: "Technology".to_string(), count: 5 });
        assert_eq!(stats.analytics.monthly_stats[0].month, YearMonth { year: 2024, month: 5 });
    }

    #[test]
    fn test_dashboard_without_extras() {
        let json = r#"{"stats":{"blogs":{"total":1,"published":1,"pending":0,"rejected":0}}}"#;
        let stats = serde_json::from_str::<DashboardResponse>(json).unwrap().stats;
        assert_eq!(stats.users.total, 0);
        assert_eq!(stats.recent_activity, RecentActivity::default());
        assert_eq!(stats.analytics, Analytics::default());
    }
}
