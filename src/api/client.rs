use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use spdlog::{debug, warn};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::*;
use crate::api::{BlogSource, BlogWriter, ModerationApi};

pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

#[derive(Serialize)]
struct PageParams<'a> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Serialize)]
struct RejectBody<'a> {
    reason: &'a str,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    content: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create client: {}", e)))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Transport(format!("Invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("Invalid API base URL {}", base_url)));
        }

        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Appends each segment to the base URL, percent-encoding ids and slugs.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn builder(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.endpoint(segments))
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Request-Id", Uuid::new_v4().to_string());

        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let req = req.build()?;
        let target = format!("{} {}", req.method(), req.url().path());
        debug!("API request {}", target);

        let response = match self.http.execute(req).await {
            Ok(response) => response,
            Err(e) => {
                warn!("API request {} failed: {}", target, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        // An unparsable body still has to yield the status based error below
        let envelope: Envelope = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() || envelope.success == Some(false) {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            warn!("API request {} rejected ({}): {}", target, status.as_u16(), message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
                field_errors: envelope.errors,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("API request {} returned an unexpected body: {}", target, e);
            ApiError::Decode(e.to_string())
        })
    }

    // Authentication

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.builder(Method::POST, &["auth", "register"]).json(request)).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.builder(Method::POST, &["auth", "login"]).json(request)).await
    }

    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.send(self.builder(Method::POST, &["auth", "logout"])).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let res: UserResponse = self.send(self.builder(Method::GET, &["auth", "me"])).await?;
        Ok(res.user)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, ApiError> {
        let res: UserResponse = self.send(self.builder(Method::PUT, &["auth", "profile"]).json(request)).await?;
        Ok(res.user)
    }

    // Blogs

    pub async fn search_blogs(&self, q: &str, page: u32, limit: u32) -> Result<BlogListResponse, ApiError> {
        let params = [("q", q.to_string()), ("page", page.to_string()), ("limit", limit.to_string())];
        self.send(self.builder(Method::GET, &["blogs", "search"]).query(&params)).await
    }

    pub async fn blog_by_slug(&self, slug: &str) -> Result<BlogDetail, ApiError> {
        let res: BlogResponse<BlogDetail> = self.send(self.builder(Method::GET, &["blogs", slug])).await?;
        Ok(res.blog)
    }

    pub async fn update_blog(&self, id: &str, request: &CreateBlogRequest) -> Result<BlogSummary, ApiError> {
        let res: BlogResponse = self.send(self.builder(Method::PUT, &["blogs", id]).json(request)).await?;
        Ok(res.blog)
    }

    pub async fn delete_own_blog(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self.send(self.builder(Method::DELETE, &["blogs", id])).await?;
        Ok(())
    }

    pub async fn blogs_by_user(&self, user_id: &str, page: u32, limit: u32) -> Result<BlogListResponse, ApiError> {
        let params = PageParams { page, limit, status: None };
        self.send(self.builder(Method::GET, &["blogs", "user", user_id]).query(&params)).await
    }

    // Comments

    pub async fn comments(&self, blog_id: &str, page: u32, limit: u32) -> Result<CommentListResponse, ApiError> {
        let params = PageParams { page, limit, status: None };
        self.send(self.builder(Method::GET, &["comments", "blog", blog_id]).query(&params)).await
    }

    pub async fn create_comment(&self, blog_id: &str, request: &CreateCommentRequest) -> Result<Comment, ApiError> {
        let res: CommentResponse = self
            .send(self.builder(Method::POST, &["comments", "blog", blog_id]).json(request))
            .await?;
        Ok(res.comment)
    }

    pub async fn comment_replies(&self, comment_id: &str, page: u32, limit: u32) -> Result<CommentListResponse, ApiError> {
        let params = PageParams { page, limit, status: None };
        self.send(self.builder(Method::GET, &["comments", comment_id, "replies"]).query(&params)).await
    }

    pub async fn update_comment(&self, id: &str, content: &str) -> Result<Comment, ApiError> {
        let res: CommentResponse = self
            .send(self.builder(Method::PUT, &["comments", id]).json(&CommentBody { content }))
            .await?;
        Ok(res.comment)
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self.send(self.builder(Method::DELETE, &["comments", id])).await?;
        Ok(())
    }

    pub async fn like_comment(&self, id: &str) -> Result<LikeResponse, ApiError> {
        self.send(self.builder(Method::POST, &["comments", id, "like"])).await
    }

    // Admin and platform

    pub async fn admin_users(&self, page: u32, limit: u32) -> Result<UserListResponse, ApiError> {
        let params = PageParams { page, limit, status: None };
        self.send(self.builder(Method::GET, &["admin", "users"]).query(&params)).await
    }

    pub async fn stats(&self) -> Result<PlatformStats, ApiError> {
        let res: StatsResponse = self.send(self.builder(Method::GET, &["stats"])).await?;
        Ok(res.data)
    }
}

impl BlogSource for ApiClient {
    async fn list_blogs(&self, query: &BlogQuery) -> Result<BlogListResponse, ApiError> {
        self.send(self.builder(Method::GET, &["blogs"]).query(query)).await
    }

    async fn trending_blogs(&self, limit: u32, days: u32) -> Result<Vec<BlogSummary>, ApiError> {
        let params = [("limit", limit), ("days", days)];
        let res: TrendingResponse = self.send(self.builder(Method::GET, &["blogs", "trending"]).query(&params)).await?;
        Ok(res.blogs)
    }

    async fn like_blog(&self, id: &str) -> Result<LikeResponse, ApiError> {
        self.send(self.builder(Method::POST, &["blogs", id, "like"])).await
    }
}

impl BlogWriter for ApiClient {
    async fn create_blog(&self, request: &CreateBlogRequest) -> Result<BlogSummary, ApiError> {
        let res: BlogResponse = self.send(self.builder(Method::POST, &["blogs"]).json(request)).await?;
        Ok(res.blog)
    }
}

impl ModerationApi for ApiClient {
    async fn dashboard(&self) -> Result<AdminStats, ApiError> {
        let res: DashboardResponse = self.send(self.builder(Method::GET, &["admin", "dashboard"])).await?;
        Ok(res.stats)
    }

    async fn pending_blogs(&self, page: u32, limit: u32) -> Result<BlogListResponse, ApiError> {
        let params = PageParams { page, limit, status: None };
        self.send(self.builder(Method::GET, &["admin", "blogs", "pending"]).query(&params)).await
    }

    async fn admin_blogs(&self, page: u32, limit: u32, status: Option<BlogStatus>) -> Result<BlogListResponse, ApiError> {
        let params = PageParams { page, limit, status: status.map(|s| s.as_str()) };
        self.send(self.builder(Method::GET, &["admin", "blogs"]).query(&params)).await
    }

    async fn approve_blog(&self, id: &str) -> Result<BlogSummary, ApiError> {
        let res: BlogResponse = self.send(self.builder(Method::PUT, &["admin", "blogs", id, "approve"])).await?;
        Ok(res.blog)
    }

    async fn reject_blog(&self, id: &str, reason: &str) -> Result<BlogSummary, ApiError> {
        let res: BlogResponse = self
            .send(self.builder(Method::PUT, &["admin", "blogs", id, "reject"]).json(&RejectBody { reason }))
            .await?;
        Ok(res.blog)
    }

    async fn toggle_hide_blog(&self, id: &str) -> Result<BlogSummary, ApiError> {
        let res: BlogResponse = self.send(self.builder(Method::PUT, &["admin", "blogs", id, "toggle-hide"])).await?;
        Ok(res.blog)
    }

    async fn delete_blog(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self.send(self.builder(Method::DELETE, &["admin", "blogs", id])).await?;
        Ok(())
    }
}
