//! HTTP/JSON contract of the Vibe Write API.
//!
//! Controllers talk to the API through the narrow traits below so they can be
//! driven by an in-memory fake in tests. [`client::ApiClient`] is the real
//! implementation.

use crate::api::error::ApiError;
use crate::api::types::{
    AdminStats, BlogListResponse, BlogQuery, BlogStatus, BlogSummary, CreateBlogRequest, LikeResponse,
};

pub mod client;
pub mod error;
pub mod types;

/// Read side of the public blog listing, plus likes.
#[allow(async_fn_in_trait)]
pub trait BlogSource {
    async fn list_blogs(&self, query: &BlogQuery) -> Result<BlogListResponse, ApiError>;
    async fn trending_blogs(&self, limit: u32, days: u32) -> Result<Vec<BlogSummary>, ApiError>;
    async fn like_blog(&self, id: &str) -> Result<LikeResponse, ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait BlogWriter {
    async fn create_blog(&self, request: &CreateBlogRequest) -> Result<BlogSummary, ApiError>;
}

/// Admin endpoints. Every call requires an admin session.
#[allow(async_fn_in_trait)]
pub trait ModerationApi {
    async fn dashboard(&self) -> Result<AdminStats, ApiError>;
    async fn pending_blogs(&self, page: u32, limit: u32) -> Result<BlogListResponse, ApiError>;
    async fn admin_blogs(&self, page: u32, limit: u32, status: Option<BlogStatus>) -> Result<BlogListResponse, ApiError>;
    async fn approve_blog(&self, id: &str) -> Result<BlogSummary, ApiError>;
    async fn reject_blog(&self, id: &str, reason: &str) -> Result<BlogSummary, ApiError>;
    async fn toggle_hide_blog(&self, id: &str) -> Result<BlogSummary, ApiError>;
    async fn delete_blog(&self, id: &str) -> Result<(), ApiError>;
}
