#![cfg(test)]

use chrono::{DateTime, Duration, Utc};

use crate::api::types::{Author, BlogListResponse, BlogStatus, BlogSummary};

pub const BLOG_JSON: &str = r#"{
    "_id": "b1",
    "title": "Hello",
    "slug": "hello",
    "content": "full body is ignored",
    "excerpt": "Hi",
    "coverImage": null,
    "author": {"_id": "u1", "username": "ana", "firstName": "Ana", "lastName": "Lima", "avatar": null},
    "status": "published",
    "tags": ["rust", "web"],
    "category": "Technology",
    "likes": ["u2"],
    "likeCount": 10,
    "views": 100,
    "isHidden": false,
    "publishedAt": "2024-05-01T10:00:00.000Z",
    "readTime": 3,
    "createdAt": "2024-04-30T10:00:00.000Z",
    "updatedAt": "2024-05-01T10:00:00.000Z",
    "commentCount": 5
}"#;

pub const POST_DATA_MD: &str = "# What I learned after 20+ years of software development

How to be a great software engineer?

> Someone asked me this question today and I didn’t have an answer.

## Non technical

- Have a honest image of yourself
- [ ] Read [the docs](https://example.com/docs)

```rust
fn main() {}
```

Use `cargo` often.
";

pub fn blog(id: &str, tags: &[&str]) -> BlogSummary {
    blog_at(id, tags, DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().into())
}

pub fn blog_at(id: &str, tags: &[&str], published_at: DateTime<Utc>) -> BlogSummary {
    BlogSummary {
        id: id.to_string(),
        title: format!("Post {}", id),
        slug: format!("post-{}", id),
        excerpt: String::new(),
        cover_image: None,
        author: Author {
            id: "u1".to_string(),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            avatar: None,
        },
        category: "technology".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        status: BlogStatus::Published,
        like_count: 0,
        comment_count: 0,
        views: 0,
        is_hidden: false,
        rejection_reason: None,
        published_at: Some(published_at),
        created_at: published_at - Duration::days(1),
        read_time: Some(1),
    }
}

pub fn pending_blog(id: &str) -> BlogSummary {
    let mut blog = blog(id, &[]);
    blog.status = BlogStatus::Pending;
    blog.published_at = None;
    blog
}

pub fn page(blogs: Vec<BlogSummary>, current_page: u32, pages: u32, total: u64) -> BlogListResponse {
    BlogListResponse {
        count: blogs.len() as u32,
        total,
        pages,
        current_page,
        blogs,
    }
}
