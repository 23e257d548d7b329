// src/chapters/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub region: Option<String>,
    pub created_by: String,
    pub member_count: i64,
    pub created_at: Option<String>,
}

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct ChapterMember {
    pub id: String,
    pub chapter_id: String,
    pub user_id: String,
    pub status: String,
    pub joined_at: Option<String>,
}

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct ChapterPost {
    pub id: String,
    pub chapter_id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub created_at: Option<String>,
}

/// A pending or approved member joined with user details, for the
/// chapter-creator view
#[derive(FromRow, Serialize, Debug)]
pub struct MemberDetails {
    pub id: String,
    pub user_id: String,
    pub member_name: String,
    pub member_email: String,
    pub status: String,
    pub joined_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub recent_posts: Vec<ChapterPost>,
}

#[derive(Deserialize, Debug)]
pub struct CreateChapterRequest {
    pub name: String,
    pub description: Option<String>,
    pub region: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}
