use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::payload::deserialize_lenient_id;

// --- Persisted Records (Mapped to Database) ---

/// User
///
/// The identity behind a bearer token. Only resolved by the auth extractor to
/// confirm that the token's subject still exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Category
///
/// Lookup entity every article belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Article
///
/// A row of the `articles` table. Only validated `NewArticle`s are ever inserted,
/// so `ingress`, `body`, `image`, `country` and `city` are always populated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Article {
    pub id: i64,
    pub title: Option<String>,
    pub ingress: String,
    pub body: String,
    pub image: String,
    pub written_by: Option<String>,
    pub country: String,
    pub city: String,
    pub published: bool,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Review
///
/// A score left on an article.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Review {
    pub id: i64,
    pub article_id: i64,
    pub score: i32,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Validated Inputs (ready for insertion) ---

/// Output of the article validation pipeline. Constructed only by `validation::validate_article`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: Option<String>,
    pub ingress: String,
    pub body: String,
    pub image: String,
    pub written_by: Option<String>,
    pub country: String,
    pub city: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub article_id: i64,
    pub score: i32,
    pub content: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateArticleRequest
///
/// Body of `POST /api/v1/articles`. The fields are nested under `article` and
/// every one of them is optional on the wire; presence is a validation concern.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub article: ArticleParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct ArticleParams {
    pub title: Option<String>,
    #[schema(example = "At least fifty characters of lead paragraph text go in this field.")]
    pub ingress: Option<String>,
    pub body: Option<String>,
    #[schema(example = "https://example.com/images/cover.png")]
    pub image: Option<String>,
    pub written_by: Option<String>,
    #[serde(deserialize_with = "deserialize_lenient_id")]
    pub category_id: Option<i64>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// CreateCategoryRequest
///
/// Body of `POST /api/v1/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub category: CategoryParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct CategoryParams {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// CreateReviewRequest
///
/// Body of `POST /api/v1/articles/{id}/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub review: ReviewParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct ReviewParams {
    #[serde(deserialize_with = "deserialize_lenient_id")]
    pub score: Option<i32>,
    pub content: Option<String>,
}

// --- Creation Acknowledgements (Output) ---

/// Returned with status 200 after an article is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleCreated {
    #[schema(example = "Successfully created")]
    pub message: String,
    pub article_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryCreated {
    pub message: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReviewCreated {
    pub message: String,
    pub review_id: i64,
}

pub const CREATED_MESSAGE: &str = "Successfully created";
