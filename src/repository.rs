use crate::models::{Article, Category, NewArticle, NewCategory, NewReview, Review, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Failures surfaced by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("category {0} does not exist")]
    MissingCategory(i64),
    #[error("article {0} does not exist")]
    MissingArticle(i64),
}

/// Repository Trait
///
/// Persistence contract for users, categories, articles and reviews. Handlers and
/// the auth extractor only ever see `Arc<dyn Repository>`, so Postgres and the
/// in-memory store are interchangeable.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    // --- Categories ---
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError>;
    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RepositoryError>;
    async fn create_category(&self, category: NewCategory) -> Result<Category, RepositoryError>;

    // --- Articles ---
    // Ordered by id, i.e. insertion order.
    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError>;
    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError>;
    async fn create_article(&self, article: NewArticle) -> Result<Article, RepositoryError>;

    // --- Reviews ---
    // Reviews belonging to any of `article_ids`, ordered by id.
    async fn reviews_for_articles(
        &self,
        article_ids: &[i64],
    ) -> Result<Vec<Review>, RepositoryError>;
    async fn create_review(&self, review: NewReview) -> Result<Review, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation, backed by a Postgres connection pool.
/// Schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ARTICLE_COLUMNS: &str = "id, title, ingress, body, image, written_by, country, city, published, category_id, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let created = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(category.name)
        .bind(category.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id");
        let articles = sqlx::query_as::<_, Article>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let article = sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    /// create_article
    ///
    /// New articles start unpublished. The foreign key on `category_id` is the
    /// last line of defence if the category vanished after validation.
    async fn create_article(&self, article: NewArticle) -> Result<Article, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO articles (title, ingress, body, image, written_by, country, city, category_id, published, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, NOW())
            RETURNING {ARTICLE_COLUMNS}
            "#
        );
        let category_id = article.category_id;
        let result = sqlx::query_as::<_, Article>(&query)
            .bind(article.title)
            .bind(article.ingress)
            .bind(article.body)
            .bind(article.image)
            .bind(article.written_by)
            .bind(article.country)
            .bind(article.city)
            .bind(article.category_id)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(RepositoryError::MissingCategory(category_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reviews_for_articles(
        &self,
        article_ids: &[i64],
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, article_id, score, content, created_at
            FROM reviews
            WHERE article_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let article_id = review.article_id;
        let result = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (article_id, score, content, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, article_id, score, content, created_at
            "#,
        )
        .bind(review.article_id)
        .bind(review.score)
        .bind(review.content)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(RepositoryError::MissingArticle(article_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory, used by the test suites and
/// for running the API without a database. Ids are assigned sequentially from 1,
/// and foreign keys are enforced the same way Postgres enforces them.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    users: Vec<User>,
    categories: Vec<Category>,
    articles: Vec<Article>,
    reviews: Vec<Review>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user so tokens naming it authenticate. Users are provisioned
    /// by the identity provider, so there is no trait method for this.
    pub async fn insert_user(&self, user: User) {
        self.store.write().await.users.push(user);
    }
}

fn next_id(last: Option<i64>) -> i64 {
    last.map_or(1, |id| id + 1)
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.store.read().await.categories.clone())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let mut store = self.store.write().await;
        let created = Category {
            id: next_id(store.categories.last().map(|c| c.id)),
            name: category.name,
            description: category.description,
        };
        store.categories.push(created.clone());
        Ok(created)
    }

    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        Ok(self.store.read().await.articles.clone())
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create_article(&self, article: NewArticle) -> Result<Article, RepositoryError> {
        let mut store = self.store.write().await;
        if !store.categories.iter().any(|c| c.id == article.category_id) {
            return Err(RepositoryError::MissingCategory(article.category_id));
        }
        let created = Article {
            id: next_id(store.articles.last().map(|a| a.id)),
            title: article.title,
            ingress: article.ingress,
            body: article.body,
            image: article.image,
            written_by: article.written_by,
            country: article.country,
            city: article.city,
            published: false,
            category_id: article.category_id,
            created_at: Utc::now(),
        };
        store.articles.push(created.clone());
        Ok(created)
    }

    async fn reviews_for_articles(
        &self,
        article_ids: &[i64],
    ) -> Result<Vec<Review>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .reviews
            .iter()
            .filter(|r| article_ids.contains(&r.article_id))
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut store = self.store.write().await;
        if !store.articles.iter().any(|a| a.id == review.article_id) {
            return Err(RepositoryError::MissingArticle(review.article_id));
        }
        let created = Review {
            id: next_id(store.reviews.last().map(|r| r.id)),
            article_id: review.article_id,
            score: review.score,
            content: review.content,
            created_at: Utc::now(),
        };
        store.reviews.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_article(category_id: i64) -> NewArticle {
        NewArticle {
            title: None,
            ingress: "i".repeat(50),
            body: "b".repeat(1000),
            image: "https://example.com/a.png".to_string(),
            written_by: None,
            country: "Sweden".to_string(),
            city: "Gothenburg".to_string(),
            category_id,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids_in_insertion_order() {
        let repo = InMemoryRepository::new();
        let category = repo
            .create_category(NewCategory {
                name: "Travel".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let first = repo.create_article(new_article(category.id)).await.unwrap();
        let second = repo.create_article(new_article(category.id)).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert!(!first.published);
        let ids: Vec<_> = repo
            .list_articles()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn enforces_foreign_keys() {
        let repo = InMemoryRepository::new();

        let article = repo.create_article(new_article(42)).await;
        assert!(matches!(article, Err(RepositoryError::MissingCategory(42))));

        let review = repo
            .create_review(NewReview {
                article_id: 5,
                score: 3,
                content: None,
            })
            .await;
        assert!(matches!(review, Err(RepositoryError::MissingArticle(5))));
    }
}
