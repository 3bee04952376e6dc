use std::collections::HashMap;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        Article, ArticleCreated, CREATED_MESSAGE, CategoryCreated, CreateArticleRequest,
        CreateCategoryRequest, CreateReviewRequest, Review, ReviewCreated,
    },
    payload::Payload,
    repository::{RepositoryError, RepositoryState},
    serializers::{ArticleView, CategoryView},
    validation,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

/// hydrate
///
/// Joins each article with its category and reviews and projects it into an
/// `ArticleView`. Two batched lookups regardless of how many articles are passed.
async fn hydrate(
    repo: &RepositoryState,
    articles: Vec<Article>,
) -> Result<Vec<ArticleView>, ApiError> {
    let article_ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let mut category_ids: Vec<i64> = articles.iter().map(|a| a.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    let categories: HashMap<_, _> = repo
        .get_categories(&category_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut reviews: HashMap<i64, Vec<Review>> = HashMap::new();
    for review in repo.reviews_for_articles(&article_ids).await? {
        reviews.entry(review.article_id).or_default().push(review);
    }

    articles
        .into_iter()
        .map(|article| -> Result<ArticleView, ApiError> {
            let category = categories
                .get(&article.category_id)
                .ok_or(RepositoryError::MissingCategory(article.category_id))?;
            let article_reviews = reviews.get(&article.id).map_or(&[][..], Vec::as_slice);
            Ok(ArticleView::new(article, category, article_reviews))
        })
        .collect()
}

// --- Articles ---

/// list_articles
///
/// Every persisted article in insertion order. No pagination or filtering.
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    responses(
        (status = 200, description = "All articles", body = [ArticleView]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleView>>, ApiError> {
    let articles = state.repo.list_articles().await?;
    Ok(Json(hydrate(&state.repo, articles).await?))
}

/// get_article
#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ArticleView),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleView>, ApiError> {
    let article = state
        .repo
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Couldn't find Article with 'id'={id}")))?;

    let mut views = hydrate(&state.repo, vec![article]).await?;
    // hydrate yields exactly one view per article.
    views
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Couldn't find Article with 'id'={id}")))
}

/// create_article
///
/// Validates the submitted fields and persists the article. Every violated rule
/// is reported at once; nothing is written unless all of them pass.
#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 200, description = "Created", body = ArticleCreated),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_article(
    Extension(AuthUser { id: user_id }): Extension<AuthUser>,
    State(state): State<AppState>,
    Payload(payload): Payload<CreateArticleRequest>,
) -> Result<Json<ArticleCreated>, ApiError> {
    let params = payload.article;

    let category = match params.category_id {
        Some(category_id) => state.repo.get_category(category_id).await?,
        None => None,
    };

    let new_article = validation::validate_article(&params, category.as_ref()).map_err(|errors| {
        tracing::debug!(%user_id, ?errors, "article rejected");
        ApiError::Validation(errors)
    })?;

    let article = state.repo.create_article(new_article).await?;
    tracing::info!(%user_id, article_id = article.id, "article created");

    Ok(Json(ArticleCreated {
        message: CREATED_MESSAGE.to_string(),
        article_id: article.id,
    }))
}

// --- Reviews ---

/// create_review
///
/// Attaches a review to an existing article.
#[utoipa::path(
    post,
    path = "/api/v1/articles/{id}/reviews",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Created", body = ReviewCreated),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Article not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_review(
    Extension(AuthUser { id: user_id }): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
    Payload(payload): Payload<CreateReviewRequest>,
) -> Result<Json<ReviewCreated>, ApiError> {
    if state.repo.get_article(article_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Couldn't find Article with 'id'={article_id}"
        )));
    }

    let new_review =
        validation::validate_review(article_id, &payload.review).map_err(ApiError::Validation)?;

    let review = match state.repo.create_review(new_review).await {
        Ok(review) => review,
        Err(RepositoryError::MissingArticle(id)) => {
            return Err(ApiError::NotFound(format!(
                "Couldn't find Article with 'id'={id}"
            )));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(%user_id, article_id, review_id = review.id, "review created");

    Ok(Json(ReviewCreated {
        message: CREATED_MESSAGE.to_string(),
        review_id: review.id,
    }))
}

// --- Categories ---

/// list_categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryView]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryView>>, ApiError> {
    let categories = state.repo.list_categories().await?;
    Ok(Json(categories.iter().map(CategoryView::from).collect()))
}

/// create_category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Created", body = CategoryCreated),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_category(
    Extension(AuthUser { id: user_id }): Extension<AuthUser>,
    State(state): State<AppState>,
    Payload(payload): Payload<CreateCategoryRequest>,
) -> Result<Json<CategoryCreated>, ApiError> {
    let new_category =
        validation::validate_category(&payload.category).map_err(ApiError::Validation)?;

    let category = state.repo.create_category(new_category).await?;
    tracing::info!(%user_id, category_id = category.id, "category created");

    Ok(Json(CategoryCreated {
        message: CREATED_MESSAGE.to_string(),
        category_id: category.id,
    }))
}
