use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{Article, Category, Review};

/// ArticleView
///
/// The JSON shape of an article as returned by the list and show endpoints.
/// The field set is fixed: `category` is always an object and `reviews` is
/// always a list, empty when the article has none.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleView {
    pub id: i64,
    pub title: Option<String>,
    pub ingress: String,
    pub body: String,
    pub image: String,
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub written_by: Option<String>,
    pub country: String,
    pub city: String,
    pub category: CategoryView,
    pub reviews: Vec<ReviewView>,
}

/// CategoryView
///
/// Two-field projection of a category, embedded in articles and returned by the category listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
}

/// ReviewView
///
/// Four-field projection of a review. The owning article id is implied by nesting.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReviewView {
    pub id: i64,
    pub score: i32,
    pub content: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            score: review.score,
            content: review.content.clone(),
            created_at: review.created_at,
        }
    }
}

impl ArticleView {
    /// Projects an article together with its category and the reviews that belong to it.
    pub fn new(article: Article, category: &Category, reviews: &[Review]) -> Self {
        Self {
            id: article.id,
            title: article.title,
            ingress: article.ingress,
            body: article.body,
            image: article.image,
            published: article.published,
            created_at: article.created_at,
            written_by: article.written_by,
            country: article.country,
            city: article.city,
            category: category.into(),
            reviews: reviews.iter().map(ReviewView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article() -> Article {
        Article {
            id: 3,
            title: Some("Gothenburg is great".to_string()),
            ingress: "ingress".to_string(),
            body: "body".to_string(),
            image: "https://example.com/a.png".to_string(),
            written_by: None,
            country: "Sweden".to_string(),
            city: "Gothenburg".to_string(),
            published: false,
            category_id: 1,
            created_at: Utc::now(),
        }
    }

    fn category() -> Category {
        Category {
            id: 1,
            name: "Travel".to_string(),
            description: Some("Places worth visiting".to_string()),
        }
    }

    #[test]
    fn emits_fixed_field_set() {
        let view = ArticleView::new(article(), &category(), &[]);
        let json = serde_json::to_value(&view).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "body",
                "category",
                "city",
                "country",
                "created_at",
                "id",
                "image",
                "ingress",
                "published",
                "reviews",
                "title",
                "written_by",
            ]
        );
        // Absent optional attributes are emitted as null rather than dropped.
        assert!(object["written_by"].is_null());
    }

    #[test]
    fn no_reviews_serializes_as_empty_list() {
        let view = ArticleView::new(article(), &category(), &[]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["reviews"], serde_json::json!([]));
    }

    #[test]
    fn nested_shapes_have_two_and_four_fields() {
        let review = Review {
            id: 9,
            article_id: 3,
            score: 10,
            content: None,
            created_at: Utc::now(),
        };
        let view = ArticleView::new(article(), &category(), &[review]);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["category"].as_object().unwrap().len(), 2);
        assert_eq!(json["category"]["name"], "Travel");
        assert_eq!(json["reviews"][0].as_object().unwrap().len(), 4);
        assert_eq!(json["reviews"][0]["score"], 10);
    }
}
