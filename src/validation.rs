//! Input validation for everything the API persists.
//!
//! Each validator runs every rule and collects one message per violation, in a
//! fixed order, instead of stopping at the first failure.

use crate::models::{
    ArticleParams, Category, CategoryParams, NewArticle, NewCategory, NewReview, ReviewParams,
};

pub const INGRESS_MIN_CHARS: usize = 50;
pub const BODY_MIN_CHARS: usize = 1000;
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

/// Accumulates messages in the order rules are checked.
#[derive(Debug, Default)]
struct Errors(Vec<String>);

impl Errors {
    fn add(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    fn presence(&mut self, attribute: &str, value: Option<&str>) {
        if is_blank(value) {
            self.add(format!("{attribute} can't be blank"));
        }
    }

    /// Absent values count as zero characters.
    fn min_length(&mut self, attribute: &str, value: Option<&str>, minimum: usize) {
        let length = value.map_or(0, |v| v.chars().count());
        if length < minimum {
            self.add(format!(
                "{attribute} is too short (minimum is {minimum} characters)"
            ));
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<String>> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self.0)
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// validate_article
///
/// `category` is the row `params.category_id` resolved to, if any. An unresolved
/// category yields both the association message ("must exist", checked first)
/// and the presence message ("can't be blank", checked after image).
pub fn validate_article(
    params: &ArticleParams,
    category: Option<&Category>,
) -> Result<NewArticle, Vec<String>> {
    let mut errors = Errors::default();

    if category.is_none() {
        errors.add("Category must exist");
    }
    errors.presence("Ingress", params.ingress.as_deref());
    errors.min_length("Ingress", params.ingress.as_deref(), INGRESS_MIN_CHARS);
    errors.presence("Body", params.body.as_deref());
    errors.min_length("Body", params.body.as_deref(), BODY_MIN_CHARS);
    errors.presence("Image", params.image.as_deref());
    if category.is_none() {
        errors.add("Category can't be blank");
    }
    errors.presence("Country", params.country.as_deref());
    errors.presence("City", params.city.as_deref());

    errors.into_result(|| NewArticle {
        title: params.title.clone(),
        ingress: params.ingress.clone().unwrap_or_default(),
        body: params.body.clone().unwrap_or_default(),
        image: params.image.clone().unwrap_or_default(),
        written_by: params.written_by.clone(),
        country: params.country.clone().unwrap_or_default(),
        city: params.city.clone().unwrap_or_default(),
        // Only reachable when the category resolved.
        category_id: category.map(|c| c.id).unwrap_or_default(),
    })
}

pub fn validate_category(params: &CategoryParams) -> Result<NewCategory, Vec<String>> {
    let mut errors = Errors::default();
    errors.presence("Name", params.name.as_deref());

    errors.into_result(|| NewCategory {
        name: params.name.clone().unwrap_or_default(),
        description: params.description.clone(),
    })
}

pub fn validate_review(article_id: i64, params: &ReviewParams) -> Result<NewReview, Vec<String>> {
    let mut errors = Errors::default();
    match params.score {
        None => errors.add("Score can't be blank"),
        Some(score) if !SCORE_RANGE.contains(&score) => errors.add(format!(
            "Score must be between {} and {}",
            SCORE_RANGE.start(),
            SCORE_RANGE.end()
        )),
        Some(_) => {}
    }

    errors.into_result(|| NewReview {
        article_id,
        score: params.score.unwrap_or_default(),
        content: params.content.clone(),
    })
}
