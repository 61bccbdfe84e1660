/**
 * Review Routes
 * Visitor reviews and their aggregate statistics
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{NewReview, Review, ReviewStats};
use crate::error::{AppError, OrInternal};
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReviewResponse {
    pub message: String,
    pub review: Review,
}

impl CreateReviewRequest {
    fn validate(self) -> Result<NewReview, AppError> {
        let name = self.name.filter(|s| !s.trim().is_empty());
        let comment = self.comment.filter(|s| !s.trim().is_empty());

        let (name, rating, comment) = match (name, self.rating, comment) {
            (Some(name), Some(rating), Some(comment)) => (name, rating, comment),
            _ => {
                return Err(AppError::validation(
                    "Name, rating, and comment are required",
                ))
            }
        };

        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }

        Ok(NewReview {
            name,
            rating,
            comment,
        })
    }
}

/// GET /api/reviews
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state
        .store
        .list_reviews()
        .await
        .or_internal("Failed to fetch reviews")?;
    Ok(Json(reviews))
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_review = payload.validate()?;

    let review = state
        .store
        .insert_review(&new_review)
        .await
        .or_internal("Failed to add review")?;

    tracing::info!(review_id = review.id, rating = review.rating, "Review added");

    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse {
            message: "Review added successfully".to_string(),
            review,
        }),
    ))
}

/// GET /api/reviews/stats
pub async fn review_stats(State(state): State<AppState>) -> Result<Json<ReviewStats>, AppError> {
    let stats = state
        .store
        .review_stats()
        .await
        .or_internal("Failed to fetch review statistics")?;
    Ok(Json(stats))
}
