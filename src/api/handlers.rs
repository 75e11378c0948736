use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Genre, PersonalityType, RecommendedBook, TypeId},
    services::votes::normalize_book_id,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub book_id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub new_vote_count: u64,
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub type_id: Option<TypeId>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommended_books: Vec<RecommendedBook>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Record one vote for a book
pub async fn vote(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> AppResult<Json<VoteResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let book_id = normalize_book_id(request.book_id.as_ref())?;

    tracing::debug!(request_id = %request_id, book_id = %book_id, "Vote received");
    let receipt = state.ledger.record_vote(&book_id).await?;

    Ok(Json(VoteResponse {
        success: true,
        new_vote_count: receipt.new_vote_count,
        book_id: receipt.book_id,
    }))
}

/// Recommend books for a personality type.
///
/// Never fails: an unreadable body, a missing or unknown type id all produce an
/// empty list.
pub async fn recommend_genres(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Json<RecommendResponse> {
    let type_id = match payload {
        Ok(Json(RecommendRequest { type_id: Some(type_id) })) => type_id,
        Ok(_) => {
            tracing::debug!("Recommendation requested without type_id");
            return Json(RecommendResponse { recommended_books: Vec::new() });
        }
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable recommendation request");
            return Json(RecommendResponse { recommended_books: Vec::new() });
        }
    };

    let recommended_books = state.recommender.recommend(&type_id, &state.ledger).await;
    Json(RecommendResponse { recommended_books })
}

/// List personality types in catalog order
pub async fn list_types(State(state): State<AppState>) -> Json<Vec<PersonalityType>> {
    Json(state.recommender.catalog().personality_types.clone())
}

/// List genres in catalog order
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.recommender.catalog().genres.clone())
}
