use crate::anon::Rater;
use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use core_types::{LeaderboardOrder, RatingValue};
use database::{
    BreedDetail, BreedStanding, BreedSummary, DogCard, DogDetail, Page, RatingHistoryEntry,
    RatingOutcome,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stats::RaterReport;
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: i64 = 20;
const DEFAULT_LIST_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// The success envelope: every handler answers `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse { data }))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    page: Option<i64>,
    limit: Option<i64>,
}

impl Pagination {
    /// Validated `(page, limit)`.
    pub fn resolve(&self) -> Result<(i64, i64), AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        let limit = check_limit(self.limit, DEFAULT_PAGE_SIZE)?;
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::Validation("page is too large".to_string()));
        }
        Ok((page, limit))
    }
}

fn check_limit(limit: Option<i64>, default: i64) -> Result<i64, AppError> {
    let limit = limit.unwrap_or(default);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    Ok(limit)
}

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

/// # GET /api/health
pub async fn health() -> ApiResult<Health> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// --- Dogs ---

#[derive(Debug, Deserialize)]
pub struct NextDogQuery {
    breed: Option<String>,
}

/// # GET /api/dogs/next
/// The next dog the rater has neither rated nor skipped, or `null` when
/// there is none left.
pub async fn next_dog(
    State(state): State<Arc<AppState>>,
    Rater(anon): Rater,
    WithRejection(Query(query), _): WithRejection<Query<NextDogQuery>, AppError>,
) -> ApiResult<Option<DogCard>> {
    let breed = query.breed.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if let Some(slug) = breed {
        // Unknown breeds are a 404 rather than an empty result.
        state.db_repo.get_breed(slug).await?;
    }
    state.db_repo.touch_user(anon).await?;
    ok(state.db_repo.next_dog_for(anon, breed).await?)
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

/// # GET /api/dogs/top
pub async fn top_dogs(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> ApiResult<Vec<DogDetail>> {
    let limit = check_limit(query.limit, DEFAULT_LIST_LIMIT)?;
    let min_ratings = state.settings.stats.top_dogs_min_ratings;
    ok(state.db_repo.top_dogs(min_ratings, limit).await?)
}

/// # GET /api/dogs/:id
pub async fn get_dog(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(dog_id), _): WithRejection<Path<i32>, AppError>,
) -> ApiResult<DogDetail> {
    ok(state.db_repo.get_dog(dog_id).await?)
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    #[serde(flatten)]
    outcome: RatingOutcome,
    /// The rating minus everyone else's average; `null` when nobody else rated.
    #[serde(with = "rust_decimal::serde::float_option")]
    difference_from_average: Option<Decimal>,
}

/// # POST /api/dogs/:id/rate
pub async fn rate_dog(
    State(state): State<Arc<AppState>>,
    Rater(anon): Rater,
    WithRejection(Path(dog_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(body), _): WithRejection<Json<RateRequest>, AppError>,
) -> ApiResult<RateResponse> {
    let value = RatingValue::try_from(body.value)?;
    let outcome = state.db_repo.save_rating(anon, dog_id, value).await?;
    let difference_from_average = outcome
        .others
        .average_rating
        .map(|avg| (value.as_decimal() - avg).round_dp(2));

    tracing::info!(dog_id, value = %value, "Dog rated.");
    ok(RateResponse {
        outcome,
        difference_from_average,
    })
}

#[derive(Debug, Serialize)]
pub struct SkipResponse {
    dog_id: i32,
    skipped: bool,
}

/// # POST /api/dogs/:id/skip
pub async fn skip_dog(
    State(state): State<Arc<AppState>>,
    Rater(anon): Rater,
    WithRejection(Path(dog_id), _): WithRejection<Path<i32>, AppError>,
) -> ApiResult<SkipResponse> {
    state.db_repo.save_skip(anon, dog_id).await?;
    ok(SkipResponse {
        dog_id,
        skipped: true,
    })
}

// --- Breeds ---

/// # GET /api/breeds
pub async fn list_breeds(State(state): State<Arc<AppState>>) -> ApiResult<Vec<BreedSummary>> {
    ok(state.db_repo.list_breeds().await?)
}

#[derive(Debug, Serialize)]
pub struct BreedPage {
    breed: BreedDetail,
    dogs: Page<DogDetail>,
}

/// # GET /api/breeds/:slug
pub async fn get_breed(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(slug), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(pagination), _): WithRejection<Query<Pagination>, AppError>,
) -> ApiResult<BreedPage> {
    let (page, limit) = pagination.resolve()?;
    let breed = state.db_repo.get_breed(&slug).await?;
    let dogs = state.db_repo.list_dogs_for_breed(breed.id, page, limit).await?;
    ok(BreedPage { breed, dogs })
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    limit: Option<i64>,
    #[serde(default)]
    order: LeaderboardOrder,
}

/// # GET /api/leaderboard/breeds
pub async fn breed_leaderboard(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<LeaderboardQuery>, AppError>,
) -> ApiResult<Vec<BreedStanding>> {
    let limit = check_limit(query.limit, DEFAULT_LIST_LIMIT)?;
    let min_ratings = state.settings.stats.leaderboard_min_ratings;
    ok(state
        .db_repo
        .breed_leaderboard(min_ratings, limit, query.order)
        .await?)
}

// --- Me ---

/// # GET /api/me/stats
pub async fn my_stats(
    State(state): State<Arc<AppState>>,
    Rater(anon): Rater,
) -> ApiResult<RaterReport> {
    state.db_repo.touch_user(anon).await?;
    let activity = state
        .db_repo
        .rater_activity(anon, state.settings.stats.favorite_breed_min_ratings)
        .await?;
    ok(state.stats.evaluate(&activity))
}

/// # GET /api/me/ratings
pub async fn my_ratings(
    State(state): State<Arc<AppState>>,
    Rater(anon): Rater,
    WithRejection(Query(pagination), _): WithRejection<Query<Pagination>, AppError>,
) -> ApiResult<Page<RatingHistoryEntry>> {
    let (page, limit) = pagination.resolve()?;
    ok(state.db_repo.rating_history(anon, page, limit).await?)
}
