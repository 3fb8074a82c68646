use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    hotels::{
        dto::{CreateHotelDto, GetHotelDetailsDto, GetHotelDto, UpdateHotelDto},
        repo::{Hotel, HotelsRepository},
    },
    pagination::{PagedResult, QueryParameters},
    repository::{Entity, RepoError},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/hotels/GetAll", get(get_hotels))
        .route("/hotels", get(get_paged_hotels))
        .route("/hotels/:id", get(get_hotel))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/hotels", post(post_hotel))
        .route("/hotels/:id", put(put_hotel).delete(delete_hotel))
}

#[instrument(skip(state))]
pub async fn get_hotels(State(state): State<AppState>) -> Result<Json<Vec<GetHotelDto>>, AppError> {
    let repo = HotelsRepository::new(state.db.clone());
    let hotels = repo.get_all_mapped().await?;
    Ok(Json(hotels))
}

#[instrument(skip(state))]
pub async fn get_paged_hotels(
    State(state): State<AppState>,
    Query(params): Query<QueryParameters>,
) -> Result<Json<PagedResult<GetHotelDto>>, AppError> {
    let repo = HotelsRepository::new(state.db.clone());
    let page = repo.get_all_paged(&params).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GetHotelDetailsDto>, AppError> {
    let repo = HotelsRepository::new(state.db.clone());
    let hotel = repo.get_details(id).await?;
    Ok(Json(hotel))
}

#[instrument(skip(state, _user, payload))]
pub async fn put_hotel(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateHotelDto>,
) -> Result<StatusCode, AppError> {
    if id != payload.id {
        return Err(AppError::BadRequest("Invalid record Id".into()));
    }

    let repo = HotelsRepository::new(state.db.clone());
    match repo.update_mapped(id, payload).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RepoError::Conflict { .. }) => {
            if repo.exists(id).await? {
                Err(AppError::Conflict {
                    entity: Hotel::NAME,
                    key: id.to_string(),
                })
            } else {
                Err(AppError::NotFound {
                    entity: Hotel::NAME,
                    key: id.to_string(),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state, _user, payload))]
pub async fn post_hotel(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateHotelDto>,
) -> Result<(StatusCode, HeaderMap, Json<GetHotelDto>), AppError> {
    let repo = HotelsRepository::new(state.db.clone());
    let hotel: GetHotelDto = repo.add_mapped(payload).await?;
    info!(id = hotel.id, "hotel created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/hotels/{}", hotel.id).parse().unwrap(),
    );

    Ok((StatusCode::CREATED, headers, Json(hotel)))
}

#[instrument(skip(state, _user))]
pub async fn delete_hotel(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = HotelsRepository::new(state.db.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
