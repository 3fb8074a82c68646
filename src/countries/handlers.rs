use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::{AdminUser, AuthUser},
    countries::{
        dto::{CreateCountryDto, GetCountryDetailsDto, GetCountryDto, UpdateCountryDto},
        repo::{CountriesRepository, Country},
    },
    error::AppError,
    pagination::{PagedResult, QueryParameters},
    repository::{Entity, RepoError},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/countries/GetAll", get(get_countries))
        .route("/countries", get(get_paged_countries))
        .route("/countries/:id", get(get_country))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/countries", post(post_country))
        .route("/countries/:id", put(put_country).delete(delete_country))
}

#[instrument(skip(state))]
pub async fn get_countries(
    State(state): State<AppState>,
) -> Result<Json<Vec<GetCountryDto>>, AppError> {
    let repo = CountriesRepository::new(state.db.clone());
    let countries = repo.get_all_mapped().await?;
    Ok(Json(countries))
}

#[instrument(skip(state))]
pub async fn get_paged_countries(
    State(state): State<AppState>,
    Query(params): Query<QueryParameters>,
) -> Result<Json<PagedResult<GetCountryDto>>, AppError> {
    let repo = CountriesRepository::new(state.db.clone());
    let page = repo.get_all_paged(&params).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GetCountryDetailsDto>, AppError> {
    let repo = CountriesRepository::new(state.db.clone());
    let country = repo.get_details(id).await?;
    Ok(Json(country))
}

#[instrument(skip(state, _user, payload))]
pub async fn put_country(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCountryDto>,
) -> Result<StatusCode, AppError> {
    if id != payload.id {
        return Err(AppError::BadRequest("Invalid record Id".into()));
    }

    let repo = CountriesRepository::new(state.db.clone());
    match repo.update_mapped(id, payload).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        // The row vanished between fetch and write; decide 404 vs 409 by
        // looking again.
        Err(RepoError::Conflict { .. }) => {
            if repo.exists(id).await? {
                Err(AppError::Conflict {
                    entity: Country::NAME,
                    key: id.to_string(),
                })
            } else {
                Err(AppError::NotFound {
                    entity: Country::NAME,
                    key: id.to_string(),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state, _user, payload))]
pub async fn post_country(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateCountryDto>,
) -> Result<(StatusCode, HeaderMap, Json<GetCountryDto>), AppError> {
    let repo = CountriesRepository::new(state.db.clone());
    let country: GetCountryDto = repo.add_mapped(payload).await?;
    info!(id = country.id, "country created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/countries/{}", country.id).parse().unwrap(),
    );

    Ok((StatusCode::CREATED, headers, Json(country)))
}

#[instrument(skip(state, _admin))]
pub async fn delete_country(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = CountriesRepository::new(state.db.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Claims;

    fn bearer(roles: &[&str]) -> AuthUser {
        AuthUser(Claims {
            sub: "a@b.com".into(),
            jti: "test-jti".into(),
            email: "a@b.com".into(),
            uid: uuid::Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iat: 0,
            exp: usize::MAX,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        })
    }

    #[tokio::test]
    async fn put_with_mismatched_id_is_rejected_before_any_store_access() {
        // The lazy fake pool would error on any query; the guard must fire first.
        let state = AppState::fake();
        let payload = UpdateCountryDto {
            id: 6,
            name: "Jamaica".into(),
            short_name: None,
        };

        let err = put_country(State(state), bearer(&["User"]), Path(5), Json(payload))
            .await
            .unwrap_err();

        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "Invalid record Id"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
