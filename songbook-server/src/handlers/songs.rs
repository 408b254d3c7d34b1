//! Song search and CRUD handlers

use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};

use songbook_query::{AddSongRequest, Song, SongFilter, SongsPage, UpdateSongRequest};

use super::bad_id;
use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/songs?song=&group=&releaseDate=&text=&link=&page=&limit=`
pub async fn search_songs(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<SongsPage>> {
    let filter = SongFilter::from_query_str(query.as_deref().unwrap_or_default())?;
    Ok(Json(state.catalog.search(&filter).await?))
}

/// `POST /api/v1/songs/add`
pub async fn add_song(
    State(state): State<AppState>,
    body: Result<Json<AddSongRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let Json(request) = body?;
    let song = state.catalog.add(&request).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// `GET /api/v1/songs/{id}`
pub async fn get_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Song>> {
    let Path(id) = id.map_err(bad_id)?;
    Ok(Json(state.catalog.get(id).await?))
}

/// `PUT /api/v1/songs/{id}`
pub async fn update_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let Path(id) = id.map_err(bad_id)?;
    let Json(request) = body?;
    let song = state.catalog.update(id, &request).await?;
    Ok((StatusCode::ACCEPTED, Json(song)))
}

/// `DELETE /api/v1/songs/{id}`
pub async fn delete_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id.map_err(bad_id)?;
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
