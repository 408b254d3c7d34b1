//! Lyrics pagination handler

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};

use songbook_query::CoupletPage;
use songbook_query::query::parse_count;

use super::bad_id;
use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/songs/{id}/text?page=&limit=`
pub async fn song_text(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<CoupletPage>> {
    let Path(id) = id.map_err(bad_id)?;
    let page = count_param(&params, "page")?;
    let limit = count_param(&params, "limit")?;
    Ok(Json(state.catalog.lyrics(id, page, limit).await?))
}

fn count_param(params: &HashMap<String, String>, name: &str) -> songbook_query::QueryResult<Option<u64>> {
    params
        .get(name)
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_count(name, v))
        .transpose()
}
