use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract::Query, Json};
use contracts::records::{DeleteRecordsRequest, DeleteRecordsResponse};
use contracts::shared::data_table::{FetchParams, PageResult};
use serde_json::json;
use thiserror::Error;

use crate::domain::records::repository::{get_store, RecordStore};
use crate::domain::records::service;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("record store is not initialized")]
    StoreUnavailable,
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Records API error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn store() -> Result<&'static RecordStore, ApiError> {
    get_store().ok_or(ApiError::StoreUnavailable)
}

/// GET /api/records
pub async fn list(Query(params): Query<FetchParams>) -> Result<Json<PageResult>, ApiError> {
    let store = store()?;
    let result = service::query_page(store, &params);
    tracing::debug!(
        page = params.page,
        items_per_page = params.items_per_page,
        sort_field = ?params.sort_field,
        search = %params.search_term,
        returned = result.items.len(),
        "records page"
    );
    Ok(Json(result))
}

/// POST /api/records/delete
pub async fn delete(
    Json(request): Json<DeleteRecordsRequest>,
) -> Result<Json<DeleteRecordsResponse>, ApiError> {
    if request.ids.is_empty() {
        return Err(ApiError::BadRequest("ids must not be empty".to_string()));
    }
    let store = store()?;
    let deleted = service::delete_records(store, &request.ids);
    tracing::info!("Deleted {} of {} requested records", deleted, request.ids.len());
    Ok(Json(DeleteRecordsResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::repository::{demo_rows, initialize_store};

    fn ensure_store() {
        // тесты делят одно глобальное хранилище; повторная инициализация игнорируется
        let _ = initialize_store(RecordStore::new(demo_rows(30), 20));
    }

    #[tokio::test]
    async fn test_list_returns_page_with_meta() {
        ensure_store();
        let params = FetchParams {
            page: 2,
            items_per_page: 50,
            ..FetchParams::default()
        };
        let Json(result) = list(Query(params)).await.unwrap();
        let meta = result.meta.unwrap();
        assert_eq!(meta.items_per_page, 20);
        assert_eq!(meta.current_page, 2);
        assert!(!result.items.is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_ids() {
        ensure_store();
        let err = delete(Json(DeleteRecordsRequest::default())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let response = ApiError::StoreUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
