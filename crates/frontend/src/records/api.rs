use contracts::records::{DeleteRecordsRequest, DeleteRecordsResponse};
use contracts::shared::data_table::{FetchParams, PageResult};
use gloo_net::http::Request;

use crate::shared::api_utils::api_url;

/// Fetch one page of records
pub async fn fetch_records(params: FetchParams) -> Result<PageResult, String> {
    let query = serde_qs::to_string(&params)
        .map_err(|e| format!("Failed to encode query: {}", e))?;

    let response = Request::get(&format!("{}?{}", api_url("/api/records"), query))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Failed to fetch records: {}", response.status()));
    }

    response
        .json::<PageResult>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Delete records by id
pub async fn delete_records(ids: Vec<String>) -> Result<usize, String> {
    let response = Request::post(&api_url("/api/records/delete"))
        .json(&DeleteRecordsRequest { ids })
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Failed to delete records: {}", response.status()));
    }

    let result: DeleteRecordsResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    Ok(result.deleted)
}
