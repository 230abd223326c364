use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::pagination::{Page, PageRequest};
use crate::presentation::http::error::ApiError;

pub const OK_CODE: &str = "OK";

/// Body of every response: `{code, message, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: &'static str,
    pub message: String,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;
pub type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    with_message("success", data)
}

pub fn with_message<T: Serialize>(message: impl Into<String>, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: OK_CODE,
        message: message.into(),
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, with_message("created", data))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Items per page, capped at 100
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_data: i64,
    pub total_page: i64,
}

#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paged<T> {
    pub fn from_page<U: Into<T>>(page: Page<U>) -> Self {
        let page = page.map(Into::into);
        Self {
            pagination: PageMeta {
                page: page.page,
                limit: page.limit,
                total_data: page.total_data,
                total_page: page.total_page,
            },
            items: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let Json(body) = ok(vec![1, 2]);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["code"], "OK");
        assert_eq!(v["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn paged_carries_meta() {
        let page = Page::new(vec![1_i32, 2], PageRequest::new(Some(1), Some(2)), 3);
        let paged: Paged<i64> = Paged::from_page(page);
        let v = serde_json::to_value(&paged).unwrap();
        assert_eq!(v["items"], serde_json::json!([1, 2]));
        assert_eq!(v["pagination"]["total_page"], 2);
        assert_eq!(v["pagination"]["total_data"], 3);
    }
}
