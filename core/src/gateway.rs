//! Typed wrappers over the recommendation endpoints.
//!
//! Failures are collapsed into `SearchError` / `CourseCreationError` with a
//! fixed user-facing message; the underlying `ApiError` is logged here and
//! then dropped.

use serde_json::Value;
use tracing::{error, info};

use crate::client::HttpJsonClient;
use crate::error::{ApiError, CourseCreationError, SearchError};
use crate::http::HttpMethod;
use crate::types::{DateCourseRequest, DateCourseResult, RecommendationRequest, SearchLogRequest, SearchResult};

const RECOMMENDATIONS_PATH: &str = "/recommendations";
const DATE_COURSE_PATH: &str = "/date-course";
const SEARCH_LOG_PATH: &str = "/search-log";

pub const SEARCH_FAILED: &str = "검색 오류가 발생했습니다.";
pub const SEARCH_LOG_FAILED: &str = "통신 오류가 발생했습니다.";
pub const COURSE_FAILED: &str = "데이트 코스 생성에 실패했습니다.";

#[derive(Debug, Clone)]
pub struct SearchGateway {
    client: HttpJsonClient,
}

impl SearchGateway {
    pub fn new(client: HttpJsonClient) -> Self {
        Self { client }
    }

    /// Ask for recommendations. A blank prompt yields an empty result without
    /// touching the network. Restaurant order is the backend's.
    pub async fn search(&self, prompt: &str, user_id: i64) -> Result<SearchResult, SearchError> {
        if prompt.trim().is_empty() {
            info!("empty search prompt, skipping request");
            return Ok(SearchResult::default());
        }

        let request = RecommendationRequest { user_id, prompt };
        let value = self
            .client
            .request_json(HttpMethod::Post, RECOMMENDATIONS_PATH, Some(&request), &[])
            .await
            .map_err(|e| search_failed(e, SEARCH_FAILED))?;

        let result = match value {
            Value::Null => SearchResult::default(),
            other => serde_json::from_value(other)
                .map_err(|e| search_failed(ApiError::Decode(e.to_string()), SEARCH_FAILED))?,
        };
        info!(count = result.restaurants.len(), "search completed");
        Ok(result)
    }

    /// Record a raw search query. A blank query is ignored and returns `None`.
    pub async fn save_search_log(&self, query: &str) -> Result<Option<Value>, SearchError> {
        if query.trim().is_empty() {
            info!("empty search query, nothing to log");
            return Ok(None);
        }

        let value = self
            .client
            .request_json(HttpMethod::Post, SEARCH_LOG_PATH, Some(&SearchLogRequest { query }), &[])
            .await
            .map_err(|e| search_failed(e, SEARCH_LOG_FAILED))?;
        Ok(Some(value))
    }

    /// Request a date course. The backend payload is returned untouched.
    pub async fn create_date_course(
        &self,
        request: &DateCourseRequest,
    ) -> Result<DateCourseResult, CourseCreationError> {
        self.client
            .request_json(HttpMethod::Post, DATE_COURSE_PATH, Some(request), &[])
            .await
            .map_err(|e| {
                error!(error = %e, "date course request failed");
                CourseCreationError::new(COURSE_FAILED)
            })
    }
}

fn search_failed(cause: ApiError, message: &str) -> SearchError {
    error!(error = %cause, "search request failed");
    SearchError::new(message)
}
