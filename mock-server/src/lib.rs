use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Accounts accepted by `POST /token`: (email, password, response body).
const ACCOUNTS: &[(&str, &str, &str)] = &[
    ("a@b.com", "pw", r#"{"access_token":"T1","token_type":"bearer"}"#),
    ("legacy@b.com", "pw", r#"{"token":"T2","user":{"username":"legacy","email":"legacy@b.com"}}"#),
    ("notoken@b.com", "pw", r#"{"token_type":"bearer"}"#),
];

/// The only user id the recommendation endpoints know.
pub const KNOWN_USER_ID: i64 = 1;

/// Prompts containing this word get a response without `restaurants`.
pub const EMPTY_PROMPT_MARKER: &str = "nothing";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub category: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
pub struct RecommendationRequest {
    pub user_id: Option<i64>,
    pub prompt: String,
}

#[derive(Deserialize, Serialize)]
pub struct CourseRequest {
    pub user_id: Option<i64>,
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub theme: String,
}

#[derive(Deserialize)]
pub struct SearchLogRequest {
    pub query: String,
}

#[derive(Default)]
pub struct MockState {
    pub registered: HashSet<String>,
    pub search_logs: Vec<String>,
}

pub type Db = Arc<RwLock<MockState>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

/// Router sharing `db`, so tests can inspect what the server recorded.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/token", post(token))
        .route("/users/signup", post(signup))
        .route("/recommendations", post(recommendations))
        .route("/date-course", post(date_course))
        .route("/search-log", post(search_log))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn canned_restaurants() -> Vec<Restaurant> {
    vec![
        Restaurant {
            id: "1".to_string(),
            name: "스시 오마카세".to_string(),
            category: "일식".to_string(),
            location: "서울 강남구".to_string(),
        },
        Restaurant {
            id: "2".to_string(),
            name: "한정식 다온".to_string(),
            category: "한식".to_string(),
            location: "서울 서초구".to_string(),
        },
    ]
}

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "message": "Cureat API is running!"}))
}

async fn token(mut multipart: Multipart) -> ApiResult {
    let mut username = None;
    let mut password = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.to_string()))?;
        match name.as_str() {
            "username" => username = Some(value),
            "password" => password = Some(value),
            _ => {}
        }
    }

    let (Some(username), Some(password)) = (username, password) else {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "username and password are required"));
    };

    ACCOUNTS
        .iter()
        .find(|(email, pw, _)| *email == username && *pw == password)
        .and_then(|(_, _, body)| serde_json::from_str(body).ok())
        .map(Json)
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "bad credentials"))
}

async fn signup(State(db): State<Db>, Json(input): Json<SignupRequest>) -> ApiResult {
    let mut state = db.write().await;
    if !state.registered.insert(input.email.clone()) {
        return Err(detail(StatusCode::BAD_REQUEST, "이미 등록된 이메일입니다."));
    }
    let mut user = input.rest;
    user.insert("name".to_string(), json!(input.name));
    user.insert("email".to_string(), json!(input.email));
    Ok(Json(json!({"success": true, "message": "회원가입 성공", "user": user})))
}

async fn recommendations(State(db): State<Db>, Json(input): Json<RecommendationRequest>) -> ApiResult {
    if let Some(user_id) = input.user_id {
        if user_id != KNOWN_USER_ID {
            return Err(detail(StatusCode::NOT_FOUND, "요청한 사용자를 찾을 수 없습니다."));
        }
        db.write().await.search_logs.push(input.prompt.clone());
    }
    if input.prompt.contains(EMPTY_PROMPT_MARKER) {
        return Ok(Json(json!({"answer": "조건에 맞는 맛집을 찾지 못했습니다."})));
    }
    Ok(Json(json!({
        "answer": format!("'{}'에 대한 추천입니다.", input.prompt),
        "restaurants": canned_restaurants(),
    })))
}

async fn date_course(Json(input): Json<CourseRequest>) -> ApiResult {
    if input.user_id.is_some_and(|id| id != KNOWN_USER_ID) {
        return Err(detail(StatusCode::NOT_FOUND, "사용자를 찾을 수 없습니다."));
    }
    Ok(Json(json!({
        "success": true,
        "message": "데이트 코스가 생성되었습니다.",
        "course": {
            "request": input,
            "steps": canned_restaurants(),
        },
    })))
}

async fn search_log(State(db): State<Db>, Json(input): Json<SearchLogRequest>) -> Json<Value> {
    db.write().await.search_logs.push(input.query);
    Json(json!({"message": "검색 로그가 저장되었습니다."}))
}
