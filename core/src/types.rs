//! Request and response records for the Cureat endpoints.
//!
//! # Design
//! Every response field the backend may omit is `Option` or `#[serde(default)]`
//! here, so defaults (empty restaurant list, placeholder profile) are applied
//! once at the boundary. Unknown fields are kept in `extra` maps rather than
//! dropped.
//!
//! Backend records (`user`, restaurants) are decoded field by field from
//! `Value`: a field of the wrong type falls back to its default and the raw
//! value is kept in `extra`, so one odd field never fails the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Username shown until the backend tells us who is logged in.
pub const PLACEHOLDER_USERNAME: &str = "사용자";

/// Profile of the logged-in user. Only `username` is guaranteed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn placeholder() -> Self {
        Self {
            username: PLACEHOLDER_USERNAME.to_string(),
            email: None,
            extra: Map::new(),
        }
    }

    /// Read a backend `user` record. `username` wins over `name`; when
    /// neither is a string the placeholder name is used. Returns `None` for
    /// anything that is not a JSON object.
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(mut extra) = value else {
            return None;
        };
        let username = take_string(&mut extra, "username")
            .or_else(|| take_string(&mut extra, "name"))
            .unwrap_or_else(|| PLACEHOLDER_USERNAME.to_string());
        let email = take_string(&mut extra, "email");
        Some(Self { username, email, extra })
    }
}

/// `POST /token` response. Older backends send `token` instead of
/// `access_token`. `user` stays raw until the session decides what to do
/// with it.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token: Option<String>,
    pub token_type: Option<String>,
    pub user: Option<Value>,
}

impl From<Map<String, Value>> for TokenResponse {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            access_token: take_string(&mut map, "access_token"),
            token: take_string(&mut map, "token"),
            token_type: take_string(&mut map, "token_type"),
            user: map.remove("user").filter(|user| !user.is_null()),
        }
    }
}

impl TokenResponse {
    /// `access_token` if non-empty, else `token` if non-empty.
    pub fn bearer(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}

/// `POST /users/signup` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub birthdate: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub interests: String,
    pub allergies: bool,
    pub password: String,
}

/// `POST /recommendations` payload.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRequest<'a> {
    pub user_id: i64,
    pub prompt: &'a str,
}

/// One recommended restaurant, in backend order.
///
/// `id` may arrive as a string or a number. A non-object list entry becomes
/// an unnamed restaurant with the raw entry under `extra["value"]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Value")]
pub struct Restaurant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Value> for Restaurant {
    fn from(value: Value) -> Self {
        let mut extra = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let id = match extra.get("id") {
            Some(Value::Number(n)) => {
                let id = n.to_string();
                extra.remove("id");
                Some(id)
            }
            _ => take_string(&mut extra, "id"),
        };
        Self {
            id,
            name: take_string(&mut extra, "name").unwrap_or_default(),
            category: take_string(&mut extra, "category"),
            location: take_string(&mut extra, "location"),
            description: take_string(&mut extra, "description"),
            extra,
        }
    }
}

/// `POST /recommendations` response, defaults applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restaurants: Vec<Restaurant>,
}

/// `POST /date-course` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateCourseRequest {
    pub user_id: i64,
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub theme: String,
}

/// Backend answer to a date-course request, passed through untouched.
pub type DateCourseResult = Value;

/// `POST /search-log` payload.
#[derive(Debug, Clone, Serialize)]
pub struct SearchLogRequest<'a> {
    pub query: &'a str,
}

/// Remove `key` if it holds a string and return it. Nulls are dropped; any
/// other type is left in `map`.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) | Some(Value::Null) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Restaurant>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Restaurant>>::deserialize(deserializer)?.unwrap_or_default())
}
