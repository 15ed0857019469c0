//! Wire types for the TODO REST API.

use serde::{Deserialize, Deserializer, Serialize};

/// Type tag the server prefixes every sort key with.
pub const SORT_KEY_PREFIX: &str = "TODO#";

/// Strips the type tag from a sort key (`TODO#01HX..` -> `01HX..`).
pub fn todo_id(sort_key: &str) -> &str {
    sort_key.strip_prefix(SORT_KEY_PREFIX).unwrap_or(sort_key)
}

/// Accepts either a bare id or a full sort key and returns the sort key.
pub fn sort_key(id_or_key: &str) -> String {
    if id_or_key.starts_with(SORT_KEY_PREFIX) {
        id_or_key.to_string()
    } else {
        format!("{SORT_KEY_PREFIX}{id_or_key}")
    }
}

/// A TODO item as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(rename = "SK")]
    pub sort_key: String,
    pub todo_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub todo_details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub todo_date: String,
    #[serde(rename = "PK", default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TodoItem {
    pub fn id(&self) -> &str {
        todo_id(&self.sort_key)
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    pub user_email: String,
    pub todo_title: String,
    pub todo_details: String,
    pub todo_date: String,
}

/// Body of `PATCH /todos/<id>`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

impl TodoPatch {
    pub fn done(done: bool) -> Self {
        Self {
            is_done: Some(done),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.todo_title.is_none()
            && self.todo_details.is_none()
            && self.todo_date.is_none()
            && self.is_done.is_none()
    }
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The server stores `is_done` as a string ("True"/"False") but may also send
/// a JSON bool.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrText {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<BoolOrText>::deserialize(deserializer)? {
        Some(BoolOrText::Bool(b)) => b,
        Some(BoolOrText::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}
