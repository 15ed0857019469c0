//! TODO REST API: wire types and the HTTP client.

pub mod client;
pub mod types;

pub use client::{CORRELATION_HEADER, TodoClient, new_correlation_id};
pub use types::{NewTodo, SORT_KEY_PREFIX, TodoItem, TodoPatch, sort_key, todo_id};
