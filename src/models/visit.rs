use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// One recorded hit of the root endpoint. Both fields are assigned by the
/// database; rows are never updated after insert.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub visited_at: NaiveDateTime,
}
