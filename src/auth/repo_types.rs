use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                        // unique user ID
    pub email: String,                   // user email, unique among live users
    pub name: String,                    // display name
    #[serde(skip_serializing)]
    pub password_hash: String,           // Argon2 hash, not exposed in JSON
    pub avatar: Option<String>,          // short avatar marker
    pub created_at: OffsetDateTime,      // creation timestamp
    pub updated_at: OffsetDateTime,      // last update timestamp
    #[serde(skip_serializing)]
    pub deleted_at: Option<OffsetDateTime>, // soft-delete marker
}

/// Fields needed to insert a user; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

/// Outcome of inserting a user.
#[derive(Debug)]
pub enum CreateUser {
    Created(User),
    /// A live user already holds the email (unique index violation).
    ConflictExists,
}
