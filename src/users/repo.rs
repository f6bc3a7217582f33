use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A stored user row. Passwords are kept in clear text, matching the
/// upstream system this demo reproduces.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

/// Every stored user, in insertion order.
pub async fn fetch_all(db: &SqlitePool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, password, first_name, middle_name, last_name
        FROM users
        ORDER BY user_id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Equality lookup by username. The schema does not make usernames unique,
/// so duplicates resolve to the lowest user_id.
pub async fn fetch_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, password, first_name, middle_name, last_name
        FROM users
        WHERE username = ?
        ORDER BY user_id
        LIMIT 1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(user)
}
