use anyhow::Context;
use sqlx::SqlitePool;
use tracing::info;

pub struct FixtureUser {
    pub username: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub middle_name: &'static str,
    pub last_name: &'static str,
}

/// The two demo records the service ships with, inserted in this order.
pub const USERS: [FixtureUser; 2] = [
    FixtureUser {
        username: "myemail@email.com",
        password: "superSecretPass",
        first_name: "Chamoy",
        middle_name: "Ray",
        last_name: "Douglas",
    },
    FixtureUser {
        username: "youremail@email.com",
        password: "1234pass",
        first_name: "Lucia",
        middle_name: "",
        last_name: "Lu",
    },
];

/// Drops and recreates the users table, then inserts the fixtures, all in
/// one transaction.
///
/// Destructive. Must not run against a pool that is serving traffic.
pub async fn rebuild(db: &SqlitePool) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin seed transaction")?;

    sqlx::query("DROP TABLE IF EXISTS users")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE users (
            user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL,
            password    TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            middle_name TEXT NOT NULL,
            last_name   TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    for user in &USERS {
        sqlx::query(
            r#"
            INSERT INTO users (username, password, first_name, middle_name, last_name)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.username)
        .bind(user.password)
        .bind(user.first_name)
        .bind(user.middle_name)
        .bind(user.last_name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.context("commit seed transaction")?;
    info!(count = USERS.len(), "users table rebuilt");
    Ok(())
}
