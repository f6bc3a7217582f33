use serde::Serialize;

use super::repo::User;

/// Plain-data projection of a stored user, as returned over HTTP.
///
/// The password field travels in clear text because the API contract this
/// demo reproduces exposes it. Do not reuse this shape outside the demo.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            password: user.password,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
        }
    }
}
