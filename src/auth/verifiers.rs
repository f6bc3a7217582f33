use sqlx::SqlitePool;

use crate::users::repo;

/// Scopes granted to an authenticated caller, normalized to a list of
/// scope names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeGrant(Vec<String>);

impl ScopeGrant {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scopes.into_iter().map(Into::into).collect())
    }

    /// True when every required scope is part of the grant.
    pub fn covers(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.0.contains(scope))
    }

    pub fn scopes(&self) -> &[String] {
        &self.0
    }
}

/// HTTP Basic verifier: exact string comparison of the supplied password
/// against the stored one. Success grants "read write".
pub async fn verify_user_pass(
    db: &SqlitePool,
    username: &str,
    password: &str,
    required_scopes: &[String],
) -> anyhow::Result<Option<ScopeGrant>> {
    let Some(user) = repo::fetch_by_username(db, username).await? else {
        return Ok(None);
    };
    if user.password != password {
        return Ok(None);
    }
    let grant = ScopeGrant::new(["read", "write"]);
    if !grant.covers(required_scopes) {
        return Ok(None);
    }
    Ok(Some(grant))
}

/// Bearer verifier: two literal tokens are recognized, everything else is
/// rejected.
pub fn verify_token(token: &str, required_scopes: &[String]) -> Option<ScopeGrant> {
    let grant = match token {
        "read-token" => ScopeGrant::new(["read"]),
        "write-token" => ScopeGrant::new(["read", "write"]),
        _ => return None,
    };
    grant.covers(required_scopes).then_some(grant)
}
