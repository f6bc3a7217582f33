pub mod middleware;
pub mod verifiers;

pub use verifiers::{verify_token, verify_user_pass, ScopeGrant};
