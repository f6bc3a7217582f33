use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use tracing::{debug, error, warn};

use crate::apispec::{Requirement, SchemeKind};
use crate::state::AppState;

use super::verifiers::{verify_token, verify_user_pass, ScopeGrant};

/// Per-request security dispatch.
///
/// Looks the matched route up in the OpenAPI document and runs the verifier
/// named by its security requirement. Routes the document does not declare
/// pass through untouched, as do declared routes without a `security`
/// section. On success the grant is attached to the request extensions; on
/// failure the request is rejected with 401 before reaching the handler.
pub async fn require_security(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(route_path) = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
    else {
        // No matched route; let the router produce its 404.
        return next.run(req).await;
    };

    let Some(requirements) = state.spec.security_for(req.method(), &route_path) else {
        debug!(path = %route_path, "route not declared in OpenAPI document, skipping security");
        return next.run(req).await;
    };
    if requirements.is_empty() {
        return next.run(req).await;
    }

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let mut granted: Option<ScopeGrant> = None;
    for requirement in requirements {
        match check(&state, requirement, authorization.as_deref()).await {
            Ok(Some(grant)) => {
                granted = Some(grant);
                break;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, path = %route_path, "verifier failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        }
    }

    match granted {
        Some(grant) => {
            req.extensions_mut().insert(grant);
            next.run(req).await
        }
        None => {
            warn!(path = %route_path, "authentication failed");
            unauthorized(&state, requirements)
        }
    }
}

async fn check(
    state: &AppState,
    requirement: &Requirement,
    authorization: Option<&str>,
) -> anyhow::Result<Option<ScopeGrant>> {
    let Some(kind) = state.spec.scheme(&requirement.scheme) else {
        warn!(scheme = %requirement.scheme, "route references unknown security scheme");
        return Ok(None);
    };
    let Some(authorization) = authorization else {
        return Ok(None);
    };
    match kind {
        SchemeKind::Basic => {
            let Some((username, password)) = decode_basic(authorization) else {
                return Ok(None);
            };
            verify_user_pass(&state.db, &username, &password, &requirement.scopes).await
        }
        SchemeKind::Bearer => {
            let Some(token) = strip_scheme(authorization, "Bearer") else {
                return Ok(None);
            };
            Ok(verify_token(token, &requirement.scopes))
        }
    }
}

fn unauthorized(state: &AppState, requirements: &[Requirement]) -> Response {
    let challenge = requirements
        .iter()
        .find_map(|r| state.spec.scheme(&r.scheme))
        .map(|kind| match kind {
            SchemeKind::Basic => "Basic",
            SchemeKind::Bearer => "Bearer",
        })
        .unwrap_or("Bearer");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge)],
        "authentication failed",
    )
        .into_response()
}

/// Splits `Basic dXNlcjpwYXNz` into the credential pair.
fn decode_basic(authorization: &str) -> Option<(String, String)> {
    let encoded = strip_scheme(authorization, "Basic")?;
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

fn strip_scheme<'a>(authorization: &'a str, scheme: &str) -> Option<&'a str> {
    let (head, rest) = authorization.split_once(' ')?;
    head.eq_ignore_ascii_case(scheme).then_some(rest)
}
