use crate::model::{Principal, Role};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// The identity collaborator's view of a request. Token verification happens
/// upstream; by the time a request reaches this service the gateway has
/// translated the token into plain headers:
///
/// - `x-user-id`: the principal's identifier
/// - `x-user-role`: `user` (default) or `admin`
///
/// Absent headers mean an unauthenticated context, which is only accepted by
/// resources with no ownership restriction.
#[derive(Debug, Clone)]
pub struct AuthContext(pub Option<Principal>);

impl AuthContext {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthContext(principal_from_headers(&parts.headers)))
    }
}

fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let id = header_value(headers, "x-user-id")?;
    let role = header_value(headers, "x-user-role")
        .map(|value| Role::from_header(&value))
        .unwrap_or(Role::User);
    Some(Principal { id, role })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
