use admitdesk_auth::{Claims, verify_token};
use admitdesk_core::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::metrics::track_jwt_validation;
use crate::state::AppState;

/// Claims of the administrator making the request.
///
/// Inserted into request extensions by [`require_admin`]; handlers behind
/// that layer can take it as an argument.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Claims);

impl AuthAdmin {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthAdmin>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Unauthorized access".to_string()))
    }
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::auth::require_admin;
///
/// let admin_routes = Router::new()
///     .route("/summary-stats", get(get_summary_stats))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Response {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::unauthorized("Unauthorized access".to_string()).into_response();
    };

    match verify_token(bearer.token(), &state.jwt_config) {
        Ok(claims) => {
            track_jwt_validation(true);
            req.extensions_mut().insert(AuthAdmin(claims));
            next.run(req).await
        }
        Err(err) => {
            track_jwt_validation(false);
            err.into_response()
        }
    }
}
