//! HTTP surface: a single GraphQL endpoint plus health checks.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Html;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::auth::rules::{BearerToken, ClientUserAgent};
use crate::graphql::ApiSchema;
use crate::state::ApiContext;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    schema: ApiSchema,
    ctx: ApiContext,
}

/// Build the application router.
pub fn router(schema: ApiSchema, ctx: ApiContext) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { schema, ctx })
}

/// Execute a GraphQL request, threading the caller's bearer token and
/// user agent into the request data for the resolvers.
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(token) = auth::bearer_token(&headers) {
        request = request.data(BearerToken(token));
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);
    request = request.data(ClientUserAgent(user_agent));

    state.schema.execute(request).await.into()
}

/// Serve the GraphiQL IDE.
async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Liveness check.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness check: verifies database connectivity.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.ctx.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
