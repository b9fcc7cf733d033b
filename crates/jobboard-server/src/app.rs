//! axum host: every request falls through to the job board router.

use crate::context::{Form, RequestContext, effective_method};
use crate::controllers::error_page;
use crate::routes::AppRouter;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use jobboard::{Database, GenericClient, Pool, PoolClient};
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub router: AppRouter<PoolClient>,
    pub pool: Pool,
}

impl AppState {
    pub fn new(router: AppRouter<PoolClient>, pool: Pool) -> Self {
        Self { router, pool }
    }
}

pub fn app(state: Arc<AppState>) -> axum::Router {
    axum::Router::new().fallback(serve).with_state(state)
}

async fn serve(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let client = match state.pool.get().await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to check out a database connection");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    dispatch(&state.router, Database::new(client), method.as_str(), uri.path(), &body).await
}

/// Decode the form body, apply `_method` overrides and route the request.
pub async fn dispatch<C: GenericClient + 'static>(
    router: &AppRouter<C>,
    db: Database<C>,
    method: &str,
    path: &str,
    body: &[u8],
) -> Response {
    let start = Instant::now();
    let form = Form::parse(body);
    let method = effective_method(method, &form);

    let response = router
        .route(RequestContext::new(db, form), &method, path)
        .await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}
