use super::{database_error, json};
use crate::context::RequestContext;
use axum::http::StatusCode;
use axum::response::Response;
use jobboard::{GenericClient, qb};

/// Number of listings on the home page.
pub const LATEST_LIMIT: u64 = 6;

/// Latest listings, newest first.
pub async fn index<C: GenericClient>(ctx: RequestContext<C>) -> Response {
    let latest = qb::table("listings")
        .order_by_desc("created_at")
        .limit(LATEST_LIMIT)
        .get(&ctx.db)
        .await;

    match latest {
        Ok(listings) => json(StatusCode::OK, json!({ "listings": listings })),
        Err(e) => database_error(e),
    }
}
