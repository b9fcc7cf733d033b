use crate::context::RequestContext;
use crate::controllers::{HandlerFuture, boxed, home, listings, not_found};
use jobboard::{GenericClient, Router};

pub type AppRouter<C> = Router<RequestContext<C>, HandlerFuture>;

/// The job board route table.
pub fn build<C: GenericClient + 'static>() -> AppRouter<C> {
    let mut router: AppRouter<C> =
        Router::new(|_ctx: RequestContext<C>| boxed(async { not_found("Page not found") }));

    router
        .get("/", |ctx, _| boxed(home::index(ctx)))
        .get("/listings", |ctx, _| boxed(listings::index(ctx)))
        .post("/listings", |ctx, _| boxed(listings::store(ctx)))
        .get("/listings/create", |ctx, _| boxed(listings::create(ctx)))
        .get("/listings/{id}", |ctx, params| boxed(listings::show(ctx, params)))
        .get("/listings/edit/{id}", |ctx, params| boxed(listings::edit(ctx, params)))
        .put("/listings/{id}", |ctx, params| boxed(listings::update(ctx, params)))
        .delete("/listings/{id}", |ctx, params| boxed(listings::destroy(ctx, params)));

    router
}
