//! CRUD for job listings.

use super::{database_error, json, not_found, redirect};
use crate::context::{Form, RequestContext};
use axum::http::StatusCode;
use axum::response::Response;
use jobboard::{Bindings, Database, GenericClient, Params, Record, Value, qb};

/// Form fields a listing may be created or updated with.
pub const ALLOWED_FIELDS: &[&str] = &[
    "title",
    "description",
    "salary",
    "tags",
    "company",
    "address",
    "city",
    "state",
    "phone",
    "email",
    "requirements",
    "benefits",
];

/// Owner assigned to new listings until sessions exist.
const DEFAULT_USER_ID: i64 = 1;

const NOT_FOUND: &str = "Listing not found";

/// Trim and HTML-escape user input.
pub fn sanitize(input: &str) -> String {
    let input = input.trim();
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Allowed, sanitized fields of `form` in column order. Blank values become NULL.
fn listing_fields(form: &Form) -> Vec<(&'static str, Value)> {
    ALLOWED_FIELDS
        .iter()
        .filter_map(|&field| {
            let value = sanitize(form.get(field)?);
            let value = if value.is_empty() {
                Value::Null
            } else {
                Value::Text(value)
            };
            Some((field, value))
        })
        .collect()
}

fn listing_id(params: &Params) -> Option<i64> {
    params.get("id")?.parse().ok()
}

async fn find<C: GenericClient>(db: &Database<C>, id: i64) -> jobboard::Result<Option<Record>> {
    qb::table("listings").where_("id", "=", id).first(db).await
}

pub async fn index<C: GenericClient>(ctx: RequestContext<C>) -> Response {
    match ctx.db.query("SELECT * FROM listings", &Bindings::new()).await {
        Ok(mut rows) => json(StatusCode::OK, json!({ "listings": rows.fetch_all() })),
        Err(e) => database_error(e),
    }
}

pub async fn create<C: GenericClient>(_ctx: RequestContext<C>) -> Response {
    json(
        StatusCode::OK,
        json!({ "view": "listings/create", "fields": ALLOWED_FIELDS }),
    )
}

pub async fn show<C: GenericClient>(ctx: RequestContext<C>, params: Params) -> Response {
    let Some(id) = listing_id(&params) else {
        return not_found(NOT_FOUND);
    };
    match find(&ctx.db, id).await {
        Ok(Some(listing)) => json(StatusCode::OK, json!({ "listing": listing })),
        Ok(None) => not_found(NOT_FOUND),
        Err(e) => database_error(e),
    }
}

pub async fn edit<C: GenericClient>(ctx: RequestContext<C>, params: Params) -> Response {
    let Some(id) = listing_id(&params) else {
        return not_found(NOT_FOUND);
    };
    match find(&ctx.db, id).await {
        Ok(Some(listing)) => json(
            StatusCode::OK,
            json!({ "view": "listings/edit", "listing": listing, "fields": ALLOWED_FIELDS }),
        ),
        Ok(None) => not_found(NOT_FOUND),
        Err(e) => database_error(e),
    }
}

pub async fn store<C: GenericClient>(ctx: RequestContext<C>) -> Response {
    let mut fields = listing_fields(&ctx.form);
    fields.push(("user_id", Value::Int(DEFAULT_USER_ID)));

    let columns: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    let sql = format!(
        "INSERT INTO listings ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    let bindings: Bindings = fields.into_iter().collect();

    match ctx.db.execute(&sql, &bindings).await {
        Ok(_) => {
            tracing::info!(columns = columns.len(), "listing created");
            redirect("/listings")
        }
        Err(e) => database_error(e),
    }
}

pub async fn update<C: GenericClient>(ctx: RequestContext<C>, params: Params) -> Response {
    let Some(id) = listing_id(&params) else {
        return not_found(NOT_FOUND);
    };
    let fields = listing_fields(&ctx.form);
    let target = format!("/listings/{id}");
    if fields.is_empty() {
        return redirect(&target);
    }

    let assignments: Vec<String> = fields
        .iter()
        .map(|(name, _)| format!("{name} = :{name}"))
        .collect();
    let sql = format!(
        "UPDATE listings SET {} WHERE id = :id",
        assignments.join(", ")
    );
    let bindings: Bindings = fields.into_iter().collect::<Bindings>().bind("id", id);

    match ctx.db.execute(&sql, &bindings).await {
        Ok(0) => not_found(NOT_FOUND),
        Ok(_) => redirect(&target),
        Err(e) => database_error(e),
    }
}

pub async fn destroy<C: GenericClient>(ctx: RequestContext<C>, params: Params) -> Response {
    let Some(id) = listing_id(&params) else {
        return not_found(NOT_FOUND);
    };
    let deleted = ctx
        .db
        .execute(
            "DELETE FROM listings WHERE id = :id",
            &Bindings::new().bind("id", id),
        )
        .await;

    match deleted {
        Ok(0) => not_found(NOT_FOUND),
        Ok(_) => {
            tracing::info!(id, "listing deleted");
            redirect("/listings")
        }
        Err(e) => database_error(e),
    }
}
