//! Request dispatch through the route table with a scripted database.

use axum::http::StatusCode;
use axum::response::Response;
use jobboard::tokio_postgres::types::{IsNull, ToSql, Type};
use jobboard::{Database, GenericClient, Record, Result};
use jobboard_server::dispatch;
use jobboard_server::routes::{self, AppRouter};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Reply {
    Rows(Vec<Record>),
    Affected(u64),
}

/// Replays queued replies in order and records each statement with its text-rendered parameters.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, Vec<Option<String>>)>>,
}

impl ScriptedClient {
    fn rows(self, rows: Vec<Record>) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Rows(rows));
        self
    }

    fn affected(self, n: u64) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Affected(n));
        self
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Option<Reply> {
        let params = params
            .iter()
            .map(|p| {
                let mut buf = bytes::BytesMut::new();
                match p.to_sql_checked(&Type::TEXT, &mut buf).unwrap() {
                    IsNull::Yes => None,
                    IsNull::No => Some(String::from_utf8(buf.to_vec()).unwrap()),
                }
            })
            .collect();
        self.calls.lock().unwrap().push((sql.to_string(), params));
        self.replies.lock().unwrap().pop_front()
    }
}

impl GenericClient for ScriptedClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Record>> {
        Ok(match self.record(sql, params) {
            Some(Reply::Rows(rows)) => rows,
            _ => Vec::new(),
        })
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        Ok(match self.record(sql, params) {
            Some(Reply::Affected(n)) => n,
            _ => 0,
        })
    }
}

struct Harness {
    router: AppRouter<Arc<ScriptedClient>>,
    client: Arc<ScriptedClient>,
}

impl Harness {
    fn new(client: ScriptedClient) -> Self {
        Self {
            router: routes::build(),
            client: Arc::new(client),
        }
    }

    async fn send(&self, method: &str, path: &str, body: &str) -> Response {
        let db = Database::new(Arc::clone(&self.client));
        dispatch(&self.router, db, method, path, body.as_bytes()).await
    }

    fn calls(&self) -> Vec<(String, Vec<Option<String>>)> {
        self.client.calls.lock().unwrap().clone()
    }
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn listing(id: i64, title: &str) -> Record {
    Record::new().with("id", id).with("title", title)
}

#[tokio::test]
async fn home_shows_latest_six() {
    let h = Harness::new(ScriptedClient::default().rows(vec![listing(2, "B"), listing(1, "A")]));

    let response = h.send("GET", "/", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["listings"][0]["title"], "B");

    assert_eq!(
        h.calls()[0].0,
        "SELECT * FROM listings ORDER BY created_at DESC LIMIT 6"
    );
}

#[tokio::test]
async fn show_finds_listing_by_id() {
    let h = Harness::new(ScriptedClient::default().rows(vec![listing(42, "Rust Dev")]));

    let response = h.send("GET", "/listings/42", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["listing"]["id"], 42);

    let calls = h.calls();
    assert_eq!(calls[0].0, "SELECT * FROM listings WHERE id = $1 LIMIT 1");
    assert_eq!(calls[0].1, vec![Some("42".to_string())]);
}

#[tokio::test]
async fn show_missing_listing_is_404() {
    let h = Harness::new(ScriptedClient::default());

    let response = h.send("GET", "/listings/7", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Listing not found");
}

#[tokio::test]
async fn non_numeric_id_is_404_without_query() {
    let h = Harness::new(ScriptedClient::default());
    let response = h.send("GET", "/listings/abc", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn unknown_path_uses_not_found_handler() {
    let h = Harness::new(ScriptedClient::default());

    for (method, path) in [("GET", "/jobs"), ("GET", "/listings/1/extra"), ("PATCH", "/listings/1")] {
        let response = h.send(method, path, "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Page not found");
    }
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn store_inserts_allowed_fields_and_redirects() {
    let h = Harness::new(ScriptedClient::default().affected(1));

    let response = h
        .send(
            "POST",
            "/listings",
            "title=%3Cb%3ERust%3C%2Fb%3E&salary=90000&user_id=7&is_admin=1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/listings");

    let calls = h.calls();
    assert_eq!(
        calls[0].0,
        "INSERT INTO listings (title, salary, user_id) VALUES ($1, $2, $3)"
    );
    assert_eq!(
        calls[0].1,
        vec![
            Some("&lt;b&gt;Rust&lt;/b&gt;".to_string()),
            Some("90000".to_string()),
            Some("1".to_string()),
        ]
    );
}

#[tokio::test]
async fn method_override_routes_to_update() {
    let h = Harness::new(ScriptedClient::default().affected(1));

    let response = h
        .send("POST", "/listings/5", "_method=PUT&title=Staff+Engineer&city=Boston")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/listings/5");

    let calls = h.calls();
    assert_eq!(
        calls[0].0,
        "UPDATE listings SET title = $1, city = $2 WHERE id = $3"
    );
    assert_eq!(calls[0].1[2], Some("5".to_string()));
}

#[tokio::test]
async fn delete_of_missing_listing_is_404() {
    let h = Harness::new(ScriptedClient::default().affected(0));
    let response = h.send("POST", "/listings/9", "_method=DELETE").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(h.calls()[0].0, "DELETE FROM listings WHERE id = $1");
}

#[tokio::test]
async fn delete_redirects_to_index() {
    let h = Harness::new(ScriptedClient::default().affected(1));
    let response = h.send("DELETE", "/listings/9/", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/listings");
}
