use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{json, Value as JsonValue};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use bemlo_scraper::error::Error;
use bemlo_scraper::scraper::auth::BemloAuth;
use bemlo_scraper::scraper::fetcher::BemloFetcher;
use bemlo_scraper::scraper::ScrapeService;
use bemlo_scraper::services::notify_service::NotifyService;
use bemlo_scraper::services::vacancy_service::VacancyService;
use bemlo_scraper::AppState;

/// Stand-in for the Bemlo portal: SuperTokens sign-in plus the two GraphQL
/// operations the scraper issues.
#[derive(Clone)]
struct StubState {
    signin_attempts: Arc<AtomicUsize>,
    fail_first_logins: usize,
    fill_rate: Arc<Mutex<f64>>,
    listing_pages: usize,
    seen_cursors: Arc<Mutex<Vec<Option<String>>>>,
    revoke_session_once: Arc<AtomicBool>,
}

impl StubState {
    fn new(fail_first_logins: usize, listing_pages: usize) -> Self {
        Self {
            signin_attempts: Arc::new(AtomicUsize::new(0)),
            fail_first_logins,
            fill_rate: Arc::new(Mutex::new(0.0)),
            listing_pages,
            seen_cursors: Arc::new(Mutex::new(Vec::new())),
            revoke_session_once: Arc::new(AtomicBool::new(false)),
        }
    }
}

fn fake_jwt(expires_at: i64) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(b"{\"alg\":\"RS256\",\"typ\":\"JWT\"}"),
        URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{}}}", expires_at))
    )
}

async fn stub_signin(State(stub): State<StubState>) -> Response {
    let attempt = stub.signin_attempts.fetch_add(1, Ordering::SeqCst);
    if attempt < stub.fail_first_logins {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "WRONG_CREDENTIALS_ERROR"})),
        )
            .into_response();
    }

    let token = fake_jwt(chrono::Utc::now().timestamp() + 7200);
    (
        StatusCode::OK,
        [
            ("st-access-token", token),
            ("st-refresh-token", "refresh-token-1".to_string()),
            ("front-token", "front-token-1".to_string()),
        ],
        Json(json!({"status": "OK"})),
    )
        .into_response()
}

fn listing_node(id: &str, profession: &str, rate: f64, fill_rate: f64) -> JsonValue {
    json!({
        "id": id,
        "title": format!("{} sommar", profession),
        "profession": profession,
        "specializations": ["AKUTSJUKVARD"],
        "municipality": "Stockholm",
        "region": "Stockholm",
        "jobStartsAt": 1760000000000i64,
        "jobEndsAt": 1765000000000i64,
        "procuredAmount": rate,
        "procuredAmountCurrency": "SEK",
        "lastApplicationDate": 1759000000000i64,
        "createdAt": 1755000000000i64,
        "tender": {
            "id": format!("tender-{}", id),
            "title": "Bemanning sommar",
            "scope": 160.0,
            "fillRate": fill_rate,
            "dynamicStatus": "OPEN",
            "announcedAt": 1754000000000i64,
            "unit": {"id": format!("unit-{}", id), "name": "Akutmottagningen", "municipality": "Stockholm"},
            "orderer": {"id": format!("org-{}", id), "displayName": "Region Stockholm"}
        }
    })
}

async fn stub_graphql(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Json(payload): Json<JsonValue>,
) -> Response {
    if !headers.contains_key("authorization") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    // A revoked session answers 401 once despite a fresh-looking token.
    if stub.revoke_session_once.swap(false, Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match payload["operationName"].as_str().unwrap_or_default() {
        "VacanciesList" => {
            let cursor = payload["variables"]["afterCursor"]
                .as_str()
                .map(str::to_string);
            stub.seen_cursors.lock().unwrap().push(cursor.clone());

            let fill_rate = *stub.fill_rate.lock().unwrap();
            let (edges, has_next) = match cursor {
                None => (
                    json!([
                        {"cursor": "c1", "node": listing_node("vac-1", "DOCTOR", 1100.0, fill_rate)},
                        {"cursor": "c2", "node": listing_node("vac-2", "NURSE", 620.0, 0.0)}
                    ]),
                    stub.listing_pages > 1,
                ),
                Some(_) => (
                    json!([
                        {"cursor": "c3", "node": listing_node("vac-3", "NURSE", 700.0, 0.0)}
                    ]),
                    false,
                ),
            };
            let end_cursor = if has_next {
                json!("cursor-page-1")
            } else {
                JsonValue::Null
            };
            Json(json!({
                "data": {
                    "allVacancies": {
                        "pageInfo": {"hasNextPage": has_next, "endCursor": end_cursor},
                        "edges": edges
                    }
                }
            }))
            .into_response()
        }
        "VacancyDetail" => {
            let id = payload["variables"]["id"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "data": {
                    "vacancy": {
                        "id": id,
                        "description": "Sommarbemanning på akuten",
                        "contact": {"name": "Anna Svensson", "email": "anna@example.com", "phone": "+46701234567"},
                        "billing": {"reference": "REF-1001", "invoiceAddress": "Box 12, Stockholm"},
                        "requirements": {
                            "documents": ["Legitimation"],
                            "experience": [],
                            "journalSystems": ["TakeCare"],
                            "specializations": []
                        },
                        "shifts": [
                            {"id": format!("{}-shift-1", id), "date": "2025-09-01", "startTime": "08:00", "endTime": "17:00", "durationHours": 9.0, "status": "VACANT"}
                        ],
                        "priceGroups": [
                            {"specialization": "AKUTSJUKVARD", "price": 980.0, "currency": "SEK"}
                        ]
                    }
                }
            }))
            .into_response()
        }
        other => Json(json!({"errors": [{"message": format!("Unknown operation {}", other)}]}))
            .into_response(),
    }
}

async fn body_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn count(pool: &sqlx::SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(pool)
        .await
        .expect("count query")
}

async fn start_portal(stub: StubState) -> String {
    let router = Router::new()
        .route("/auth/signin", post(stub_signin))
        .route("/graphql", post(stub_graphql))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base_url
}

async fn scraper_app(base_url: String) -> (Router, sqlx::SqlitePool) {
    // One shared connection so the in-memory database survives across queries.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let client = reqwest::Client::new();
    let vacancy_service = VacancyService::new(pool.clone());
    let notify_service = NotifyService::new(client.clone(), None);
    let scrape_service = ScrapeService::new(
        client,
        base_url,
        "scraper@example.com".to_string(),
        "test_password".to_string(),
        vacancy_service.clone(),
        notify_service.clone(),
    );
    let state = AppState {
        pool: pool.clone(),
        vacancy_service,
        notify_service,
        scrape_service,
    };
    (bemlo_scraper::routes::router(state), pool)
}

async fn post_scrape(app: &Router) -> axum::response::Response {
    let req = Request::builder()
        .method("POST")
        .uri("/scrape")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn scrape_flow_end_to_end() {
    let stub = StubState::new(1, 1);
    let base_url = start_portal(stub.clone()).await;
    let (app, pool) = scraper_app(base_url).await;

    // First cycle: the portal rejects the sign-in and nothing may be written.
    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("Sign-in failed"));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancies").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM scrape_history").await, 0);

    // Second cycle: sign-in succeeds and both vacancies land with children.
    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["started_at"].is_string());
    assert_eq!(body["total_fetched"], 2);
    assert_eq!(body["new_count"], 2);
    assert_eq!(body["updated_count"], 0);
    assert_eq!(body["unchanged_count"], 0);
    assert_eq!(body["new_vacancies"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["new_vacancies"][0]["id"], "vac-1");
    assert_eq!(body["new_vacancies"][0]["rate"], 1100.0);
    assert_eq!(
        body["new_vacancies"][0]["url"],
        "https://app.bemlo.com/vacancies/vac-1"
    );

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancies").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancy_details").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM shifts").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM requirements").await, 4);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM price_groups").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM scrape_history").await, 1);

    // Third cycle: same portal data, everything counts as unchanged and the
    // child records are replaced rather than appended.
    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["new_count"], 0);
    assert_eq!(body["updated_count"], 0);
    assert_eq!(body["unchanged_count"], 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM shifts").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM requirements").await, 4);

    // Fourth cycle: the portal reports a new fill rate for vac-1 only.
    *stub.fill_rate.lock().unwrap() = 0.5;
    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["new_count"], 0);
    assert_eq!(body["updated_count"], 1);
    assert_eq!(body["unchanged_count"], 1);
    assert_eq!(body["updates"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["updates"][0]["id"], "vac-1");
    assert_eq!(body["updates"][0]["changes"], json!(["fill_rate"]));

    let fill_rate = sqlx::query_scalar::<_, f64>("SELECT fill_rate FROM vacancies WHERE id = ?")
        .bind("vac-1")
        .fetch_one(&pool)
        .await
        .expect("fill rate");
    assert_eq!(fill_rate, 0.5);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM scrape_history").await, 3);

    // One failed and one successful sign-in; later cycles reuse the session.
    assert_eq!(stub.signin_attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn scrape_follows_listing_cursors() {
    let stub = StubState::new(0, 2);
    let base_url = start_portal(stub.clone()).await;
    let (app, pool) = scraper_app(base_url).await;

    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_fetched"], 3);
    assert_eq!(body["new_count"], 3);

    // The first page is requested without a cursor, the second with the
    // cursor the first page returned.
    let cursors = stub.seen_cursors.lock().unwrap().clone();
    assert_eq!(cursors, vec![None, Some("cursor-page-1".to_string())]);

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancies").await, 3);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancy_details").await, 3);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM shifts").await, 3);
}

#[tokio::test]
async fn scrape_retries_after_a_revoked_session() {
    let stub = StubState::new(0, 1);
    stub.revoke_session_once.store(true, Ordering::SeqCst);
    let base_url = start_portal(stub.clone()).await;
    let (app, pool) = scraper_app(base_url).await;

    let resp = post_scrape(&app).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_fetched"], 2);
    assert_eq!(body["new_count"], 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM vacancies").await, 2);

    // The 401 mid-session forced a second sign-in before the retry.
    assert_eq!(stub.signin_attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transport_failures_surface_as_gateway_errors() {
    let base_url = start_portal(StubState::new(0, 1)).await;

    // Reserve a port, then close it again so nothing answers there.
    let closed_port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("reserve port");
        listener.local_addr().expect("addr").port()
    };

    let client = reqwest::Client::new();
    let auth = BemloAuth::new(
        client.clone(),
        base_url,
        "scraper@example.com".to_string(),
        "test_password".to_string(),
    );
    let fetcher = BemloFetcher::new(client, format!("http://127.0.0.1:{}", closed_port), auth);

    let err = fetcher
        .fetch_all_vacancies()
        .await
        .expect_err("closed endpoint");
    assert!(matches!(err, Error::Reqwest(_)));

    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("External service error"));
}
