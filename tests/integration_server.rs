//! End-to-end walk through the public router: create, list, filter, update and
//! delete, first against the in-memory store and then against `PostgreSQL`
//! when `CARDS_TEST_DSN` points at a disposable database.

use anyhow::{Context, Result, ensure};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
    response::Response,
};
use cards::{
    api::{CountryGate, app},
    cards::{Card, PgStorage, Storage, storage::postgres::migrate},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use tower::ServiceExt;

fn request(method: Method, uri: &str, body: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Country-Code", "US")
        .body(Body::from(body.to_string()))?)
}

async fn send(router: &Router, method: Method, uri: &str, body: &str) -> Result<Response> {
    Ok(router.clone().oneshot(request(method, uri, body)?).await?)
}

async fn list(router: &Router, uri: &str) -> Result<Vec<Card>> {
    let response = send(router, Method::GET, uri, "").await?;
    ensure!(
        response.status() == StatusCode::OK,
        "unexpected status {}",
        response.status()
    );
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&body).context("list body is not a card array")
}

fn card_json(holder: &str, cvv: i32) -> String {
    serde_json::json!({
        "number": "4263 9826 4026 9299",
        "expiration_date": "09/30",
        "cvv": cvv,
        "holder": holder,
    })
    .to_string()
}

async fn lifecycle(router: Router) -> Result<()> {
    assert!(list(&router, "/cards").await?.is_empty());

    for holder in ["Олена Коваленко", "Остап Коваль", "John Smith"] {
        let response = send(&router, Method::POST, "/cards", &card_json(holder, 321)).await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let all = list(&router, "/cards").await?;
    assert_eq!(all.len(), 3);
    let ids: Vec<i32> = all.iter().map(|card| card.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let filtered = list(&router, "/cards?holder=%D0%BA%D0%BE%D0%B2%D0%B0%D0%BB").await?;
    let holders: Vec<&str> = filtered.iter().map(|card| card.holder.as_str()).collect();
    assert_eq!(holders, vec!["Олена Коваленко", "Остап Коваль"]);

    let target = all[2].id;
    let response = send(
        &router,
        Method::PUT,
        &format!("/cards/{target}"),
        &card_json("Jane Smith", 999),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = list(&router, "/cards?holder=jane").await?;
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, target);
    assert_eq!(updated[0].cvv, 999);

    let response = send(&router, Method::DELETE, &format!("/cards/{target}"), "").await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, Method::DELETE, &format!("/cards/{target}"), "").await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &router,
        Method::PUT,
        &format!("/cards/{target}"),
        &card_json("Jane Smith", 999),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(list(&router, "/cards").await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn memory_lifecycle() -> Result<()> {
    lifecycle(app(Storage::memory(), CountryGate::default())).await
}

#[tokio::test]
async fn postgres_lifecycle() -> Result<()> {
    let Ok(dsn) = env::var("CARDS_TEST_DSN") else {
        eprintln!("CARDS_TEST_DSN not set, skipping postgres lifecycle");
        return Ok(());
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&dsn)
        .await
        .context("failed to connect to CARDS_TEST_DSN")?;

    migrate(&pool).await?;
    sqlx::query("TRUNCATE credit_cards RESTART IDENTITY")
        .execute(&pool)
        .await?;

    lifecycle(app(
        Storage::from(PgStorage::new(pool)),
        CountryGate::default(),
    ))
    .await
}
