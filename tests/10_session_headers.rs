mod common;

use anyhow::Result;
use axum::http::Method;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::json;

use common::{FakeBackend, Reply};
use zura_client::{AuthApi, Credential, QueryParams, RequestDescriptor, SessionMode};

#[tokio::test]
async fn stored_token_and_tenant_are_stamped_on_every_call() -> Result<()> {
    let backend = FakeBackend::start().await?;
    backend.respond(Method::GET, "/leads", 200, json!({"items": [{"_id": "1"}]}));
    let client = backend.client(SessionMode::Token)?;
    client
        .store()
        .set(Some(Credential::Bearer("abc123".into())), Some("org-7".into()))?;

    let leads = client.get_json("/leads", QueryParams::new()).await?;
    assert_eq!(leads, json!([{"_id": "1"}]));

    let received = backend.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].header("authorization").as_deref(), Some("Bearer abc123"));
    assert_eq!(received[0].header("x-org-id").as_deref(), Some("org-7"));
    Ok(())
}

#[tokio::test]
async fn caller_supplied_headers_win() -> Result<()> {
    let backend = FakeBackend::start().await?;
    backend.respond(Method::GET, "/contacts/5", 200, json!({"_id": "5"}));
    let client = backend.client(SessionMode::Token)?;
    client
        .store()
        .set(Some(Credential::Bearer("abc123".into())), Some("org-7".into()))?;

    let request = RequestDescriptor::get("/contacts/5")
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer delegated"))
        .header(HeaderName::from_static("x-org-id"), HeaderValue::from_static("org-9"));
    client.send_json(request).await?;

    let received = backend.received();
    assert_eq!(received[0].header("authorization").as_deref(), Some("Bearer delegated"));
    assert_eq!(received[0].header("x-org-id").as_deref(), Some("org-9"));
    Ok(())
}

#[tokio::test]
async fn anonymous_calls_carry_no_auth_headers() -> Result<()> {
    let backend = FakeBackend::start().await?;
    backend.respond(Method::GET, "/products", 200, json!([]));
    let client = backend.client(SessionMode::Token)?;

    client.get_json("/products", QueryParams::new()).await?;

    let received = backend.received();
    assert_eq!(received[0].header("authorization"), None);
    assert_eq!(received[0].header("x-org-id"), None);
    Ok(())
}

#[tokio::test]
async fn query_skips_blanks_and_repeats_arrays() -> Result<()> {
    let backend = FakeBackend::start().await?;
    backend.respond(Method::GET, "/deals", 200, json!({"items": []}));
    let client = backend.client(SessionMode::Token)?;

    let query = QueryParams::from_json(&json!({
        "stage": "won",
        "q": "",
        "owner": null,
        "tags": ["a", "b"]
    }));
    let deals = client.get_json("/deals", query).await?;
    assert_eq!(deals, json!([]));
    assert_eq!(
        backend.received()[0].query.as_deref(),
        Some("stage=won&tags=a&tags=b")
    );
    Ok(())
}

#[tokio::test]
async fn envelopes_outside_the_allow_list_pass_through() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let users = json!({"items": [{"_id": "u1"}], "total": 1});
    backend.respond(Method::GET, "/users", 200, users.clone());
    let leads_stats = json!({"items": [{"month": "Jan"}]});
    backend.respond(Method::GET, "/leads/stats", 200, leads_stats.clone());
    let client = backend.client(SessionMode::Token)?;

    assert_eq!(client.get_json("/users", QueryParams::new()).await?, users);
    assert_eq!(
        client.get_json("/leads/stats", QueryParams::new()).await?,
        leads_stats
    );
    Ok(())
}

#[tokio::test]
async fn cookie_mode_relies_on_the_cookie_jar() -> Result<()> {
    let backend = FakeBackend::start().await?;
    backend.reply(
        Method::POST,
        "/auth/signin",
        Reply::new(200, json!({"user": {"_id": "u1"}, "org": {"id": "o1"}}))
            .cookie("sid=s3cr3t; Path=/; HttpOnly"),
    );
    backend.respond(Method::GET, "/tasks", 200, json!({"items": []}));
    let client = backend.client(SessionMode::Cookie)?;

    AuthApi::new(client.clone())
        .signin(json!({"identifier": "a@b.co", "password": "pw"}))
        .await?;
    assert_eq!(client.store().get().credential, Some(Credential::CookieSession));

    client.get_json("/tasks", QueryParams::new()).await?;
    let tasks_call = &backend.received()[1];
    assert_eq!(tasks_call.header("authorization"), None);
    assert_eq!(tasks_call.header("x-org-id").as_deref(), Some("o1"));
    assert!(tasks_call
        .header("cookie")
        .map_or(false, |c| c.contains("sid=s3cr3t")));
    Ok(())
}
