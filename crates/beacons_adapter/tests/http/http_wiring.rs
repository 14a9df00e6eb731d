#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use beacons_adapter::api_client::DisabledRegistrationApi;
use beacons_adapter::{build_router, AppState};
use beacons_storage::{FormCacheConfig, InMemoryFormCache};

async fn spawn_app() -> SocketAddr {
    let state = AppState::new(
        Arc::new(InMemoryFormCache::new(FormCacheConfig::mvp_v1()).unwrap()),
        Arc::new(DisabledRegistrationApi),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    addr
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .redirects(0)
        .timeout(Duration::from_secs(5))
        .build()
}

struct Reply {
    status: u16,
    location: Option<String>,
    set_cookie: Option<String>,
    body: String,
}

async fn call(
    method: &'static str,
    url: String,
    cookie: Option<String>,
    form: Option<&'static str>,
) -> Reply {
    tokio::task::spawn_blocking(move || {
        let mut req = agent().request(method, &url);
        if let Some(cookie) = cookie {
            req = req.set("cookie", &cookie);
        }
        let result = match form {
            Some(body) => req
                .set("content-type", "application/x-www-form-urlencoded")
                .send_string(body),
            None => req.call(),
        };
        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(err) => panic!("transport error: {err}"),
        };
        Reply {
            status: resp.status(),
            location: resp.header("location").map(str::to_string),
            set_cookie: resp.header("set-cookie").map(str::to_string),
            body: resp.into_string().unwrap(),
        }
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn at_http_wiring_01_health_and_gate() {
    let addr = spawn_app().await;

    let health = call("GET", format!("http://{addr}/healthz"), None, None).await;
    assert_eq!(health.status, 200);
    assert_eq!(health.body, r#"{"status":"ok"}"#);

    let gated = call(
        "GET",
        format!("http://{addr}/register-a-beacon/check-beacon-details"),
        None,
        None,
    )
    .await;
    assert_eq!(gated.status, 307);
    assert_eq!(gated.location.as_deref(), Some("/"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn at_http_wiring_02_start_then_post_page() {
    let addr = spawn_app().await;

    let started = call(
        "GET",
        format!("http://{addr}/register-a-beacon/start"),
        None,
        None,
    )
    .await;
    assert_eq!(started.status, 303);
    assert_eq!(
        started.location.as_deref(),
        Some("/register-a-beacon/check-beacon-details")
    );
    let cookie = started
        .set_cookie
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let page = format!("http://{addr}/register-a-beacon/check-beacon-details");
    let invalid = call("POST", page.clone(), Some(cookie.clone()), Some("hexId=XYZ")).await;
    assert_eq!(invalid.status, 200);
    let json: serde_json::Value = serde_json::from_str(&invalid.body).unwrap();
    assert_eq!(json["form"]["fields"]["hexId"]["value"], "XYZ");
    assert_eq!(
        json["form"]["errorSummary"][0]["href"],
        "#manufacturer"
    );

    let reload = call("GET", page.clone(), Some(cookie.clone()), None).await;
    let json: serde_json::Value = serde_json::from_str(&reload.body).unwrap();
    assert_eq!(json["form"]["fields"]["hexId"]["value"], "XYZ");
    assert_eq!(json["form"]["errorSummary"], serde_json::json!([]));

    let valid = call(
        "POST",
        page,
        Some(cookie.clone()),
        Some("manufacturer=ACME&model=Excelsior&hexId=1D0EA08C52FFBFF"),
    )
    .await;
    assert_eq!(valid.status, 303);
    assert_eq!(
        valid.location.as_deref(),
        Some("/register-a-beacon/beacon-information")
    );

    let answers = call(
        "GET",
        format!("http://{addr}/register-a-beacon/check-your-answers"),
        Some(cookie),
        None,
    )
    .await;
    let json: serde_json::Value = serde_json::from_str(&answers.body).unwrap();
    assert_eq!(json["registration"]["model"], "Excelsior");
}
