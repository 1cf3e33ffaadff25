use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use devsync_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

fn chain_scan() -> Value {
    json!({
        "nodes": ["svc-a", "svc-b", "svc-c"],
        "edges": [
            {"from": "svc-a", "to": "svc-b"},
            {"from": "svc-b", "to": "svc-c"}
        ]
    })
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = app(AppState::default());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn graph_starts_empty() {
    let app = app(AppState::default());
    let (status, body) = call(&app, "GET", "/graph", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"], json!([]));
    assert_eq!(body["edges"], json!([]));

    let (_, summary) = call(&app, "GET", "/graph/summary", None).await;
    assert_eq!(summary["maxBlastRadius"], 0);
}

#[tokio::test]
async fn put_graph_then_query_blast_radius() {
    let app = app(AppState::default());

    let (status, summary) = call(&app, "PUT", "/graph", Some(chain_scan())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["nodes"], 3);
    assert_eq!(summary["edges"], 2);
    assert_eq!(summary["maxBlastRadius"], 2);

    let (status, radii) = call(&app, "GET", "/graph/blast-radius", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(radii, json!({"svc-a": 2, "svc-b": 1, "svc-c": 0}));

    let (_, dependents) = call(
        &app,
        "GET",
        "/graph/blast-radius?direction=dependents",
        None,
    )
    .await;
    assert_eq!(dependents, json!({"svc-a": 0, "svc-b": 1, "svc-c": 2}));

    let (_, graph) = call(&app, "GET", "/graph", None).await;
    assert_eq!(graph["nodes"], json!(["svc-a", "svc-b", "svc-c"]));
    assert_eq!(graph["edges"][0], json!({"from": "svc-a", "to": "svc-b"}));

    let (_, adjacency) = call(&app, "GET", "/graph/adjacency", None).await;
    assert_eq!(
        adjacency,
        json!({"svc-a": ["svc-b"], "svc-b": ["svc-c"], "svc-c": []})
    );
}

#[tokio::test]
async fn node_blast_radius_lists_reachable_nodes() {
    let app = app(AppState::default());
    call(&app, "PUT", "/graph", Some(chain_scan())).await;

    let (status, body) = call(&app, "GET", "/graph/blast-radius/svc-a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["radius"], 2);
    assert_eq!(body["direction"], "dependencies");
    assert_eq!(body["reachable"], json!(["svc-b", "svc-c"]));

    let (status, _) = call(&app, "GET", "/graph/blast-radius/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn node_blast_radius_accepts_module_paths() {
    let app = app(AppState::default());
    call(
        &app,
        "PUT",
        "/graph",
        Some(json!({
            "nodes": ["github.com/acme/app", "golang.org/x/mod"],
            "edges": [{"from": "github.com/acme/app", "to": "golang.org/x/mod"}]
        })),
    )
    .await;

    let (status, body) = call(
        &app,
        "GET",
        "/graph/blast-radius/github.com/acme/app",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["radius"], 1);
}

#[tokio::test]
async fn construction_error_keeps_previous_graph() {
    let app = app(AppState::default());
    call(&app, "PUT", "/graph", Some(chain_scan())).await;

    let (status, body) = call(
        &app,
        "PUT",
        "/graph",
        Some(json!({
            "nodes": ["svc-x"],
            "edges": [{"from": "svc-x", "to": "svc-unknown"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("svc-unknown"));

    let (_, radii) = call(&app, "GET", "/graph/blast-radius", None).await;
    assert_eq!(radii["svc-a"], 2);
}

#[tokio::test]
async fn malformed_scan_is_rejected() {
    let app = app(AppState::default());
    let request = Request::builder()
        .method("PUT")
        .uri("/graph")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_reads_go_mod_from_repo_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("go.mod"),
        "module github.com/acme/api\n\ngo 1.22\n\nrequire (\n\tgithub.com/gorilla/websocket v1.5.1\n\tgolang.org/x/mod v0.17.0\n)\n",
    )
    .unwrap();

    let app = app(AppState::default());
    let (status, summary) = call(
        &app,
        "POST",
        "/scan",
        Some(json!({"repoPath": dir.path().to_str().unwrap()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["nodes"], 3);

    let (_, radii) = call(&app, "GET", "/graph/blast-radius", None).await;
    assert_eq!(radii["github.com/acme/api"], 2);
    assert_eq!(radii["golang.org/x/mod"], 0);
}

#[tokio::test]
async fn scan_of_missing_repo_is_bad_request() {
    let app = app(AppState::default());
    let (status, body) = call(
        &app,
        "POST",
        "/scan",
        Some(json!({"repoPath": "does/not/exist"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("failed to scan"));
}

#[tokio::test]
async fn unknown_direction_is_a_json_bad_request() {
    let app = app(AppState::default());
    call(&app, "PUT", "/graph", Some(chain_scan())).await;

    for uri in [
        "/graph/blast-radius?direction=sideways",
        "/graph/blast-radius/svc-a?direction=sideways",
    ] {
        let (status, body) = call(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert!(body["error"].is_string(), "uri: {uri}, body: {body}");
    }
}
