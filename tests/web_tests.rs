//! Route-level tests for the web API, driven through the router without a
//! network listener.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lyrics_genre::web::server::{routes, AppState};
use lyrics_genre::{AppConfig, GenrePredictor};
use tempfile::TempDir;
use tower::ServiceExt;

use common::{multipart_body, multipart_content_type, write_model, Part, CATALOG_CSV};

struct TestApp {
    dir: TempDir,
    app: Router,
}

impl TestApp {
    /// App over an empty data directory, with or without a model artifact
    fn new(with_model: bool) -> Self {
        Self::with_data(with_model, None)
    }

    fn with_data(with_model: bool, combined_csv: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let artifacts = dir.path().join("artifacts");
        if with_model {
            write_model(&artifacts);
        }
        if let Some(csv) = combined_csv {
            std::fs::write(dir.path().join("combined.csv"), csv).unwrap();
        }
        let config = AppConfig::new(artifacts, dir.path());
        let app = routes(Arc::new(AppState::new(config)));
        Self { dir, app }
    }

    async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, parts: &[Part<'_>]) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", multipart_content_type())
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

#[tokio::test]
async fn test_index_page() {
    let app = TestApp::new(false);
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Genre Classifier"));
    // Catalog values are interpolated into quoted attributes
    assert!(html.contains("&quot;"));
    assert!(html.contains("&#39;"));
}

#[tokio::test]
async fn test_status_reports_missing_artifacts() {
    let app = TestApp::new(false);
    let (status, json) = app.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model"]["present"], false);
    assert_eq!(json["metadata"]["present"], false);
    assert!(json["metadata"]["content"].is_null());
    assert_eq!(json["catalog_override"], false);
}

#[tokio::test]
async fn test_status_shows_metadata() {
    let app = TestApp::new(true);
    std::fs::write(
        app.dir.path().join("artifacts").join("metadata.json"),
        r#"{"accuracy": 0.61, "labels": ["pop", "rock"]}"#,
    )
    .unwrap();

    let (_, json) = app.get("/api/status").await;
    assert_eq!(json["model"]["present"], true);
    assert_eq!(json["metadata"]["content"]["accuracy"], 0.61);
}

#[tokio::test]
async fn test_predict_without_model() {
    let app = TestApp::new(false);
    let (status, json) = app
        .post("/api/predict", &[Part::Text("text", "love love")])
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_type"], "missing_artifact");
    assert!(json["details"].is_null());
}

#[tokio::test]
async fn test_predict_rejects_blank_text() {
    let app = TestApp::new(true);
    let (status, json) = app.post("/api/predict", &[Part::Text("text", "  \n ")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "missing_input");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Blank input is refused"));
}

#[tokio::test]
async fn test_predict_lists_local_catalog() {
    let app = TestApp::with_data(true, Some(CATALOG_CSV));
    let (status, json) = app
        .post("/api/predict", &[Part::Text("text", "All my LOVE, <br/> love!")])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["genre"], "pop");

    let browse = &json["browse"];
    assert_eq!(browse["status"], "listing");
    assert_eq!(browse["total"], 2);
    let items = browse["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["caption"], "A — X");
    assert_eq!(items[0]["audio"]["type"], "search_fallback");
    assert_eq!(items[0]["audio"]["query"], "A%20X");
    assert_eq!(items[1]["row"], 2);
}

#[tokio::test]
async fn test_predict_without_catalog() {
    let app = TestApp::new(true);
    let (status, json) = app
        .post("/api/predict", &[Part::Text("text", "guitar")])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["genre"], "rock");
    assert_eq!(json["browse"]["status"], "no_catalog");
    assert_eq!(json["browse"]["issue"], "missing_artifact");
}

#[tokio::test]
async fn test_predict_uses_uploaded_catalog_when_none_exists() {
    let app = TestApp::new(true);
    let (status, json) = app
        .post(
            "/api/predict",
            &[
                Part::Text("text", "guitar"),
                Part::File("file", "songs.csv", CATALOG_CSV.as_bytes()),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["browse"]["status"], "listing");
    assert_eq!(json["browse"]["items"][0]["audio"]["type"], "remote_url");
    assert_eq!(
        json["browse"]["items"][0]["audio"]["url"],
        "https://example.com/b.mp3"
    );

    // The upload now backs plain browsing too
    let (_, json) = app.get("/api/browse?genre=pop").await;
    assert_eq!(json["status"], "listing");
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_predict_ignores_upload_when_catalog_exists() {
    let app = TestApp::with_data(true, Some(CATALOG_CSV));
    let other = b"Genre,Title\nrock,Only\n";
    let (_, json) = app
        .post(
            "/api/predict",
            &[
                Part::Text("text", "guitar"),
                Part::File("file", "other.csv", other),
            ],
        )
        .await;
    assert_eq!(json["browse"]["items"][0]["caption"], "B — Y");

    let (_, status) = app.get("/api/status").await;
    assert_eq!(status["catalog_override"], false);
}

#[tokio::test]
async fn test_browse_outcomes() {
    let app = TestApp::with_data(false, Some(CATALOG_CSV));

    let (_, json) = app.get("/api/browse?genre=jazz").await;
    assert_eq!(json["status"], "no_matches");
    assert_eq!(json["issue"], "empty_result");

    // Matching is case-sensitive
    let (_, json) = app.get("/api/browse?genre=Pop").await;
    assert_eq!(json["status"], "no_matches");

    let (_, json) = app.get("/api/browse?genre=pop&limit=1").await;
    assert_eq!(json["status"], "listing");
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_upload_overrides_local_catalog() {
    let app = TestApp::with_data(false, Some(CATALOG_CSV));

    let upload = b"label,song,band\njazz,Blue,Trio\n";
    let (status, json) = app
        .post("/api/catalog", &[Part::File("file", "jazz.csv", upload)])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], 1);
    assert_eq!(json["roles"]["genre"], "label");
    assert_eq!(json["roles"]["title"], "song");
    assert_eq!(json["roles"]["artist"], "band");
    assert!(json["roles"]["audio"].is_null());

    let (_, json) = app.get("/api/browse?genre=jazz").await;
    assert_eq!(json["items"][0]["caption"], "Blue — Trio");

    let (_, json) = app.get("/api/browse?genre=pop").await;
    assert_eq!(json["status"], "no_matches");
}

#[tokio::test]
async fn test_catalog_without_genre_column() {
    let app = TestApp::new(false);
    let upload = b"Title,Artist\nA,X\n";
    let (status, _) = app
        .post("/api/catalog", &[Part::File("file", "songs.csv", upload)])
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app.get("/api/browse?genre=pop").await;
    assert_eq!(json["status"], "no_genre_column");
    assert_eq!(json["issue"], "unresolved_schema");
    assert_eq!(json["columns"], serde_json::json!(["Title", "Artist"]));
}

#[tokio::test]
async fn test_catalog_upload_errors() {
    let app = TestApp::new(false);

    let (status, json) = app.post("/api/catalog", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "missing_input");

    let (status, json) = app
        .post(
            "/api/catalog",
            &[Part::File("file", "../../etc/passwd", b"Genre\npop\n")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_filename");

    let (status, json) = app
        .post(
            "/api/catalog",
            &[Part::File("file", "songs.csv.gz", b"Genre\npop\n")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "format_mismatch");

    // A data row wider than the header
    let (status, json) = app
        .post(
            "/api/catalog",
            &[Part::File("file", "songs.csv", b"Genre\npop,extra\n")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "malformed_source");
}

#[tokio::test]
async fn test_batch_predictions() {
    let app = TestApp::new(true);
    let input = b"id,Lyrics\n1,love song\n2,guitar solo guitar\n3,\n";
    let (status, json) = app
        .post("/api/batch", &[Part::File("file", "lyrics.csv", input)])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], 3);
    assert_eq!(json["text_column"], "Lyrics");
    assert_eq!(json["genres"], serde_json::json!(["pop", "rock"]));
    assert_eq!(
        json["preview"]["columns"],
        serde_json::json!(["id", "Lyrics", "pred_genre"])
    );
    assert_eq!(json["preview"]["rows"][1][2], "rock");

    let csv = json["csv"].as_str().unwrap();
    assert!(csv.starts_with("id,Lyrics,pred_genre\n"));
    assert!(csv.contains("2,guitar solo guitar,rock"));
    // Empty text scores the intercepts only; the tie goes to the first label
    assert!(csv.contains("3,,pop"));
}

#[tokio::test]
async fn test_batch_text_column() {
    let app = TestApp::new(true);
    let input = b"words,other\nguitar,love\n";

    let (_, json) = app
        .post(
            "/api/batch",
            &[
                Part::File("file", "lyrics.csv", input),
                Part::Text("text_column", "other"),
            ],
        )
        .await;
    assert_eq!(json["genres"], serde_json::json!(["pop"]));

    // No Lyrics column: the first column is used
    let (_, json) = app
        .post("/api/batch", &[Part::File("file", "lyrics.csv", input)])
        .await;
    assert_eq!(json["text_column"], "words");
    assert_eq!(json["genres"], serde_json::json!(["rock"]));

    let (status, json) = app
        .post(
            "/api/batch",
            &[
                Part::File("file", "lyrics.csv", input),
                Part::Text("text_column", "Lyrics"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "batch_failed");
}

#[tokio::test]
async fn test_audio_route() {
    let dir = TempDir::new().unwrap();
    let audio_path = dir.path().join("song.mp3");
    std::fs::write(&audio_path, b"ID3 not really an mp3").unwrap();

    let catalog = format!(
        "Genre,Title,Artist,preview_url\npop,A,X,{}\npop,B,Y,https://example.com/b.mp3\n",
        audio_path.display()
    );
    let app = TestApp::with_data(false, Some(&catalog));

    let (_, json) = app.get("/api/browse?genre=pop").await;
    assert_eq!(json["items"][0]["audio"]["type"], "inline_bytes");
    assert_eq!(json["items"][0]["audio"]["size"], 21);

    let request = Request::builder()
        .uri("/api/audio?row=0")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ID3 not really an mp3");

    // Remote rows and unknown rows have no local audio
    let (status, _) = app.get("/api/audio?row=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, json) = app.get("/api/audio?row=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_type"], "resource_unavailable");
}

#[tokio::test]
async fn test_uploaded_catalog_cannot_read_files_outside_data_dir() {
    let app = TestApp::new(false);
    let outside = TempDir::new().unwrap();
    let secret = outside.path().join("secret.txt");
    std::fs::write(&secret, "TOP-SECRET").unwrap();
    let inside = app.dir.path().join("song.mp3");
    std::fs::write(&inside, "ID3").unwrap();

    let upload = format!(
        "Genre,Title,preview_url\npop,x,{}\npop,y,{}\n",
        secret.display(),
        inside.display()
    );
    let (status, _) = app
        .post("/api/catalog", &[Part::File("file", "songs.csv", upload.as_bytes())])
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app.get("/api/browse?genre=pop").await;
    assert_eq!(json["items"][0]["audio"]["type"], "remote_url");
    assert_eq!(json["items"][1]["audio"]["type"], "inline_bytes");
    assert_eq!(json["items"][1]["audio"]["file"], "song.mp3");
    assert!(json["items"][1]["audio"].get("path").is_none());

    let (status, json) = app.get("/api/audio?row=0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_type"], "resource_unavailable");

    let request = Request::builder()
        .uri("/api/audio?row=1")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Predictor that labels every text the same way
struct Constant(&'static str);

impl GenrePredictor for Constant {
    fn predict(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|_| self.0.to_string()).collect()
    }
}

#[tokio::test]
async fn test_predict_with_injected_model() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("combined.csv"),
        "genre,title
jazz,So What
pop,A
",
    )
    .unwrap();
    let config = AppConfig::new(dir.path().join("artifacts"), dir.path());
    let state = AppState::with_model(config, Arc::new(Constant("jazz")));
    let app = TestApp {
        app: routes(Arc::new(state)),
        dir,
    };

    let (status, json) = app.post("/api/predict", &[Part::Text("text", "anything")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["genre"], "jazz");
    assert_eq!(json["browse"]["total"], 1);
    assert_eq!(json["browse"]["items"][0]["caption"], "So What — Unknown Artist");
}
