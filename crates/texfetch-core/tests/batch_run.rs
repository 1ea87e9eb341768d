//! End-to-end batch runs against a mock CDN and conversion service.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use texfetch_core::config::TransportConfig;
use texfetch_core::stages::finalize::encode_png;
use texfetch_core::{
    load_catalog, BatchController, Config, FailureLedger, ItemId, ItemOutcome, LedgerAction,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::default();
    config.endpoints.cdn_url_template = format!("{}/cdn/{{id}}_rgb.astc", server.uri());
    config.endpoints.convert_url = format!("{}/", server.uri());
    config.paths.catalog = root.join("OB52.json");
    config.paths.output_dir = root.join("IMAGE");
    config.paths.failure_ledger = root.join("failed_items.json");
    config.processing.workers = 4;
    config.processing.failure_cooldown_ms = 0;
    config.transport = TransportConfig {
        timeout_ms: 5_000,
        backoff_base_ms: 1,
        ..TransportConfig::default()
    };
    config
}

fn converted_page() -> String {
    let mut img = RgbaImage::new(2, 2);
    img.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
    img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
    img.put_pixel(0, 1, Rgba([200, 100, 50, 255]));
    img.put_pixel(1, 1, Rgba([200, 100, 50, 255]));
    let png = encode_png(&DynamicImage::ImageRgba8(img)).unwrap();
    format!(
        "<html><body><img class=\"preview\" src=\"data:image/png;base64,{}\"></body></html>",
        BASE64.encode(png)
    )
}

async fn mount_asset(server: &MockServer, id: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_bytes(format!("ASTC-{id}").into_bytes())
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path(format!("/cdn/{id}_rgb.astc")))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_converter(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn run(config: &Config) -> (texfetch_core::BatchSummary, LedgerAction) {
    let ids = load_catalog(&config.catalog_path()).unwrap();
    std::fs::create_dir_all(config.output_dir()).unwrap();
    let controller = BatchController::new(config);
    let summary = controller.run(ids, |_| {}).await;
    let action = FailureLedger::new(config.ledger_path())
        .persist(&summary.failures)
        .unwrap();
    (summary, action)
}

#[tokio::test(flavor = "multi_thread")]
async fn catalog_to_artifacts_and_ledger() {
    let server = MockServer::start().await;
    mount_asset(&server, "101", 200).await;
    mount_asset(&server, "202", 200).await;
    mount_asset(&server, "555", 404).await;
    mount_converter(&server, converted_page()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    std::fs::write(
        config.catalog_path(),
        r#"[{"itemID": 555}, {"itemID": 202}, {"itemID": 101}, {"notItemID": 303}]"#,
    )
    .unwrap();

    let (summary, action) = run(&config).await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(action, LedgerAction::Written(1));

    let output = config.output_dir();
    assert!(output.join("101.png").exists());
    assert!(output.join("202.png").exists());
    assert!(!output.join("555.png").exists());
    assert!(!output.join("303.png").exists());

    let written = image::open(output.join("101.png")).unwrap();
    assert_eq!(written.get_pixel(0, 0), Rgba([200, 100, 50, 255]));

    let ledger: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(config.ledger_path()).unwrap()).unwrap();
    assert_eq!(
        ledger,
        serde_json::json!([{"itemID": "555", "error": "ASTC HTTP 404"}])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn second_run_skips_finished_items_without_network() {
    let server = MockServer::start().await;
    mount_asset(&server, "101", 200).await;
    mount_asset(&server, "202", 200).await;
    mount_converter(&server, converted_page()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    std::fs::write(config.catalog_path(), r#"[{"itemID": 101}, {"itemID": 202}]"#).unwrap();

    let (first, _) = run(&config).await;
    assert_eq!(first.succeeded, 2);
    let requests_after_first = server.received_requests().await.unwrap().len();
    let artifact = std::fs::read(config.output_dir().join("101.png")).unwrap();

    let (second, _) = run(&config).await;
    assert_eq!(second.skipped, 2);
    assert_eq!(second.succeeded + second.failed, 0);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );
    assert_eq!(
        std::fs::read(config.output_dir().join("101.png")).unwrap(),
        artifact
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn clean_run_removes_stale_ledger() {
    let server = MockServer::start().await;
    mount_asset(&server, "101", 200).await;
    mount_converter(&server, converted_page()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    std::fs::write(config.catalog_path(), r#"[{"itemID": 101}]"#).unwrap();
    std::fs::write(
        config.ledger_path(),
        r#"[{"itemID": "101", "error": "ASTC HTTP 503"}]"#,
    )
    .unwrap();

    let (summary, action) = run(&config).await;
    assert_eq!(summary.failed, 0);
    assert_eq!(action, LedgerAction::Removed);
    assert!(!config.ledger_path().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_payload_is_recorded_per_item() {
    let server = MockServer::start().await;
    mount_asset(&server, "7", 200).await;
    mount_asset(&server, "8", 200).await;
    mount_converter(&server, "<html>no image here</html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    std::fs::write(config.catalog_path(), r#"[{"itemID": 8}, {"itemID": 7}]"#).unwrap();

    let (summary, action) = run(&config).await;
    assert_eq!(action, LedgerAction::Written(2));
    let mut failed: Vec<_> = summary.failures.iter().map(|f| f.item_id.clone()).collect();
    failed.sort();
    assert_eq!(failed, vec![ItemId::from("7"), ItemId::from("8")]);
    assert!(summary
        .failures
        .iter()
        .all(|f| f.error == "PNG DATA NOT FOUND"));
    assert!(std::fs::read_dir(config.output_dir()).unwrap().next().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn each_item_ends_with_artifact_or_failure_never_both() {
    let server = MockServer::start().await;
    for id in ["1", "2", "3", "4", "5", "6"] {
        let status = if id.parse::<u32>().unwrap() % 2 == 0 { 200 } else { 503 };
        mount_asset(&server, id, status).await;
    }
    mount_converter(&server, converted_page()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    std::fs::write(
        config.catalog_path(),
        r#"[{"itemID":1},{"itemID":2},{"itemID":3},{"itemID":4},{"itemID":5},{"itemID":6}]"#,
    )
    .unwrap();

    let ids = load_catalog(&config.catalog_path()).unwrap();
    std::fs::create_dir_all(config.output_dir()).unwrap();
    let controller = BatchController::new(&config);
    let mut outcomes = Vec::new();
    let summary = controller.run(ids.clone(), |o| outcomes.push(o.clone())).await;
    assert_eq!(outcomes.len(), ids.len());

    for id in &ids {
        let has_artifact = config.output_dir().join(id.png_file_name()).exists();
        let has_failure = summary.failures.iter().any(|f| &f.item_id == id);
        assert!(has_artifact ^ has_failure, "item {id}");
    }
    assert!(outcomes
        .iter()
        .filter(|o| matches!(o, ItemOutcome::Failed(_)))
        .all(|o| o.to_string().ends_with("ASTC HTTP 503")));
}
