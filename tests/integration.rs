use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fmap_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("fmap");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    let maps_dir = config_dir.join("mappings");
    fs::create_dir_all(&maps_dir).unwrap();

    fs::write(
        maps_dir.join("products.xml"),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<map>
  <link source="url">
    <target name="content_url" crawlUrl="true"/>
  </link>
  <link source="title">
    <target name="doc_title"/>
  </link>
</map>
"#,
    )
    .unwrap();

    let config_content = r#"[connectors.rest.products]
mapping = "mappings/products.xml"
schema_fields = ["content_url", "doc_title", "title_sort"]

[connectors.database.orders]
mapping = "mappings/orders.xml"
"#;

    let config_path = config_dir.join("fmap.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_fmap(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = fmap_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run fmap binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_sources_lists_connectors() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_fmap(&config, &["sources"]);
    assert!(success, "sources failed: {}", stderr);
    assert!(stdout.contains("rest:products"));
    assert!(stdout.contains("crawl-url: content_url"));
    assert!(stdout.contains("database:orders"));
    assert!(stdout.contains("MISSING"));
}

#[test]
fn test_show_prints_links_in_order() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_fmap(&config, &["show", "rest:products"]);
    assert!(success, "show failed: {}", stderr);
    let url = stdout.find("content_url").unwrap();
    let title = stdout.find("doc_title").unwrap();
    assert!(url < title);
    assert!(stdout.contains("crawlUrl=true"));
}

#[test]
fn test_check_reports_crawl_url() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_fmap(&config, &["check", "rest:products"]);
    assert!(success, "check failed: {}", stderr);
    assert!(stdout.contains("links:    2"));
    assert!(stdout.contains("crawl-url: content_url (from url)"));
}

#[test]
fn test_check_fails_on_invalid_mapping() {
    let (tmp, config) = setup_test_env();
    fs::write(
        tmp.path().join("config/mappings/products.xml"),
        r#"<map><link><target name="doc_title"/></link></map>"#,
    )
    .unwrap();
    let (_stdout, stderr, success) = run_fmap(&config, &["check", "rest:products"]);
    assert!(!success);
    assert!(stderr.contains("source"), "stderr: {}", stderr);
}

#[test]
fn test_link_add_and_remove() {
    let (tmp, config) = setup_test_env();
    let path = tmp.path().join("config/mappings/products.xml");

    let (_, stderr, success) = run_fmap(
        &config,
        &[
            "link",
            "add",
            "rest:products",
            "--source",
            "title",
            "--target",
            "title_sort",
            "--at",
            "1",
        ],
    );
    assert!(success, "link add failed: {}", stderr);

    let doc = fs::read_to_string(&path).unwrap();
    let sort = doc.find("title_sort").unwrap();
    let title = doc.find("doc_title").unwrap();
    assert!(sort < title, "inserted link should precede doc_title:\n{}", doc);

    let (_, stderr, success) = run_fmap(&config, &["link", "remove", "rest:products", "0"]);
    assert!(success, "link remove failed: {}", stderr);

    let doc = fs::read_to_string(&path).unwrap();
    assert!(!doc.contains("content_url"));

    let (stdout, _, success) = run_fmap(&config, &["check", "rest:products"]);
    assert!(success);
    assert!(stdout.contains("crawl-url: none"));
}

#[test]
fn test_link_add_rejects_unknown_schema_field() {
    let (tmp, config) = setup_test_env();
    let path = tmp.path().join("config/mappings/products.xml");
    let before = fs::read_to_string(&path).unwrap();

    let (_, _, success) = run_fmap(
        &config,
        &[
            "link",
            "add",
            "rest:products",
            "--source",
            "body",
            "--target",
            "doc_body",
        ],
    );
    assert!(!success);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_init_and_database_flags() {
    let (tmp, config) = setup_test_env();

    let (_, stderr, success) = run_fmap(&config, &["init", "database:orders"]);
    assert!(success, "init failed: {}", stderr);
    assert!(tmp.path().join("config/mappings/orders.xml").exists());

    let (_, stderr, success) = run_fmap(
        &config,
        &[
            "link",
            "add",
            "database:orders",
            "--source",
            "ORDER_ID",
            "--target",
            "id",
            "--flag",
            "primaryKey=true",
        ],
    );
    assert!(success, "link add failed: {}", stderr);

    let (stdout, _, success) = run_fmap(&config, &["check", "database:orders"]);
    assert!(success);
    assert!(stdout.contains("primary-key: id (from ORDER_ID)"));
}

#[test]
fn test_export_json() {
    let (tmp, config) = setup_test_env();
    let out = tmp.path().join("out/products.json");

    let (_, stderr, success) = run_fmap(
        &config,
        &["export", "rest:products", "--output", out.to_str().unwrap()],
    );
    assert!(success, "export failed: {}", stderr);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let links = json.as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["source"], "url");
    assert_eq!(links[0]["attributes"]["crawlUrl"], "true");
    assert_eq!(links[1]["target"], "doc_title");
}

#[test]
fn test_unknown_connector_fails() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_fmap(&config, &["show", "rest:missing"]);
    assert!(!success);
    assert!(stderr.contains("not configured"));
}
