use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use sitekit_cli::test_utils::SiteFixture;

fn sitekit() -> Command {
    let mut cmd = Command::cargo_bin("sitekit").unwrap();
    cmd.env_remove("SITEKIT_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_prerender_writes_expanded_content() {
    let site = SiteFixture::with_blog().unwrap();

    sitekit()
        .arg("prerender")
        .arg("--content")
        .arg(site.root().join("site-content.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Prerendered 4 pages"))
        .stdout(predicate::str::contains("2 generated from 1 dynamic routes"));

    let expanded = read_json(&site.root().join("dist/site-content.json"));
    let routes: Vec<_> = expanded["pages"].as_array().unwrap().iter().map(|p| p["route"].clone()).collect();
    assert_eq!(routes, vec![json!("/"), json!("/blog"), json!("/blog/second-post"), json!("/blog/first-post")]);
    assert_eq!(expanded["pages"][2]["isDynamic"], json!(false));
    assert_eq!(expanded["pages"][2]["dynamicContext"]["singularSchema"], json!("article"));
}

#[test]
fn test_prerender_custom_output_and_warnings() {
    let site = SiteFixture::new().unwrap();
    site.content(&json!({
        "pages": [{"route": "/team", "fetch": "/data/missing.json", "sections": []}]
    }))
    .unwrap();
    let out = site.root().join("out/expanded.json");

    sitekit()
        .args(["prerender", "--content"])
        .arg(site.root().join("site-content.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings (1):"))
        .stdout(predicate::str::contains("/data/missing.json not found"));

    assert!(out.exists());
}

#[test]
fn test_prerender_respects_config_file() {
    let site = SiteFixture::with_blog().unwrap();
    let config = site.write("ci/sitekit.toml", "output_dir = \"public-build\"\n").unwrap();

    sitekit()
        .arg("--config")
        .arg(&config)
        .arg("prerender")
        .arg("--content")
        .arg(site.root().join("site-content.json"))
        .assert()
        .success();

    assert!(site.root().join("public-build/site-content.json").exists());
}

#[test]
fn test_prerender_missing_content_fails() {
    let site = SiteFixture::new().unwrap();

    sitekit()
        .arg("prerender")
        .arg("--content")
        .arg(site.root().join("nope.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Site content not found"));
}

#[test]
fn test_schema_to_stdout() {
    let site = SiteFixture::new().unwrap();
    site.component_meta("ArticleList", "meta.yaml", "title: Articles\ndata: articles:3\nbackground: auto\n").unwrap();
    site.component_meta("Divider", "meta.json", r#"{"title": "Divider"}"#).unwrap();

    let assert = sitekit().arg("schema").arg("--components").arg(site.root().join("components")).assert().success();

    let stdout: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(
        stdout,
        json!({
            "ArticleList": {
                "background": "auto",
                "data": {"type": "articles", "limit": 3},
                "inheritData": ["articles"]
            }
        })
    );
}

#[test]
fn test_schema_to_file() {
    let site = SiteFixture::new().unwrap();
    site.component_meta("Hero", "meta.json", r#"{"params": {"title": {"type": "string", "default": "Hi"}}}"#).unwrap();
    let out = site.root().join("generated/schemas.json");

    sitekit()
        .arg("schema")
        .arg("--components")
        .arg(site.root().join("components"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 components"));

    assert_eq!(read_json(&out), json!({"Hero": {"defaults": {"title": "Hi"}}}));
}

#[test]
fn test_schema_missing_dir_fails() {
    let site = SiteFixture::new().unwrap();

    sitekit()
        .arg("schema")
        .arg("--components")
        .arg(site.root().join("components"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("components directory not found"));
}
