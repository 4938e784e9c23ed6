use serde_json::json;
use sitekit_cli::config::BuildConfig;
use sitekit_cli::content::SiteContent;
use sitekit_cli::fetch::{ExecutorOptions, FetchExecutor};
use sitekit_cli::prerender::{Prerenderer, render_pages};
use sitekit_cli::test_utils::{SiteFixture, init_test_logging};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prerenderer(site: &SiteFixture) -> Prerenderer {
    let mut options = ExecutorOptions::new(site.root());
    options.retries = 0;
    Prerenderer::new(FetchExecutor::new(options).unwrap())
}

#[tokio::test]
async fn test_blog_site_end_to_end() {
    init_test_logging(None);
    let site = SiteFixture::with_blog().unwrap();
    let content = SiteContent::load(&site.root().join("site-content.json")).unwrap();

    let output = prerenderer(&site).run(content).await.unwrap();
    assert!(output.warnings.is_empty(), "{:?}", output.warnings);

    let routes: Vec<_> = output.content.pages.iter().map(|p| p.route.as_str()).collect();
    assert_eq!(routes, vec!["/", "/blog", "/blog/second-post", "/blog/first-post"]);

    let second = &output.content.pages[2];
    assert_eq!(second.title.as_deref(), Some("Second"));
    assert_eq!(second.description.as_deref(), Some("The second one"));
    let first = &output.content.pages[3];
    assert_eq!(first.description.as_deref(), Some("The first one"));

    // Site cascade reaches generated pages, per-item data reaches nested sections
    let nested = &first.sections[0].subsections[0];
    assert_eq!(nested.cascaded_data["nav"], json!(["home", "blog"]));
    assert_eq!(nested.cascaded_data["article"]["slug"], json!("first-post"));
    assert_eq!(nested.cascaded_data["articles"].as_array().unwrap().len(), 2);

    let home = &output.content.pages[0].sections[0];
    assert_eq!(home.cascaded_data["nav"], json!(["home", "blog"]));
    assert!(home.cascaded_data.get("articles").is_none());
}

#[tokio::test]
async fn test_yaml_source_with_query() {
    let site = SiteFixture::new().unwrap();
    site.write(
        "content/events.yaml",
        "- title: Meetup\n  status: published\n  day: 3\n- title: Draft\n  status: draft\n  day: 1\n- title: Launch\n  status: published\n  day: 2\n",
    )
    .unwrap();
    let content: SiteContent = serde_json::from_value(json!({
        "pages": [{
            "route": "/events",
            "sections": [{
                "parsedContent": {"title": "Events"},
                "fetch": {"path": "content/events.yaml", "filter": "status == published", "sort": "day", "limit": 5}
            }]
        }]
    }))
    .unwrap();

    let output = prerenderer(&site).fetch_site_data(content).await.unwrap();
    let events = &output.content.pages[0].sections[0].parsed_content["data"]["events"];

    assert_eq!(events[0]["title"], json!("Launch"));
    assert_eq!(events[1]["title"], json!("Meetup"));
    assert_eq!(events.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_remote_page_fetch_drives_expansion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 7, "name": "Ada"}, {"id": 9, "name": "Linus"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let site = SiteFixture::new().unwrap();
    let content: SiteContent = serde_json::from_value(json!({
        "pages": [
            {"route": "/team", "fetch": {"url": format!("{}/people", server.uri()), "schema": "members", "transform": "results", "prerender": true}},
            {"route": "/team/:id", "isDynamic": true, "paramName": "id", "parentSchema": "members", "sections": [{}]}
        ]
    }))
    .unwrap();

    let output = prerenderer(&site).run(content).await.unwrap();
    let routes: Vec<_> = output.content.pages.iter().map(|p| p.route.as_str()).collect();

    assert_eq!(routes, vec!["/team", "/team/7", "/team/9"]);
    let context = output.content.pages[1].dynamic_context.as_ref().unwrap();
    assert_eq!(context.param_value, "7");
    assert_eq!(context.singular_schema, "member");
}

#[tokio::test]
async fn test_remote_failure_degrades_and_other_pages_complete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&server)
        .await;
    let site = SiteFixture::new().unwrap();
    site.data_file("team.json", r#"[{"name": "Ada"}]"#).unwrap();
    let content: SiteContent = serde_json::from_value(json!({
        "pages": [
            {"route": "/news", "fetch": {"url": format!("{}/news", server.uri()), "prerender": true}, "sections": [{}]},
            {"route": "/news/:slug", "isDynamic": true, "paramName": "slug", "parentSchema": "news"},
            {"route": "/about", "fetch": "/data/team.json", "sections": [{}]}
        ]
    }))
    .unwrap();

    let output = prerenderer(&site).run(content).await.unwrap();

    let routes: Vec<_> = output.content.pages.iter().map(|p| p.route.as_str()).collect();
    assert_eq!(routes, vec!["/news", "/about"]);
    assert_eq!(output.page_fetches["/news"].data, json!([]));
    assert_eq!(output.content.pages[1].sections[0].cascaded_data["team"], json!([{"name": "Ada"}]));
    assert!(output.warnings.iter().any(|w| w.contains("HTTP 500")));
}

#[tokio::test]
async fn test_config_controls_public_dir_and_render_output() {
    let site = SiteFixture::new().unwrap();
    site.write("sitekit.toml", "public_dir = \"static\"\noutput_dir = \"build\"\n").unwrap();
    site.write("static/data/faq.json", r#"[{"q": "Why?"}]"#).unwrap();
    let content: SiteContent = serde_json::from_value(json!({
        "pages": [{"route": "/faq", "fetch": "/data/faq.json", "title": "FAQ", "sections": [{}]}]
    }))
    .unwrap();

    let config = BuildConfig::load_with_optional(None, site.root()).unwrap();
    let output = Prerenderer::from_config(&config).unwrap().run(content).await.unwrap();
    assert_eq!(output.page_fetches["/faq"].data, json!([{"q": "Why?"}]));

    let renderer = |page: &sitekit_cli::content::Page, _site: &SiteContent| -> anyhow::Result<String> {
        Ok(format!("<title>{}</title>", page.title.as_deref().unwrap_or_default()))
    };
    let written = render_pages(&output.content, &renderer, &config.output_dir).unwrap();

    assert_eq!(written, vec![site.root().join("build/faq/index.html")]);
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "<title>FAQ</title>");
}
