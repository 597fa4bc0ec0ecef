//! Integration tests for complete crawl operations
//!
//! These tests use wiremock to create mock HTTP servers and verify
//! end-to-end crawler behavior, including resuming from the store.

use crawl_frontier::config::{
    Config, CrawlerConfig, HttpConfig, IgnoreConfig, IndexConfig, PartitionNames, StorageConfig,
};
use crawl_frontier::crawler::{crawl, Driver};
use crawl_frontier::output::{load_statistics, PageSaver, SearchIndex};
use crawl_frontier::store::{SqliteStore, StoreLayout};
use crawl_frontier::{Frontier, IgnoreRules};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "127.0.0.1";

/// Helper to create a test configuration
fn create_test_config(seed: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            seeds: vec![seed.to_string()],
            batch_size: 2,
            max_attempts: 2,
        },
        storage: StorageConfig {
            base_path: dir.path().join("crawls"),
            header_rows: 3,
            save_pages: true,
            partitions: PartitionNames::default(),
        },
        http: HttpConfig {
            user_agent: "TestCrawler/1.0".to_string(),
            timeout_secs: 5,
            proxy: None,
        },
        ignore: IgnoreConfig {
            prefixes: Some(vec!["fr/".to_string()]),
        },
        index: Some(IndexConfig {
            database_path: dir.path().join("index.sqlite"),
        }),
    }
}

fn html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Mounts a small site: a home page, two content pages, a broken link,
/// an ignored section and an off-site link
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        html(
            "Home",
            &[
                "/page1",
                "page2",
                "/page1#top",
                "/broken",
                "/fr/accueil",
                "https://other.test/elsewhere",
                "mailto:someone@example.test",
            ],
        ),
        1,
    )
    .await;
    mount_page(server, "/page1", html("Page One", &["/", "/page2"]), 1).await;
    mount_page(server, "/page2", html("Page Two", &[]), 1).await;
    mount_page(server, "/fr/accueil", html("Accueil", &[]), 0).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_single_site() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let config = create_test_config(&home, &dir);

    let summary = crawl(&config, Some("test-hash"))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.abandoned, 1);

    let mut store = SqliteStore::new(
        config.storage.base_path.clone(),
        StoreLayout::from(&config.storage),
    );
    let stats = load_statistics(&mut store, SITE)
        .expect("Failed to read store")
        .expect("Store should exist");
    assert_eq!(stats.to_crawl, 0);
    assert_eq!(stats.crawled, 3);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.ignore_rules, 1);
}

#[tokio::test]
async fn test_crawl_records_pages_in_sinks() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let config = create_test_config(&home, &dir);

    crawl(&config, None).await.expect("Crawl failed");

    let saver = PageSaver::new(&config.storage.base_path, SITE);
    let saved = std::fs::read_to_string(saver.page_path(&home)).expect("Home page not saved");
    assert!(saved.contains("<title>Home</title>"));
    assert!(saver.page_path(&format!("{}/page2", mock_server.uri())).exists());
    assert!(!saver.page_path(&format!("{}/broken", mock_server.uri())).exists());

    let index_path = &config.index.as_ref().unwrap().database_path;
    let index = SearchIndex::open(index_path).expect("Failed to open index");
    assert_eq!(index.len().unwrap(), 3);

    // The home page only mentions "page" in its links, so it ranks last
    let hits = index.search("Page", 10).unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Page One", "Page Two", "Home"]);
}

#[tokio::test]
async fn test_crawl_resumes_from_store() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let config = create_test_config(&home, &dir);

    crawl(&config, None).await.expect("First crawl failed");

    // Finished crawls do not fetch again; the mocks' expected hit counts
    // are checked when the server is dropped
    let summary = crawl(&config, None).await.expect("Second crawl failed");
    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.batches, 0);

    let mut store = SqliteStore::new(
        config.storage.base_path.clone(),
        StoreLayout::from(&config.storage),
    );
    let stats = load_statistics(&mut store, SITE).unwrap().unwrap();
    assert_eq!(stats.crawled, 3);
    assert_eq!(stats.ignored, 1);
}

#[tokio::test]
async fn test_crawl_continues_interrupted_frontier() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html("Home", &["/a", "/b"]), 0).await;
    mount_page(&mock_server, "/a", html("A", &[]), 0).await;
    mount_page(&mock_server, "/b", html("B", &["/c"]), 1).await;
    mount_page(&mock_server, "/c", html("C", &[]), 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let config = create_test_config(&home, &dir);

    // Simulate a run that stopped after the first two pages
    {
        let store = SqliteStore::new(
            config.storage.base_path.clone(),
            StoreLayout::from(&config.storage),
        );
        let mut frontier = Frontier::initialize_with(&[home.as_str()], store, |root| {
            IgnoreRules::from_suffixes(root, &["fr/"])
        })
        .expect("Failed to create frontier");
        let now = chrono::Local::now().naive_local();
        frontier.complete(&home, "Home", now).unwrap();
        frontier
            .extract_links([format!("{}/a", mock_server.uri()), format!("{}/b", mock_server.uri())])
            .unwrap();
        frontier
            .complete(&format!("{}/a", mock_server.uri()), "A", now)
            .unwrap();
    }

    let mut driver = Driver::from_config(&config, None).expect("Failed to build driver");
    assert_eq!(driver.frontier().pending_len(), 1);

    let summary = driver.run().await.expect("Crawl failed");
    assert_eq!(summary.fetched, 2);

    let frontier = driver.into_frontier();
    assert!(frontier.is_finished());
    assert_eq!(frontier.done_len(), 4);
}

#[tokio::test]
async fn test_crawl_without_sinks() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html("Home", &[]), 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let mut config = create_test_config(&home, &dir);
    config.storage.save_pages = false;
    config.index = None;

    let summary = crawl(&config, None).await.expect("Crawl failed");
    assert_eq!(summary.fetched, 1);

    assert!(SqliteStore::store_path(&config.storage.base_path, SITE).exists());
    assert!(!config.storage.base_path.join(SITE).exists());
    assert!(!dir.path().join("index.sqlite").exists());
}

#[tokio::test]
async fn test_default_ignore_rules_apply_without_config() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        html("Home", &["/privacy", "/about"]),
        1,
    )
    .await;
    mount_page(&mock_server, "/about", html("About", &[]), 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = format!("{}/", mock_server.uri());
    let mut config = create_test_config(&home, &dir);
    config.ignore.prefixes = None;

    let mut driver = Driver::from_config(&config, None).expect("Failed to build driver");
    let summary = driver.run().await.expect("Crawl failed");
    assert_eq!(summary.fetched, 2);

    let frontier = driver.into_frontier();
    assert!(frontier.contains_ignored(&format!("{}/privacy", mock_server.uri())));
    assert!(!frontier.ignore_rules().is_empty());
}
