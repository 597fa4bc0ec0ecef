//! Integration tests for the frontier and its SQLite store
//!
//! These tests reopen stores from disk to check that progress survives a
//! restart and that the frontier invariants hold across runs.

use chrono::{NaiveDate, NaiveDateTime};
use crawl_frontier::config::PartitionNames;
use crawl_frontier::frontier::FrontierError;
use crawl_frontier::link::IgnoreRules;
use crawl_frontier::store::{Partition, PartitionStore, StoreError, StoreLayout};
use crawl_frontier::{Frontier, SqliteStore};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

const ROOT: &str = "https://example.test/";

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 4, 1)
        .unwrap()
        .and_hms_opt(19, 5, 0)
        .unwrap()
}

fn private_rules(_: &url::Url) -> IgnoreRules {
    IgnoreRules::from_prefixes(["https://example.test/private"])
}

fn open(dir: &Path) -> Frontier {
    let store = SqliteStore::new(dir, StoreLayout::default());
    Frontier::initialize_with(&[ROOT], store, private_rules).expect("Failed to open frontier")
}

#[test]
fn test_persistence_round_trip() {
    let dir = TempDir::new().unwrap();

    let before = {
        let mut frontier = open(dir.path());
        frontier
            .extract_links([
                "https://example.test/a",
                "https://example.test/b",
                "https://example.test/private/x",
            ])
            .unwrap();
        frontier.complete(ROOT, "Home", t0()).unwrap();
        frontier.complete("https://example.test/b", "", t0()).unwrap();
        frontier.snapshot()
    };

    let after = open(dir.path()).snapshot();
    assert!(before.same_sets(&after));
    assert_eq!(after.pending, vec!["https://example.test/a"]);
    assert_eq!(
        after.done,
        BTreeSet::from([ROOT.to_string(), "https://example.test/b".to_string()])
    );
    assert_eq!(
        after.ignored,
        BTreeSet::from(["https://example.test/private/x".to_string()])
    );
    assert_eq!(after.ignore_rules, vec!["https://example.test/private"]);
}

#[test]
fn test_resume_ignores_new_seeds_and_default_rules() {
    let dir = TempDir::new().unwrap();
    {
        let mut frontier = open(dir.path());
        frontier.complete(ROOT, "Home", t0()).unwrap();
    }

    let store = SqliteStore::new(dir.path(), StoreLayout::default());
    let frontier = Frontier::initialize(&["https://example.test/other"], store).unwrap();

    assert!(frontier.is_finished());
    assert!(frontier.contains_done(ROOT));
    assert!(!frontier.contains_pending("https://example.test/other"));
    assert_eq!(
        frontier.ignore_rules().iter().collect::<Vec<_>>(),
        vec!["https://example.test/private"]
    );
}

#[test]
fn test_completed_urls_are_not_resurrected_after_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut frontier = open(dir.path());
        frontier.extract_links(["https://example.test/private/x"]).unwrap();
        frontier.complete(ROOT, "Home", t0()).unwrap();
    }

    let mut frontier = open(dir.path());
    let summary = frontier
        .extract_links([ROOT, "https://example.test/private/x"])
        .unwrap();
    assert_eq!(summary.added, 0);
    assert!(frontier.is_finished());
}

#[test]
fn test_no_duplication_across_overlapping_batches() {
    let dir = TempDir::new().unwrap();
    let mut frontier = open(dir.path());

    let pages = [
        vec!["https://example.test/a", "https://example.test/b"],
        vec!["https://example.test/b", "https://example.test/c", ROOT],
        vec!["https://example.test/a", "https://example.test/private/1"],
        vec!["https://example.test/private/1", "https://example.test/c"],
    ];
    for links in &pages {
        frontier.extract_links(links.iter()).unwrap();
    }
    frontier.complete("https://example.test/b", "B", t0()).unwrap();
    frontier.extract_links(["https://example.test/b"]).unwrap();

    let snapshot = frontier.snapshot();
    let mut all: Vec<&String> = snapshot
        .pending
        .iter()
        .chain(snapshot.done.iter())
        .chain(snapshot.ignored.iter())
        .collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
    assert_eq!(snapshot.known_urls(), 5);

    let store = frontier.store();
    assert_eq!(store.partition_len(Partition::ToCrawl).unwrap(), 3);
    assert_eq!(store.partition_len(Partition::Crawled).unwrap(), 1);
    assert_eq!(store.partition_len(Partition::Ignored).unwrap(), 1);
}

#[test]
fn test_ignore_rule_soundness() {
    let dir = TempDir::new().unwrap();
    let mut frontier = open(dir.path());
    frontier
        .extract_links([
            "https://example.test/private",
            "https://example.test/private/deep/page",
            "https://example.test/privately",
            "https://example.test/public",
        ])
        .unwrap();

    let snapshot = frontier.snapshot();
    let rules = frontier.ignore_rules();
    for url in &snapshot.ignored {
        assert!(rules.is_ignored(url), "{} should match a rule", url);
    }
    for url in snapshot.pending.iter().chain(snapshot.done.iter()) {
        assert!(!rules.is_ignored(url), "{} should match no rule", url);
    }
    assert_eq!(snapshot.ignored.len(), 3);
}

#[test]
fn test_crawl_until_finished() {
    let dir = TempDir::new().unwrap();
    let mut frontier = open(dir.path());
    frontier
        .extract_links(["https://example.test/a", "https://example.test/b"])
        .unwrap();

    let mut order = Vec::new();
    while !frontier.is_finished() {
        let batch: Vec<String> = frontier.next_batch(2).map(String::from).collect();
        for url in batch {
            frontier.complete(&url, "", t0()).unwrap();
            order.push(url);
        }
    }

    assert_eq!(
        order,
        vec![ROOT, "https://example.test/a", "https://example.test/b"]
    );
    assert_eq!(open(dir.path()).done_len(), 3);
}

#[test]
fn test_custom_partition_names_round_trip() {
    let dir = TempDir::new().unwrap();
    let layout = StoreLayout {
        header_rows: 1,
        names: PartitionNames {
            crawled: "Done".to_string(),
            to_crawl: "Todo".to_string(),
            ignore_rules: "Rules".to_string(),
            ignored: "Skipped".to_string(),
        },
    };

    {
        let store = SqliteStore::new(dir.path(), layout.clone());
        let mut frontier = Frontier::initialize_with(&[ROOT], store, private_rules).unwrap();
        frontier.complete(ROOT, "Home", t0()).unwrap();
    }

    let store = SqliteStore::new(dir.path(), layout);
    let frontier = Frontier::initialize(&[ROOT], store).unwrap();
    assert!(frontier.contains_done(ROOT));

    let store = SqliteStore::new(dir.path(), StoreLayout::default());
    let result = Frontier::initialize(&[ROOT], store);
    assert!(matches!(
        result,
        Err(FrontierError::Store(StoreError::UnknownPartition(_)))
    ));
}

#[test]
fn test_store_file_is_named_after_host() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path(), StoreLayout::default());
    Frontier::initialize(&["https://Example.TEST/start"], store).unwrap();

    assert!(SqliteStore::store_path(dir.path(), "example.test").exists());
}

#[test]
fn test_ignored_seed_stays_ignored_after_restart() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path(), StoreLayout::default());
    let frontier = Frontier::initialize_with(
        &[ROOT, "https://example.test/private/start"],
        store,
        private_rules,
    )
    .unwrap();
    assert_eq!(frontier.pending_len(), 1);
    drop(frontier);

    let frontier = open(dir.path());
    let snapshot = frontier.snapshot();
    assert_eq!(snapshot.pending, vec![ROOT]);
    assert_eq!(
        snapshot.ignored,
        BTreeSet::from(["https://example.test/private/start".to_string()])
    );
}
