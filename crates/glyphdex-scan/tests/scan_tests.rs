use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use futures::future::BoxFuture;
use glyphdex_core::ScanConfig;
use glyphdex_scan::{AssetWalker, BoxError, ScanResult, TaskExecutor};

fn names(result: &ScanResult) -> BTreeSet<String> {
    result
        .records
        .iter()
        .map(|record| record.name.to_string())
        .collect()
}

fn make_ws(dir: &TempDir) -> PathBuf {
    let root = dir.path().join("ws");
    fs::create_dir_all(&root).unwrap();
    root
}

#[tokio::test]
async fn test_default_ignore_scenario() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::create_dir_all(root.join("node_modules")).unwrap();
    fs::write(root.join("a.svg"), "<svg/>").unwrap();
    fs::write(root.join("sub/b.svg"), "<svg/>").unwrap();
    fs::write(root.join("node_modules/c.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&root).await;

    assert_eq!(names(&result), BTreeSet::from(["a".to_string(), "b".to_string()]));
    assert_eq!(result.files_scanned, 2);
    assert!(!result.truncated);
    assert!(result.issues.is_empty());
}

#[tokio::test]
async fn test_rescan_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    for sub in ["icons", "icons/arrows", "brand"] {
        fs::create_dir_all(root.join(sub)).unwrap();
    }
    for file in ["icons/a.svg", "icons/arrows/up.svg", "icons/arrows/down.svg", "brand/logo.svg"] {
        fs::write(root.join(file), "<svg/>").unwrap();
    }

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let first = walker.scan(&root).await;
    let second = walker.scan(&root).await;

    // Same item set (as a set, order unconstrained) and same flag.
    assert_eq!(names(&first), names(&second));
    assert_eq!(first.truncated, second.truncated);
    assert_eq!(first.files_scanned, second.files_scanned);
}

#[tokio::test]
async fn test_depth_boundary() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join("sub/deep")).unwrap();
    fs::write(root.join("at0.svg"), "<svg/>").unwrap();
    fs::write(root.join("sub/at1.svg"), "<svg/>").unwrap();
    fs::write(root.join("sub/deep/at2.svg"), "<svg/>").unwrap();

    let config = ScanConfig::builder().max_depth(1u32).build().unwrap();
    let walker = AssetWalker::new(config).unwrap();
    let result = walker.scan(&root).await;

    // A file at depth exactly max_depth is included; one level deeper
    // is excluded and marks truncation.
    assert_eq!(names(&result), BTreeSet::from(["at0".to_string(), "at1".to_string()]));
    assert!(result.truncated);
}

#[tokio::test]
async fn test_max_files_ceiling_is_exact_and_sticky() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    for i in 0..10 {
        fs::write(root.join(format!("icon{i}.svg")), "<svg/>").unwrap();
    }

    let config = ScanConfig::builder().max_files(3usize).build().unwrap();
    let walker = AssetWalker::new(config).unwrap();
    let result = walker.scan(&root).await;

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.files_scanned, 3);
    assert!(result.truncated);
}

#[tokio::test]
async fn test_missing_root_is_empty_not_error() {
    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan("/definitely/not/here").await;
    assert!(result.records.is_empty());
    assert!(result.issues.is_empty());
    assert!(!result.truncated);
}

#[tokio::test]
async fn test_ignore_matched_root_is_empty() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("node_modules");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&root).await;
    assert!(result.records.is_empty());
    assert!(result.issues.is_empty());
}

#[tokio::test]
async fn test_file_root_is_empty() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("just-a-file.svg");
    fs::write(&file, "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&file).await;
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn test_hidden_entries_are_skipped() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join(".cache")).unwrap();
    fs::write(root.join(".cache/x.svg"), "<svg/>").unwrap();
    fs::write(root.join(".y.svg"), "<svg/>").unwrap();
    fs::write(root.join("z.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&root).await;
    assert_eq!(names(&result), BTreeSet::from(["z".to_string()]));
}

#[tokio::test]
async fn test_ignore_file_applies_to_subtree() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join("drafts")).unwrap();
    fs::create_dir_all(root.join("keep/inner")).unwrap();
    fs::write(root.join(".iconignore"), "drafts\n*.tmp.svg\n# comment\n").unwrap();
    fs::write(root.join("drafts/sketch.svg"), "<svg/>").unwrap();
    fs::write(root.join("scratch.tmp.svg"), "<svg/>").unwrap();
    fs::write(root.join("final.svg"), "<svg/>").unwrap();
    fs::write(root.join("keep/kept.svg"), "<svg/>").unwrap();
    // A deeper ignore file chains onto the inherited one.
    fs::write(root.join("keep/.iconignore"), "inner\n").unwrap();
    fs::write(root.join("keep/inner/buried.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&root).await;

    assert_eq!(
        names(&result),
        BTreeSet::from(["final".to_string(), "kept".to_string()])
    );
}

#[tokio::test]
async fn test_record_category_is_parent_folder() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join("social")).unwrap();
    fs::write(root.join("social/share.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan(&root).await;

    let record = &result.records[0];
    assert_eq!(record.name, "share");
    assert_eq!(record.category, "social");
    assert_eq!(record.defining_path, root.join("social/share.svg"));
}

#[tokio::test]
async fn test_scan_folders_skips_unnamed_siblings() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    for sub in ["icons", "extras", "other"] {
        fs::create_dir_all(root.join(sub)).unwrap();
        fs::write(root.join(sub).join(format!("{sub}.svg")), "<svg/>").unwrap();
    }
    fs::write(root.join("toplevel.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker
        .scan_folders(&root, &["icons".to_string(), "extras".to_string()])
        .await;

    assert_eq!(
        names(&result),
        BTreeSet::from(["icons".to_string(), "extras".to_string()])
    );
}

#[tokio::test]
async fn test_progress_reports_matches() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    for i in 0..4 {
        fs::write(root.join(format!("icon{i}.svg")), "<svg/>").unwrap();
    }

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let mut progress = walker.subscribe();
    let result = walker.scan(&root).await;
    assert_eq!(result.files_scanned, 4);

    let mut last = 0;
    while let Ok(update) = progress.try_recv() {
        last = update.files_matched;
    }
    assert_eq!(last, 4);
}

#[tokio::test]
async fn test_in_flight_never_exceeds_ceiling() {
    let limit = 3usize;
    let executor = TaskExecutor::new(limit).unwrap();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let in_flight_for_task = Arc::clone(&in_flight);
    let peak_for_task = Arc::clone(&peak);
    let results = executor
        .run(
            (0..20u32).collect(),
            move |value| {
                let in_flight = Arc::clone(&in_flight_for_task);
                let peak = Arc::clone(&peak_for_task);
                Box::pin(async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(value)
                }) as BoxFuture<'static, Result<u32, BoxError>>
            },
            None,
        )
        .await;

    assert_eq!(results.len(), 20);
    assert!(results.iter().all(Option::is_some));
    assert!(peak.load(Ordering::SeqCst) <= limit);
    assert!(peak.load(Ordering::SeqCst) >= 2, "work should overlap");
}

#[tokio::test]
async fn test_bounding_is_neither_serial_nor_unbounded() {
    // 6 items, ceiling 2, fixed delay D: wall clock lands near 3·D,
    // not D (full parallelism) and not 6·D (serialization).
    let delay = Duration::from_millis(50);
    let executor = TaskExecutor::new(2).unwrap();

    let started = Instant::now();
    executor
        .run(
            (0..6u32).collect(),
            move |value| {
                Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    Ok(value)
                }) as BoxFuture<'static, Result<u32, BoxError>>
            },
            None,
        )
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= delay * 3 - Duration::from_millis(10), "too fast: {elapsed:?}");
    assert!(elapsed < delay * 5, "too slow: {elapsed:?}");
}

#[tokio::test]
async fn test_walker_concurrency_one_still_completes() {
    let dir = TempDir::new().unwrap();
    let root = make_ws(&dir);
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    fs::write(root.join("a/b/c/deep.svg"), "<svg/>").unwrap();
    fs::write(root.join("top.svg"), "<svg/>").unwrap();

    let config = ScanConfig::builder().max_concurrency(1usize).build().unwrap();
    let walker = AssetWalker::new(config).unwrap();
    let result = walker.scan(&root).await;

    assert_eq!(names(&result), BTreeSet::from(["deep".to_string(), "top".to_string()]));
}

#[tokio::test]
async fn test_scan_many_unions_roots() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    fs::write(first.join("one.svg"), "<svg/>").unwrap();
    fs::write(second.join("two.svg"), "<svg/>").unwrap();

    let walker = AssetWalker::new(ScanConfig::default()).unwrap();
    let result = walker.scan_many(&[first, second, Path::new("/missing").into()]).await;

    assert_eq!(names(&result), BTreeSet::from(["one".to_string(), "two".to_string()]));
}
