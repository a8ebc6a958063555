use std::fs;

use tempfile::TempDir;

use glyphdex_core::{IconRecord, ScanConfig, read_record};
use glyphdex_session::{IconSession, SessionContext, SourceKind};

fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ws");
    fs::create_dir_all(root.join("icons")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::write(root.join("icons/rocket.svg"), "<svg/>").unwrap();
    fs::write(root.join("icons/anchor.svg"), "<svg/>").unwrap();
    fs::write(root.join("banner.svg"), "<svg/>").unwrap();
    fs::write(root.join("node_modules/pkg/hidden.svg"), "<svg/>").unwrap();
    (dir, root)
}

fn library_artifact(root: &std::path::Path) -> std::path::PathBuf {
    let artifact = root.join("icon-lib.ts");
    fs::write(
        &artifact,
        r#"
export const spinner = {
  name: "spinner",
  body: '<circle cx="12" cy="12" r="10"/>',
  viewBox: "0 0 24 24",
  animation: { type: "spin", duration: 1000, timing: "linear", iteration: "infinite" },
};
"#,
    )
    .unwrap();
    artifact
}

#[tokio::test]
async fn test_rebuild_populates_all_sources() {
    let (_dir, root) = workspace();
    let artifact = library_artifact(&root);

    let session = IconSession::new(ScanConfig::default(), SessionContext::new())
        .unwrap()
        .with_library_artifacts(vec![artifact]);

    let summary = session.rebuild(&root).await.unwrap();
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.library_icons, 1);
    assert!(!summary.truncated);
    assert!(summary.issues.is_empty());

    session.with_model(|model| {
        assert_eq!(model.index().count_of(SourceKind::Workspace), 3);
        assert_eq!(model.index().count_of(SourceKind::Library), 1);
    });

    // Reveal by name and by path.
    assert!(session.reveal("spinner").is_some());
    let banner = root.join("banner.svg");
    assert!(session.reveal(banner.to_str().unwrap()).is_some());
}

#[tokio::test]
async fn test_rebuild_notifies_full_refresh() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new()).unwrap();
    let mut refreshes = session.subscribe();

    session.rebuild(&root).await.unwrap();

    assert!(refreshes.try_recv().unwrap().is_full());
}

#[tokio::test]
async fn test_concurrent_rebuild_is_coalesced() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new()).unwrap();

    let (first, second) = tokio::join!(session.rebuild(&root), session.rebuild(&root));

    // The in-flight scan stands; the second request is a no-op.
    assert!(first.is_some());
    assert!(second.is_none());
    assert!(!session.is_scanning());

    // A later rebuild runs normally again.
    assert!(session.rebuild(&root).await.is_some());
}

#[tokio::test]
async fn test_missing_artifact_is_an_issue_not_an_error() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new())
        .unwrap()
        .with_library_artifacts(vec![root.join("gone.ts")]);

    let summary = session.rebuild(&root).await.unwrap();
    assert_eq!(summary.library_icons, 0);
    assert_eq!(summary.issues.len(), 1);
}

#[tokio::test]
async fn test_context_presets_decorate_records() {
    let (_dir, root) = workspace();
    let mut context = SessionContext::new();
    context.animations.assign(
        "rocket",
        glyphdex_core::AnimationSpec {
            kind: glyphdex_core::AnimationKind::Pulse,
            duration_ms: 700,
            timing: "ease-in-out".into(),
            iteration: glyphdex_core::IterationCount::Infinite,
            delay_ms: None,
            direction: None,
        },
    );

    let session = IconSession::new(ScanConfig::default(), context).unwrap();
    session.rebuild(&root).await.unwrap();

    let rocket = session.get_icon("rocket").unwrap();
    let animation = read_record(&rocket).animation.clone().unwrap();
    assert_eq!(animation.duration_ms, 700);

    // Icons without an assignment stay bare.
    let anchor = session.get_icon("anchor").unwrap();
    assert!(read_record(&anchor).animation.is_none());
}

#[tokio::test]
async fn test_single_entity_mutations_pass_through() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new()).unwrap();
    session.rebuild(&root).await.unwrap();

    let held = session.get_icon("anchor").unwrap();
    session.rename_icon("anchor", "mooring", None);
    assert_eq!(read_record(&held).name, "mooring");

    session.remove_icon("mooring");
    assert!(session.get_icon("mooring").is_none());

    session.add_icon(IconRecord::new_workspace("fresh", "/elsewhere/fresh.svg", "misc"));
    assert!(session.get_icon("fresh").is_some());

    // Mutating a missing record never throws.
    session.rename_icon("ghost", "phantom", None);
    session.remove_icon("ghost");
}

#[tokio::test]
async fn test_usage_writes_are_external_and_transient() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new()).unwrap();
    session.rebuild(&root).await.unwrap();

    session.set_usages(
        "rocket",
        vec![glyphdex_core::UsageSite {
            file: root.join("src/app.tsx"),
            line: 14,
            column: 8,
        }],
    );

    let rocket = session.get_icon("rocket").unwrap();
    assert_eq!(read_record(&rocket).usage_count(), 1);
}

#[tokio::test]
async fn test_refresh_all_is_lazy() {
    let (_dir, root) = workspace();
    let session = IconSession::new(ScanConfig::default(), SessionContext::new()).unwrap();
    session.rebuild(&root).await.unwrap();

    session.refresh_all();
    session.with_model(|model| {
        assert!(model.index().is_empty());
        assert_eq!(model.cached_nodes(), 0);
    });
}
