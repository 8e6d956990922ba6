//! Registry extraction and DirStore integration tests.
//! Layout: <store>/DASHBOARD.md and <store>/projects/<name>/STATUS.md

use assert_fs::prelude::*;
use overseer_core::{
    registry, store::content_version, DirStore, DocumentStore, ProjectName, StoreError,
    VersionToken,
};
use predicates::prelude::predicate;
use rstest::rstest;

fn status_doc(code_path: &str) -> String {
    format!(
        "# Project Status: Beauty-PK\n\n| Field | Value |\n|---|---|\n| **Actual Code Path** | `{code_path}` |\n\n## Log\n<!-- LOG_START -->\n"
    )
}

// ---------------------------------------------------------------------------
// 1. Dashboard parsing
// ---------------------------------------------------------------------------

#[rstest]
#[case("| 🎨 | **Beauty-PK** | 🟢 |", Some("Beauty-PK"))]
#[case("| 🧪 | ***Lab*** | |", Some("Lab"))]
#[case("|🎨| **Tight** |", Some("Tight"))]
#[case("| 🎨 | Beauty-PK | 🟢 |", None)]
#[case("| **Name only", None)]
#[case("text ** | mentions a bold end only", None)]
fn dashboard_row_extraction(#[case] row: &str, #[case] expected: Option<&str>) {
    let names = registry::parse_dashboard(row);
    assert_eq!(
        names,
        expected.map(ProjectName::from).into_iter().collect::<Vec<_>>()
    );
}

#[test]
fn dashboard_keeps_duplicates_and_row_order() {
    let dashboard = "| a | **Zeta** |\n| b | **Alpha** |\n| c | **Zeta** |\n";
    let names: Vec<String> = registry::parse_dashboard(dashboard)
        .into_iter()
        .map(|n| n.0)
        .collect();
    assert_eq!(names, ["Zeta", "Alpha", "Zeta"]);
}

#[test]
fn load_projects_reads_dashboard_from_store() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("DASHBOARD.md")
        .write_str("| Icon | Project |\n|---|---|\n| 🎨 | **Beauty-PK** |\n| 🛰 | **Orbit** |\n")
        .expect("write dashboard");

    let store = DirStore::new(root.path());
    let names = registry::load_projects(&store).expect("load");
    assert_eq!(names, vec![ProjectName::from("Beauty-PK"), ProjectName::from("Orbit")]);
}

#[test]
fn load_projects_without_dashboard_is_not_found() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = DirStore::new(root.path());
    let err = registry::load_projects(&store).unwrap_err();
    assert!(err.is_not_found(), "got: {err}");
    assert!(err.to_string().contains("DASHBOARD.md"));
}

// ---------------------------------------------------------------------------
// 2. Code path resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_code_path_returns_trimmed_value() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("projects/Beauty-PK/STATUS.md")
        .write_str(&status_doc("  /srv/code/beauty-pk "))
        .expect("write status");

    let store = DirStore::new(root.path());
    let path = registry::resolve_code_path(&store, &ProjectName::from("Beauty-PK")).expect("resolve");
    assert_eq!(path.as_deref(), Some("/srv/code/beauty-pk"));
}

#[test]
fn resolve_code_path_first_row_wins() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("projects/Twin/STATUS.md")
        .write_str("| **Actual Code Path** | `/first` |\n| **Actual Code Path** | `/second` |\n")
        .expect("write status");

    let store = DirStore::new(root.path());
    let path = registry::resolve_code_path(&store, &ProjectName::from("Twin")).expect("resolve");
    assert_eq!(path.as_deref(), Some("/first"));
}

#[test]
fn resolve_code_path_missing_document_is_none() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = DirStore::new(root.path());
    let path = registry::resolve_code_path(&store, &ProjectName::from("Ghost")).expect("resolve");
    assert!(path.is_none());
}

#[test]
fn resolve_code_path_without_row_is_none() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("projects/Bare/STATUS.md")
        .write_str("# Project Status: Bare\n<!-- LOG_START -->\n")
        .expect("write status");

    let store = DirStore::new(root.path());
    let path = registry::resolve_code_path(&store, &ProjectName::from("Bare")).expect("resolve");
    assert!(path.is_none());
}

// ---------------------------------------------------------------------------
// 3. DirStore optimistic writes
// ---------------------------------------------------------------------------

#[test]
fn write_with_current_version_replaces_content() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child("projects/A/STATUS.md");
    file.write_str("before\n").expect("write");

    let store = DirStore::new(root.path());
    let doc = store.get_document("projects/A/STATUS.md").expect("get");
    assert_eq!(doc.version, content_version("before\n"));

    store
        .write_document("projects/A/STATUS.md", "after\n", "audit", &doc.version)
        .expect("write");
    file.assert("after\n");
    root.child("projects/A/STATUS.md.overseer.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn write_with_stale_version_is_conflict() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child("projects/A/STATUS.md");
    file.write_str("before\n").expect("write");

    let store = DirStore::new(root.path());
    let doc = store.get_document("projects/A/STATUS.md").expect("get");
    file.write_str("edited elsewhere\n").expect("concurrent edit");

    let err = store
        .write_document("projects/A/STATUS.md", "after\n", "audit", &doc.version)
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "got: {err}");
    file.assert("edited elsewhere\n");
}

#[test]
fn write_to_deleted_document_is_conflict() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = DirStore::new(root.path());
    let err = store
        .write_document("projects/A/STATUS.md", "x", "audit", &VersionToken::from("abc"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "got: {err}");
}
