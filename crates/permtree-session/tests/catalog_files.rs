//! Loading catalogs from disk.

use std::io::Write;
use std::path::PathBuf;

use permtree_core::FlatPermissions;
use permtree_session::{CatalogConfig, ConfigError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn json_fixture_builds() {
    let catalog = CatalogConfig::from_json_file(fixture("catalog.json"))
        .expect("fixture parses")
        .build()
        .expect("fixture is valid");

    assert_eq!(catalog.roles().len(), 6);
    let keys: Vec<&str> = catalog.hierarchies().iter().map(|h| h.key.as_str()).collect();
    assert_eq!(keys, ["location", "organization", "project"]);
    assert_eq!(catalog.hierarchy("location").expect("location").hierarchy.len(), 19);
    assert_eq!(catalog.hierarchy("organization").expect("organization").hierarchy.len(), 8);
    assert_eq!(catalog.hierarchy("project").expect("project").hierarchy.len(), 5);

    let editor = catalog.subject("user-editor").expect("editor");
    assert_eq!(editor.roles, ["editor", "analyst"]);
    assert_eq!(
        editor.permissions["organization"]["tech-corp"],
        FlatPermissions::new(true, false)
    );
    assert!(editor.permissions["project"].is_empty());
}

#[test]
fn toml_fixture_builds() {
    let catalog = CatalogConfig::from_toml_file(fixture("catalog.toml"))
        .expect("fixture parses")
        .build()
        .expect("fixture is valid");

    let project = catalog.hierarchy("project").expect("project");
    assert_eq!(project.hierarchy.len(), 5);
    assert_eq!(project.hierarchy.parent_id("project-titan"), Some("q3-initiatives"));

    let viewer = catalog.subject("user-viewer").expect("viewer");
    assert_eq!(viewer.permissions["project"].len(), 2);
    let admin = catalog.subject("user-admin").expect("admin");
    assert!(admin.permissions.is_empty());
}

#[test]
fn written_file_round_trips() {
    let config = CatalogConfig::from_json_file(fixture("catalog.json")).expect("fixture parses");
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(config.to_json_string().expect("serializes").as_bytes())
        .expect("write");
    let reloaded = CatalogConfig::from_json_file(file.path()).expect("reload");
    assert_eq!(reloaded, config);
}

#[test]
fn toml_file_with_validation_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        r#"
roles = ["viewer"]

[[subjects]]
id = "u1"
name = "Someone"
roles = ["owner"]
"#,
    )
    .expect("write");

    let config = CatalogConfig::from_toml_file(&path).expect("parses");
    match config.build() {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors, ["subjects.u1: unknown role 'owner'"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = CatalogConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn malformed_json_is_json_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"{\"roles\": [1, 2]}").expect("write");
    let err = CatalogConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}
