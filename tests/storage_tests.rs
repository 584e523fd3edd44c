use portfolio_cms::{
    errors::StorageError,
    storage::{build_storage, build_storage_key, ensure_safe_key, LocalStorage, RemoteStorage, StorageBackend},
    settings::{AppConfig, StorageKind},
    utils::media_url::{resolve_media_url, resolve_stored_url, RequestOrigin},
};

fn origin() -> RequestOrigin {
    RequestOrigin::new("https", "portfolio.test")
}

#[test]
fn root_relative_paths_are_joined_onto_the_request_origin() {
    assert_eq!(
        resolve_media_url("/media/projects/a.png", &origin()),
        "https://portfolio.test/media/projects/a.png"
    );
}

#[test]
fn absolute_urls_are_returned_unchanged() {
    let raw = "https://cdn.example.com/bucket/projects/a.png?sig=abc";
    assert_eq!(resolve_media_url(raw, &origin()), raw);
}

#[test]
fn relative_paths_are_resolved_from_the_host_root() {
    let origin = RequestOrigin::new("http", "localhost:8000");
    assert_eq!(
        resolve_media_url("media/resume/cv.pdf", &origin),
        "http://localhost:8000/media/resume/cv.pdf"
    );
}

#[test]
fn missing_or_blank_keys_resolve_to_none() {
    let storage = LocalStorage::new("unused", "/media/");
    assert_eq!(resolve_stored_url(&storage, None, &origin()), None);
    assert_eq!(resolve_stored_url(&storage, Some(""), &origin()), None);
    assert_eq!(resolve_stored_url(&storage, Some("  "), &origin()), None);
    assert_eq!(
        resolve_stored_url(&storage, Some("projects/a.png"), &origin()).as_deref(),
        Some("https://portfolio.test/media/projects/a.png")
    );
}

#[test]
fn storage_keys_are_slugified_and_unique() {
    let first = build_storage_key("projects", "My Screenshot (1).PNG");
    let second = build_storage_key("projects", "My Screenshot (1).PNG");

    assert!(first.starts_with("projects/my-screenshot-1-"), "{first}");
    assert!(first.ends_with(".png"), "{first}");
    assert_ne!(first, second);
}

#[test]
fn storage_keys_drop_client_directories() {
    let key = build_storage_key("resume/", "../../etc/passwd");
    assert!(key.starts_with("resume/passwd-"), "{key}");
    assert!(ensure_safe_key(&key).is_ok());
}

#[test]
fn unsafe_keys_are_rejected() {
    for key in ["", "/etc/passwd", "projects/../secret", "projects//a.png", "a\\b"] {
        assert!(
            matches!(ensure_safe_key(key), Err(StorageError::InvalidKey(_))),
            "{key:?} should be rejected"
        );
    }
}

#[test]
fn local_urls_are_root_relative_under_the_prefix() {
    let storage = LocalStorage::new("media", "media");
    assert_eq!(storage.url_of("projects/a.png"), "/media/projects/a.png");

    let storage = LocalStorage::new("media", "/uploads/");
    assert_eq!(storage.url_of("projects/a.png"), "/uploads/projects/a.png");
    assert_eq!(
        storage.url_of("https://cdn.example.com/a.png"),
        "https://cdn.example.com/a.png"
    );
}

#[actix_rt::test]
async fn local_storage_round_trips_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "/media/");

    let key = storage
        .store("resume", "cv.pdf", b"%PDF-1.4 test".to_vec())
        .await
        .unwrap();

    assert!(key.starts_with("resume/cv-"));
    assert!(storage.exists(&key).await.unwrap());
    assert_eq!(
        std::fs::read(dir.path().join(&key)).unwrap(),
        b"%PDF-1.4 test".to_vec()
    );

    storage.delete(&key).await.unwrap();
    assert!(!storage.exists(&key).await.unwrap());

    // Deleting again is not an error.
    storage.delete(&key).await.unwrap();
}

#[actix_rt::test]
async fn local_storage_refuses_traversal_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "/media/");

    assert!(matches!(
        storage.exists("../outside.txt").await,
        Err(StorageError::InvalidKey(_))
    ));
    assert!(matches!(
        storage.delete("/etc/hosts").await,
        Err(StorageError::InvalidKey(_))
    ));
}

#[test]
fn remote_urls_are_absolute_under_the_public_base() {
    let storage = RemoteStorage::new(
        "https://cdn.example.com/portfolio",
        "https://upload.example.com/portfolio/",
        Some("token".to_string()),
    )
    .unwrap();

    assert_eq!(
        storage.url_of("projects/a.png"),
        "https://cdn.example.com/portfolio/projects/a.png"
    );
    assert!(format!("{:?}", storage).contains("[REDACTED]"));
}

#[test]
fn remote_storage_rejects_relative_base_urls() {
    let result = RemoteStorage::new("cdn.example.com", "https://upload.example.com/", None);
    assert!(matches!(result, Err(StorageError::Misconfigured(_))));
}

#[test]
fn build_storage_requires_remote_urls() {
    let config = AppConfig {
        storage_backend: StorageKind::Remote,
        ..AppConfig::default()
    };
    assert!(matches!(build_storage(&config), Err(StorageError::Misconfigured(_))));

    let config = AppConfig {
        storage_backend: StorageKind::Remote,
        remote_public_base_url: Some("https://cdn.example.com/".into()),
        remote_upload_url: Some("https://upload.example.com/".into()),
        ..AppConfig::default()
    };
    let storage = build_storage(&config).unwrap();
    assert_eq!(storage.url_of("resume/cv.pdf"), "https://cdn.example.com/resume/cv.pdf");
}
