use std::sync::Arc;

use futures::TryStreamExt;

use docstream::application::ports::{DocumentFetcher, DurableStore, FetchError, FetchedDocument};
use docstream::domain::{DocumentReference, SourceKind, StoragePath};
use docstream::infrastructure::fetch::{FileFetcher, HttpFetcher, RoutingFetcher, StoreFetcher};
use docstream::infrastructure::storage::ObjectDurableStore;

use crate::helpers::BASE_URL;

async fn collect(document: FetchedDocument) -> Vec<u8> {
    document
        .stream
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
        .unwrap()
}

fn reference(raw: &str) -> DocumentReference {
    DocumentReference::new(raw)
}

#[tokio::test]
async fn given_local_path_when_fetching_file_then_contents_streamed() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "local text").unwrap();

    let fetched = FileFetcher
        .open(&reference(&path.display().to_string()), SourceKind::File)
        .await
        .unwrap();

    assert_eq!(fetched.content_length, Some(10));
    assert_eq!(collect(fetched).await, b"local text");
}

#[tokio::test]
async fn given_encoded_file_url_when_fetching_then_path_is_decoded() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("with space.txt");
    std::fs::write(&path, "spaced").unwrap();
    let url = format!(
        "file://{}",
        path.display().to_string().replace(' ', "%20")
    );

    let fetched = FileFetcher
        .open(&reference(&url), SourceKind::File)
        .await
        .unwrap();

    assert_eq!(collect(fetched).await, b"spaced");
}

#[tokio::test]
async fn given_missing_file_when_fetching_then_not_found() {
    let result = FileFetcher
        .open(&reference("/definitely/not/here.txt"), SourceKind::File)
        .await;

    assert!(matches!(result, Err(FetchError::NotFound(_))));
}

#[tokio::test]
async fn given_wrong_kind_when_fetching_file_then_unsupported() {
    let result = FileFetcher
        .open(&reference("/tmp/x.txt"), SourceKind::Hdfs)
        .await;

    assert!(matches!(result, Err(FetchError::UnsupportedKind(kind)) if kind == "HDFS"));
}

#[test]
fn given_store_url_when_resolving_then_scheme_and_authority_stripped() {
    let path = StoreFetcher::storage_path(&reference(
        "hdfs://namenode:8020/incoming/annual%20report.pdf",
    ));

    assert_eq!(path.as_str(), "incoming/annual report.pdf");
}

#[test]
fn given_bare_store_path_when_resolving_then_used_as_is() {
    let path = StoreFetcher::storage_path(&reference("/incoming/a.txt"));

    assert_eq!(path.as_str(), "incoming/a.txt");
}

#[tokio::test]
async fn given_object_in_store_when_fetching_then_contents_streamed() {
    let store = Arc::new(ObjectDurableStore::in_memory(BASE_URL));
    store
        .write(&StoragePath::from_raw("incoming/a.txt"), "stored".into())
        .await
        .unwrap();
    let fetcher = StoreFetcher::new(store);

    let fetched = fetcher
        .open(&reference(&format!("{BASE_URL}/incoming/a.txt")), SourceKind::Hdfs)
        .await
        .unwrap();

    assert_eq!(collect(fetched).await, b"stored");
}

#[tokio::test]
async fn given_missing_object_when_fetching_from_store_then_not_found() {
    let fetcher = StoreFetcher::new(Arc::new(ObjectDurableStore::in_memory(BASE_URL)));

    let result = fetcher
        .open(&reference(&format!("{BASE_URL}/incoming/gone.txt")), SourceKind::Hdfs)
        .await;

    assert!(matches!(result, Err(FetchError::NotFound(_))));
}

#[tokio::test]
async fn given_unregistered_kind_when_routing_then_unsupported() {
    let file: Arc<dyn DocumentFetcher> = Arc::new(FileFetcher);
    let router = RoutingFetcher::new(vec![(SourceKind::File, file)]);

    assert!(router.supports(SourceKind::File));
    assert!(!router.supports(SourceKind::Http));
    let result = router
        .open(&reference("https://example.com/a.pdf"), SourceKind::Http)
        .await;
    assert!(matches!(result, Err(FetchError::UnsupportedKind(_))));
}

#[tokio::test]
async fn given_registered_kind_when_routing_then_delegated() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("routed.txt");
    std::fs::write(&path, "routed").unwrap();
    let file: Arc<dyn DocumentFetcher> = Arc::new(FileFetcher);
    let router = RoutingFetcher::new(vec![(SourceKind::File, file)]);

    let fetched = router
        .open(&reference(&path.display().to_string()), SourceKind::File)
        .await
        .unwrap();

    assert_eq!(collect(fetched).await, b"routed");
}

#[tokio::test]
async fn given_non_http_kind_when_fetching_over_http_then_unsupported() {
    let fetcher = HttpFetcher::new(std::time::Duration::from_secs(1)).unwrap();

    let result = fetcher
        .open(&reference("/local/file.txt"), SourceKind::File)
        .await;

    assert!(matches!(result, Err(FetchError::UnsupportedKind(_))));
}
