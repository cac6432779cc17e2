mod common;

use std::{collections::HashSet, sync::Arc};

use bucket_ext_rename::{
    EngineSettings, ErrorKind, ObjectDescriptor, ObjectLister, Prefix, RenameService,
    RenameServiceImpl,
};
use common::{session, FakeStore};
use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;

const TREE: &[&str] = &[
    "root.txt",
    "docs/h.txt",
    "docs/i.md",
    "photos/a.txt",
    "photos/b.txt",
    "photos/c.jpg",
    "photos/2023/g.txt",
    "photos/2024/",
    "photos/2024/d.txt",
    "photos/2024/may/e.txt",
    "photos/2024/may/f.txt",
];

async fn tree_store(page_size: usize) -> Arc<FakeStore> {
    let store = Arc::new(FakeStore::with_page_size(page_size));
    store.seed(TREE).await;
    store
}

fn keys(objects: &[ObjectDescriptor]) -> Vec<String> {
    objects.iter().map(|o| o.key.as_str().to_string()).collect()
}

async fn list_all(store: &Arc<FakeStore>, prefix: &str, recursive: bool) -> Vec<String> {
    let lister = ObjectLister::default();
    let objects: Vec<ObjectDescriptor> = lister
        .list(&session(store), &Prefix::new(prefix).unwrap(), recursive)
        .try_collect()
        .await
        .unwrap();
    keys(&objects)
}

#[tokio::test]
async fn test_recursive_listing_is_exhaustive_for_any_page_size() {
    let expected: HashSet<String> = TREE
        .iter()
        .filter(|k| !k.ends_with('/'))
        .map(|k| k.to_string())
        .collect();
    let reference = list_all(&tree_store(1000).await, "", true).await;

    for page_size in [1, 2, 3, 5, 1000] {
        let store = tree_store(page_size).await;
        let listed = list_all(&store, "", true).await;

        let unique: HashSet<String> = listed.iter().cloned().collect();
        assert_eq!(unique.len(), listed.len(), "duplicates at page size {}", page_size);
        assert_eq!(unique, expected, "page size {}", page_size);
        assert_eq!(listed, reference, "order changed at page size {}", page_size);
    }
}

#[tokio::test]
async fn test_small_pages_issue_continuation_requests() {
    let store = tree_store(1).await;

    list_all(&store, "photos/", false).await;

    // 3 objects and 2 sub-prefixes, one per page
    assert_eq!(store.list_calls(), 5);
}

#[tokio::test]
async fn test_non_recursive_lists_direct_children_only() {
    let store = tree_store(2).await;

    let listed = list_all(&store, "photos/", false).await;

    assert_eq!(listed, vec!["photos/a.txt", "photos/b.txt", "photos/c.jpg"]);
}

#[tokio::test]
async fn test_recursive_prefix_skips_folder_markers() {
    let store = tree_store(1000).await;

    let listed = list_all(&store, "photos/2024/", true).await;

    assert_eq!(
        listed,
        vec![
            "photos/2024/d.txt",
            "photos/2024/may/e.txt",
            "photos/2024/may/f.txt"
        ]
    );
}

#[tokio::test]
async fn test_listing_requeries_current_state() {
    let store = tree_store(1000).await;
    let lister = ObjectLister::default();
    let prefix = Prefix::new("docs/").unwrap();

    let first: Vec<ObjectDescriptor> = lister
        .list(&session(&store), &prefix, false)
        .try_collect()
        .await
        .unwrap();
    store.seed(&["docs/new.txt"]).await;
    let second: Vec<ObjectDescriptor> = lister
        .list(&session(&store), &prefix, false)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 3);
}

#[tokio::test]
async fn test_page_failure_ends_listing_with_error() {
    let store = tree_store(2).await;
    store.fail_list_call(2);
    let lister = ObjectLister::default();

    let result: Result<Vec<ObjectDescriptor>, _> = lister
        .list(&session(&store), &Prefix::root(), true)
        .try_collect()
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::ProviderError);
    // no retry after the failed page
    assert_eq!(store.list_calls(), 2);
}

#[tokio::test]
async fn test_cancelled_listing_returns_partial_result() {
    let store = Arc::new(FakeStore::with_page_size(2));
    let names: Vec<String> = (0..10).map(|i| format!("bulk/{:02}.dat", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    store.seed(&refs).await;

    let cancel = CancellationToken::new();
    store.cancel_after_lists(2, &cancel);

    let listing = ObjectLister::default()
        .collect(&session(&store), &Prefix::new("bulk/").unwrap(), false, &cancel)
        .await
        .unwrap();

    assert!(listing.cancelled);
    assert_eq!(
        keys(&listing.objects),
        vec!["bulk/00.dat", "bulk/01.dat", "bulk/02.dat", "bulk/03.dat"]
    );
    assert_eq!(store.list_calls(), 2);
}

#[tokio::test]
async fn test_cancel_after_last_page_keeps_listing_complete() {
    let store = Arc::new(FakeStore::with_page_size(2));
    store
        .seed(&["bulk/00.dat", "bulk/01.dat", "bulk/02.dat", "bulk/03.dat"])
        .await;

    let cancel = CancellationToken::new();
    // the second list call is the final page
    store.cancel_after_lists(2, &cancel);

    let listing = ObjectLister::default()
        .collect(&session(&store), &Prefix::new("bulk/").unwrap(), false, &cancel)
        .await
        .unwrap();

    assert!(cancel.is_cancelled());
    assert!(!listing.cancelled);
    assert_eq!(listing.objects.len(), 4);
    assert_eq!(store.list_calls(), 2);
}

#[tokio::test]
async fn test_browse_splits_folders_and_files() {
    let store = tree_store(2).await;
    let service = RenameServiceImpl::new(EngineSettings::default());

    let listing = service
        .browse(&session(&store), &Prefix::new("photos").unwrap())
        .await
        .unwrap();

    let folders: Vec<(&str, &str)> = listing
        .folders
        .iter()
        .map(|f| (f.name.as_str(), f.full_path.as_str()))
        .collect();
    assert_eq!(
        folders,
        vec![("2023", "photos/2023/"), ("2024", "photos/2024/")]
    );
    let files: Vec<&str> = listing.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(files, vec!["a.txt", "b.txt", "c.jpg"]);
}

#[tokio::test]
async fn test_connection_check_is_single_request() {
    let store = tree_store(1000).await;
    let service = RenameServiceImpl::new(EngineSettings::default());

    service.test_connection(&session(&store)).await.unwrap();
    assert_eq!(store.list_calls(), 1);

    store.fail_list_call(2);
    let err = service.test_connection(&session(&store)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderError);
}
