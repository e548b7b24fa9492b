//! Concurrent behavior of the run caches.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use legacy_import::cache::{ImportRunContext, KeyCache};
use uuid::Uuid;

#[test]
fn add_is_case_insensitive_first_writer_wins() {
    let cache = KeyCache::new("legacy");
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    assert!(cache.add("Foo", first));
    assert!(!cache.add("foo", second));
    assert_eq!(cache.get("FOO"), Some(first));
    assert_eq!(cache.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_keep_exactly_one_entry_per_key() {
    let cache = Arc::new(KeyCache::new("legacy"));
    let winners = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let winners = Arc::clone(&winners);
            tokio::spawn(async move {
                let key = if i % 2 == 0 { "Shared" } else { " shared " };
                if cache.add(key, Uuid::new_v4()) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(cache.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn media_is_created_once_across_workers() {
    let ctx = Arc::new(ImportRunContext::new());
    let uploads = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            let uploads = Arc::clone(&uploads);
            tokio::spawn(async move {
                let source = if i % 3 == 0 { "https://example.com/LOGO.png" } else { "https://example.com/logo.png" };
                ctx.ensure_media(source, |_| {
                    uploads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>(Uuid::new_v4())
                })
                .unwrap()
                .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }

    assert_eq!(uploads.load(Ordering::SeqCst), 1);
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn folder_paths_share_prefixes() {
    let ctx = ImportRunContext::new();
    let mut created = Vec::new();

    let docs = ctx
        .ensure_folder_path("media/docs", |parent, name| {
            created.push((parent, name.to_string()));
            Ok::<_, std::convert::Infallible>(Uuid::new_v4())
        })
        .unwrap();
    let images = ctx
        .ensure_folder_path("Media\\Images", |parent, name| {
            created.push((parent, name.to_string()));
            Ok::<_, std::convert::Infallible>(Uuid::new_v4())
        })
        .unwrap();

    let names: Vec<&str> = created.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(names, vec!["media", "docs", "Images"]);
    assert_ne!(docs, images);
    assert_eq!(created[2].0, created[1].0);
}

#[test]
fn reset_clears_every_cache() {
    let mut ctx = ImportRunContext::new();
    let run = ctx.run_id();
    ctx.register_entity("1", Uuid::new_v4());
    ctx.ensure_media("a.png", |_| Ok::<_, std::convert::Infallible>(Uuid::new_v4())).unwrap();

    ctx.reset();

    assert!(ctx.legacy_ids().is_empty());
    assert!(ctx.media().is_empty());
    assert_ne!(ctx.run_id(), run);
}
