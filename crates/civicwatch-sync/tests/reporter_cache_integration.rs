//! Reporter cache memoization against a counting backend.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use civicwatch_store::MemoryDocumentStore;
use civicwatch_sync::ReporterCache;
use common::{CountingStore, seed_profile};

const PLACEHOLDER: &str = "https://placehold.co/40x40.png";

async fn cache_over(inner: MemoryDocumentStore) -> (Arc<CountingStore>, ReporterCache) {
	let store = Arc::new(CountingStore::new(inner));
	let cache = ReporterCache::new(store.clone(), "users", PLACEHOLDER);
	(store, cache)
}

#[tokio::test]
async fn test_second_resolve_performs_no_remote_lookup() {
	let inner = MemoryDocumentStore::new();
	seed_profile(&inner, "u1", "Ada").await;
	let (store, cache) = cache_over(inner).await;

	let first = cache.resolve("u1").await;
	let second = cache.resolve("u1").await;

	assert_eq!(first.name, "Ada");
	assert_eq!(second, first);
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 1);
	assert_eq!(cache.misses(), 1);
	assert_eq!(cache.hits(), 1);
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached_and_retries() {
	let inner = MemoryDocumentStore::new();
	seed_profile(&inner, "u1", "Ada").await;
	let (store, cache) = cache_over(inner).await;
	store.fail_user_lookups.store(true, Ordering::SeqCst);

	let degraded = cache.resolve("u1").await;
	assert_eq!(degraded.name, "Anonymous");
	assert_eq!(degraded.avatar_url, PLACEHOLDER);
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 1);

	// the failure was not cached, so the next call goes back to the store
	store.fail_user_lookups.store(false, Ordering::SeqCst);
	let resolved = cache.resolve("u1").await;
	assert_eq!(resolved.name, "Ada");
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 2);

	// and now it is cached
	cache.resolve("u1").await;
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_profile_is_not_cached() {
	let (store, cache) = cache_over(MemoryDocumentStore::new()).await;

	let first = cache.resolve("ghost").await;
	let second = cache.resolve("ghost").await;
	assert_eq!(first.name, "Anonymous");
	assert_eq!(second.name, "Anonymous");
	// both calls hit the store: absence is not a cacheable answer
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 2);
	assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_empty_uid_short_circuits_to_placeholder() {
	let (store, cache) = cache_over(MemoryDocumentStore::new()).await;
	let snapshot = cache.resolve("").await;
	assert_eq!(snapshot.name, "Anonymous");
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clear_forces_a_fresh_lookup() {
	let inner = MemoryDocumentStore::new();
	seed_profile(&inner, "u1", "Ada").await;
	let (store, cache) = cache_over(inner).await;

	cache.resolve("u1").await;
	cache.clear().await;
	cache.resolve("u1").await;
	assert_eq!(store.user_lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_blank_display_name_falls_back_to_anonymous() {
	let inner = MemoryDocumentStore::new();
	seed_profile(&inner, "u1", "").await;
	let (_store, cache) = cache_over(inner).await;

	let snapshot = cache.resolve("u1").await;
	assert_eq!(snapshot.name, "Anonymous");
}
