use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use spotlight_core::activity::UserActivity;
use spotlight_core::config::{QueueConfig, SpotlightConfig};
use spotlight_core::identifier::{domain, encode};
use spotlight_core::traits::{Router, SearchIndex, WorkQueue};
use spotlight_core::types::{Feature, NavigationTarget, SpotlightItem, Subfeature, Thumbnail};
use spotlight_index::{MemoryIndex, TantivyIndex};
use spotlight_manager::{BackgroundQueue, InlineQueue, ManagerOptions, SpotlightManager};

#[derive(Default, Clone)]
struct RecordingRouter(Arc<Mutex<Vec<NavigationTarget>>>);

impl Router for RecordingRouter {
    fn navigate(&self, target: &NavigationTarget) {
        self.0.lock().push(target.clone());
    }
}

fn people(n: usize) -> Vec<SpotlightItem> {
    (0..n)
        .map(|i| {
            SpotlightItem::new(i.to_string(), format!("Person {}", i), Feature::Home)
                .with_subfeature(Subfeature::People)
                .with_keywords(["contact"])
        })
        .collect()
}

fn inline_manager(index: Arc<MemoryIndex>) -> SpotlightManager {
    SpotlightManager::new(index, Arc::new(InlineQueue), ManagerOptions::default())
}

fn background_queue(workers: usize) -> Arc<BackgroundQueue> {
    let config = QueueConfig { worker_threads: workers, ..QueueConfig::default() };
    Arc::new(BackgroundQueue::new(&config).expect("queue"))
}

#[test]
fn index_submits_one_call_per_item() {
    let index = Arc::new(MemoryIndex::new());
    let manager = inline_manager(index.clone());
    manager.index(&people(5));
    assert_eq!(index.index_calls(), 5);
    assert_eq!(index.len(), 5);
    assert!(index.contains("com.kk?feature=home&itemID=3&subfeature=people"));
}

#[test]
fn failed_item_does_not_block_the_others() {
    let index = Arc::new(MemoryIndex::new());
    index.fail_on(encode("com.kk", Feature::Home, Some(Subfeature::People), "2"));
    let queue = background_queue(2);
    let manager = SpotlightManager::new(index.clone(), queue.clone(), ManagerOptions::default());

    manager.index(&people(6));
    queue.wait_idle();

    assert_eq!(index.index_calls(), 6);
    assert_eq!(index.len(), 5);
    assert!(!index.contains(&encode("com.kk", Feature::Home, Some(Subfeature::People), "2")));
    assert!(queue.shutdown(Duration::from_secs(5)));
}

#[test]
fn background_jobs_run_concurrently() {
    let queue = background_queue(2);
    let barrier = Arc::new(Barrier::new(2));
    let done = Arc::new(Mutex::new(0usize));
    for _ in 0..2 {
        let barrier = barrier.clone();
        let done = done.clone();
        queue.submit(Box::new(move || {
            barrier.wait();
            *done.lock() += 1;
        }));
    }
    queue.wait_idle();
    assert_eq!(*done.lock(), 2);
    assert_eq!(queue.pending(), 0);
}

#[test]
fn submissions_after_shutdown_are_dropped() {
    let queue = background_queue(1);
    assert!(queue.shutdown(Duration::from_secs(5)));
    assert!(!queue.is_running());
    let ran = Arc::new(Mutex::new(false));
    let flag = ran.clone();
    assert!(queue.try_submit(Box::new(move || *flag.lock() = true)).is_err());
    queue.submit(Box::new(|| {}));
    queue.wait_idle();
    assert!(!*ran.lock());
    assert!(queue.shutdown(Duration::from_secs(1)));
}

#[test]
fn delete_items_by_subfeature_spares_siblings() {
    let index = Arc::new(MemoryIndex::new());
    let manager = inline_manager(index.clone());
    manager.index(&people(2));
    manager.index(&[SpotlightItem::new("9", "Starred", Feature::Home).with_subfeature(Subfeature::Favorites)]);
    manager.index(&[SpotlightItem::new("7", "Privacy", Feature::Settings)]);

    manager.delete_items(Feature::Home, Some(Subfeature::People));

    let domains: Vec<String> = index.records().into_iter().map(|r| r.domain_identifier).collect();
    assert_eq!(domains, vec!["com.kk.home.favorites".to_string(), "com.kk.settings".to_string()]);

    manager.delete_items(Feature::Home, None);
    assert_eq!(index.len(), 1);
    assert!(index.contains("com.kk?feature=settings&itemID=7"));
}

#[test]
fn delete_item_removes_exactly_one() {
    let index = Arc::new(MemoryIndex::new());
    let manager = inline_manager(index.clone());
    manager.index(&people(3));
    manager.delete_item(Feature::Home, Some(Subfeature::People), "1");
    assert_eq!(index.len(), 2);
    assert!(!index.contains("com.kk?feature=home&itemID=1&subfeature=people"));

    // Missing subfeature names a different record.
    manager.delete_item(Feature::Home, None, "0");
    assert_eq!(index.len(), 2);
}

#[test]
fn delete_all_clears_index() {
    let index = Arc::new(MemoryIndex::new());
    let manager = inline_manager(index.clone());
    manager.index(&people(4));
    manager.delete_all();
    assert!(index.is_empty());
}

#[test]
fn record_uses_wire_format_and_attributes() {
    let manager = inline_manager(Arc::new(MemoryIndex::new()));
    let item = SpotlightItem::new("42", "Ann", Feature::Home)
        .with_subfeature(Subfeature::People)
        .with_description("Neighbour")
        .with_keywords(["friend", "gardening"]);
    let record = manager.searchable_record(&item);
    assert_eq!(record.unique_identifier, "com.kk?feature=home&itemID=42&subfeature=people");
    assert_eq!(record.domain_identifier, "com.kk.home.people");
    assert_eq!(record.attributes.content_type, "public.text");
    assert_eq!(record.attributes.identifier, "42");
    assert_eq!(record.attributes.content_description.as_deref(), Some("Neighbour"));
    assert_eq!(record.attributes.keywords, Some(vec!["friend".to_string(), "gardening".to_string()]));
    assert_eq!(record.attributes.thumbnail, None);
}

#[test]
fn thumbnail_prefers_url_then_image_then_default() {
    let options = ManagerOptions { default_thumbnail: Some(vec![1, 2, 3]), ..ManagerOptions::default() };
    let manager = SpotlightManager::new(Arc::new(MemoryIndex::new()), Arc::new(InlineQueue), options);
    let url = url::Url::parse("https://example.com/a.png").unwrap();

    let with_url = SpotlightItem::new("1", "a", Feature::Home).with_thumbnail_url(url.clone()).with_image(vec![9]);
    assert_eq!(manager.searchable_record(&with_url).attributes.thumbnail, Some(Thumbnail::Url(url)));

    let with_image = SpotlightItem::new("2", "b", Feature::Home).with_image(vec![9]);
    assert_eq!(manager.searchable_record(&with_image).attributes.thumbnail, Some(Thumbnail::Data(vec![9])));

    let bare = SpotlightItem::new("3", "c", Feature::Home);
    assert_eq!(manager.searchable_record(&bare).attributes.thumbnail, Some(Thumbnail::Data(vec![1, 2, 3])));
}

#[test]
fn custom_prefix_flows_into_identifiers() {
    let options = ManagerOptions { base_identifier: "org.example".to_string(), ..ManagerOptions::default() };
    let manager = SpotlightManager::new(Arc::new(MemoryIndex::new()), Arc::new(InlineQueue), options);
    let record = manager.searchable_record(&SpotlightItem::new("7", "x", Feature::Settings));
    assert_eq!(record.unique_identifier, "org.example?feature=settings&itemID=7");
    assert_eq!(record.domain_identifier, domain("org.example", Feature::Settings, None));
}

#[test]
fn handle_activity_routes_known_features() {
    let router = RecordingRouter::default();
    let manager = inline_manager(Arc::new(MemoryIndex::new())).with_router(Box::new(router.clone()));
    let activity = UserActivity::searchable_item("com.kk?feature=home&itemID=42&subfeature=people");

    let target = manager.handle_activity(&activity).expect("navigates");
    assert_eq!(
        target,
        NavigationTarget { feature: Feature::Home, subfeature: Some(Subfeature::People), item_id: Some("42".into()) }
    );
    assert_eq!(router.0.lock().as_slice(), &[target]);
}

#[test]
fn handle_activity_ignores_bad_input() {
    let router = RecordingRouter::default();
    let manager = inline_manager(Arc::new(MemoryIndex::new())).with_router(Box::new(router.clone()));

    assert!(manager.handle_activity(&UserActivity::searchable_item("com.kk?feature=profile&itemID=1")).is_none());
    assert!(manager.handle_activity(&UserActivity::searchable_item("com.kk?itemID=1")).is_none());
    assert!(manager.handle_activity(&UserActivity::searchable_item("%%%")).is_none());
    assert!(manager.handle_activity(&UserActivity::new("com.example.browsing")).is_none());
    assert!(manager.handle_activity(&UserActivity::new(spotlight_core::activity::SEARCHABLE_ITEM_ACTION_TYPE)).is_none());
    assert!(router.0.lock().is_empty());
}

#[test]
fn indexed_item_is_searchable_and_activates_back() {
    let index: Arc<dyn SearchIndex> = Arc::new(TantivyIndex::in_memory().expect("index"));
    let queue = background_queue(2);
    let manager = SpotlightManager::new(index, queue.clone(), ManagerOptions::default());

    manager.index(&[
        SpotlightItem::new("a&b", "Grace Hopper", Feature::Home)
            .with_subfeature(Subfeature::People)
            .with_keywords(["compiler"]),
        SpotlightItem::new("7", "Notifications", Feature::Settings),
    ]);
    queue.wait_idle();

    let hits = manager.search("compiler", 5).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Grace Hopper");

    let target = manager.handle_activity(&UserActivity::searchable_item(hits[0].unique_identifier.clone())).expect("target");
    assert_eq!(target.item_id.as_deref(), Some("a&b"));
    assert_eq!(target.subfeature, Some(Subfeature::People));

    manager.delete_items(Feature::Home, None);
    queue.wait_idle();
    assert!(manager.search("grace", 5).expect("search").is_empty());
    assert_eq!(manager.search("notifications", 5).expect("search").len(), 1);
    assert!(queue.shutdown(Duration::from_secs(5)));
}

#[test]
fn configured_default_thumbnail_resolves_against_base_dir() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("assets")).unwrap();
    std::fs::write(tmp.path().join("assets/AppIcon.png"), [0x89u8, b'P', b'N', b'G']).unwrap();
    let config = SpotlightConfig { default_thumbnail: Some("assets/AppIcon.png".to_string()), ..SpotlightConfig::default() };

    let options = ManagerOptions::from_config(&config, tmp.path()).expect("icon loads");
    let manager = SpotlightManager::new(Arc::new(MemoryIndex::new()), Arc::new(InlineQueue), options);
    let record = manager.searchable_record(&SpotlightItem::new("1", "Bare", Feature::Home));
    assert_eq!(record.attributes.thumbnail, Some(Thumbnail::Data(vec![0x89, b'P', b'N', b'G'])));
}

#[test]
fn missing_default_thumbnail_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = SpotlightConfig { default_thumbnail: Some("assets/missing.png".to_string()), ..SpotlightConfig::default() };
    assert!(ManagerOptions::from_config(&config, tmp.path()).is_err());
}

#[test]
fn dropping_queue_without_shutdown_does_not_wait_for_jobs() {
    let queue = background_queue(1);
    queue.submit(Box::new(|| std::thread::sleep(Duration::from_millis(300))));
    queue.submit(Box::new(|| std::thread::sleep(Duration::from_millis(300))));
    let started = Instant::now();
    drop(queue);
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[test]
fn shutdown_during_wait_idle_stays_closed() {
    let queue = background_queue(2);
    for _ in 0..4 {
        queue.submit(Box::new(|| std::thread::sleep(Duration::from_millis(50))));
    }
    let waiter = {
        let queue = queue.clone();
        std::thread::spawn(move || queue.wait_idle())
    };
    assert!(queue.shutdown(Duration::from_secs(5)));
    waiter.join().expect("wait_idle returns");

    assert!(!queue.is_running());
    assert_eq!(queue.pending(), 0);
    assert!(queue.try_submit(Box::new(|| {})).is_err());
}
