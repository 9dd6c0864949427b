use spotlight_core::identifier::{domain, encode};
use spotlight_core::traits::SearchIndex;
use spotlight_core::types::{AttributeSet, Feature, SearchableRecord, Subfeature, Thumbnail, TEXT_CONTENT_TYPE};
use spotlight_index::{MemoryIndex, TantivyIndex};

fn record(feature: Feature, sub: Option<Subfeature>, id: &str, title: &str, keywords: &[&str]) -> SearchableRecord {
    SearchableRecord {
        unique_identifier: encode("com.kk", feature, sub, id),
        domain_identifier: domain("com.kk", feature, sub),
        attributes: AttributeSet {
            content_type: TEXT_CONTENT_TYPE.to_string(),
            title: title.to_string(),
            identifier: id.to_string(),
            content_description: Some(format!("Profile of {}", title)),
            keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
            thumbnail: Some(Thumbnail::Url(url::Url::parse("https://example.com/t.png").unwrap())),
        },
    }
}

fn seed(index: &dyn SearchIndex) {
    index
        .index(&[
            record(Feature::Home, Some(Subfeature::People), "1", "Alice Walker", &["author"]),
            record(Feature::Home, Some(Subfeature::People), "2", "Bob Marley", &["musician"]),
            record(Feature::Home, Some(Subfeature::Favorites), "3", "Carol King", &["musician"]),
            record(Feature::Home, None, "4", "Dashboard", &[]),
            record(Feature::Settings, None, "5", "Privacy", &["tracking"]),
        ])
        .expect("seed");
}

fn ids(index: &dyn SearchIndex, query: &str) -> Vec<String> {
    let mut hits: Vec<String> = index.search(query, 10).expect("search").into_iter().map(|h| h.unique_identifier).collect();
    hits.sort();
    hits
}

fn everything(index: &dyn SearchIndex) -> Vec<String> {
    let mut all = Vec::new();
    for q in ["alice", "bob", "carol", "dashboard", "privacy"] {
        all.extend(ids(index, q));
    }
    all.sort();
    all.dedup();
    all
}

fn check_subfeature_delete_spares_siblings(index: &dyn SearchIndex) {
    seed(index);
    index.delete_domains(&[domain("com.kk", Feature::Home, Some(Subfeature::People))]).unwrap();
    assert_eq!(
        everything(index),
        vec![
            encode("com.kk", Feature::Home, Some(Subfeature::Favorites), "3"),
            encode("com.kk", Feature::Home, None, "4"),
            encode("com.kk", Feature::Settings, None, "5"),
        ]
    );
}

fn check_feature_delete_takes_all_subfeatures(index: &dyn SearchIndex) {
    seed(index);
    index.delete_domains(&[domain("com.kk", Feature::Home, None)]).unwrap();
    assert_eq!(everything(index), vec![encode("com.kk", Feature::Settings, None, "5")]);
}

fn check_delete_identifier_removes_one(index: &dyn SearchIndex) {
    seed(index);
    index.delete_identifiers(&[encode("com.kk", Feature::Home, Some(Subfeature::People), "2")]).unwrap();
    assert!(ids(index, "bob").is_empty());
    assert_eq!(ids(index, "alice").len(), 1);
}

fn check_reindex_replaces(index: &dyn SearchIndex) {
    seed(index);
    index.index(&[record(Feature::Home, Some(Subfeature::People), "1", "Alice Munro", &["author"])]).unwrap();
    assert!(ids(index, "walker").is_empty());
    assert_eq!(ids(index, "alice"), vec![encode("com.kk", Feature::Home, Some(Subfeature::People), "1")]);
}

fn check_delete_all(index: &dyn SearchIndex) {
    seed(index);
    index.delete_all().unwrap();
    assert!(everything(index).is_empty());
}

fn check_keyword_search(index: &dyn SearchIndex) {
    seed(index);
    assert_eq!(
        ids(index, "musician"),
        vec![
            encode("com.kk", Feature::Home, Some(Subfeature::People), "2"),
            encode("com.kk", Feature::Home, Some(Subfeature::Favorites), "3"),
        ]
    );
    assert!(index.search("   ", 10).unwrap().is_empty());
}

macro_rules! index_suite {
    ($modname:ident, $ctor:expr) => {
        mod $modname {
            use super::*;

            #[test]
            fn subfeature_delete_spares_siblings() { check_subfeature_delete_spares_siblings(&$ctor); }
            #[test]
            fn feature_delete_takes_all_subfeatures() { check_feature_delete_takes_all_subfeatures(&$ctor); }
            #[test]
            fn delete_identifier_removes_one() { check_delete_identifier_removes_one(&$ctor); }
            #[test]
            fn reindex_replaces() { check_reindex_replaces(&$ctor); }
            #[test]
            fn delete_all() { check_delete_all(&$ctor); }
            #[test]
            fn keyword_search() { check_keyword_search(&$ctor); }
        }
    };
}

index_suite!(memory, MemoryIndex::new());
index_suite!(tantivy_ram, TantivyIndex::in_memory().expect("ram index"));

#[test]
fn memory_index_rejects_injected_failure() {
    let index = MemoryIndex::new();
    let bad = record(Feature::Home, None, "9", "Broken", &[]);
    index.fail_on(bad.unique_identifier.clone());
    assert!(index.index(&[bad]).is_err());
    assert!(index.is_empty());
    assert_eq!(index.index_calls(), 1);
}

#[test]
fn tantivy_index_persists_across_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let index = TantivyIndex::open_in_dir(tmp.path(), 50_000_000).expect("open");
        seed(&index);
        assert_eq!(index.num_docs(), 5);
    }
    let reopened = TantivyIndex::open_in_dir(tmp.path(), 50_000_000).expect("reopen");
    assert_eq!(reopened.num_docs(), 5);
    assert_eq!(ids(&reopened, "privacy"), vec![encode("com.kk", Feature::Settings, None, "5")]);
}

#[test]
fn tantivy_batch_with_repeated_identifier_keeps_last() {
    let index = TantivyIndex::in_memory().expect("ram index");
    index
        .index(&[
            record(Feature::Home, None, "1", "First Draft", &[]),
            record(Feature::Home, None, "1", "Final Copy", &[]),
        ])
        .expect("index");
    assert_eq!(index.num_docs(), 1);
    assert!(ids(&index, "draft").is_empty());
    assert_eq!(ids(&index, "final"), vec![encode("com.kk", Feature::Home, None, "1")]);
}
