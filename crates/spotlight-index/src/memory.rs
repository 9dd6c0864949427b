//! In-memory `SearchIndex` for tests and embedding without persistence.
use anyhow::{bail, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use spotlight_core::traits::{domain_in_group, SearchIndex};
use spotlight_core::types::{SearchHit, SearchableRecord};

#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<BTreeMap<String, SearchableRecord>>,
    failing: RwLock<HashSet<String>>,
    index_calls: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self { Self::default() }

    /// Reject any later `index` call that carries `unique_identifier`.
    pub fn fail_on(&self, unique_identifier: impl Into<String>) {
        self.failing.write().insert(unique_identifier.into());
    }

    pub fn len(&self) -> usize { self.records.read().len() }

    pub fn is_empty(&self) -> bool { self.records.read().is_empty() }

    pub fn contains(&self, unique_identifier: &str) -> bool {
        self.records.read().contains_key(unique_identifier)
    }

    pub fn get(&self, unique_identifier: &str) -> Option<SearchableRecord> {
        self.records.read().get(unique_identifier).cloned()
    }

    /// Snapshot of all records ordered by unique identifier.
    pub fn records(&self) -> Vec<SearchableRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Number of `index` calls received, including rejected ones.
    pub fn index_calls(&self) -> usize { self.index_calls.load(Ordering::SeqCst) }
}

impl SearchIndex for MemoryIndex {
    fn index(&self, records: &[SearchableRecord]) -> Result<()> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        {
            let failing = self.failing.read();
            if let Some(bad) = records.iter().find(|r| failing.contains(&r.unique_identifier)) {
                bail!("index rejected record {}", bad.unique_identifier);
            }
        }
        let mut map = self.records.write();
        for r in records {
            map.insert(r.unique_identifier.clone(), r.clone());
        }
        Ok(())
    }

    fn delete_identifiers(&self, identifiers: &[String]) -> Result<()> {
        let mut map = self.records.write();
        for id in identifiers {
            map.remove(id);
        }
        Ok(())
    }

    fn delete_domains(&self, domains: &[String]) -> Result<()> {
        self.records
            .write()
            .retain(|_, r| !domains.iter().any(|d| domain_in_group(&r.domain_identifier, d)));
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.records.write().clear();
        Ok(())
    }

    /// Case-insensitive substring match of each query word against title,
    /// description and keywords; one point per matching (word, field) pair.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() { return Ok(vec![]); }
        let map = self.records.read();
        let mut hits: Vec<SearchHit> = map
            .values()
            .filter_map(|r| {
                let a = &r.attributes;
                let mut fields = vec![a.title.to_lowercase()];
                fields.extend(a.content_description.iter().map(|d| d.to_lowercase()));
                fields.extend(a.keywords.iter().flatten().map(|k| k.to_lowercase()));
                let score = words
                    .iter()
                    .map(|w| fields.iter().filter(|f| f.contains(w.as_str())).count())
                    .sum::<usize>();
                (score > 0).then(|| SearchHit {
                    unique_identifier: r.unique_identifier.clone(),
                    domain_identifier: r.domain_identifier.clone(),
                    title: a.title.clone(),
                    score: score as f32,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }
}
