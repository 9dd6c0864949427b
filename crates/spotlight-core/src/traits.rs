use crate::types::{NavigationTarget, SearchHit, SearchableRecord};

/// The system-wide search index the app feeds.
///
/// Implementations own storage, ranking and matching. `index` upserts by
/// `unique_identifier`. `delete_domains` removes every record whose domain
/// equals one of the given domains or lies beneath it (`<domain>.<more>`).
pub trait SearchIndex: Send + Sync {
    fn index(&self, records: &[SearchableRecord]) -> anyhow::Result<()>;
    fn delete_identifiers(&self, identifiers: &[String]) -> anyhow::Result<()>;
    fn delete_domains(&self, domains: &[String]) -> anyhow::Result<()>;
    fn delete_all(&self) -> anyhow::Result<()>;
    fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fire-and-forget executor for index mutations. `submit` never blocks on
/// the job itself.
pub trait WorkQueue: Send + Sync {
    fn submit(&self, job: Job);
}

/// Receives decoded navigation targets from activated search results.
pub trait Router: Send + Sync {
    fn navigate(&self, target: &NavigationTarget);
}

/// `true` if `domain` is `group` itself or one of its sub-domains.
pub fn domain_in_group(domain: &str, group: &str) -> bool {
    match domain.strip_prefix(group) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
