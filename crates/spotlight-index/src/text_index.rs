//! Tantivy-backed `SearchIndex`.
//!
//! Records are upserted by `unique_identifier`. Group deletes hit the
//! multi-valued `domain_path` field, which carries every ancestor of a
//! record's domain, so deleting `com.kk.home` removes `com.kk.home.people`
//! but never `com.kk.homestead`.
use anyhow::Result;
use parking_lot::Mutex;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use spotlight_core::traits::SearchIndex;
use spotlight_core::types::{SearchHit, SearchableRecord, Thumbnail};

use crate::schema::{build_schema, domain_ancestors, register_tokenizer, RecordFields};

const RAM_WRITER_HEAP_BYTES: usize = 15_000_000;

pub struct TantivyIndex {
	index: Index,
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	fields: RecordFields,
}

impl TantivyIndex {
	pub fn in_memory() -> Result<Self> {
		let index = Index::create_in_ram(build_schema());
		let writer = index.writer_with_num_threads(1, RAM_WRITER_HEAP_BYTES)?;
		Self::from_parts(index, writer)
	}

	/// Open the index stored in `index_dir`, creating it when absent.
	pub fn open_in_dir(index_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
		std::fs::create_dir_all(index_dir)?;
		let directory = MmapDirectory::open(index_dir)?;
		let index = Index::open_or_create(directory, build_schema())?;
		let writer = index.writer(writer_heap_bytes)?;
		tracing::debug!("Opened local search index at {}", index_dir.display());
		Self::from_parts(index, writer)
	}

	fn from_parts(index: Index, writer: IndexWriter) -> Result<Self> {
		register_tokenizer(&index);
		let fields = RecordFields::resolve(&index.schema())?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { index, reader, writer: Mutex::new(writer), fields })
	}

	/// Number of live records.
	pub fn num_docs(&self) -> u64 {
		self.reader.searcher().num_docs()
	}

	fn to_document(&self, record: &SearchableRecord) -> TantivyDocument {
		let f = &self.fields;
		let attrs = &record.attributes;
		let mut doc = TantivyDocument::default();
		doc.add_text(f.unique_identifier, &record.unique_identifier);
		doc.add_text(f.domain_identifier, &record.domain_identifier);
		for ancestor in domain_ancestors(&record.domain_identifier) {
			doc.add_text(f.domain_path, ancestor);
		}
		doc.add_text(f.identifier, &attrs.identifier);
		doc.add_text(f.title, &attrs.title);
		if let Some(description) = &attrs.content_description {
			doc.add_text(f.description, description);
		}
		for keyword in attrs.keywords.iter().flatten() {
			doc.add_text(f.keywords, keyword);
		}
		if let Some(Thumbnail::Url(url)) = &attrs.thumbnail {
			doc.add_text(f.thumbnail_url, url.as_str());
		}
		doc
	}

	fn commit(&self, writer: &mut IndexWriter) -> Result<()> {
		writer.commit()?;
		self.reader.reload()?;
		Ok(())
	}

	fn delete_terms(&self, field: tantivy::schema::Field, values: &[String]) -> Result<()> {
		let mut writer = self.writer.lock();
		for value in values {
			writer.delete_term(Term::from_field_text(field, value));
		}
		self.commit(&mut writer)
	}
}

impl SearchIndex for TantivyIndex {
	fn index(&self, records: &[SearchableRecord]) -> Result<()> {
		let mut writer = self.writer.lock();
		for record in records {
			writer.delete_term(Term::from_field_text(self.fields.unique_identifier, &record.unique_identifier));
			if let Err(e) = writer.add_document(self.to_document(record)) {
				// Drop the staged delete so a later commit cannot remove the old record alone.
				writer.rollback()?;
				return Err(e.into());
			}
		}
		self.commit(&mut writer)
	}

	fn delete_identifiers(&self, identifiers: &[String]) -> Result<()> {
		self.delete_terms(self.fields.unique_identifier, identifiers)
	}

	fn delete_domains(&self, domains: &[String]) -> Result<()> {
		self.delete_terms(self.fields.domain_path, domains)
	}

	fn delete_all(&self) -> Result<()> {
		let mut writer = self.writer.lock();
		writer.delete_all_documents()?;
		self.commit(&mut writer)
	}

	fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
		if query.trim().is_empty() || limit == 0 { return Ok(vec![]); }
		let f = &self.fields;
		let searcher = self.reader.searcher();
		let qp = QueryParser::for_index(&self.index, vec![f.title, f.description, f.keywords]);
		let (q, errors) = qp.parse_query_lenient(query);
		if !errors.is_empty() { tracing::debug!("Lenient parse of '{}' dropped {} clause(s)", query, errors.len()); }
		let top_docs = searcher.search(&q, &TopDocs::with_limit(limit))?;
		let mut hits = Vec::new();
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let text = |field: tantivy::schema::Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			hits.push(SearchHit {
				unique_identifier: text(f.unique_identifier),
				domain_identifier: text(f.domain_identifier),
				title: text(f.title),
				score,
			});
		}
		Ok(hits)
	}
}
