use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TEXT_TOKENIZER: &str = "spotlight_text";

/// Field handles resolved once per opened index.
#[derive(Debug, Clone, Copy)]
pub struct RecordFields {
	pub unique_identifier: Field,
	pub domain_identifier: Field,
	/// Every ancestor of the domain, including the domain itself.
	pub domain_path: Field,
	pub identifier: Field,
	pub title: Field,
	pub description: Field,
	pub keywords: Field,
	pub thumbnail_url: Field,
}

impl RecordFields {
	pub fn resolve(schema: &Schema) -> tantivy::Result<Self> {
		Ok(Self {
			unique_identifier: schema.get_field("unique_identifier")?,
			domain_identifier: schema.get_field("domain_identifier")?,
			domain_path: schema.get_field("domain_path")?,
			identifier: schema.get_field("identifier")?,
			title: schema.get_field("title")?,
			description: schema.get_field("description")?,
			keywords: schema.get_field("keywords")?,
			thumbnail_url: schema.get_field("thumbnail_url")?,
		})
	}
}

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field("unique_identifier", STRING | STORED);
	schema_builder.add_text_field("domain_identifier", STRING | STORED);
	schema_builder.add_text_field("domain_path", STRING);
	schema_builder.add_text_field("identifier", STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TEXT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	schema_builder.add_text_field("title", text_options.clone());
	schema_builder.add_text_field("description", text_options.clone());
	schema_builder.add_text_field("keywords", text_options);
	schema_builder.add_text_field("thumbnail_url", STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","in","is","it","its","of","on","that","the","to","was","will","with","or","but","this","these","there","then","than","so","if",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, tokenizer);
}

/// `com.kk.home.people` -> `com`, `com.kk`, `com.kk.home`, `com.kk.home.people`.
pub fn domain_ancestors(domain: &str) -> impl Iterator<Item = &str> {
	domain
		.match_indices('.')
		.map(move |(i, _)| &domain[..i])
		.chain(std::iter::once(domain))
}
