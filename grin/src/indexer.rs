//! Tantivy indexer for the emoji corpus.
//!
//! One document per picker-visible record: a stored id plus a word-tokenized
//! blob of label, tags, emoticon aliases, and the id itself. Queries arrive
//! as rewritten pattern strings ("cow", "cow*", "*cow*", "*cow* *hat*").
//! Bare words get an exact term clause and a length-graduated fuzzy clause;
//! starred words compile to term-dictionary regexes. All clauses are OR'd,
//! so whitespace between words means OR.

use crate::corpus::Corpus;
use rayon::prelude::*;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};
use thiserror::Error;

/// Analyzer shared by indexed documents and query terms.
const TOKENIZER_NAME: &str = "emoji_text";

/// Boost for exact term hits so they outrank fuzzy expansions of the same
/// word.
const EXACT_TERM_BOOST: f32 = 2.0;

/// Error type for indexer operations
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

pub type IndexerResult<T> = Result<T, IndexerError>;

/// A scored index hit. Scores are BM25 relevance, comparable only between
/// hits of the same query.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub id: String,
    pub score: f32,
}

pub struct Indexer {
    index: Index,
    reader: IndexReader,
    id_field: Field,
    text_field: Field,
}

impl Indexer {
    /// Builds the in-RAM index over the corpus. Runs once per store; the
    /// index is immutable afterwards.
    pub fn build(corpus: &Corpus) -> IndexerResult<Indexer> {
        let schema = Self::build_schema();
        let index = Index::create_in_ram(schema.clone());
        Self::register_tokenizer(&index);

        let id_field = schema.get_field("id").unwrap();
        let text_field = schema.get_field("text").unwrap();

        let mut writer = index.writer(15_000_000)?;
        // The writer synchronizes internally, so the rayon pool can feed it
        // directly.
        corpus.records().par_iter().try_for_each(|emoji| {
            let mut doc = TantivyDocument::default();
            doc.add_text(id_field, &emoji.hexcode);
            doc.add_text(text_field, emoji.search_blob());
            writer.add_document(doc)?;
            Ok::<(), IndexerError>(())
        })?;
        writer.commit()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        reader.reload()?;

        log::info!(
            "emoji index ready: {} documents",
            reader.searcher().num_docs()
        );

        Ok(Indexer {
            index,
            reader,
            id_field,
            text_field,
        })
    }

    fn build_schema() -> Schema {
        let mut builder = Schema::builder();
        builder.add_text_field("id", STRING | STORED);

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER_NAME)
            .set_index_option(IndexRecordOption::WithFreqs);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);
        builder.add_text_field("text", text_options);

        builder.build()
    }

    fn register_tokenizer(index: &Index) {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(64))
            .filter(LowerCaser)
            .build();
        index.tokenizers().register(TOKENIZER_NAME, analyzer);
    }

    /// Runs one rewritten pattern and returns up to `limit` scored hits.
    ///
    /// Pattern grammar: whitespace-separated tokens, each optionally starred
    /// on either side. A token that is only stars contributes nothing; a
    /// pattern with no usable tokens returns no hits rather than an error.
    pub fn run(&self, pattern: &str, limit: usize) -> IndexerResult<Vec<IndexHit>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in pattern.split_whitespace() {
            self.push_token_clauses(token, &mut clauses)?;
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let query = BooleanQuery::new(clauses);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit).order_by_score())?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()) {
                hits.push(IndexHit {
                    id: id.to_string(),
                    score,
                });
            }
        }
        Ok(hits)
    }

    fn push_token_clauses(
        &self,
        token: &str,
        clauses: &mut Vec<(Occur, Box<dyn Query>)>,
    ) -> IndexerResult<()> {
        let leading = token.starts_with('*');
        let trailing = token.ends_with('*');
        let core = token.trim_matches('*');
        if core.is_empty() {
            return Ok(());
        }

        if leading || trailing {
            // Term dictionary entries are lowercased, and the regex matches
            // whole terms, so substring semantics need explicit dot-stars.
            let escaped = regex::escape(&core.to_lowercase());
            let pattern = if leading && trailing {
                format!(".*{escaped}.*")
            } else if trailing {
                format!("{escaped}.*")
            } else {
                format!(".*{escaped}")
            };
            let query = RegexQuery::from_pattern(&pattern, self.text_field)?;
            clauses.push((Occur::Should, Box::new(query)));
            return Ok(());
        }

        let mut analyzer = self.index.tokenizers().get(TOKENIZER_NAME).unwrap();
        let mut stream = analyzer.token_stream(core);
        while let Some(word) = stream.next() {
            let term = Term::from_field_text(self.text_field, &word.text);

            let exact = TermQuery::new(term.clone(), IndexRecordOption::WithFreqs);
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(exact), EXACT_TERM_BOOST)),
            ));

            let distance = max_edit_distance(word.text.chars().count());
            if distance > 0 {
                clauses.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(term, distance, true)),
                ));
            }
        }
        Ok(())
    }
}

/// Allowed edit distance for fuzzy matching, graduated by word length so
/// short words stay exact.
fn max_edit_distance(word_len: usize) -> u8 {
    match word_len {
        0..=4 => 0,
        5..=8 => 1,
        _ => 2,
    }
}
