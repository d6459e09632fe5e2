//! The Search Indexer: builds and queries a Tantivy index of denormalised
//! description documents, per spec.md §4.9. Grounded on the pack's
//! Tantivy-backed search engine (`search_tantivy.rs`/`tantivy_schema.rs`):
//! same open-or-create-directory shape, custom tokenizer registration, and
//! boolean-query-with-filters construction, adapted from message/agent
//! documents to SNOMED description documents.

use std::path::Path;

use snomed_kv::KvStore;
use snomed_store::{index as store_index, ComponentStore};
use snomed_types::{DescriptionType, Rf2Description, SctId};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, TantivyDocument, Term, Value};
use tantivy::Index;

use crate::error::{SearchError, SearchResult};
use crate::request::{FuzzyMode, SearchHit, SearchRequest, SearchResponse};
use crate::schema::{build_schema, register_tokenizer, FieldHandles, TOKENIZER_NAME};

/// Candidate pool size fetched from Tantivy before the final
/// sort-by-term-length truncation to `maximumHits`.
const CANDIDATE_POOL: usize = 2000;

/// The Search Indexer: an open Tantivy index plus its field handles.
pub struct SearchIndex {
    index: Index,
    handles: FieldHandles,
}

impl SearchIndex {
    /// Opens an existing index at `dir`, or creates one if absent.
    pub fn open_or_create(dir: &Path) -> SearchResult<Self> {
        let (schema, handles) = build_schema();
        let index = if dir.join("meta.json").exists() {
            Index::open_in_dir(dir)?
        } else {
            std::fs::create_dir_all(dir)?;
            Index::create_in_dir(dir, schema)?
        };
        register_tokenizer(&index);
        Ok(Self { index, handles })
    }

    /// Opens an in-RAM index, for tests.
    pub fn open_in_ram() -> SearchResult<Self> {
        let (schema, handles) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);
        Ok(Self { index, handles })
    }

    /// Rebuilds the index from scratch: one document per non-FSN
    /// description, a single-writer pass committed once.
    pub fn rebuild_index<S: KvStore>(&self, store: &ComponentStore<S>) -> SearchResult<()> {
        let mut writer = self.index.writer(50_000_000)?;
        writer.delete_all_documents()?;

        let descriptions: Vec<Rf2Description> = store.scan_all()?;
        for desc in descriptions {
            if desc.type_id == DescriptionType::FSN_ID {
                continue;
            }
            let concept = store_index::get_concept(store, desc.concept_id)?;
            let concept_active = concept.as_ref().map(|c| c.active).unwrap_or(false);
            let recursive_parents = snomed_engine::semantic::all_parents(store, desc.concept_id)?;
            let direct_parents = store_index::direct_parents(store, desc.concept_id)?;
            let concept_refsets = store_index::component_refsets(store, desc.concept_id)?;
            let description_refsets = store_index::component_refsets(store, desc.id)?;

            let mut document = TantivyDocument::default();
            document.add_u64(self.handles.description_id, sctid_to_u64(desc.id));
            document.add_u64(self.handles.concept_id, sctid_to_u64(desc.concept_id));
            document.add_text(self.handles.term, &desc.term);
            for parent in recursive_parents {
                document.add_u64(self.handles.recursive_parent_ids, sctid_to_u64(parent));
            }
            for parent in direct_parents {
                document.add_u64(self.handles.direct_parent_ids, sctid_to_u64(parent));
            }
            for refset in concept_refsets {
                document.add_u64(self.handles.concept_refset_ids, sctid_to_u64(refset));
            }
            for refset in description_refsets {
                document.add_u64(self.handles.description_refset_ids, sctid_to_u64(refset));
            }
            document.add_u64(self.handles.concept_active, bool_to_u64(concept_active));
            document.add_u64(self.handles.description_active, bool_to_u64(desc.active));

            writer.add_document(document)?;
        }

        writer.commit()?;
        Ok(())
    }

    /// Evaluates `request` against the index, per spec.md §4.9's query
    /// construction, filter, and sort rules.
    pub fn search(&self, request: &SearchRequest) -> SearchResult<SearchResponse> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();

        let tokens = self.tokenize(&request.s)?;

        let run = |include_fuzzy: bool| -> SearchResult<Vec<(SctId, SctId, String)>> {
            let query = self.build_query(&tokens, request, include_fuzzy)?;
            let top_docs = searcher.search(&query, &TopDocs::with_limit(CANDIDATE_POOL))?;
            let mut out = Vec::with_capacity(top_docs.len());
            for (_score, doc_address) in top_docs {
                let doc: TantivyDocument = searcher.doc(doc_address)?;
                let description_id = doc
                    .get_first(self.handles.description_id)
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as SctId;
                let concept_id = doc
                    .get_first(self.handles.concept_id)
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as SctId;
                let term = doc
                    .get_first(self.handles.term)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                out.push((description_id, concept_id, term));
            }
            Ok(out)
        };

        let apply_fuzzy_now = matches!(request.fuzzy, FuzzyMode::Always);
        let mut rows = run(apply_fuzzy_now)?;
        if rows.is_empty() && matches!(request.fuzzy, FuzzyMode::Fallback) {
            rows = run(true)?;
        }

        rows.sort_by_key(|(_, _, term)| term.chars().count());
        rows.truncate(request.maximum_hits);

        Ok(SearchResponse {
            hits: rows
                .into_iter()
                .map(|(description_id, concept_id, term)| SearchHit { description_id, concept_id, term })
                .collect(),
        })
    }

    fn tokenize(&self, s: &str) -> SearchResult<Vec<String>> {
        if s.is_empty() {
            return Ok(Vec::new());
        }
        let mut tokenizer = self
            .index
            .tokenizers()
            .get(TOKENIZER_NAME)
            .ok_or_else(|| SearchError::InvalidQuery("tokenizer not registered".to_string()))?;
        let mut stream = tokenizer.token_stream(s);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    fn build_query(&self, tokens: &[String], request: &SearchRequest, include_fuzzy: bool) -> SearchResult<Box<dyn Query>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for token in tokens {
            clauses.push((Occur::Must, self.token_query(token, include_fuzzy)));
        }

        if !request.is_a.is_empty() {
            clauses.push((Occur::Must, or_over(self.handles.recursive_parent_ids, &request.is_a)));
        }
        if !request.direct_parents.is_empty() {
            clauses.push((Occur::Must, or_over(self.handles.direct_parent_ids, &request.direct_parents)));
        }
        if !request.concept_refsets.is_empty() {
            clauses.push((Occur::Must, or_over(self.handles.concept_refset_ids, &request.concept_refsets)));
        }
        if !request.description_refsets.is_empty() {
            clauses.push((Occur::Must, or_over(self.handles.description_refset_ids, &request.description_refsets)));
        }
        if !request.include_inactive {
            let term = Term::from_field_u64(self.handles.concept_active, 1);
            clauses.push((Occur::Must, Box::new(TermQuery::new(term, IndexRecordOption::Basic))));
        }

        if clauses.is_empty() {
            return Ok(Box::new(tantivy::query::AllQuery));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// A single token's query: exact match OR prefix match, optionally OR'd
    /// with a fuzzy (edit-distance 2) variant. Tokens under 3 characters
    /// are exact-match only, per spec.md §4.9.
    fn token_query(&self, token: &str, include_fuzzy: bool) -> Box<dyn Query> {
        let term = Term::from_field_text(self.handles.term, token);
        if token.chars().count() < 3 {
            return Box::new(TermQuery::new(term, IndexRecordOption::WithFreqsAndPositions));
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![
            (Occur::Should, Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqsAndPositions))),
            (Occur::Should, Box::new(FuzzyTermQuery::new_prefix(term.clone(), 0, true))),
        ];
        if include_fuzzy {
            clauses.push((Occur::Should, Box::new(FuzzyTermQuery::new(term, 2, true))));
        }
        Box::new(BooleanQuery::new(clauses))
    }
}

fn or_over(field: tantivy::schema::Field, ids: &[SctId]) -> Box<dyn Query> {
    let clauses: Vec<(Occur, Box<dyn Query>)> = ids
        .iter()
        .map(|id| {
            let term = Term::from_field_u64(field, sctid_to_u64(*id));
            (Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::Basic)) as Box<dyn Query>)
        })
        .collect();
    Box::new(BooleanQuery::new(clauses))
}

fn sctid_to_u64(id: SctId) -> u64 {
    id as u64
}

fn bool_to_u64(b: bool) -> u64 {
    if b {
        1
    } else {
        0
    }
}
