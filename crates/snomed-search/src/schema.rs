//! Tantivy schema for the denormalised description document, per
//! spec.md §4.9: {descriptionId, term, recursiveParentIds, directParentIds,
//! conceptRefsetIds, descriptionRefsetIds, conceptActive, descriptionActive}.

use tantivy::schema::{Field, IndexRecordOption, Schema, SchemaBuilder, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

/// Name of the tokenizer registered against the `term` field.
pub const TOKENIZER_NAME: &str = "snomed_term";

/// Handles for every field in the description document schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldHandles {
    pub description_id: Field,
    pub concept_id: Field,
    pub term: Field,
    pub recursive_parent_ids: Field,
    pub direct_parent_ids: Field,
    pub concept_refset_ids: Field,
    pub description_refset_ids: Field,
    pub concept_active: Field,
    pub description_active: Field,
}

/// Builds the description-document schema and returns its field handles.
#[must_use]
pub fn build_schema() -> (Schema, FieldHandles) {
    let mut builder = SchemaBuilder::new();

    let text_options = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    let description_id = builder.add_u64_field("description_id", INDEXED | STORED | FAST);
    let concept_id = builder.add_u64_field("concept_id", INDEXED | STORED | FAST);
    let term = builder.add_text_field("term", text_options);
    // Multi-valued fast fields: one field entry per parent/refset id.
    let recursive_parent_ids = builder.add_u64_field("recursive_parent_ids", INDEXED | FAST);
    let direct_parent_ids = builder.add_u64_field("direct_parent_ids", INDEXED | FAST);
    let concept_refset_ids = builder.add_u64_field("concept_refset_ids", INDEXED | FAST);
    let description_refset_ids = builder.add_u64_field("description_refset_ids", INDEXED | FAST);
    let concept_active = builder.add_u64_field("concept_active", INDEXED | STORED | FAST);
    let description_active = builder.add_u64_field("description_active", INDEXED | STORED | FAST);

    let schema = builder.build();
    let handles = FieldHandles {
        description_id,
        concept_id,
        term,
        recursive_parent_ids,
        direct_parent_ids,
        concept_refset_ids,
        description_refset_ids,
        concept_active,
        description_active,
    };
    (schema, handles)
}

/// Registers the `snomed_term` tokenizer (lowercase, whitespace/punctuation
/// split, drop pathological tokens over 256 bytes) on `index`.
pub fn register_tokenizer(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(256))
        .build();
    index.tokenizers().register(TOKENIZER_NAME, analyzer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_nine_fields() {
        let (schema, _) = build_schema();
        assert_eq!(schema.fields().count(), 9);
    }

    #[test]
    fn tokenizer_registers_and_lowercases() {
        let (schema, _) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);
        let mut tokenizer = index.tokenizers().get(TOKENIZER_NAME).unwrap();
        let mut stream = tokenizer.token_stream("Diabetes Mellitus");
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        assert_eq!(tokens, vec!["diabetes", "mellitus"]);
    }
}
