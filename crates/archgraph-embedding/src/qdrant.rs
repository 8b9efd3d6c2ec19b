//! Qdrant-backed record store.
//!
//! Each record becomes one point: the vector is the Ollama embedding of the
//! record text, the payload is the record metadata plus the record key and
//! text. Point ids are UUID v5 of the record key, so the same key always
//! lands on the same point.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, Condition, CreateCollectionBuilder,
    DeletePointsBuilder, Distance, Filter, PointId, PointStruct, PointsIdsList, Range,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ollama::OllamaClient;
use crate::record::{Metadata, MetadataValue, Record, RecordStore, StoreResult};

/// Payload field holding the record key.
const KEY_FIELD: &str = "record_key";

/// Payload field holding the record text.
const TEXT_FIELD: &str = "document";

/// Page size used when scrolling filtered records.
const SCROLL_PAGE: usize = 256;

/// Qdrant record store for one collection.
#[derive(Clone)]
pub struct QdrantStore {
    client: Qdrant,
    ollama: OllamaClient,
    collection: String,
}

impl QdrantStore {
    /// Create a new QdrantStore client bound to `collection`.
    pub fn new(url: &str, collection: &str, ollama: OllamaClient) -> StoreResult<Self> {
        let client = Qdrant::from_url(url).build()?;

        Ok(Self {
            client,
            ollama,
            collection: collection.to_string(),
        })
    }

    /// Ensure the collection exists.
    ///
    /// The vector size is probed from the embedding model so a model switch
    /// only requires a fresh collection name.
    pub async fn ensure_collection(&self) -> StoreResult<()> {
        let exists = self.client.collection_exists(&self.collection).await?;

        if !exists {
            let probe = self.ollama.embed("archgraph dimension probe").await?;
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(probe.len() as u64, Distance::Cosine)),
                )
                .await?;

            info!(collection = %self.collection, dim = probe.len(), "Created Qdrant collection");
        } else {
            debug!(collection = %self.collection, "Collection already exists");
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for QdrantStore {
    async fn put(&self, key: &str, text: &str, metadata: Metadata) -> StoreResult<String> {
        let vector = self.ollama.embed(text).await?;

        let mut payload = metadata_to_payload(&metadata);
        payload.insert(KEY_FIELD.to_string(), string_value(key));
        payload.insert(TEXT_FIELD.to_string(), string_value(text));

        let point = PointStruct::new(record_point_id(key), vector, payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await?;

        debug!(collection = %self.collection, key, "Upserted record");
        Ok(key.to_string())
    }

    async fn get_by_filter(&self, filter: &Metadata, limit: usize) -> StoreResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset: Option<PointId> = None;

        while records.len() < limit {
            let page = SCROLL_PAGE.min(limit - records.len());
            let mut request = ScrollPointsBuilder::new(&self.collection)
                .limit(page as u32)
                .with_payload(true)
                .with_vectors(false);
            if let Some(f) = metadata_filter(filter) {
                request = request.filter(f);
            }
            if let Some(next) = offset.take() {
                request = request.offset(next);
            }

            let response = self.client.scroll(request).await?;
            for point in response.result {
                match payload_to_record(&point.payload) {
                    Some(record) => records.push(record),
                    None => debug!(collection = %self.collection, "Skipping point without record key"),
                }
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        records.truncate(limit);
        Ok(records)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let ids_list = PointsIdsList {
            ids: vec![PointId {
                point_id_options: Some(PointIdOptions::Uuid(record_point_id(key))),
            }],
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(ids_list)
                    .wait(true),
            )
            .await?;

        debug!(collection = %self.collection, key, "Deleted record");
        Ok(())
    }

    async fn semantic_search(
        &self,
        query: &str,
        filter: &Metadata,
        top_k: usize,
    ) -> StoreResult<Vec<(Record, f32)>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.ollama.embed(query).await?;
        debug!(query, dim = query_vector.len(), "Generated query embedding");

        let mut request = SearchPointsBuilder::new(&self.collection, query_vector, top_k as u64)
            .with_payload(true);
        if let Some(f) = metadata_filter(filter) {
            request = request.filter(f);
        }

        let response = self.client.search_points(request).await?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| payload_to_record(&point.payload).map(|r| (r, point.score)))
            .collect())
    }
}

/// Deterministic point id for a record key.
pub fn record_point_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

/// Build a `must` filter from exact-match metadata. `None` when empty.
fn metadata_filter(filter: &Metadata) -> Option<Filter> {
    if filter.is_empty() {
        return None;
    }

    let conditions: Vec<Condition> = filter
        .iter()
        .map(|(key, value)| match value {
            MetadataValue::String(s) => Condition::matches(key.clone(), s.clone()),
            MetadataValue::Integer(i) => Condition::matches(key.clone(), *i),
            MetadataValue::Bool(b) => Condition::matches(key.clone(), *b),
            MetadataValue::Float(f) => Condition::range(
                key.clone(),
                Range {
                    gte: Some(*f),
                    lte: Some(*f),
                    ..Default::default()
                },
            ),
        })
        .collect();

    Some(Filter::must(conditions))
}

fn string_value(s: &str) -> Value {
    Value {
        kind: Some(Kind::StringValue(s.to_string())),
    }
}

/// Convert record metadata to a Qdrant payload.
fn metadata_to_payload(metadata: &Metadata) -> HashMap<String, Value> {
    metadata
        .iter()
        .map(|(key, value)| {
            let kind = match value {
                MetadataValue::String(s) => Kind::StringValue(s.clone()),
                MetadataValue::Integer(i) => Kind::IntegerValue(*i),
                MetadataValue::Float(f) => Kind::DoubleValue(*f),
                MetadataValue::Bool(b) => Kind::BoolValue(*b),
            };
            (key.clone(), Value { kind: Some(kind) })
        })
        .collect()
}

/// Convert a Qdrant payload back into a record. `None` if the key is missing.
fn payload_to_record(payload: &HashMap<String, Value>) -> Option<Record> {
    let mut metadata = Metadata::new();
    let mut key = None;
    let mut text = String::new();

    for (field, val) in payload {
        let Some(kind) = &val.kind else { continue };
        let value = match kind {
            Kind::StringValue(s) => MetadataValue::String(s.clone()),
            Kind::IntegerValue(i) => MetadataValue::Integer(*i),
            Kind::DoubleValue(f) => MetadataValue::Float(*f),
            Kind::BoolValue(b) => MetadataValue::Bool(*b),
            _ => continue,
        };

        match field.as_str() {
            KEY_FIELD => key = value.as_str().map(str::to_string),
            TEXT_FIELD => text = value.to_string(),
            _ => {
                metadata.insert(field.clone(), value);
            }
        }
    }

    key.map(|key| Record { key, text, metadata })
}
