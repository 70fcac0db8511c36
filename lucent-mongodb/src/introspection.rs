//! Schema inference from sample documents.
//!
//! Collections have no declared schema, so field types are inferred from a
//! sample. Nested documents are flattened into dotted paths
//! (`author.email`); array elements count towards the array's own path.

use std::fmt;

use bson::{Bson, Document, doc};
use indexmap::IndexMap;
use lucent_query::{Schema, SchemaSource, SearchResult, SemanticType};
use tracing::debug;

/// Default number of documents sampled for inference.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Types observed for one path across the sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Observed {
    integer: bool,
    float: bool,
    boolean: bool,
    string: bool,
    timestamp: bool,
    null: bool,
    other: bool,
}

impl Observed {
    fn record(&mut self, value: &Bson) {
        match value {
            Bson::Int32(_) | Bson::Int64(_) => self.integer = true,
            Bson::Double(_) | Bson::Decimal128(_) => self.float = true,
            Bson::Boolean(_) => self.boolean = true,
            Bson::String(_) | Bson::Symbol(_) => self.string = true,
            Bson::DateTime(_) | Bson::Timestamp(_) => self.timestamp = true,
            Bson::Null | Bson::Undefined => self.null = true,
            _ => self.other = true,
        }
    }

    /// The single semantic type consistent with every observation.
    /// Integers mixed with floats widen to float.
    fn semantic_type(&self) -> Option<SemanticType> {
        if self.other {
            return None;
        }
        match (self.integer, self.float, self.boolean, self.string, self.timestamp) {
            (true, false, false, false, false) => Some(SemanticType::Integer),
            (_, true, false, false, false) => Some(SemanticType::Float),
            (false, false, true, false, false) if self.null => Some(SemanticType::NullableBoolean),
            (false, false, true, false, false) => Some(SemanticType::Boolean),
            (false, false, false, true, false) => Some(SemanticType::String),
            (false, false, false, false, true) => Some(SemanticType::Timestamp),
            _ => None,
        }
    }
}

fn walk(prefix: &str, doc: &Document, paths: &mut IndexMap<String, Observed>) {
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        visit(&path, value, paths);
    }
}

fn visit(path: &str, value: &Bson, paths: &mut IndexMap<String, Observed>) {
    match value {
        Bson::Document(inner) => walk(path, inner, paths),
        Bson::Array(items) => {
            paths.entry(path.to_string()).or_default();
            for item in items {
                visit(path, item, paths);
            }
        }
        scalar => paths.entry(path.to_string()).or_default().record(scalar),
    }
}

/// Infer a [`Schema`] from sample documents.
///
/// `_id` is skipped. Paths whose values disagree on type are kept with an
/// unknown type.
pub fn infer_schema<'a>(samples: impl IntoIterator<Item = &'a Document>) -> Schema {
    let mut paths = IndexMap::new();
    for sample in samples {
        walk("", sample, &mut paths);
    }

    let mut schema = Schema::new();
    for (path, observed) in paths {
        if path == "_id" {
            continue;
        }
        schema.insert(path, observed.semantic_type());
    }
    schema
}

/// Aggregation pipeline sampling `size` documents.
pub fn sample_pipeline(size: usize) -> Vec<Document> {
    vec![doc! { "$sample": { "size": size as i64 } }]
}

/// Runs an aggregation pipeline against a collection.
pub type PipelineExecutor =
    Box<dyn Fn(&str, Vec<Document>) -> SearchResult<Vec<Document>> + Send + Sync>;

/// [`SchemaSource`] sampling a collection through a pipeline executor.
pub struct MongoIntrospector {
    collection: String,
    sample_size: usize,
    default_search_fields: Vec<String>,
    execute: PipelineExecutor,
}

impl MongoIntrospector {
    /// Create an introspector for `collection`.
    pub fn new(
        collection: impl Into<String>,
        execute: impl Fn(&str, Vec<Document>) -> SearchResult<Vec<Document>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            collection: collection.into(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            default_search_fields: Vec::new(),
            execute: Box::new(execute),
        }
    }

    /// Number of documents to sample.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    /// Paths searched by bare terms.
    pub fn default_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_search_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl SchemaSource for MongoIntrospector {
    fn introspect(&self) -> SearchResult<Schema> {
        let samples = (self.execute)(&self.collection, sample_pipeline(self.sample_size))?;
        let schema = infer_schema(&samples);
        debug!(
            collection = %self.collection,
            samples = samples.len(),
            paths = schema.len(),
            "Inferred collection schema"
        );
        Ok(schema.default_search_fields(self.default_search_fields.iter().cloned()))
    }
}

impl fmt::Debug for MongoIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoIntrospector")
            .field("collection", &self.collection)
            .field("sample_size", &self.sample_size)
            .finish_non_exhaustive()
    }
}
