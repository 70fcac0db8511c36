//! Distinct-value aggregation pipelines for suggestions.

use std::fmt;

use bson::{Document, doc};
use indexmap::IndexSet;
use lucent_query::{SearchResult, ValueSource};
use tracing::debug;

use crate::introspection::PipelineExecutor;
use crate::types::bson_to_text;

/// Build the pipeline listing up to `limit` distinct values of `source`
/// that contain `prefix`, ignoring case. Each value is the `_id` of one
/// output document.
pub fn distinct_values_pipeline(source: &str, prefix: &str, limit: usize) -> Vec<Document> {
    let condition = if prefix.is_empty() {
        doc! { "$ne": null }
    } else {
        doc! { "$regex": regex_lite::escape(prefix), "$options": "i" }
    };
    let mut matcher = Document::new();
    matcher.insert(source, condition);

    vec![
        doc! { "$match": matcher },
        doc! { "$group": { "_id": format!("${}", source) } },
        doc! { "$sort": { "_id": 1 } },
        doc! { "$limit": limit as i64 },
    ]
}

/// [`ValueSource`] running one aggregation per source path.
pub struct MongoValueSource {
    collection: String,
    execute: PipelineExecutor,
}

impl MongoValueSource {
    /// Create a value source over `collection`.
    pub fn new(
        collection: impl Into<String>,
        execute: impl Fn(&str, Vec<Document>) -> SearchResult<Vec<Document>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            collection: collection.into(),
            execute: Box::new(execute),
        }
    }
}

impl ValueSource for MongoValueSource {
    fn fetch_values(
        &self,
        sources: &[String],
        prefix: &str,
        limit: usize,
    ) -> SearchResult<Vec<String>> {
        let mut values = IndexSet::new();
        for source in sources {
            if values.len() >= limit {
                break;
            }
            let pipeline = distinct_values_pipeline(source, prefix, limit - values.len());
            let rows = (self.execute)(&self.collection, pipeline)?;
            debug!(
                collection = %self.collection,
                source = %source,
                rows = rows.len(),
                "Fetched values"
            );
            values.extend(rows.iter().filter_map(|row| row.get("_id").and_then(bson_to_text)));
        }
        Ok(values.into_iter().take(limit).collect())
    }
}

impl fmt::Debug for MongoValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoValueSource")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
