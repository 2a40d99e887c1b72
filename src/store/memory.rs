use bson::oid::ObjectId;
use bson::{Document as BsonDocument, doc};
use parking_lot::RwLock;

use super::BookStore;
use crate::errors::BookError;
use crate::query::{
    DeleteReport, Filter, FindOptions, IndexSpec, Pipeline, UpdateDoc, UpdateReport, apply_update,
    compare_docs, eval_filter, project_fields, run_pipeline,
};

/// In-process collection. Natural order is insertion order.
pub struct MemoryStore {
    name: String,
    docs: RwLock<Vec<BsonDocument>>,
    indexes: RwLock<Vec<IndexSpec>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), docs: RwLock::new(Vec::new()), indexes: RwLock::new(Vec::new()) }
    }

    /// Creates a store pre-populated with `docs`, assigning identifiers where missing.
    pub fn with_documents(name: impl Into<String>, docs: Vec<BsonDocument>) -> Self {
        let store = Self::new(name);
        store.docs.write().extend(docs.into_iter().map(with_id));
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

fn with_id(doc: BsonDocument) -> BsonDocument {
    if doc.contains_key("_id") {
        return doc;
    }
    let mut out = doc! { "_id": ObjectId::new() };
    for (k, v) in doc {
        out.insert(k, v);
    }
    out
}

impl BookStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, BookError> {
        let mut docs: Vec<BsonDocument> =
            self.docs.read().iter().filter(|d| eval_filter(d, filter)).cloned().collect();

        if let Some(sort) = &opts.sort {
            // stable, so ties keep natural order
            docs.sort_by(|a, b| compare_docs(a, b, sort));
        }

        let skip = opts.skip.and_then(|s| usize::try_from(s).ok()).unwrap_or(0);
        let limit = opts.limit.and_then(|l| usize::try_from(l).ok()).unwrap_or(usize::MAX);
        let mut docs: Vec<BsonDocument> = docs.into_iter().skip(skip).take(limit).collect();

        if let Some(fields) = &opts.projection {
            for d in &mut docs {
                *d = project_fields(d, fields);
            }
        }
        Ok(docs)
    }

    fn update_one(&self, filter: &Filter, update: &UpdateDoc) -> Result<UpdateReport, BookError> {
        let mut docs = self.docs.write();
        if let Some(doc) = docs.iter_mut().find(|d| eval_filter(d, filter)) {
            let changed = apply_update(doc, update);
            return Ok(UpdateReport { matched: 1, modified: u64::from(changed) });
        }
        Ok(UpdateReport::default())
    }

    fn delete_one(&self, filter: &Filter) -> Result<DeleteReport, BookError> {
        let mut docs = self.docs.write();
        if let Some(pos) = docs.iter().position(|d| eval_filter(d, filter)) {
            docs.remove(pos);
            return Ok(DeleteReport { deleted: 1 });
        }
        Ok(DeleteReport::default())
    }

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, BookError> {
        let snapshot = self.docs.read().clone();
        Ok(run_pipeline(snapshot, pipeline))
    }

    fn create_index(&self, spec: &IndexSpec) -> Result<String, BookError> {
        let name = spec.name();
        let mut indexes = self.indexes.write();
        if !indexes.iter().any(|i| i.name() == name) {
            indexes.push(spec.clone());
        }
        Ok(name)
    }

    fn list_indexes(&self) -> Result<Vec<String>, BookError> {
        Ok(self.indexes.read().iter().map(IndexSpec::name).collect())
    }

    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, BookError> {
        let mut store = self.docs.write();
        let before = store.len();
        store.extend(docs.into_iter().map(with_id));
        Ok((store.len() - before) as u64)
    }
}
