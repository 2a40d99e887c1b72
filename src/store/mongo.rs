use bson::Document as BsonDocument;
use mongodb::IndexModel;
use mongodb::sync::{Client, Collection};

use super::BookStore;
use crate::errors::BookError;
use crate::query::{
    DeleteReport, Filter, FindOptions, IndexSpec, Pipeline, UpdateDoc, UpdateReport,
    filter_to_document, index_keys_document, projection_to_document, sort_to_document,
    update_to_document,
};

const DEFAULT_ID_INDEX: &str = "_id_";

/// A collection on a MongoDB deployment.
///
/// Driver errors are returned unchanged; there are no retries beyond the
/// driver's own retryable reads and writes.
pub struct MongoStore {
    collection: Collection<BsonDocument>,
}

impl MongoStore {
    /// Builds a client for `uri` and selects `database.collection`.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the first request.
    pub fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, BookError> {
        let client = Client::with_uri_str(uri)?;
        let collection = client.database(database).collection::<BsonDocument>(collection);
        log::info!("using mongodb collection {}.{}", database, collection.name());
        Ok(Self { collection })
    }

    #[must_use]
    pub fn from_collection(collection: Collection<BsonDocument>) -> Self {
        Self { collection }
    }
}

impl BookStore for MongoStore {
    fn name(&self) -> &str {
        self.collection.name()
    }

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, BookError> {
        let mut action = self.collection.find(filter_to_document(filter));
        if let Some(sort) = &opts.sort {
            action = action.sort(sort_to_document(sort));
        }
        if let Some(fields) = &opts.projection {
            action = action.projection(projection_to_document(fields));
        }
        if let Some(skip) = opts.skip {
            action = action.skip(skip);
        }
        if let Some(limit) = opts.limit {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let cursor = action.run()?;
        Ok(cursor.collect::<Result<Vec<_>, _>>()?)
    }

    fn update_one(&self, filter: &Filter, update: &UpdateDoc) -> Result<UpdateReport, BookError> {
        let res = self
            .collection
            .update_one(filter_to_document(filter), update_to_document(update))
            .run()?;
        Ok(UpdateReport { matched: res.matched_count, modified: res.modified_count })
    }

    fn delete_one(&self, filter: &Filter) -> Result<DeleteReport, BookError> {
        let res = self.collection.delete_one(filter_to_document(filter)).run()?;
        Ok(DeleteReport { deleted: res.deleted_count })
    }

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, BookError> {
        let cursor = self.collection.aggregate(pipeline.to_documents()).run()?;
        Ok(cursor.collect::<Result<Vec<_>, _>>()?)
    }

    fn create_index(&self, spec: &IndexSpec) -> Result<String, BookError> {
        let model = IndexModel::builder().keys(index_keys_document(spec)).build();
        let res = self.collection.create_index(model).run()?;
        Ok(res.index_name)
    }

    fn list_indexes(&self) -> Result<Vec<String>, BookError> {
        let names = self.collection.list_index_names().run()?;
        Ok(names.into_iter().filter(|n| n != DEFAULT_ID_INDEX).collect())
    }

    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, BookError> {
        // the server rejects an empty batch
        if docs.is_empty() {
            return Ok(0);
        }
        let res = self.collection.insert_many(docs).run()?;
        Ok(res.inserted_ids.len() as u64)
    }
}
