//! Collection backends the facade issues its requests to.
//!
//! [`MongoStore`] talks to a MongoDB deployment through the synchronous
//! driver. [`MemoryStore`] evaluates the same request shapes over documents
//! held in process, which is what the test suite and `--memory` CLI mode use.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use bson::Document as BsonDocument;

use crate::errors::BookError;
use crate::query::{DeleteReport, Filter, FindOptions, IndexSpec, Pipeline, UpdateDoc, UpdateReport};

/// One document collection.
pub trait BookStore: Send + Sync {
    /// Collection name, for logging.
    fn name(&self) -> &str;

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, BookError>;

    /// Applies `update` to the first document matching `filter`.
    fn update_one(&self, filter: &Filter, update: &UpdateDoc) -> Result<UpdateReport, BookError>;

    /// Removes the first document matching `filter`.
    fn delete_one(&self, filter: &Filter) -> Result<DeleteReport, BookError>;

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, BookError>;

    /// Ensures the index exists and returns its name. Creating an existing index is a no-op.
    fn create_index(&self, spec: &IndexSpec) -> Result<String, BookError>;

    /// Names of the secondary indexes, excluding the built-in `_id_` index.
    fn list_indexes(&self) -> Result<Vec<String>, BookError>;

    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, BookError>;
}
