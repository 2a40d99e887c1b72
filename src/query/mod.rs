// Submodules for separation of concerns
mod eval;
mod pipeline;
mod render;
mod types;

pub(crate) use eval::as_f64;
pub use eval::{apply_update, compare_bson, compare_docs, eval_filter, project_fields};
pub use pipeline::{
    Accumulator, GroupKey, Pipeline, ProjectExpr, Stage, round_half_even, run_pipeline,
};
pub use render::{
    filter_to_document, index_keys_document, projection_to_document, sort_to_document,
    update_to_document,
};
pub use types::{
    CmpOp, DeleteReport, Filter, FindOptions, IndexSpec, Order, SortSpec, UpdateDoc, UpdateReport,
};
