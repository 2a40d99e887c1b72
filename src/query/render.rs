//! Rendering of typed requests into the documents a MongoDB server accepts.

use bson::{Bson, Document as BsonDocument, doc};

use super::types::{CmpOp, Filter, IndexSpec, MAX_PROJECTION_FIELDS, SortSpec, UpdateDoc};

#[must_use]
pub fn filter_to_document(filter: &Filter) -> BsonDocument {
    match filter {
        Filter::True => BsonDocument::new(),
        Filter::Numeric { path } => doc! { path.as_str(): { "$type": "number" } },
        Filter::Cmp { path, op: CmpOp::Eq, value } => doc! { path.as_str(): value.clone() },
        Filter::Cmp { path, op, value } => {
            let op = match op {
                CmpOp::Gt => "$gt",
                CmpOp::Gte => "$gte",
                CmpOp::Lt => "$lt",
                CmpOp::Lte => "$lte",
                CmpOp::Eq => "$eq",
            };
            doc! { path.as_str(): { op: value.clone() } }
        }
        Filter::And(fs) => {
            let parts: Vec<BsonDocument> = fs.iter().map(filter_to_document).collect();
            // Implicit AND when the clauses touch distinct fields, `$and` otherwise.
            let mut merged = BsonDocument::new();
            let mut overlap = false;
            for (k, v) in parts.iter().flat_map(|p| p.iter()) {
                if merged.contains_key(k) {
                    overlap = true;
                    break;
                }
                merged.insert(k.clone(), v.clone());
            }
            if overlap {
                let clauses: Vec<Bson> = parts.into_iter().map(Bson::Document).collect();
                return doc! { "$and": clauses };
            }
            merged
        }
    }
}

#[must_use]
pub fn sort_to_document(spec: &[SortSpec]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for s in spec {
        out.insert(s.field.clone(), s.order.direction());
    }
    out
}

/// Inclusion projection; `_id` is suppressed unless explicitly listed.
#[must_use]
pub fn projection_to_document(fields: &[String]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for f in fields.iter().take(MAX_PROJECTION_FIELDS) {
        out.insert(f.clone(), 1);
    }
    if !fields.iter().any(|f| f == "_id") {
        out.insert("_id", 0);
    }
    out
}

#[must_use]
pub fn update_to_document(update: &UpdateDoc) -> BsonDocument {
    let mut set = BsonDocument::new();
    for (k, v) in &update.set {
        set.insert(k.clone(), v.clone());
    }
    doc! { "$set": set }
}

#[must_use]
pub fn index_keys_document(spec: &IndexSpec) -> BsonDocument {
    sort_to_document(&spec.keys)
}
