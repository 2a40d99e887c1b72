//! Aggregation pipelines: typed stages, their shell rendering, and in-process evaluation.

use bson::{Bson, Document as BsonDocument, doc};

use super::eval::{as_f64, compare_bson, compare_docs, eval_filter, get_path, is_num};
use super::render::{filter_to_document, sort_to_document};
use super::types::{Filter, SortSpec};

/// Grouping key of a `$group` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// `"$path"`
    Field(String),
    /// `floor(path / 10) * 10`
    Decade(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// `{ $avg: "$path" }`
    Avg(String),
    /// `{ $sum: 1 }`
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectExpr {
    /// The group key (`"$_id"`).
    Key,
    Field(String),
    Round { path: String, places: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Group { key: GroupKey, fields: Vec<(String, Accumulator)> },
    /// Output fields in order; `_id` is always dropped.
    Project(Vec<(String, ProjectExpr)>),
    Sort(Vec<SortSpec>),
    Limit(u64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Renders the pipeline as the array of stage documents the server expects.
    #[must_use]
    pub fn to_documents(&self) -> Vec<BsonDocument> {
        self.stages.iter().map(render_stage).collect()
    }
}

fn field_ref(path: &str) -> Bson {
    Bson::String(format!("${path}"))
}

fn render_stage(stage: &Stage) -> BsonDocument {
    match stage {
        Stage::Match(f) => doc! { "$match": filter_to_document(f) },
        Stage::Group { key, fields } => {
            let mut group = BsonDocument::new();
            let key = match key {
                GroupKey::Field(p) => field_ref(p),
                GroupKey::Decade(p) => Bson::Document(doc! {
                    "$multiply": [ { "$floor": { "$divide": [field_ref(p), 10] } }, 10 ]
                }),
            };
            group.insert("_id", key);
            for (name, acc) in fields {
                let expr = match acc {
                    Accumulator::Avg(p) => doc! { "$avg": field_ref(p) },
                    Accumulator::Count => doc! { "$sum": 1 },
                };
                group.insert(name.clone(), expr);
            }
            doc! { "$group": group }
        }
        Stage::Project(fields) => {
            let mut proj = doc! { "_id": 0 };
            for (name, expr) in fields {
                let value = match expr {
                    ProjectExpr::Key => field_ref("_id"),
                    ProjectExpr::Field(p) => field_ref(p),
                    ProjectExpr::Round { path, places } => {
                        Bson::Document(doc! { "$round": [field_ref(path), *places] })
                    }
                };
                proj.insert(name.clone(), value);
            }
            doc! { "$project": proj }
        }
        Stage::Sort(spec) => doc! { "$sort": sort_to_document(spec) },
        Stage::Limit(n) => doc! { "$limit": i64::try_from(*n).unwrap_or(i64::MAX) },
    }
}

/// Evaluates a pipeline over an in-memory document set.
#[must_use]
pub fn run_pipeline(docs: Vec<BsonDocument>, pipeline: &Pipeline) -> Vec<BsonDocument> {
    let mut docs = docs;
    for stage in &pipeline.stages {
        docs = match stage {
            Stage::Match(f) => docs.into_iter().filter(|d| eval_filter(d, f)).collect(),
            Stage::Group { key, fields } => group(&docs, key, fields),
            Stage::Project(fields) => docs.iter().map(|d| project(d, fields)).collect(),
            Stage::Sort(spec) => {
                docs.sort_by(|a, b| compare_docs(a, b, spec));
                docs
            }
            Stage::Limit(n) => {
                docs.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
                docs
            }
        };
    }
    docs
}

enum AccState {
    Avg { sum: f64, count: u64 },
    Count(i64),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Avg(_) => AccState::Avg { sum: 0.0, count: 0 },
            Accumulator::Count => AccState::Count(0),
        }
    }

    fn feed(&mut self, acc: &Accumulator, doc: &BsonDocument) {
        match (self, acc) {
            (AccState::Avg { sum, count }, Accumulator::Avg(p)) => {
                // non-numeric values are ignored, matching $avg
                if let Some(v) = get_path(doc, p).and_then(as_f64) {
                    *sum += v;
                    *count += 1;
                }
            }
            (AccState::Count(n), Accumulator::Count) => *n += 1,
            _ => {}
        }
    }

    fn finish(self) -> Bson {
        match self {
            AccState::Avg { count: 0, .. } => Bson::Null,
            AccState::Avg { sum, count } => Bson::Double(sum / count as f64),
            AccState::Count(n) => match i32::try_from(n) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(n),
            },
        }
    }
}

fn group_key(doc: &BsonDocument, key: &GroupKey) -> Bson {
    match key {
        GroupKey::Field(p) => get_path(doc, p).cloned().unwrap_or(Bson::Null),
        GroupKey::Decade(p) => get_path(doc, p)
            .and_then(as_f64)
            .map_or(Bson::Null, |y| Bson::Double((y / 10.0).floor() * 10.0)),
    }
}

fn same_key(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        compare_bson(a, b).is_eq()
    } else {
        a == b
    }
}

fn group(docs: &[BsonDocument], key: &GroupKey, fields: &[(String, Accumulator)]) -> Vec<BsonDocument> {
    let mut groups: Vec<(Bson, Vec<AccState>)> = Vec::new();
    for d in docs {
        let k = group_key(d, key);
        let slot = match groups.iter().position(|(g, _)| same_key(g, &k)) {
            Some(i) => i,
            None => {
                groups.push((k, fields.iter().map(|(_, acc)| AccState::new(acc)).collect()));
                groups.len() - 1
            }
        };
        for (state, (_, acc)) in groups[slot].1.iter_mut().zip(fields) {
            state.feed(acc, d);
        }
    }
    groups
        .into_iter()
        .map(|(k, states)| {
            let mut out = doc! { "_id": k };
            for (state, (name, _)) in states.into_iter().zip(fields) {
                out.insert(name.clone(), state.finish());
            }
            out
        })
        .collect()
}

fn project(doc: &BsonDocument, fields: &[(String, ProjectExpr)]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (name, expr) in fields {
        let value = match expr {
            ProjectExpr::Key => doc.get("_id").cloned(),
            ProjectExpr::Field(p) => get_path(doc, p).cloned(),
            ProjectExpr::Round { path, places } => Some(
                get_path(doc, path)
                    .and_then(as_f64)
                    .map_or(Bson::Null, |v| Bson::Double(round_half_even(v, *places))),
            ),
        };
        if let Some(v) = value {
            out.insert(name.clone(), v);
        }
    }
    out
}

/// Rounds to `places` decimals with ties to even, as the server's `$round` does.
#[must_use]
pub fn round_half_even(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}
