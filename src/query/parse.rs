use crate::errors::{CatalogError, Result};
use crate::types::BookField;
use bson::Bson;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{CmpOp, MAX_IN_SET, MAX_PATCH_FIELDS, Patch, Predicate};

/// Parses a Mongo-style filter document into a conjunction of predicates.
///
/// Accepted shapes: `{"genre": "Fiction"}`, `{"published_year": {"$gt": 1950, "$lt": 2000}}`,
/// `{"$and": [{...}, {...}]}` and any mix of those at the top level. `{}` matches everything.
///
/// # Errors
/// `CatalogError::Json` for malformed JSON, `CatalogError::InvalidField` for unknown fields,
/// `CatalogError::Query` for unsupported operators.
pub fn parse_filter_json(json: &str) -> Result<Vec<Predicate>> {
    let v: Value = serde_json::from_str(json)?;
    let mut out = Vec::new();
    collect_predicates(&v, &mut out)?;
    Ok(out)
}

fn collect_predicates(v: &Value, out: &mut Vec<Predicate>) -> Result<()> {
    let Value::Object(map) = v else {
        return Err(CatalogError::Query("filter must be a JSON object".into()));
    };
    for (key, val) in map {
        if key == "$and" {
            let Value::Array(parts) = val else {
                return Err(CatalogError::Query("$and requires an array".into()));
            };
            for p in parts {
                collect_predicates(p, out)?;
            }
            continue;
        }
        if key.starts_with('$') {
            return Err(CatalogError::Query(format!("unsupported top-level operator {key}")));
        }
        let field: BookField = key.parse()?;
        match val {
            Value::Object(ops) if is_operator_map(ops) => {
                for (op, arg) in ops {
                    out.push(Predicate { field, op: parse_op(op)?, value: to_bson(op, arg)? });
                }
            }
            other => out.push(Predicate { field, op: CmpOp::Eq, value: json_to_bson(other.clone())? }),
        }
    }
    Ok(())
}

fn is_operator_map(ops: &Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|k| k.starts_with('$'))
}

fn parse_op(op: &str) -> Result<CmpOp> {
    Ok(match op {
        "$eq" => CmpOp::Eq,
        "$ne" => CmpOp::Ne,
        "$gt" => CmpOp::Gt,
        "$gte" => CmpOp::Gte,
        "$lt" => CmpOp::Lt,
        "$lte" => CmpOp::Lte,
        "$in" => CmpOp::In,
        "$nin" => CmpOp::Nin,
        other => return Err(CatalogError::Query(format!("unsupported operator {other}"))),
    })
}

fn to_bson(op: &str, arg: &Value) -> Result<Bson> {
    match (op, arg) {
        ("$in" | "$nin", Value::Array(items)) => {
            if items.len() > MAX_IN_SET {
                return Err(CatalogError::Query(format!("{op} accepts at most {MAX_IN_SET} values, got {}", items.len())));
            }
            items.iter().cloned().map(json_to_bson).collect::<Result<Vec<_>>>().map(Bson::Array)
        }
        ("$in" | "$nin", _) => Err(CatalogError::Query(format!("{op} requires an array"))),
        _ => json_to_bson(arg.clone()),
    }
}

/// Converts a JSON value to BSON. Extended-JSON wrappers such as `{"$numberLong": "5"}`
/// are understood.
///
/// # Errors
/// `CatalogError::Query` when `v` is malformed extended JSON.
pub(crate) fn json_to_bson(v: Value) -> Result<Bson> {
    Bson::try_from(v).map_err(|e| CatalogError::Query(format!("invalid value: {e}")))
}

fn check_patch_size(op: &str, n: usize) -> Result<()> {
    if n > MAX_PATCH_FIELDS {
        return Err(CatalogError::Query(format!("{op} accepts at most {MAX_PATCH_FIELDS} fields, got {n}")));
    }
    Ok(())
}

// Serde-facing structure for update documents
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDocSerde {
    #[serde(default, rename = "$set")]
    pub set: Option<Map<String, Value>>,
    #[serde(default, rename = "$inc")]
    pub inc: Option<Map<String, Value>>,
    #[serde(default, rename = "$unset")]
    pub unset: Option<Value>,
}

impl TryFrom<UpdateDocSerde> for Patch {
    type Error = CatalogError;
    fn try_from(us: UpdateDocSerde) -> Result<Self> {
        if us.unset.is_some() {
            return Err(CatalogError::Query("$unset is not supported: every book field is required".into()));
        }
        let mut out = Self::default();
        if let Some(setd) = us.set {
            check_patch_size("$set", setd.len())?;
            for (k, v) in setd {
                out.set.push((k.parse()?, json_to_bson(v)?));
            }
        }
        if let Some(incd) = us.inc {
            check_patch_size("$inc", incd.len())?;
            for (k, v) in incd {
                let f = v.as_f64().ok_or_else(|| CatalogError::Query("$inc requires numeric".into()))?;
                out.inc.push((k.parse()?, f));
            }
        }
        Ok(out)
    }
}

/// # Errors
/// Returns an error if the JSON string cannot be parsed into a patch.
pub fn parse_update_json(json: &str) -> Result<Patch> {
    let us: UpdateDocSerde = serde_json::from_str(json)?;
    Patch::try_from(us)
}
