use crate::errors::Result;
use crate::types::{BookField, Order};
use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_PATCH_FIELDS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `value` must be an array; matches when the field equals any element.
    In,
    /// `value` must be an array; matches when the field equals no element.
    Nin,
}

impl CmpOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
        }
    }
}

/// A field/operator/value triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: BookField,
    pub op: CmpOp,
    pub value: Bson,
}

impl Predicate {
    /// # Errors
    /// Returns `CatalogError::InvalidField` when `field` is not a book field.
    pub fn new(field: &str, op: CmpOp, value: impl Into<Bson>) -> Result<Self> {
        Ok(Self { field: field.parse()?, op, value: value.into() })
    }

    #[must_use]
    pub fn eq(field: BookField, value: impl Into<Bson>) -> Self {
        Self { field, op: CmpOp::Eq, value: value.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: BookField,
    pub order: Order,
}

/// Partial field replacement applied by `update_one`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Patch {
    pub set: Vec<(BookField, Bson)>,
    pub inc: Vec<(BookField, f64)>,
}

impl Patch {
    /// # Errors
    /// Returns `CatalogError::InvalidField` when `field` is not a book field.
    pub fn set(field: &str, value: impl Into<Bson>) -> Result<Self> {
        Ok(Self { set: vec![(field.parse()?, value.into())], inc: Vec::new() })
    }

    #[must_use]
    pub fn and_set(mut self, field: BookField, value: impl Into<Bson>) -> Self {
        self.set.push((field, value.into()));
        self
    }

    #[must_use]
    pub fn and_inc(mut self, field: BookField, delta: f64) -> Self {
        self.inc.push((field, delta));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }
}
