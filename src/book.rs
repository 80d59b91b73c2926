use crate::errors::{CatalogError, Result};
use crate::query::exact_i64;
use crate::types::{BookField, FieldKind};
use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

/// A single record of the bookstore collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i64,
    pub price: f64,
    pub in_stock: bool,
    pub pages: i64,
    pub publisher: String,
}

/// Projection result: a document holding only the requested fields.
pub type PartialBook = BsonDocument;

impl Book {
    /// Value of `field` as BSON. Integers are `Int64`, the price is `Double`.
    #[must_use]
    pub fn get(&self, field: BookField) -> Bson {
        match field {
            BookField::Title => Bson::String(self.title.clone()),
            BookField::Author => Bson::String(self.author.clone()),
            BookField::Genre => Bson::String(self.genre.clone()),
            BookField::PublishedYear => Bson::Int64(self.published_year),
            BookField::Price => Bson::Double(self.price),
            BookField::InStock => Bson::Boolean(self.in_stock),
            BookField::Pages => Bson::Int64(self.pages),
            BookField::Publisher => Bson::String(self.publisher.clone()),
        }
    }

    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        doc! {
            "title": self.title.clone(),
            "author": self.author.clone(),
            "genre": self.genre.clone(),
            "published_year": self.published_year,
            "price": self.price,
            "in_stock": self.in_stock,
            "pages": self.pages,
            "publisher": self.publisher.clone(),
        }
    }

    /// Builds a book from a schema-less document, checking every required field.
    ///
    /// Keys that are not book fields (such as `_id`) are ignored.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` naming the first missing or mistyped field.
    pub fn from_document(d: &BsonDocument) -> Result<Self> {
        for key in d.keys() {
            if key != "_id" && key.parse::<BookField>().is_err() {
                log::debug!("ignoring unknown key `{key}` in book document");
            }
        }
        let text = |f: BookField| required(d, f).and_then(|v| text_value(f, v));
        let integer = |f: BookField| required(d, f).and_then(|v| integer_value(f, v));
        Ok(Self {
            title: text(BookField::Title)?,
            author: text(BookField::Author)?,
            genre: text(BookField::Genre)?,
            published_year: integer(BookField::PublishedYear)?,
            price: required(d, BookField::Price).and_then(|v| decimal_value(BookField::Price, v))?,
            in_stock: required(d, BookField::InStock)
                .and_then(|v| bool_value(BookField::InStock, v))?,
            pages: integer(BookField::Pages)?,
            publisher: text(BookField::Publisher)?,
        })
    }

    /// Checks invariants a typed `Book` cannot express on its own: a finite price.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` for a NaN or infinite price.
    pub fn validate(&self) -> Result<()> {
        if !self.price.is_finite() {
            return Err(CatalogError::validation(BookField::Price.name(), "must be a finite number"));
        }
        Ok(())
    }

    /// Replaces one field. Returns whether the stored value changed.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` when `value` has the wrong type for `field`.
    pub fn set_field(&mut self, field: BookField, value: &Bson) -> Result<bool> {
        let before = self.get(field);
        match field {
            BookField::Title => self.title = text_value(field, value)?,
            BookField::Author => self.author = text_value(field, value)?,
            BookField::Genre => self.genre = text_value(field, value)?,
            BookField::Publisher => self.publisher = text_value(field, value)?,
            BookField::PublishedYear => self.published_year = integer_value(field, value)?,
            BookField::Pages => self.pages = integer_value(field, value)?,
            BookField::Price => self.price = decimal_value(field, value)?,
            BookField::InStock => self.in_stock = bool_value(field, value)?,
        }
        Ok(before != self.get(field))
    }

    /// Adds `delta` to a numeric field.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` for text/boolean fields, or for a fractional
    /// delta on an integer field.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn increment(&mut self, field: BookField, delta: f64) -> Result<bool> {
        match field.kind() {
            FieldKind::Decimal => self.set_field(field, &Bson::Double(self.price + delta)),
            FieldKind::Integer => {
                if delta.fract() != 0.0 || !delta.is_finite() {
                    return Err(CatalogError::validation(field.name(), "integer field requires an integral increment"));
                }
                let current = match self.get(field) {
                    Bson::Int64(i) => i,
                    _ => 0,
                };
                self.set_field(field, &Bson::Int64(current.saturating_add(delta as i64)))
            }
            FieldKind::Text | FieldKind::Boolean => {
                Err(CatalogError::validation(field.name(), "$inc requires a numeric field"))
            }
        }
    }
}

fn required(d: &BsonDocument, field: BookField) -> Result<&Bson> {
    match d.get(field.name()) {
        None | Some(Bson::Null) => Err(CatalogError::validation(field.name(), "missing required field")),
        Some(v) => Ok(v),
    }
}

fn text_value(field: BookField, v: &Bson) -> Result<String> {
    match v {
        Bson::String(s) => Ok(s.clone()),
        other => Err(CatalogError::validation(field.name(), format!("expected text, found {:?}", other.element_type()))),
    }
}

fn integer_value(field: BookField, v: &Bson) -> Result<i64> {
    match v {
        Bson::Int32(i) => Ok(i64::from(*i)),
        Bson::Int64(i) => Ok(*i),
        // JSON sources sometimes spell integers as `1954.0`
        Bson::Double(f) => {
            exact_i64(*f).ok_or_else(|| CatalogError::validation(field.name(), format!("expected integer, found {f}")))
        }
        other => Err(CatalogError::validation(field.name(), format!("expected integer, found {:?}", other.element_type()))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn decimal_value(field: BookField, v: &Bson) -> Result<f64> {
    let f = match v {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        other => {
            return Err(CatalogError::validation(field.name(), format!("expected decimal, found {:?}", other.element_type())));
        }
    };
    if f.is_finite() { Ok(f) } else { Err(CatalogError::validation(field.name(), "must be a finite number")) }
}

fn bool_value(field: BookField, v: &Bson) -> Result<bool> {
    match v {
        Bson::Boolean(b) => Ok(*b),
        other => Err(CatalogError::validation(field.name(), format!("expected boolean, found {:?}", other.element_type()))),
    }
}
