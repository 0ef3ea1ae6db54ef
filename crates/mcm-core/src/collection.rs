// Record collections parsed out of a literal: a plain list of records, or a
// map of category name to list (the device catalog).
use crate::error::{StoreError, StoreResult};
use crate::literal::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Sequence(Vec<Value>),
    Categories(Vec<(String, Vec<Value>)>),
}

/// Value of a record's identifying field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Int(i64),
    Str(String),
}

impl RecordKey {
    pub fn of(record: &Value, id_field: &str) -> Option<Self> {
        match record.get(id_field)? {
            Value::Str(s) => Some(RecordKey::Str(s.clone())),
            v => v.as_i64().map(RecordKey::Int),
        }
    }

    pub fn matches(&self, v: &Value) -> bool {
        match (self, v) {
            (RecordKey::Int(n), v) => v.as_i64() == Some(*n),
            (RecordKey::Str(s), Value::Str(x)) => s == x,
            _ => false,
        }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordKey::Int(n) => write!(f, "{n}"),
            RecordKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        RecordKey::Int(n)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        RecordKey::Str(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Replaced(usize),
    Appended(usize),
}

/// Where a record lives: its category (catalog shape only) and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    pub category: Option<&'a str>,
    pub index: usize,
}

fn key_matches(record: &Value, id_field: &str, key: &RecordKey) -> bool {
    record.get(id_field).is_some_and(|v| key.matches(v))
}

impl Collection {
    pub fn empty_sequence() -> Self {
        Collection::Sequence(Vec::new())
    }

    pub fn empty_categories() -> Self {
        Collection::Categories(Vec::new())
    }

    /// Interprets a parsed literal: arrays become sequences, objects whose
    /// members are all arrays become category maps.
    pub fn from_value(name: &str, value: Value) -> StoreResult<Self> {
        match value {
            Value::Array(items) => Ok(Collection::Sequence(items)),
            Value::Object(members) => {
                let mut cats = Vec::with_capacity(members.len());
                for (cat, v) in members {
                    match v {
                        Value::Array(items) => cats.push((cat, items)),
                        other => {
                            return Err(StoreError::Shape {
                                name: format!("{name}.{cat}"),
                                expected: "an array",
                                found: other.kind_name(),
                            });
                        }
                    }
                }
                Ok(Collection::Categories(cats))
            }
            other => Err(StoreError::Shape {
                name: name.to_string(),
                expected: "an array or an object of arrays",
                found: other.kind_name(),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Collection::Sequence(items) => Value::Array(items.clone()),
            Collection::Categories(cats) => Value::Object(
                cats.iter()
                    .map(|(k, items)| (k.clone(), Value::Array(items.clone())))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Sequence(items) => items.len(),
            Collection::Categories(cats) => cats.iter().map(|(_, items)| items.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records in order, with their category in the catalog shape.
    pub fn records(&self) -> Vec<(Option<&str>, &Value)> {
        match self {
            Collection::Sequence(items) => items.iter().map(|r| (None, r)).collect(),
            Collection::Categories(cats) => cats
                .iter()
                .flat_map(|(cat, items)| items.iter().map(move |r| (Some(cat.as_str()), r)))
                .collect(),
        }
    }

    pub fn find(&self, id_field: &str, key: &RecordKey) -> Option<(Position<'_>, &Value)> {
        match self {
            Collection::Sequence(items) => items
                .iter()
                .position(|r| key_matches(r, id_field, key))
                .map(|index| (Position { category: None, index }, &items[index])),
            Collection::Categories(cats) => cats.iter().find_map(|(cat, items)| {
                items
                    .iter()
                    .position(|r| key_matches(r, id_field, key))
                    .map(|index| {
                        (
                            Position {
                                category: Some(cat.as_str()),
                                index,
                            },
                            &items[index],
                        )
                    })
            }),
        }
    }

    /// Replaces the record with the same id in place, or appends it.
    ///
    /// On the catalog shape this searches every category and appends new
    /// records to the last category (creating `"default"` when there is none);
    /// use [`Collection::upsert_in_category`] to pick the category.
    pub fn upsert(&mut self, id_field: &str, record: Value) -> Upserted {
        let key = RecordKey::of(&record, id_field);
        match self {
            Collection::Sequence(items) => upsert_into(items, id_field, key.as_ref(), record),
            Collection::Categories(cats) => {
                if let Some(key) = &key {
                    for (_, items) in cats.iter_mut() {
                        if let Some(i) = items.iter().position(|r| key_matches(r, id_field, key)) {
                            items[i] = record;
                            return Upserted::Replaced(i);
                        }
                    }
                }
                match cats.last_mut() {
                    Some((_, items)) => {
                        items.push(record);
                        Upserted::Appended(items.len() - 1)
                    }
                    None => {
                        cats.push(("default".to_string(), vec![record]));
                        Upserted::Appended(0)
                    }
                }
            }
        }
    }

    /// Upsert scoped to one category of a catalog, creating it when missing.
    /// On a sequence the category is ignored.
    pub fn upsert_in_category(&mut self, category: &str, id_field: &str, record: Value) -> Upserted {
        let key = RecordKey::of(&record, id_field);
        match self {
            Collection::Sequence(items) => upsert_into(items, id_field, key.as_ref(), record),
            Collection::Categories(cats) => {
                let idx = match cats.iter().position(|(c, _)| c == category) {
                    Some(i) => i,
                    None => {
                        cats.push((category.to_string(), Vec::new()));
                        cats.len() - 1
                    }
                };
                upsert_into(&mut cats[idx].1, id_field, key.as_ref(), record)
            }
        }
    }

    /// Removes the first record whose id matches.
    ///
    /// In the catalog shape a category emptied by the removal is dropped,
    /// unless it is the only one left.
    pub fn remove(&mut self, id_field: &str, key: &RecordKey) -> Option<Value> {
        match self {
            Collection::Sequence(items) => {
                let i = items.iter().position(|r| key_matches(r, id_field, key))?;
                Some(items.remove(i))
            }
            Collection::Categories(cats) => {
                let (ci, ri) = cats.iter().enumerate().find_map(|(ci, (_, items))| {
                    items
                        .iter()
                        .position(|r| key_matches(r, id_field, key))
                        .map(|ri| (ci, ri))
                })?;
                let removed = cats[ci].1.remove(ri);
                if cats[ci].1.is_empty() && cats.len() > 1 {
                    cats.remove(ci);
                }
                Some(removed)
            }
        }
    }

    /// `max(integer ids) + 1`, or 1 for an empty collection.
    pub fn next_id(&self, id_field: &str) -> StoreResult<i64> {
        let max = self
            .records()
            .into_iter()
            .filter_map(|(_, r)| r.get(id_field).and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        max.checked_add(1).ok_or_else(|| StoreError::Record {
            message: format!("no id left after `{id_field}` {max}"),
        })
    }
}

fn upsert_into(
    items: &mut Vec<Value>,
    id_field: &str,
    key: Option<&RecordKey>,
    record: Value,
) -> Upserted {
    if let Some(key) = key
        && let Some(i) = items.iter().position(|r| key_matches(r, id_field, key))
    {
        items[i] = record;
        return Upserted::Replaced(i);
    }
    items.push(record);
    Upserted::Appended(items.len() - 1)
}
