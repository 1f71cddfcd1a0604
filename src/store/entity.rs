use crate::error::StoreError;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any row type must implement to live in a [`Table`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Table name used in error messages and logs.
    const TABLE: &'static str;

    /// Get the primary key of the row
    fn id(&self) -> &Self::Id;

    /// Row-level constraints, checked before every write.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A stored row together with its insertion sequence number.
#[derive(Debug, Clone)]
pub struct Row<T> {
    pub seq: u64,
    pub value: T,
}

/// Insertion-ordered rows keyed by primary key.
#[derive(Debug)]
pub struct Table<T: Entity> {
    rows: HashMap<T::Id, Row<T>>,
    next_seq: u64,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            next_seq: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.rows.get(id).map(|row| &row.value)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.rows.get_mut(id).map(|row| &mut row.value)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.rows.contains_key(id)
    }

    /// Looks up a row that must exist.
    pub fn require(&self, id: &T::Id) -> Result<&T, StoreError> {
        self.get(id).ok_or_else(|| Self::not_found(id))
    }

    pub fn require_mut(&mut self, id: &T::Id) -> Result<&mut T, StoreError> {
        match self.rows.get_mut(id) {
            Some(row) => Ok(&mut row.value),
            None => Err(Self::not_found(id)),
        }
    }

    /// Inserts a new row; fails if the key is taken.
    pub fn insert(&mut self, value: T) -> Result<(), StoreError> {
        value.validate().map_err(StoreError::Constraint)?;
        if self.rows.contains_key(value.id()) {
            return Err(StoreError::Duplicate {
                table: T::TABLE,
                id: value.id().to_string(),
            });
        }
        let seq = self.bump_seq();
        self.rows.insert(value.id().clone(), Row { seq, value });
        Ok(())
    }

    /// Inserts or replaces a row, returning the previous one. A replaced row keeps its
    /// position in the table.
    pub fn upsert(&mut self, value: T) -> Result<Option<Row<T>>, StoreError> {
        value.validate().map_err(StoreError::Constraint)?;
        let seq = match self.rows.get(value.id()) {
            Some(existing) => existing.seq,
            None => self.bump_seq(),
        };
        Ok(self.rows.insert(value.id().clone(), Row { seq, value }))
    }

    /// Snapshot of a row, used to journal a write before it happens.
    pub fn snapshot(&self, id: &T::Id) -> Option<Row<T>> {
        self.rows.get(id).cloned()
    }

    /// Puts a journaled snapshot back. `None` means the row did not exist.
    pub fn restore(&mut self, id: T::Id, previous: Option<Row<T>>) {
        match previous {
            Some(row) => {
                self.rows.insert(id, row);
            }
            None => {
                self.rows.remove(&id);
            }
        }
    }

    /// Rows in insertion order.
    pub fn oldest_first(&self) -> Vec<&T> {
        let mut rows: Vec<&Row<T>> = self.rows.values().collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| &row.value).collect()
    }

    /// Rows, most recently inserted first.
    pub fn newest_first(&self) -> Vec<&T> {
        let mut rows = self.oldest_first();
        rows.reverse();
        rows
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn not_found(id: &T::Id) -> StoreError {
        StoreError::NotFound {
            table: T::TABLE,
            id: id.to_string(),
        }
    }
}
