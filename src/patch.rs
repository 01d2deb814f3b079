//! Helpers for typed partial updates.
//!
//! Each entity declares a patch struct listing exactly the columns a client may
//! change. Nullable columns use `Option<Option<T>>`: absent = leave alone,
//! `null` = clear, value = set.

use serde::{Deserialize, Deserializer};
use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::access::Scope;

/// Deserializes a present field (including `null`) into `Some(..)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Builds the `SET` list of an `UPDATE` from whichever patch fields are present.
pub struct SetList<'q> {
    qb: QueryBuilder<'q, Postgres>,
    count: usize,
}

impl<'q> SetList<'q> {
    pub fn new(table: &str) -> Self {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET ");
        Self { qb, count: 0 }
    }

    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            if self.count > 0 {
                self.qb.push(", ");
            }
            self.qb.push(column).push(" = ").push_bind(value);
            self.count += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finishes the statement for one row inside `scope`, returning every column.
    pub fn finish(mut self, id: i64, scope: Scope) -> QueryBuilder<'q, Postgres> {
        self.qb
            .push(", updated_at = NOW() WHERE id = ")
            .push_bind(id)
            .push(" AND ");
        scope.push_predicate(&mut self.qb, "user_id");
        self.qb.push(" RETURNING *");
        self.qb
    }
}
