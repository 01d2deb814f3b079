//! Row visibility policy shared by every owned resource.
//!
//! Administrators may read all rows; every mutation is limited to the
//! caller's own rows.

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};

use crate::auth::extractors::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Which rows a query may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Everyone,
    Owner(i64),
}

impl Scope {
    pub fn for_viewer(viewer: &Viewer, access: Access) -> Self {
        match access {
            Access::Read if viewer.is_admin => Scope::Everyone,
            _ => Scope::Owner(viewer.id),
        }
    }

    /// Pushes a boolean SQL predicate restricting `owner_column` to this scope.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Postgres>, owner_column: &str) {
        match *self {
            Scope::Everyone => {
                qb.push("TRUE");
            }
            Scope::Owner(id) => {
                qb.push(owner_column).push(" = ").push_bind(id);
            }
        }
    }
}

/// A table whose rows belong to one user through an owner column.
pub trait OwnedResource {
    /// Table name, for deletes.
    const TABLE: &'static str;
    /// Owner column as it appears in `SELECT`.
    const OWNER_COLUMN: &'static str;
    /// Primary key as it appears in `SELECT`.
    const ID_COLUMN: &'static str;
    /// Select list and joins, without a `WHERE` clause.
    const SELECT: &'static str;
    const ORDER_BY: &'static str;
}

fn scoped_select<R: OwnedResource>(scope: Scope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(R::SELECT);
    qb.push(" WHERE ");
    scope.push_predicate(&mut qb, R::OWNER_COLUMN);
    qb
}

pub async fn list_visible<R>(db: &PgPool, scope: Scope) -> anyhow::Result<Vec<R>>
where
    R: OwnedResource + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut qb = scoped_select::<R>(scope);
    qb.push(" ORDER BY ").push(R::ORDER_BY);
    Ok(qb.build_query_as::<R>().fetch_all(db).await?)
}

pub async fn find_visible<R>(db: &PgPool, scope: Scope, id: i64) -> anyhow::Result<Option<R>>
where
    R: OwnedResource + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut qb = scoped_select::<R>(scope);
    qb.push(" AND ").push(R::ID_COLUMN).push(" = ").push_bind(id);
    Ok(qb.build_query_as::<R>().fetch_optional(db).await?)
}

/// Deletes one row inside `scope`; `false` when nothing matched.
pub async fn delete_scoped<R: OwnedResource>(
    db: &PgPool,
    scope: Scope,
    id: i64,
) -> anyhow::Result<bool> {
    let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
    qb.push(R::TABLE).push(" WHERE id = ").push_bind(id).push(" AND ");
    scope.push_predicate(&mut qb, "user_id");
    qb.push(" RETURNING id");
    let deleted = qb.build().fetch_optional(db).await?;
    Ok(deleted.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;
    impl OwnedResource for Widget {
        const TABLE: &'static str = "widgets";
        const OWNER_COLUMN: &'static str = "w.user_id";
        const ID_COLUMN: &'static str = "w.id";
        const SELECT: &'static str = "SELECT w.* FROM widgets w";
        const ORDER_BY: &'static str = "w.created_at DESC";
    }

    fn viewer(id: i64, is_admin: bool) -> Viewer {
        Viewer { id, is_admin }
    }

    #[test]
    fn admins_read_everything() {
        assert_eq!(Scope::for_viewer(&viewer(1, true), Access::Read), Scope::Everyone);
    }

    #[test]
    fn admins_write_only_their_own_rows() {
        assert_eq!(Scope::for_viewer(&viewer(1, true), Access::Write), Scope::Owner(1));
    }

    #[test]
    fn users_are_confined_to_their_rows() {
        assert_eq!(Scope::for_viewer(&viewer(5, false), Access::Read), Scope::Owner(5));
        assert_eq!(Scope::for_viewer(&viewer(5, false), Access::Write), Scope::Owner(5));
    }

    #[test]
    fn owner_scope_binds_the_owner_column() {
        let qb = scoped_select::<Widget>(Scope::Owner(5));
        assert_eq!(qb.sql(), "SELECT w.* FROM widgets w WHERE w.user_id = $1");
    }

    #[test]
    fn everyone_scope_adds_no_filter() {
        let qb = scoped_select::<Widget>(Scope::Everyone);
        assert_eq!(qb.sql(), "SELECT w.* FROM widgets w WHERE TRUE");
    }
}
