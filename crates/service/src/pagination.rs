//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct, the shared listing query and the
//! `Page` envelope returned by every list operation.

use models::{SoftState, Status};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Select};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// `?page=&per_page=&status=&q=` accepted by every list endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub q: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) }
    }

    pub fn status(&self) -> Result<Option<Status>, ServiceError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Ok(Some(s.parse::<Status>()?)),
        }
    }

    /// Trimmed search term, `None` when blank.
    pub fn search(&self) -> Option<String> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(str::to_string)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), page: self.page, per_page: self.per_page, total: self.total }
    }
}

/// Apply the optional status filter of `params` to `select`.
pub fn with_status<E: SoftState>(select: Select<E>, params: &ListParams) -> Result<Select<E>, ServiceError> {
    Ok(match params.status()? {
        Some(s) => select.filter(E::status_column().eq(s.as_str())),
        None => select,
    })
}

/// `%term%` with the LIKE wildcards of `term` taken literally.
fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Case-insensitive substring match on any of `columns`.
pub fn matches_any<C: ColumnTrait>(columns: &[C], term: &str) -> Condition {
    let pattern = contains_pattern(term);
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(Expr::expr(Func::lower(Expr::col(col.as_column_ref()))).like(LikeExpr::new(pattern.clone()).escape('\\')))
    })
}

/// Count and fetch one page of `select`.
pub async fn fetch_page<'db, E, C>(select: Select<E>, db: &'db C, opts: Pagination) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'db,
    C: ConnectionTrait,
{
    let (page_idx, per_page) = opts.normalize();
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx + 1, per_page, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn list_params_fill_defaults() {
        let p = ListParams { per_page: Some(50), ..Default::default() };
        let pg = p.pagination();
        assert_eq!((pg.page, pg.per_page), (1, 50));
        assert_eq!(p.status().unwrap(), None);
        assert_eq!(p.search(), None);
    }

    #[test]
    fn search_condition_covers_every_column() {
        use models::ciudad;
        use sea_orm::{DbBackend, QueryTrait};
        let sql = ciudad::Entity::find()
            .filter(matches_any(&[ciudad::Column::Name, ciudad::Column::Code], "Paz"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("LOWER("), "{sql}");
        assert!(sql.contains("'%paz%'"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn search_wildcards_are_literal() {
        assert_eq!(contains_pattern("Torre"), "%torre%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");

        use models::ciudad;
        use sea_orm::{DbBackend, QueryTrait};
        let sql = ciudad::Entity::find()
            .filter(matches_any(&[ciudad::Column::Name], "_"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn list_params_parse_status_and_search() {
        let p = ListParams { status: Some("inactivo".into()), q: Some("  torre ".into()), ..Default::default() };
        assert_eq!(p.status().unwrap(), Some(Status::Inactivo));
        assert_eq!(p.search().as_deref(), Some("torre"));
        let bad = ListParams { status: Some("borrado".into()), ..Default::default() };
        assert!(matches!(bad.status(), Err(ServiceError::Model(_))));
    }
}
