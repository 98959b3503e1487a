//! Offset pagination over a single-use query builder.
//!
//! [`paginate`] composes filters, date ranges, a free-text search group,
//! an allow-listed sort and a skip/take window onto any [`PageQuery`],
//! executes it once and shapes the rows into a [`PaginatedResult`].

pub mod predicate;
pub mod sea;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub use predicate::{FieldRef, Param, Predicate, SqlOp};
pub use sea::{SeaPageQuery, SeaRepository};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
pub const MAX_SEARCH_LEN: usize = 100;

/// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Sort field used when neither an allow-list nor a default is supplied.
pub const FALLBACK_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("filter on `{field}` with operator `{operator}` requires a value")]
    MissingValue { field: String, operator: FilterOperator },
}

// ── Request ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ASC")]
    Asc,
    #[default]
    #[serde(alias = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Page request as it arrives on the query string:
/// `?page=2&limit=5&sortBy=createdAt&sortOrder=asc&search=rust`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: None,
            sort_order: SortOrder::default(),
            search: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Coerce `page` and `limit` into range and drop a blank search term.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.clamp(1, MAX_PAGE);
        self.limit = self.limit.clamp(1, MAX_LIMIT);
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        match &self.search {
            Some(search) if search.chars().count() > MAX_SEARCH_LEN => Err(format!(
                "Search query must not exceed {MAX_SEARCH_LEN} characters"
            )),
            _ => Ok(()),
        }
    }

    /// Zero-based row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

// ── Filters ──

/// A bound filter value.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// `%value%` substring pattern.
    pub fn contains_pattern(&self) -> FilterValue {
        FilterValue::Text(format!("%{self}%"))
    }

    /// The members of a list value; a scalar is a one-element list.
    pub fn into_list(self) -> Vec<FilterValue> {
        match self {
            FilterValue::List(values) => values,
            other => vec![other],
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => Ok(()),
            FilterValue::Bool(v) => write!(f, "{v}"),
            FilterValue::Int(v) => write!(f, "{v}"),
            FilterValue::Float(v) => write!(f, "{v}"),
            FilterValue::Uuid(v) => write!(f, "{v}"),
            FilterValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            FilterValue::Text(v) => f.write_str(v),
            FilterValue::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Uuid> for FilterValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    In,
    Nin,
    Null,
    Notnull,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Ilike => "ilike",
            FilterOperator::In => "in",
            FilterOperator::Nin => "nin",
            FilterOperator::Null => "null",
            FilterOperator::Notnull => "notnull",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FilterCondition {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Null,
            value: None,
        }
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Notnull,
            value: None,
        }
    }

    /// Translate into a predicate bound under `filter{index}`.
    ///
    /// Every operator except `null` and `notnull` needs a value.
    pub fn to_predicate(&self, alias: &str, index: usize) -> Result<Predicate, PaginationError> {
        let field = FieldRef::new(alias, self.field.as_str());
        let name = format!("filter{index}");

        let (op, value) = match self.operator {
            FilterOperator::Null => return Ok(Predicate::IsNull { field, negated: false }),
            FilterOperator::Notnull => return Ok(Predicate::IsNull { field, negated: true }),
            FilterOperator::Like => (SqlOp::Like, self.required_value()?.contains_pattern()),
            FilterOperator::Ilike => (SqlOp::ILike, self.required_value()?.contains_pattern()),
            FilterOperator::In => (SqlOp::In, FilterValue::List(self.required_value()?.into_list())),
            FilterOperator::Nin => (SqlOp::NotIn, FilterValue::List(self.required_value()?.into_list())),
            FilterOperator::Eq => (SqlOp::Eq, self.required_value()?),
            FilterOperator::Neq => (SqlOp::Ne, self.required_value()?),
            FilterOperator::Gt => (SqlOp::Gt, self.required_value()?),
            FilterOperator::Gte => (SqlOp::Gte, self.required_value()?),
            FilterOperator::Lt => (SqlOp::Lt, self.required_value()?),
            FilterOperator::Lte => (SqlOp::Lte, self.required_value()?),
        };

        Ok(Predicate::binary(field, op, Param::new(name, value)))
    }

    fn required_value(&self) -> Result<FilterValue, PaginationError> {
        self.value.clone().ok_or_else(|| PaginationError::MissingValue {
            field: self.field.clone(),
            operator: self.operator,
        })
    }
}

/// Inclusive `[from, to]` bound on a timestamp field; either side may be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeFilter {
    pub field: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRangeFilter {
    pub fn new(
        field: impl Into<String>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            field: field.into(),
            from,
            to,
        }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Up to two predicates bound under `dateFrom{index}` / `dateTo{index}`.
    pub fn to_predicates(&self, alias: &str, index: usize) -> Vec<Predicate> {
        let field = FieldRef::new(alias, self.field.as_str());
        let mut predicates = Vec::with_capacity(2);

        if let Some(from) = self.from {
            predicates.push(Predicate::binary(
                field.clone(),
                SqlOp::Gte,
                Param::new(format!("dateFrom{index}"), from),
            ));
        }
        if let Some(to) = self.to {
            predicates.push(Predicate::binary(
                field,
                SqlOp::Lte,
                Param::new(format!("dateTo{index}"), to),
            ));
        }

        predicates
    }
}

// ── Options ──

/// Per-entity composition options supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationOptions {
    pub search_fields: Vec<String>,
    /// `"relationAlias.field"` paths searched alongside `search_fields`.
    pub search_relations: Vec<String>,
    pub default_sort_field: Option<String>,
    /// Fields a caller may sort by. The first entry is the fallback.
    pub sortable_fields: Vec<String>,
    pub filters: Vec<FilterCondition>,
    pub date_range_filters: Vec<DateRangeFilter>,
}

impl PaginationOptions {
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_relations = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sortable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_sort_field(mut self, field: impl Into<String>) -> Self {
        self.default_sort_field = Some(field.into());
        self
    }

    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn date_range(mut self, range: DateRangeFilter) -> Self {
        self.date_range_filters.push(range);
        self
    }

    /// Pick the effective sort field for `requested`.
    ///
    /// A requested field outside the allow-list is never used.
    pub fn resolve_sort_field<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        if let Some(first) = self.sortable_fields.first() {
            return requested
                .and_then(|r| self.sortable_fields.iter().find(|f| f.as_str() == r))
                .unwrap_or(first)
                .as_str();
        }
        self.default_sort_field
            .as_deref()
            .unwrap_or(FALLBACK_SORT_FIELD)
    }

    /// One OR-group across every search field and relation, or `None` when
    /// there is nothing to search.
    pub fn search_predicate(&self, alias: &str, search: Option<&str>) -> Option<Predicate> {
        let search = search.filter(|s| !s.is_empty())?;
        if self.search_fields.is_empty() {
            return None;
        }

        let pattern = FilterValue::Text(format!("%{search}%"));
        let fields = self
            .search_fields
            .iter()
            .map(|f| FieldRef::new(alias, f.as_str()))
            .chain(
                self.search_relations
                    .iter()
                    .map(|r| FieldRef::parse(r, alias)),
            );

        let group = fields
            .enumerate()
            .map(|(i, field)| {
                Predicate::binary(field, SqlOp::ILike, Param::new(format!("search{i}"), pattern.clone()))
            })
            .collect();

        Some(Predicate::Any(group))
    }
}

// ── Result ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    pub fn compute(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

// ── Query builder capabilities ──

/// An unexecuted, single-use query over one entity.
pub trait PageQuery {
    type Row;
    type Error;

    /// Reference name of the primary table inside the query.
    fn alias(&self) -> &str;

    /// AND a predicate into the query.
    fn and_where(&mut self, predicate: Predicate);

    fn order_by(&mut self, field: FieldRef, order: SortOrder);

    fn skip_take(&mut self, skip: u64, take: u64);

    /// Execute, returning the windowed rows and the total number of rows
    /// matching every predicate regardless of the window.
    fn fetch_page(self) -> impl Future<Output = Result<(Vec<Self::Row>, u64), Self::Error>>;
}

/// Source of fresh [`PageQuery`] builders for one entity.
pub trait Repository {
    type Query: PageQuery;

    fn query_builder(&self) -> Self::Query;
}

/// Compose `request` and `options` onto `query`, execute it, and map each row.
///
/// `request` is expected to be normalized already. Errors from the
/// underlying query are returned unchanged; a filter that cannot be
/// translated fails before anything is executed.
pub async fn paginate<Q, U, F>(
    mut query: Q,
    request: &PageRequest,
    map: F,
    options: &PaginationOptions,
) -> Result<PaginatedResult<U>, Q::Error>
where
    Q: PageQuery,
    Q::Error: From<PaginationError>,
    F: FnMut(Q::Row) -> U,
{
    let alias = query.alias().to_owned();

    for (index, condition) in options.filters.iter().enumerate() {
        let predicate = condition.to_predicate(&alias, index)?;
        debug!(%predicate, "applying filter");
        query.and_where(predicate);
    }

    for (index, range) in options.date_range_filters.iter().enumerate() {
        for predicate in range.to_predicates(&alias, index) {
            debug!(%predicate, "applying date range");
            query.and_where(predicate);
        }
    }

    if let Some(predicate) = options.search_predicate(&alias, request.search.as_deref()) {
        debug!(%predicate, "applying search");
        query.and_where(predicate);
    }

    let sort_field = options.resolve_sort_field(request.sort_by.as_deref());
    query.order_by(FieldRef::new(alias.as_str(), sort_field), request.sort_order);
    query.skip_take(request.offset(), request.limit);

    let (rows, total) = query.fetch_page().await?;
    let items: Vec<U> = rows.into_iter().map(map).collect();
    let pagination = PageMeta::compute(total, request.page, request.limit);

    debug!(
        alias = %alias,
        returned = items.len(),
        total,
        page = pagination.page,
        total_pages = pagination.total_pages,
        "page fetched"
    );

    Ok(PaginatedResult { items, pagination })
}

/// [`paginate`] over a fresh builder taken from `repository`.
pub async fn paginate_by_repository<R, U, F>(
    repository: &R,
    request: &PageRequest,
    map: F,
    options: &PaginationOptions,
) -> Result<PaginatedResult<U>, <R::Query as PageQuery>::Error>
where
    R: Repository,
    <R::Query as PageQuery>::Error: From<PaginationError>,
    F: FnMut(<R::Query as PageQuery>::Row) -> U,
{
    paginate(repository.query_builder(), request, map, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_arithmetic() {
        let first = PageMeta::compute(25, 1, 10);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let last = PageMeta::compute(25, 3, 10);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let exact = PageMeta::compute(20, 2, 10);
        assert_eq!(exact.total_pages, 2);
        assert!(!exact.has_next_page);
    }

    #[test]
    fn page_meta_for_empty_result() {
        let meta = PageMeta::compute(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(1, 25).offset(), 0);
    }

    #[test]
    fn huge_page_is_capped_before_offset() {
        let request: PageRequest =
            serde_json::from_str(r#"{"page":18446744073709551615,"limit":10}"#).unwrap();
        let request = request.normalized();

        assert!(request.validate().is_ok());
        assert_eq!(request.page, MAX_PAGE);
        assert!(request.offset() <= i64::MAX as u64);

        let capped = PageRequest::new(u64::MAX, MAX_LIMIT).normalized();
        assert!(capped.offset() <= i64::MAX as u64);

        assert_eq!(PageRequest::new(u64::MAX, MAX_LIMIT).offset(), u64::MAX);
    }

    #[test]
    fn normalized_clamps_into_range() {
        let request = PageRequest {
            page: 0,
            limit: 500,
            search: Some("   ".to_string()),
            ..PageRequest::default()
        }
        .normalized();

        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_LIMIT);
        assert_eq!(request.search, None);

        assert_eq!(PageRequest::new(2, 0).normalized().limit, 1);
        assert_eq!(
            PageRequest::default().with_search("  rust ").normalized().search.as_deref(),
            Some("rust")
        );
    }

    #[test]
    fn validate_rejects_long_search() {
        let ok = PageRequest::default().with_search("a".repeat(MAX_SEARCH_LEN));
        assert!(ok.validate().is_ok());

        let too_long = PageRequest::default().with_search("a".repeat(MAX_SEARCH_LEN + 1));
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn sort_field_respects_allow_list() {
        let options = PaginationOptions::default().with_sortable_fields(["createdAt", "title"]);

        assert_eq!(options.resolve_sort_field(Some("secretField")), "createdAt");
        assert_eq!(options.resolve_sort_field(Some("title")), "title");
        assert_eq!(options.resolve_sort_field(None), "createdAt");
    }

    #[test]
    fn sort_field_without_allow_list_uses_default() {
        let options = PaginationOptions::default().with_default_sort_field("updatedAt");
        assert_eq!(options.resolve_sort_field(Some("anything")), "updatedAt");

        let bare = PaginationOptions::default();
        assert_eq!(bare.resolve_sort_field(None), FALLBACK_SORT_FIELD);
    }

    #[test]
    fn filter_operators_map_literally() {
        let like = FilterCondition::new("title", FilterOperator::Like, "Rust")
            .to_predicate("posts", 0)
            .unwrap();
        assert_eq!(
            like,
            Predicate::binary(
                FieldRef::new("posts", "title"),
                SqlOp::Like,
                Param::new("filter0", "%Rust%")
            )
        );

        let neq = FilterCondition::new("category", FilterOperator::Neq, "Art")
            .to_predicate("posts", 3)
            .unwrap();
        assert_eq!(neq.to_string(), "posts.category != :filter3");

        let scalar_in = FilterCondition::new("id", FilterOperator::In, 7)
            .to_predicate("posts", 1)
            .unwrap();
        assert_eq!(scalar_in.params()[0].value, FilterValue::List(vec![FilterValue::Int(7)]));
    }

    #[test]
    fn value_operators_reject_a_missing_value() {
        let like: FilterCondition =
            serde_json::from_str(r#"{"field":"title","operator":"like"}"#).unwrap();
        let err = like.to_predicate("posts", 0).unwrap_err();
        assert!(
            matches!(&err, PaginationError::MissingValue { field, operator: FilterOperator::Like } if field == "title"),
            "{err:?}"
        );
        assert_eq!(
            err.to_string(),
            "filter on `title` with operator `like` requires a value"
        );

        let eq: FilterCondition =
            serde_json::from_str(r#"{"field":"category","operator":"eq","value":null}"#).unwrap();
        assert!(matches!(
            eq.to_predicate("posts", 1),
            Err(PaginationError::MissingValue { operator: FilterOperator::Eq, .. })
        ));

        let null: FilterCondition =
            serde_json::from_str(r#"{"field":"updatedAt","operator":"null"}"#).unwrap();
        assert!(null.to_predicate("posts", 2).is_ok());
    }

    #[test]
    fn null_filters_bind_no_value() {
        let null = FilterCondition::is_null("updatedAt").to_predicate("posts", 0).unwrap();
        assert!(null.params().is_empty());
        assert_eq!(null.to_string(), "posts.updatedAt IS NULL");

        let not_null = FilterCondition::is_not_null("updatedAt").to_predicate("posts", 1).unwrap();
        assert_eq!(not_null.to_string(), "posts.updatedAt IS NOT NULL");
    }

    #[test]
    fn date_range_yields_inclusive_bounds() {
        let from = "2024-01-01T00:00:00Z".parse().unwrap();
        let to = "2024-01-31T23:59:59Z".parse().unwrap();

        let both = DateRangeFilter::new("createdAt", Some(from), Some(to)).to_predicates("posts", 0);
        let rendered: Vec<String> = both.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            ["posts.createdAt >= :dateFrom0", "posts.createdAt <= :dateTo0"]
        );

        let open_end = DateRangeFilter::new("createdAt", Some(from), None).to_predicates("posts", 2);
        assert_eq!(open_end.len(), 1);
        assert!(DateRangeFilter::new("createdAt", None, None).is_open());
    }

    #[test]
    fn search_group_spans_fields_and_relations() {
        let options = PaginationOptions::default()
            .with_search_fields(["title", "content"])
            .with_search_relations(["author.username"]);

        let predicate = options.search_predicate("posts", Some("science")).unwrap();
        assert_eq!(
            predicate.to_string(),
            "(posts.title ILIKE :search0 OR posts.content ILIKE :search1 OR author.username ILIKE :search2)"
        );
        assert!(
            predicate
                .params()
                .iter()
                .all(|p| p.value == FilterValue::Text("%science%".to_string()))
        );
    }

    #[test]
    fn search_skipped_without_term_or_fields() {
        let options = PaginationOptions::default().with_search_fields(["title"]);
        assert!(options.search_predicate("posts", None).is_none());
        assert!(options.search_predicate("posts", Some("")).is_none());

        let no_fields = PaginationOptions::default().with_search_relations(["author.username"]);
        assert!(no_fields.search_predicate("posts", Some("rust")).is_none());
    }

    #[test]
    fn page_request_reads_camel_case_query() {
        let request: PageRequest = serde_json::from_str(
            r#"{"page":2,"limit":5,"sortBy":"createdAt","sortOrder":"asc"}"#,
        )
        .unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.sort_by.as_deref(), Some("createdAt"));
        assert_eq!(request.sort_order, SortOrder::Asc);

        let upper: PageRequest = serde_json::from_str(r#"{"sortOrder":"ASC"}"#).unwrap();
        assert_eq!(upper.sort_order, SortOrder::Asc);

        let defaults: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, PageRequest::default());
        assert_eq!(defaults.sort_order, SortOrder::Desc);
    }
}
