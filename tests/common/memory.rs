use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use blog_backend::pagination::{
    FieldRef, FilterValue, PageQuery, PaginationError, Predicate, Repository, SortOrder, SqlOp,
};

/// One stored row. Relation columns are keyed `alias.field`; an absent key is NULL.
pub type Row = BTreeMap<String, FilterValue>;

pub fn row<const N: usize>(fields: [(&str, FilterValue); N]) -> Row {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreError(pub String);

impl From<PaginationError> for StoreError {
    fn from(err: PaginationError) -> Self {
        StoreError(err.to_string())
    }
}

/// What the composer did to a query, recorded at execution time.
#[derive(Debug, Default)]
pub struct Journal {
    pub predicates: Vec<Predicate>,
    pub order: Option<(FieldRef, SortOrder)>,
    pub window: Option<(u64, u64)>,
    pub executions: usize,
}

/// A [`PageQuery`] evaluated against rows held in memory.
pub struct MemoryQuery {
    alias: String,
    rows: Vec<Row>,
    predicates: Vec<Predicate>,
    order: Option<(FieldRef, SortOrder)>,
    window: Option<(u64, u64)>,
    journal: Arc<Mutex<Journal>>,
    failure: Option<String>,
}

impl MemoryQuery {
    pub fn new(alias: &str, rows: Vec<Row>) -> Self {
        Self::with_journal(alias, rows, Arc::default())
    }

    pub fn with_journal(alias: &str, rows: Vec<Row>, journal: Arc<Mutex<Journal>>) -> Self {
        Self {
            alias: alias.to_string(),
            rows,
            predicates: Vec::new(),
            order: None,
            window: None,
            journal,
            failure: None,
        }
    }

    /// A query whose execution fails with `message`.
    pub fn failing(alias: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(alias, Vec::new())
        }
    }

    pub fn journal(&self) -> Arc<Mutex<Journal>> {
        Arc::clone(&self.journal)
    }

    fn lookup<'r>(&self, row: &'r Row, field: &FieldRef) -> Option<&'r FilterValue> {
        let key = if field.alias == self.alias {
            field.field.clone()
        } else {
            field.to_string()
        };
        row.get(&key).filter(|v| **v != FilterValue::Null)
    }

    fn matches(&self, row: &Row, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Binary { field, op, param } => {
                // Comparisons against NULL never hold.
                let Some(actual) = self.lookup(row, field) else {
                    return false;
                };
                let expected = &param.value;
                match op {
                    SqlOp::Eq => actual == expected,
                    SqlOp::Ne => actual != expected,
                    SqlOp::Gt => actual > expected,
                    SqlOp::Gte => actual >= expected,
                    SqlOp::Lt => actual < expected,
                    SqlOp::Lte => actual <= expected,
                    SqlOp::Like => like(actual, expected, true),
                    SqlOp::ILike => like(actual, expected, false),
                    SqlOp::In => expected.clone().into_list().contains(actual),
                    SqlOp::NotIn => !expected.clone().into_list().contains(actual),
                }
            }
            Predicate::IsNull { field, negated } => self.lookup(row, field).is_none() != *negated,
            Predicate::Any(inner) => inner.iter().any(|p| self.matches(row, p)),
        }
    }

    fn compare(&self, a: &Row, b: &Row, field: &FieldRef) -> Ordering {
        match (self.lookup(a, field), self.lookup(b, field)) {
            (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// `%needle%` matching, the only pattern shape the composer produces.
fn like(actual: &FilterValue, pattern: &FilterValue, case_sensitive: bool) -> bool {
    let haystack = actual.to_string();
    let pattern = pattern.to_string();
    let needle = pattern.trim_matches('%');
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl PageQuery for MemoryQuery {
    type Row = Row;
    type Error = StoreError;

    fn alias(&self) -> &str {
        &self.alias
    }

    fn and_where(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    fn order_by(&mut self, field: FieldRef, order: SortOrder) {
        self.order = Some((field, order));
    }

    fn skip_take(&mut self, skip: u64, take: u64) {
        self.window = Some((skip, take));
    }

    async fn fetch_page(self) -> Result<(Vec<Row>, u64), StoreError> {
        {
            let mut journal = self.journal.lock().unwrap();
            journal.predicates = self.predicates.clone();
            journal.order = self.order.clone();
            journal.window = self.window;
            journal.executions += 1;
        }

        if let Some(message) = &self.failure {
            return Err(StoreError(message.clone()));
        }

        let mut matching: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| self.predicates.iter().all(|p| self.matches(row, p)))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        if let Some((field, order)) = &self.order {
            matching.sort_by(|a, b| {
                let ordering = self.compare(a, b, field);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let page = match self.window {
            Some((skip, take)) => matching
                .into_iter()
                .skip(skip as usize)
                .take(take as usize)
                .collect(),
            None => matching,
        };

        Ok((page, total))
    }
}

/// Hands out [`MemoryQuery`] builders over a fixed set of rows.
pub struct MemoryRepository {
    pub alias: String,
    pub rows: Vec<Row>,
    pub journal: Arc<Mutex<Journal>>,
}

impl MemoryRepository {
    pub fn new(alias: &str, rows: Vec<Row>) -> Self {
        Self {
            alias: alias.to_string(),
            rows,
            journal: Arc::default(),
        }
    }
}

impl Repository for MemoryRepository {
    type Query = MemoryQuery;

    fn query_builder(&self) -> MemoryQuery {
        MemoryQuery::with_journal(&self.alias, self.rows.clone(), Arc::clone(&self.journal))
    }
}
