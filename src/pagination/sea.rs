//! SeaORM backing for [`PageQuery`].
//!
//! Predicates are collected while the composer runs and turned into
//! `Condition`s only when the page is fetched, so an unknown field name
//! surfaces as an error instead of a panic.

use std::marker::PhantomData;
use std::str::FromStr;

use sea_orm::sea_query::{Alias, Expr, Order};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, IdenStatic, Iterable, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};

use super::{
    FieldRef, FilterValue, PageQuery, PaginationError, Predicate, Repository, SortOrder, SqlOp,
};

/// A `Select<E>` being composed for one page.
pub struct SeaPageQuery<'db, E: EntityTrait> {
    db: &'db DatabaseConnection,
    select: Select<E>,
    alias: String,
    predicates: Vec<Predicate>,
    order: Option<(FieldRef, SortOrder)>,
    window: Option<(u64, u64)>,
}

impl<'db, E: EntityTrait> SeaPageQuery<'db, E> {
    /// Wrap `select`. The alias is the entity's table name; joined relations
    /// must be added to `select` under the aliases used in search paths.
    pub fn new(db: &'db DatabaseConnection, select: Select<E>) -> Self {
        Self {
            db,
            select,
            alias: E::default().table_name().to_string(),
            predicates: Vec::new(),
            order: None,
            window: None,
        }
    }
}

impl<'db, E> PageQuery for SeaPageQuery<'db, E>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    type Row = E::Model;
    type Error = PaginationError;

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

    async fn fetch_page(self) -> Result<(Vec<E::Model>, u64), PaginationError> {
        let select = compose(
            self.select,
            &self.alias,
            &self.predicates,
            self.order.as_ref(),
        )?;

        let total = select.clone().count(self.db).await?;
        let select = match self.window {
            Some((skip, take)) => select.offset(skip).limit(take),
            None => select,
        };
        let rows = select.all(self.db).await?;

        Ok((rows, total))
    }
}

/// Hands out a fresh `E::find()` builder per call.
pub struct SeaRepository<'db, E> {
    db: &'db DatabaseConnection,
    entity: PhantomData<E>,
}

impl<'db, E: EntityTrait> SeaRepository<'db, E> {
    pub fn new(db: &'db DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }
}

impl<'db, E> Repository for SeaRepository<'db, E>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    type Query = SeaPageQuery<'db, E>;

    fn query_builder(&self) -> Self::Query {
        SeaPageQuery::new(self.db, E::find())
    }
}

enum Target<C> {
    Column(C),
    Related(FieldRef),
}

fn resolve<E: EntityTrait>(alias: &str, field: &FieldRef) -> Result<Target<E::Column>, PaginationError> {
    if field.alias != alias {
        return Ok(Target::Related(field.clone()));
    }
    E::Column::from_str(&field.field)
        .map(Target::Column)
        .map_err(|_| PaginationError::UnknownField(field.to_string()))
}

fn resolve_column<E: EntityTrait>(alias: &str, field: &FieldRef) -> Result<E::Column, PaginationError> {
    match resolve::<E>(alias, field)? {
        Target::Column(column) => Ok(column),
        Target::Related(field) => Err(PaginationError::UnknownField(field.to_string())),
    }
}

/// Apply predicates and ordering to `select`. The skip/take window is left to the caller.
///
/// The primary key follows the sort column so equal sort values keep a
/// stable order across pages.
pub(crate) fn compose<E: EntityTrait>(
    mut select: Select<E>,
    alias: &str,
    predicates: &[Predicate],
    order: Option<&(FieldRef, SortOrder)>,
) -> Result<Select<E>, PaginationError> {
    for predicate in predicates {
        select = select.filter(to_condition::<E>(alias, predicate)?);
    }

    if let Some((field, order)) = order {
        let column = resolve_column::<E>(alias, field)?;
        let direction = match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        select = select.order_by(column, direction.clone());

        for key in E::PrimaryKey::iter().map(|key| key.into_column()) {
            if key.as_str() != column.as_str() {
                select = select.order_by(key, direction.clone());
            }
        }
    }

    Ok(select)
}

fn to_condition<E: EntityTrait>(alias: &str, predicate: &Predicate) -> Result<Condition, PaginationError> {
    match predicate {
        Predicate::Binary { field, op, param } => match resolve::<E>(alias, field)? {
            Target::Column(column) => Ok(column_condition(column, *op, &param.value)),
            Target::Related(field) => related_condition(&field, *op, &param.value),
        },
        Predicate::IsNull { field, negated } => {
            let column = resolve_column::<E>(alias, field)?;
            let expr = if *negated {
                column.is_not_null()
            } else {
                column.is_null()
            };
            Ok(Condition::all().add(expr))
        }
        Predicate::Any(inner) => inner.iter().try_fold(
            Condition::any(),
            |group, predicate| -> Result<Condition, PaginationError> {
                Ok(group.add(to_condition::<E>(alias, predicate)?))
            },
        ),
    }
}

fn column_condition<C: ColumnTrait>(column: C, op: SqlOp, value: &FilterValue) -> Condition {
    use sea_orm::sea_query::extension::postgres::PgExpr;

    let condition = Condition::all();
    match op {
        SqlOp::Eq => condition.add(column.eq(to_value(value))),
        SqlOp::Ne => condition.add(column.ne(to_value(value))),
        SqlOp::Gt => condition.add(column.gt(to_value(value))),
        SqlOp::Gte => condition.add(column.gte(to_value(value))),
        SqlOp::Lt => condition.add(column.lt(to_value(value))),
        SqlOp::Lte => condition.add(column.lte(to_value(value))),
        SqlOp::Like => condition.add(column.like(value.to_string())),
        SqlOp::ILike => {
            condition.add(Expr::col((column.entity_name(), column)).ilike(value.to_string()))
        }
        SqlOp::In => condition.add(column.is_in(to_values(value))),
        SqlOp::NotIn => condition.add(column.is_not_in(to_values(value))),
    }
}

/// Joined-relation columns are only matched by the search group.
fn related_condition(field: &FieldRef, op: SqlOp, value: &FilterValue) -> Result<Condition, PaginationError> {
    use sea_orm::sea_query::extension::postgres::PgExpr;

    match op {
        SqlOp::ILike => Ok(Condition::all().add(
            Expr::col((Alias::new(field.alias.as_str()), Alias::new(field.field.as_str())))
                .ilike(value.to_string()),
        )),
        _ => Err(PaginationError::UnknownField(field.to_string())),
    }
}

fn to_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::String(None),
        FilterValue::Bool(v) => (*v).into(),
        FilterValue::Int(v) => (*v).into(),
        FilterValue::Float(v) => (*v).into(),
        FilterValue::Uuid(v) => (*v).into(),
        FilterValue::DateTime(v) => (*v).into(),
        FilterValue::Text(v) => v.clone().into(),
        FilterValue::List(_) => value.to_string().into(),
    }
}

fn to_values(value: &FilterValue) -> Vec<Value> {
    value.clone().into_list().iter().map(to_value).collect()
}
