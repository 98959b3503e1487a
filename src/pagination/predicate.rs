use std::fmt;

use super::FilterValue;

/// A column reference qualified by the alias it is selected under
/// (`post.title`, `author.username`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub alias: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            field: field.into(),
        }
    }

    /// Parse a `"relation.field"` path. A bare field name is bound to `default_alias`.
    pub fn parse(path: &str, default_alias: &str) -> Self {
        match path.split_once('.') {
            Some((alias, field)) => Self::new(alias, field),
            None => Self::new(default_alias, path),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.field)
    }
}

/// Comparison operators that consume a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    NotIn,
}

impl SqlOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlOp::Eq => "=",
            SqlOp::Ne => "!=",
            SqlOp::Gt => ">",
            SqlOp::Gte => ">=",
            SqlOp::Lt => "<",
            SqlOp::Lte => "<=",
            SqlOp::Like => "LIKE",
            SqlOp::ILike => "ILIKE",
            SqlOp::In => "IN",
            SqlOp::NotIn => "NOT IN",
        }
    }
}

/// A named bind parameter. Names are unique within one composed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: FilterValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Engine-neutral predicate tree appended to a [`super::PageQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Binary {
        field: FieldRef,
        op: SqlOp,
        param: Param,
    },
    IsNull {
        field: FieldRef,
        negated: bool,
    },
    /// Disjunction of the inner predicates.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn binary(field: FieldRef, op: SqlOp, param: Param) -> Self {
        Predicate::Binary { field, op, param }
    }

    /// All bound parameters in this predicate, depth first.
    pub fn params(&self) -> Vec<&Param> {
        match self {
            Predicate::Binary { param, .. } => vec![param],
            Predicate::IsNull { .. } => Vec::new(),
            Predicate::Any(inner) => inner.iter().flat_map(Predicate::params).collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Binary {
                field,
                op: op @ (SqlOp::In | SqlOp::NotIn),
                param,
            } => write!(f, "{field} {} (:...{})", op.as_sql(), param.name),
            Predicate::Binary { field, op, param } => {
                write!(f, "{field} {} :{}", op.as_sql(), param.name)
            }
            Predicate::IsNull {
                field,
                negated: false,
            } => write!(f, "{field} IS NULL"),
            Predicate::IsNull {
                field,
                negated: true,
            } => write!(f, "{field} IS NOT NULL"),
            Predicate::Any(inner) => {
                let parts: Vec<String> = inner.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" OR "))
            }
        }
    }
}
