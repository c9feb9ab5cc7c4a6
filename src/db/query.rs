//! Select filters and ordering
//!
//! A small builder over the filter shapes the content layer needs:
//! equality, `>=`, `is null`, and `or` of those. Filters in a [`Query`]
//! are AND-ed.

use bson::{Bson, Document};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Bson),
    Gte(String, Bson),
    IsNull(String),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Bson>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<Bson>) -> Self {
        Self::Gte(column.to_string(), value.into())
    }

    pub fn is_null(column: &str) -> Self {
        Self::IsNull(column.to_string())
    }

    /// Evaluate against an in-memory row. A missing column counts as null.
    pub fn matches(&self, row: &Document) -> bool {
        match self {
            Self::Eq(column, value) => row.get(column).is_some_and(|v| v == value),
            Self::Gte(column, value) => row
                .get(column)
                .and_then(|v| compare_bson(v, value))
                .is_some_and(|ord| ord != Ordering::Less),
            Self::IsNull(column) => matches!(row.get(column), None | Some(Bson::Null)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(row)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Bson>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn gte(self, column: &str, value: impl Into<Bson>) -> Self {
        self.filter(Filter::gte(column, value))
    }

    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or(filters))
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn matches(&self, row: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Sort rows in place. Nulls sort first ascending; ties keep insertion order.
    pub fn sort(&self, rows: &mut [Document]) {
        let Some(order) = &self.order else {
            return;
        };
        rows.sort_by(|a, b| {
            let ord = match (a.get(&order.column), b.get(&order.column)) {
                (None | Some(Bson::Null), None | Some(Bson::Null)) => Ordering::Equal,
                (None | Some(Bson::Null), _) => Ordering::Less,
                (_, None | Some(Bson::Null)) => Ordering::Greater,
                (Some(x), Some(y)) => compare_bson(x, y).unwrap_or(Ordering::Equal),
            };
            match order.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }
}

/// Compare two values of compatible type; `None` when they are not comparable.
fn compare_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (x, y) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}
