//! Rule filters and their type-tagged XML codec.
//!
//! A filter travels as a `Filter` element whose `i:type` attribute names the
//! variant. That tag is the only thing deserialization dispatches on:
//!
//! | Wire tag            | Variant                                   |
//! | ------------------- | ----------------------------------------- |
//! | `SqlFilter`         | `Filter::Sql` with `SqlFilterKind::General` |
//! | `TrueFilter`        | `Filter::Sql` with `SqlFilterKind::True`    |
//! | `FalseFilter`       | `Filter::Sql` with `SqlFilterKind::False`   |
//! | `CorrelationFilter` | `Filter::Correlation`                     |
//!
//! Unknown tags parse to "no filter" rather than failing the enclosing
//! document, so newer server-side filter kinds do not break older clients.

mod correlation;
mod sql;

pub use correlation::CorrelationFilter;
pub use sql::{SqlFilter, SqlFilterKind, FALSE_EXPRESSION, TRUE_EXPRESSION};

use crate::xml::{Element, XSI_NS};

pub(crate) const FILTER_ELEMENT: &str = "Filter";

/// A rule filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Sql(SqlFilter),
    Correlation(CorrelationFilter),
}

impl Filter {
    pub fn sql(expression: impl Into<String>) -> Self {
        Filter::Sql(SqlFilter::new(expression))
    }

    pub fn true_filter() -> Self {
        Filter::Sql(SqlFilter::true_filter())
    }

    pub fn false_filter() -> Self {
        Filter::Sql(SqlFilter::false_filter())
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Sql(sql) => sql.filter_kind(),
            Filter::Correlation(_) => FilterKind::Correlation,
        }
    }

    pub fn to_element(&self) -> Element {
        match self {
            Filter::Sql(sql) => sql.to_element(),
            Filter::Correlation(correlation) => correlation.to_element(),
        }
    }
}

impl From<SqlFilter> for Filter {
    fn from(filter: SqlFilter) -> Self {
        Filter::Sql(filter)
    }
}

impl From<CorrelationFilter> for Filter {
    fn from(filter: CorrelationFilter) -> Self {
        Filter::Correlation(filter)
    }
}

/// Wire identity of a filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Sql,
    Correlation,
    True,
    False,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Sql,
        FilterKind::Correlation,
        FilterKind::True,
        FilterKind::False,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            FilterKind::Sql => "SqlFilter",
            FilterKind::Correlation => "CorrelationFilter",
            FilterKind::True => "TrueFilter",
            FilterKind::False => "FalseFilter",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }
}

/// Parse a `Filter` element.
///
/// A missing or unrecognized `i:type` yields `None`. The tag's prefix is not
/// checked, only its local part.
pub fn parse_filter(element: &Element) -> Option<Filter> {
    let tag = element.attribute(Some(XSI_NS), "type")?;
    let local = tag.rsplit(':').next().unwrap_or(tag);

    let Some(kind) = FilterKind::from_wire_name(local) else {
        tracing::debug!(tag, "dropping filter with unknown type");
        return None;
    };

    let filter = match kind {
        FilterKind::Correlation => Filter::Correlation(CorrelationFilter::from_element(element)),
        FilterKind::Sql => Filter::Sql(SqlFilter::from_element(element, SqlFilterKind::General)),
        FilterKind::True => Filter::Sql(SqlFilter::from_element(element, SqlFilterKind::True)),
        FilterKind::False => Filter::Sql(SqlFilter::from_element(element, SqlFilterKind::False)),
    };
    Some(filter)
}

/// Build the `Filter` element for `filter`, if there is one.
pub fn serialize_filter(filter: Option<&Filter>) -> Option<Element> {
    filter.map(Filter::to_element)
}
