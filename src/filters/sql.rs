//! SQL-expression filters and their True/False specializations.

use super::{FilterKind, FILTER_ELEMENT};
use crate::xml::{Element, SERVICE_BUS_NS, XSI_NS};

pub const TRUE_EXPRESSION: &str = "1=1";
pub const FALSE_EXPRESSION: &str = "1=0";

/// Which wire name an SQL-shaped filter carries.
///
/// The expression text never decides this: `SqlFilter::new("1=1")` stays a
/// general filter on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SqlFilterKind {
    General,
    True,
    False,
}

/// A filter holding a SQL-like expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SqlFilter {
    kind: SqlFilterKind,
    expression: String,
}

impl SqlFilter {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            kind: SqlFilterKind::General,
            expression: expression.into(),
        }
    }

    /// Matches every message.
    pub fn true_filter() -> Self {
        Self {
            kind: SqlFilterKind::True,
            expression: TRUE_EXPRESSION.to_string(),
        }
    }

    /// Matches no message.
    pub fn false_filter() -> Self {
        Self {
            kind: SqlFilterKind::False,
            expression: FALSE_EXPRESSION.to_string(),
        }
    }

    pub fn kind(&self) -> SqlFilterKind {
        self.kind
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn filter_kind(&self) -> FilterKind {
        match self.kind {
            SqlFilterKind::General => FilterKind::Sql,
            SqlFilterKind::True => FilterKind::True,
            SqlFilterKind::False => FilterKind::False,
        }
    }

    /// Build the `Filter` element, tagged by this filter's kind.
    ///
    /// `Parameters` is reserved for parameterized expressions and is always
    /// written empty.
    pub fn to_element(&self) -> Element {
        Element::new(SERVICE_BUS_NS, FILTER_ELEMENT)
            .declare("i", XSI_NS)
            .with_namespaced_attribute(XSI_NS, "type", self.filter_kind().wire_name())
            .with_child(Element::text_element(
                SERVICE_BUS_NS,
                "SqlExpression",
                self.expression.as_str(),
            ))
            .with_child(Element::new(SERVICE_BUS_NS, "Parameters"))
    }

    /// Read a filter of the given kind from its element.
    ///
    /// True/False filters keep their fixed expression whatever the element
    /// carries.
    pub fn from_element(element: &Element, kind: SqlFilterKind) -> Self {
        match kind {
            SqlFilterKind::True => Self::true_filter(),
            SqlFilterKind::False => Self::false_filter(),
            SqlFilterKind::General => {
                let expression = element.child_text("SqlExpression").unwrap_or_default();
                Self::new(expression)
            }
        }
    }
}
