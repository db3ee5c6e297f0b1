//! Rule descriptions, as embedded in a subscription's default rule.

use crate::error::ValidationError;
use crate::filters::{self, Filter};
use crate::validation::{check_valid_rule_name, names_equal};
use crate::xml::{Element, SERVICE_BUS_NS};

/// Name the broker gives the rule created together with a subscription.
pub const DEFAULT_RULE_NAME: &str = "$Default";

/// A named filter attached to a subscription.
#[derive(Clone, Debug)]
pub struct RuleDescription {
    name: String,
    filter: Option<Filter>,
}

impl RuleDescription {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        check_valid_rule_name("RuleName", &name)?;
        Ok(Self { name, filter: None })
    }

    /// The `$Default` rule with the given filter.
    pub fn default_rule(filter: impl Into<Filter>) -> Self {
        Self {
            name: DEFAULT_RULE_NAME.to_string(),
            filter: Some(filter.into()),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.filter = filter;
    }

    pub fn to_element(&self, element_name: &str) -> Element {
        let mut element = Element::new(SERVICE_BUS_NS, element_name);
        if let Some(filter) = filters::serialize_filter(self.filter.as_ref()) {
            element.push(filter);
        }
        element.push(Element::text_element(SERVICE_BUS_NS, "Name", self.name.as_str()));
        element
    }

    /// Read a rule element; a missing `Name` means the default rule.
    pub fn from_element(element: &Element) -> Result<Self, ValidationError> {
        let name = element.child_text("Name").unwrap_or(DEFAULT_RULE_NAME);
        let mut rule = Self::new(name.trim())?;
        rule.filter = element.child("Filter").and_then(filters::parse_filter);
        Ok(rule)
    }
}

impl PartialEq for RuleDescription {
    fn eq(&self, other: &Self) -> bool {
        names_equal(&self.name, &other.name) && self.filter == other.filter
    }
}

impl Eq for RuleDescription {}
