//! Filter expressions for list queries
//!
//! Builds strings like `user = "abc" && category = "Tops"`.
//! Every interpolated value is quoted and escaped.

use std::fmt;

/// A filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(String);

/// Quote a value for use in a filter expression
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

impl Filter {
    pub fn eq(field: &str, value: &str) -> Self {
        Filter(format!("{} = {}", field, quote(value)))
    }

    pub fn and(self, other: Filter) -> Self {
        Filter(format!("{} && {}", self.0, other.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.0
    }
}
