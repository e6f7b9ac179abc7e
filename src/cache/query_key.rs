use std::fmt;

/// Identity of a cached read: resource name plus serialized parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub resource: &'static str,
    pub params: String,
}

impl QueryKey {
    pub fn new(resource: &'static str, params: impl Into<String>) -> Self {
        Self {
            resource,
            params: params.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}?{}", self.resource, self.params)
        }
    }
}
