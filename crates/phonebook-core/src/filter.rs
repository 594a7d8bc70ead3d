//! Filter set and list query construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PAGE_KEY: &str = "page";
pub const PER_PAGE_KEY: &str = "per_page";
pub const SORT_KEY: &str = "sort";
pub const SORT_BY_KEY: &str = "sortBy";
pub const SORT_DESC_KEY: &str = "sortDesc";

/// Query pairs ready to be appended to the records URL.
pub type ListQuery = Vec<(String, String)>;

/// Paging, sorting and field filters sent with a list query.
///
/// An open mapping: any key other than the reserved `page`, `sortBy` and
/// `sortDesc` is a field filter. A filter set is always replaced as a whole,
/// never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(Map<String, Value>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_page(self, page: u64) -> Self {
        self.with(PAGE_KEY, page)
    }

    pub fn with_sort(self, field: impl Into<String>, descending: bool) -> Self {
        let field: String = field.into();
        self.with(SORT_BY_KEY, field).with(SORT_DESC_KEY, descending)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The requested page, or 1 when absent or falsy.
    pub fn page(&self) -> Value {
        match self.0.get(PAGE_KEY) {
            Some(value) if is_truthy(value) => value.clone(),
            _ => Value::from(1),
        }
    }

    /// `<field>` or `-<field>` when a sort field is set.
    pub fn sort(&self) -> Option<String> {
        let sort_by = self.0.get(SORT_BY_KEY).filter(|v| is_truthy(v))?;
        let field = match sort_by {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let descending = self.0.get(SORT_DESC_KEY).is_some_and(is_truthy);
        Some(if descending { format!("-{field}") } else { field })
    }

    /// Builds the list query for this filter set.
    ///
    /// Derived `page`, `per_page` and `sort` come first; every key of the
    /// set is then laid on top, so a filter named like a derived key wins.
    pub fn to_query(&self, per_page: u64) -> ListQuery {
        let mut params = Map::new();
        params.insert(PAGE_KEY.to_string(), self.page());
        params.insert(PER_PAGE_KEY.to_string(), Value::from(per_page));
        if let Some(sort) = self.sort() {
            params.insert(SORT_KEY.to_string(), Value::String(sort));
        }
        for (key, value) in &self.0 {
            params.insert(key.clone(), value.clone());
        }

        let mut query = ListQuery::new();
        for (key, value) in params {
            push_param(&mut query, key, value);
        }
        query
    }
}

impl From<Map<String, Value>> for FilterSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Loose truthiness: null, false, 0, NaN and "" are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn push_param(query: &mut ListQuery, key: String, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => query.push((key, s)),
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                push_param(query, key.clone(), item);
            }
        }
        other => query.push((key, other.to_string())),
    }
}
