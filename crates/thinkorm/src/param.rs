//! Parameter storage for rendered statements.

use crate::value::{BindType, Value, with_scalar_types};
use serde::Serialize;

/// A bound parameter.
///
/// Unnamed params match `?` placeholders in emission order; named params match
/// `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Option<String>,
    pub value: Value,
    pub bind_type: BindType,
}

impl Param {
    /// Create a positional parameter; the bind type is inferred.
    pub fn positional(value: impl Into<Value>) -> Self {
        let value = value.into();
        Param {
            name: None,
            bind_type: value.bind_type(),
            value,
        }
    }

    /// Create a named parameter; the bind type is inferred.
    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Param {
            name: Some(name.into()),
            bind_type: value.bind_type(),
            value,
        }
    }

    /// Override the inferred bind type.
    pub fn with_type(mut self, bind_type: BindType) -> Self {
        self.bind_type = bind_type;
        self
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::positional(value)
    }
}

macro_rules! impl_param_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Param {
            fn from(v: $t) -> Self {
                Param::positional(v)
            }
        })*
    };
}

with_scalar_types!(impl_param_from_scalar);

/// An ordered collection of parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a positional value and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.params.push(Param::positional(value));
        self.params.len()
    }

    /// Add a pre-built Param and return its 1-based index.
    pub fn push_param(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of positional (unnamed) params.
    pub fn positional_len(&self) -> usize {
        self.params.iter().filter(|p| !p.is_named()).count()
    }

    /// Look up a named param.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name.as_deref() == Some(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    pub fn as_slice(&self) -> &[Param] {
        &self.params
    }

    pub fn extend(&mut self, other: &ParamList) {
        self.params.extend(other.params.iter().cloned());
    }

    pub fn extend_params(&mut self, params: impl IntoIterator<Item = Param>) {
        self.params.extend(params);
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn into_vec(self) -> Vec<Param> {
        self.params
    }
}

impl<'a> IntoIterator for &'a ParamList {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl FromIterator<Param> for ParamList {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_one_based_index() {
        let mut list = ParamList::new();
        assert_eq!(list.push(1), 1);
        assert_eq!(list.push_param(Param::named("name", "a")), 2);
        assert_eq!(list.positional_len(), 1);
        assert_eq!(list.get("name").map(|p| &p.value), Some(&Value::from("a")));
    }

    #[test]
    fn bind_type_can_be_overridden() {
        let p = Param::positional("42").with_type(BindType::Int);
        assert_eq!(p.bind_type, BindType::Int);
        assert_eq!(p.value, Value::from("42"));
    }
}
