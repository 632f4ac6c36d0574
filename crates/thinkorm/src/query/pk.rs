use super::Query;
use crate::condition::Condition;
use crate::config::PrimaryKey;
use crate::error::{OrmError, OrmResult};
use crate::options::{Logic, Options};
use crate::value::{Value, with_scalar_types};

/// Identity data for primary key lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum PkData {
    /// One key value; comma-separated text means several.
    Scalar(Value),
    /// Several key values.
    List(Vec<Value>),
    /// Column → value pairs.
    Map(Vec<(String, Value)>),
}

impl PkData {
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        PkData::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn lookup(&self, column: &str) -> Option<&Value> {
        match self {
            PkData::Map(entries) => entries.iter().find(|(k, _)| k == column).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<Value> for PkData {
    fn from(v: Value) -> Self {
        PkData::Scalar(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for PkData {
    fn from(v: Vec<T>) -> Self {
        PkData::List(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_pk_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for PkData {
            fn from(v: $t) -> Self {
                PkData::Scalar(v.into())
            }
        })*
    };
}

with_scalar_types!(impl_pk_from_scalar);

impl Query {
    /// Merge a primary key condition derived from `data` into
    /// `options.where[AND]`.
    ///
    /// The key column is qualified with the main table's alias when it has
    /// one. A composite key needs a value for every column, otherwise this
    /// fails with [`OrmError::MissingCompositeKeyData`] and `options` is left
    /// untouched.
    pub fn resolve_primary_key_condition(
        &self,
        data: PkData,
        options: &mut Options,
    ) -> OrmResult<()> {
        let alias = options
            .main_table()
            .map(|t| crate::ident::parse_sql_table(t, &self.config.prefix).into_owned())
            .and_then(|t| options.alias.get(&t).cloned());
        let qualify = |column: &str| match &alias {
            Some(alias) => format!("{alias}.{column}"),
            None => column.to_string(),
        };

        match &self.config.pk {
            PrimaryKey::Single(pk) => {
                let condition = match data {
                    PkData::Scalar(Value::Text(s)) if s.contains(',') => {
                        Condition::In {
                            values: Value::Text(s).split_list(),
                            negated: false,
                        }
                    }
                    PkData::Scalar(value) => Condition::eq(value),
                    PkData::List(values) => Condition::In {
                        values,
                        negated: false,
                    },
                    PkData::Map(entries) => {
                        let found = entries.iter().find(|(k, _)| k == pk).map(|(_, v)| v.clone());
                        match found {
                            Some(value) => Condition::eq(value),
                            None => Condition::In {
                                values: entries.into_iter().map(|(_, v)| v).collect(),
                                negated: false,
                            },
                        }
                    }
                };
                options
                    .r#where
                    .upsert_field(Logic::And, &qualify(pk), vec![condition]);
            }
            PrimaryKey::Composite(columns) => {
                let mut resolved = Vec::with_capacity(columns.len());
                for column in columns {
                    let value = data
                        .lookup(column)
                        .ok_or_else(|| OrmError::missing_composite_key(column.as_str()))?;
                    resolved.push((qualify(column), Condition::eq(value.clone())));
                }
                for (column, condition) in resolved {
                    options
                        .r#where
                        .upsert_field(Logic::And, &column, vec![condition]);
                }
            }
        }
        Ok(())
    }
}
