use std::borrow::Cow;

use crate::error::SqlGatewayError;
use crate::translation::translate_named_placeholders;
use crate::types::RowValues;

/// Key prefix for positional values that ended up among named ones.
const POSITIONAL_KEY: char = '?';

/// Statement parameters, bound either by position (`?`) or by name (`:name`).
///
/// ```rust
/// use mysql_gateway::prelude::*;
///
/// let by_position = QueryParams::from(vec![RowValues::Int(1)]);
/// let by_name = QueryParams::named()
///     .bind("id", 1)
///     .bind("name", "O'Brien");
/// # let _ = (by_position, by_name);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParams {
    Positional(Vec<RowValues>),
    Named(Vec<(String, RowValues)>),
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams::Positional(Vec::new())
    }
}

impl QueryParams {
    /// No parameters.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Start an empty set of named parameters.
    #[must_use]
    pub fn named() -> Self {
        QueryParams::Named(Vec::new())
    }

    /// Add a named value.
    ///
    /// Binding a name onto positional values keeps them, marked as positional, so that
    /// [`QueryParams::resolve`] can reject the mix instead of dropping the name.
    #[must_use]
    pub fn bind(self, name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        let mut pairs = match self {
            QueryParams::Named(pairs) => pairs,
            QueryParams::Positional(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("{POSITIONAL_KEY}{}", i + 1), v))
                .collect(),
        };
        pairs.push((name.into(), value.into()));
        QueryParams::Named(pairs)
    }

    /// Append a positional value.
    #[must_use]
    pub fn push(mut self, value: impl Into<RowValues>) -> Self {
        match &mut self {
            QueryParams::Positional(values) => values.push(value.into()),
            QueryParams::Named(pairs) => {
                let key = format!("{POSITIONAL_KEY}{}", pairs.len() + 1);
                pairs.push((key, value.into()));
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            QueryParams::Positional(values) => values.is_empty(),
            QueryParams::Named(pairs) => pairs.is_empty(),
        }
    }

    /// Produce the SQL and ordered values the driver binds positionally.
    ///
    /// Named parameters are looked up once per `:name` occurrence, so a name may repeat.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::QueryError` if a placeholder has no value, a name is bound
    /// twice, a named value is never used, or named and positional parameters are mixed.
    pub fn resolve<'q>(
        &self,
        sql: &'q str,
    ) -> Result<(Cow<'q, str>, Vec<&RowValues>), SqlGatewayError> {
        match self {
            QueryParams::Positional(values) => Ok((Cow::Borrowed(sql), values.iter().collect())),
            QueryParams::Named(pairs) => {
                if pairs.iter().any(|(name, _)| name.starts_with(POSITIONAL_KEY)) {
                    return Err(SqlGatewayError::query_msg(
                        "cannot mix positional values with named bindings",
                    ));
                }
                for (i, (name, _)) in pairs.iter().enumerate() {
                    let name = name.trim_start_matches(':');
                    if pairs[..i].iter().any(|(prev, _)| prev.trim_start_matches(':') == name) {
                        return Err(SqlGatewayError::query_msg(format!(
                            "parameter :{name} is bound more than once"
                        )));
                    }
                }

                let translated = translate_named_placeholders(sql);
                if translated.positional_markers > 0 && !translated.names.is_empty() {
                    return Err(SqlGatewayError::query_msg(
                        "cannot mix named (:name) and positional (?) placeholders",
                    ));
                }

                let mut ordered = Vec::with_capacity(translated.names.len());
                for name in &translated.names {
                    let value = lookup(pairs, name).ok_or_else(|| {
                        SqlGatewayError::query_msg(format!("no value bound for :{name}"))
                    })?;
                    ordered.push(value);
                }

                let is_used = |name: &str| {
                    let name = name.trim_start_matches(':');
                    translated.names.iter().any(|n| n == name)
                };
                if let Some((unused, _)) = pairs.iter().find(|(name, _)| !is_used(name)) {
                    return Err(SqlGatewayError::query_msg(format!(
                        "parameter :{} is not used by the statement",
                        unused.trim_start_matches(':')
                    )));
                }

                Ok((translated.sql, ordered))
            }
        }
    }
}

/// Names may be given with or without their leading colon.
fn lookup<'a>(pairs: &'a [(String, RowValues)], name: &str) -> Option<&'a RowValues> {
    pairs
        .iter()
        .find(|(key, _)| key.trim_start_matches(':') == name)
        .map(|(_, value)| value)
}

impl From<Vec<RowValues>> for QueryParams {
    fn from(values: Vec<RowValues>) -> Self {
        QueryParams::Positional(values)
    }
}

impl From<&[RowValues]> for QueryParams {
    fn from(values: &[RowValues]) -> Self {
        QueryParams::Positional(values.to_vec())
    }
}

impl<const N: usize> From<[RowValues; N]> for QueryParams {
    fn from(values: [RowValues; N]) -> Self {
        QueryParams::Positional(values.into())
    }
}

impl<K: Into<String>> From<Vec<(K, RowValues)>> for QueryParams {
    fn from(pairs: Vec<(K, RowValues)>) -> Self {
        QueryParams::Named(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<()> for QueryParams {
    fn from((): ()) -> Self {
        QueryParams::none()
    }
}

/// A SQL string and its bound parameters bundled together.
///
/// Handy for helpers that need to return both query text and params:
/// ```rust
/// use mysql_gateway::prelude::*;
///
/// let qp = QueryAndParams::new(
///     "INSERT INTO t (id, name) VALUES (:id, :name)",
///     QueryParams::named().bind("id", 1).bind("name", "alice"),
/// );
/// # let _ = qp;
/// ```
#[derive(Debug, Clone)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: QueryParams,
}

impl QueryAndParams {
    /// Create a new `QueryAndParams` with the given query string and parameters
    pub fn new(query: impl Into<String>, params: impl Into<QueryParams>) -> Self {
        Self {
            query: query.into(),
            params: params.into(),
        }
    }

    /// Create a new `QueryAndParams` with no parameters
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: QueryParams::none(),
        }
    }
}
