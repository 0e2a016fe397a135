//! Tagged SQL templates.
//!
//! A [`Template`] keeps literal SQL fragments and bound values apart and only
//! renders placeholders when it is built for a concrete [`PlaceholderStyle`].
//! Interpolated positions are always parameters, never identifiers.
//!
//! # Example
//!
//! ```
//! use duosql::{PlaceholderStyle, sql};
//!
//! let id = 7;
//! let t = sql!("SELECT * FROM contents WHERE id = " {id} " AND title = " {"hello"});
//!
//! let pg = t.build(PlaceholderStyle::Numbered);
//! assert_eq!(pg.sql, "SELECT * FROM contents WHERE id = $1 AND title = $2");
//!
//! let lite = t.build(PlaceholderStyle::Positional);
//! assert_eq!(lite.sql, "SELECT * FROM contents WHERE id = ? AND title = ?");
//! assert_eq!(lite.values, pg.values);
//! ```

use crate::error::{DbError, DbResult};
use crate::placeholder::PlaceholderStyle;
use crate::value::Value;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq)]
enum TemplatePart {
    Raw(String),
    Param,
}

/// Literal SQL fragments interleaved with bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    parts: Vec<TemplatePart>,
    values: Vec<Value>,
}

/// A rendered statement: SQL text with exactly one placeholder per entry in
/// `values`, in the same left-to-right order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }
}

/// Start building a template from a leading SQL fragment.
pub fn sql(initial_sql: impl Into<String>) -> Template {
    Template::new(initial_sql)
}

impl Template {
    /// Create a new template with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let mut t = Self::empty();
        t.push(&initial_sql.into());
        t
    }

    /// Create an empty template.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a template from tagged-template input: `fragments` has exactly one
    /// more element than `values`, and value `i` sits between fragment `i` and
    /// fragment `i + 1`.
    pub fn from_parts<F, V>(fragments: F, values: V) -> DbResult<Self>
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: Into<Value>,
    {
        let fragments: Vec<F::Item> = fragments.into_iter().collect();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();

        if fragments.len() != values.len() + 1 {
            return Err(DbError::shape(format!(
                "template needs {} fragments for {} values, got {}",
                values.len() + 1,
                values.len(),
                fragments.len()
            )));
        }

        let mut fragments = fragments.iter();
        let mut t = Self::empty();
        if let Some(head) = fragments.next() {
            t.push(head.as_ref());
        }
        for (value, fragment) in values.into_iter().zip(fragments) {
            t.push_bind(value).push(fragment.as_ref());
        }
        Ok(t)
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(TemplatePart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(TemplatePart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(TemplatePart::Param);
        self.values.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `NULL` (so `IN (NULL)` is valid SQL).
    pub fn push_bind_list<T: Into<Value>>(
        &mut self,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append another template, consuming it. Its parameters continue this
    /// template's numbering.
    pub fn push_template(&mut self, other: Template) -> &mut Self {
        for part in other.parts {
            match part {
                TemplatePart::Raw(s) => {
                    self.push(&s);
                }
                TemplatePart::Param => self.parts.push(TemplatePart::Param),
            }
        }
        self.values.extend(other.values);
        self
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn param_count(&self) -> usize {
        self.values.len()
    }

    /// Render the SQL text for `style`.
    pub fn to_sql(&self, style: PlaceholderStyle) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                TemplatePart::Raw(s) => out.push_str(s),
                TemplatePart::Param => {
                    style.write_to(&mut out, idx);
                    idx += 1;
                }
            }
        }
        out
    }

    /// Render SQL and values for `style`.
    pub fn build(&self, style: PlaceholderStyle) -> Statement {
        Statement {
            sql: self.to_sql(style),
            values: self.values.clone(),
        }
    }

    /// Render SQL for `style`, moving the values out.
    pub fn into_statement(self, style: PlaceholderStyle) -> Statement {
        let sql = self.to_sql(style);
        Statement {
            sql,
            values: self.values,
        }
    }
}

impl From<&str> for Template {
    fn from(sql: &str) -> Self {
        Template::new(sql)
    }
}

impl From<String> for Template {
    fn from(sql: String) -> Self {
        Template::new(sql)
    }
}

impl From<&Template> for Template {
    fn from(t: &Template) -> Self {
        t.clone()
    }
}
