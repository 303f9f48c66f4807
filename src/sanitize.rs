//! Column-type-aware scrubbing of single values.
//!
//! This is defense in depth for callers that build statements by string interpolation.
//! It is not a substitute for parameter binding; use
//! [`SqlHandler::execute_prepared`](crate::SqlHandler::execute_prepared) for untrusted
//! input.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::RowValues;

/// Semantic class of a MySQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeClass {
    Integer,
    Real,
    Text,
    Binary,
    Temporal,
    Spatial,
    Other,
}

impl DataTypeClass {
    pub const ALL: [DataTypeClass; 7] = [
        DataTypeClass::Integer,
        DataTypeClass::Real,
        DataTypeClass::Text,
        DataTypeClass::Binary,
        DataTypeClass::Temporal,
        DataTypeClass::Spatial,
        DataTypeClass::Other,
    ];

    /// Column type names belonging to this class.
    #[must_use]
    pub fn type_names(self) -> &'static [&'static str] {
        match self {
            DataTypeClass::Integer => &["tinyint", "smallint", "mediumint", "int", "bigint", "bit"],
            DataTypeClass::Real => &["float", "double", "decimal"],
            DataTypeClass::Text => &["char", "varchar", "tinytext", "text", "mediumtext", "longtext"],
            DataTypeClass::Binary => &[
                "binary",
                "varbinary",
                "blob",
                "tinyblob",
                "mediumblob",
                "longblob",
            ],
            DataTypeClass::Temporal => &["date", "time", "year", "datetime", "timestamp"],
            DataTypeClass::Spatial => &[
                "point",
                "linestring",
                "polygon",
                "geometry",
                "multipoint",
                "multilinestring",
                "multipolygon",
                "geometrycollection",
            ],
            DataTypeClass::Other => &["enum", "set"],
        }
    }

    /// Class of a column type name such as `"VARCHAR(255)"` or `"int unsigned"`.
    ///
    /// Unrecognized names resolve to [`DataTypeClass::Text`].
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        let base = name
            .trim()
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.type_names().contains(&base.as_str()))
            .unwrap_or(DataTypeClass::Text)
    }
}

/// A class, or a column type name to be resolved to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Class(DataTypeClass),
    Name(String),
}

impl TypeSpec {
    #[must_use]
    pub fn class(&self) -> DataTypeClass {
        match self {
            TypeSpec::Class(class) => *class,
            TypeSpec::Name(name) => DataTypeClass::from_type_name(name),
        }
    }
}

impl From<DataTypeClass> for TypeSpec {
    fn from(class: DataTypeClass) -> Self {
        TypeSpec::Class(class)
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::Name(name.to_owned())
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        TypeSpec::Name(name)
    }
}

/// How numeric classes are scrubbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Keep every digit and sign character (and `.` for reals) in input order.
    #[default]
    Lenient,
    /// Keep one leading sign, the digits, and for reals only the first `.`.
    Strict,
}

/// Treatment of markup in textual classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlPolicy {
    /// Remove tags and encode quotes as numeric entities.
    #[default]
    StripTags,
    /// Leave markup alone.
    Keep,
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*(>|$)").expect("tag pattern is valid"));

/// Configurable value scrubber. [`sanitize`] uses the default configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    pub numeric: NumericMode,
    pub html: HtmlPolicy,
}

impl Sanitizer {
    #[must_use]
    pub fn new(numeric: NumericMode, html: HtmlPolicy) -> Self {
        Self { numeric, html }
    }

    /// Scrub `value` for a column of type `ty`.
    ///
    /// NULL and the empty string pass through unchanged. Blobs pass through for
    /// non-numeric classes. Everything else comes back as `RowValues::Text`.
    #[must_use]
    pub fn sanitize(&self, value: &RowValues, ty: impl Into<TypeSpec>) -> RowValues {
        let class = ty.into().class();
        if let RowValues::Blob(_) = value {
            if !matches!(class, DataTypeClass::Integer | DataTypeClass::Real) {
                return value.clone();
            }
        }
        let Some(text) = value.to_lexical() else {
            return RowValues::Null;
        };
        if text.is_empty() {
            return RowValues::Text(text);
        }
        let cleaned = match class {
            DataTypeClass::Integer => self.numeric_chars(&text, false),
            DataTypeClass::Real => self.numeric_chars(&text, true),
            _ => self.text_chars(&text),
        };
        RowValues::Text(cleaned)
    }

    fn numeric_chars(&self, text: &str, allow_fraction: bool) -> String {
        match self.numeric {
            NumericMode::Lenient => text
                .chars()
                .filter(|c| {
                    c.is_ascii_digit() || *c == '+' || *c == '-' || (allow_fraction && *c == '.')
                })
                .collect(),
            NumericMode::Strict => {
                let mut out = String::with_capacity(text.len());
                let mut seen_point = false;
                for c in text.chars() {
                    if c.is_ascii_digit() {
                        out.push(c);
                    } else if (c == '+' || c == '-') && out.is_empty() {
                        out.push(c);
                    } else if c == '.' && allow_fraction && !seen_point {
                        seen_point = true;
                        out.push(c);
                    }
                }
                out
            }
        }
    }

    fn text_chars(&self, text: &str) -> String {
        let stripped: String = text
            .chars()
            .filter(|c| !c.is_control() || matches!(*c, '\t' | '\n' | '\r'))
            .collect();
        match self.html {
            HtmlPolicy::Keep => stripped,
            HtmlPolicy::StripTags => TAG_RE
                .replace_all(&stripped, "")
                .replace('"', "&#34;")
                .replace('\'', "&#39;"),
        }
    }
}

/// Scrub `value` for a column of type `ty` with the default [`Sanitizer`].
///
/// ```rust
/// use sql_handler::prelude::*;
///
/// let clean = sanitize(&RowValues::Text(" 12abc-3 ".into()), DataTypeClass::Integer);
/// assert_eq!(clean, RowValues::Text("12-3".into()));
/// ```
#[must_use]
pub fn sanitize(value: &RowValues, ty: impl Into<TypeSpec>) -> RowValues {
    Sanitizer::default().sanitize(value, ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RowValues {
        RowValues::Text(s.into())
    }

    #[test]
    fn integer_keeps_signs_and_digits_in_order() {
        assert_eq!(sanitize(&text(" 12abc-3 "), DataTypeClass::Integer), text("12-3"));
        assert_eq!(sanitize(&text("+7e5"), "bigint"), text("+75"));
        assert_eq!(sanitize(&RowValues::Int(-9), "int"), text("-9"));
    }

    #[test]
    fn real_lenient_keeps_every_point() {
        assert_eq!(sanitize(&text("$1,234.50"), DataTypeClass::Real), text("1234.50"));
        assert_eq!(sanitize(&text("1.2.3"), "decimal(10,2)"), text("1.2.3"));
    }

    #[test]
    fn real_strict_keeps_one_point_and_leading_sign() {
        let strict = Sanitizer::new(NumericMode::Strict, HtmlPolicy::default());
        assert_eq!(strict.sanitize(&text("-1.2.3"), "double"), text("-1.23"));
        assert_eq!(strict.sanitize(&text("12-3"), "int"), text("123"));
        assert_eq!(strict.sanitize(&text("5.5"), "int"), text("55"));
    }

    #[test]
    fn null_and_empty_pass_through() {
        assert_eq!(sanitize(&RowValues::Null, DataTypeClass::Integer), RowValues::Null);
        assert_eq!(sanitize(&text(""), DataTypeClass::Text), text(""));
    }

    #[test]
    fn text_strips_controls_and_tags() {
        assert_eq!(
            sanitize(&text("a\u{0}b\tc<script>x</script>"), "varchar(20)"),
            text("ab\tcx")
        );
        assert_eq!(sanitize(&text(r#"O'Hara "q""#), "text"), text("O&#39;Hara &#34;q&#34;"));
        let keep = Sanitizer::new(NumericMode::default(), HtmlPolicy::Keep);
        assert_eq!(keep.sanitize(&text("<b>x\u{7}</b>"), "text"), text("<b>x</b>"));
    }

    #[test]
    fn type_names_resolve_to_classes() {
        assert_eq!(DataTypeClass::from_type_name("VARCHAR(255)"), DataTypeClass::Text);
        assert_eq!(DataTypeClass::from_type_name("int unsigned"), DataTypeClass::Integer);
        assert_eq!(DataTypeClass::from_type_name("datetime"), DataTypeClass::Temporal);
        assert_eq!(DataTypeClass::from_type_name("multipolygon"), DataTypeClass::Spatial);
        assert_eq!(DataTypeClass::from_type_name("enum('a','b')"), DataTypeClass::Other);
        assert_eq!(DataTypeClass::from_type_name("longblob"), DataTypeClass::Binary);
        assert_eq!(DataTypeClass::from_type_name("json"), DataTypeClass::Text);
    }

    #[test]
    fn blobs_pass_through_textual_classes() {
        let blob = RowValues::Blob(vec![0, 1, 2]);
        assert_eq!(sanitize(&blob, "blob"), blob);
    }
}
