//! Builders for the small query-language fragments the engine emits.
//!
//! Every helper is a pure function over its arguments. Field names are
//! written verbatim; the engine never escapes quotes inside them.

use std::fmt::Write;

/// Wraps a value in single quotes, the query language's field-reference form
#[inline]
pub fn s_quot(v: &str) -> String {
    format!("'{v}'")
}

/// Wraps a value in double quotes, the query language's string-literal form
#[inline]
pub fn d_quot(v: &str) -> String {
    format!("\"{v}\"")
}

/// Joins words with a bare comma
pub fn comma_sep<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, word) in words.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(word.as_ref());
    }
    out
}

/// Renders a double-quoted list suitable for an `IN (...)` clause:
/// `"a", "b", "c"`
pub fn in_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('"');
        out.push_str(value.as_ref());
        out.push('"');
    }
    out
}

/// Generates an `eval` command converting multi-value fields into
/// single-value fields by keeping their first element.
///
/// ```
/// use ujquery_core::helpers::dedup_eval;
///
/// assert_eq!(dedup_eval(["a", "b"]), "eval a=mvindex('a', 0),b=mvindex('b', 0)");
/// ```
pub fn dedup_eval<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("eval ");
    for (i, field) in fields.into_iter().enumerate() {
        let field = field.as_ref();
        if i > 0 {
            out.push(',');
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{field}=mvindex('{field}', 0)");
    }
    out
}

/// Generates an expression reading the first non-null field of `src_fields`,
/// so each field is a fallback for the ones before it. Returns `None` for an
/// empty chain.
///
/// ```
/// use ujquery_core::helpers::fallback_expr;
///
/// assert_eq!(
///     fallback_expr(&["a", "b", "c"]).as_deref(),
///     Some("if(isnull('a'),if(isnull('b'),'c','b'),'a')"),
/// );
/// ```
pub fn fallback_expr<S: AsRef<str>>(src_fields: &[S]) -> Option<String> {
    let (last, rest) = src_fields.split_last()?;
    let mut expr = s_quot(last.as_ref());
    for field in rest.iter().rev() {
        let field = field.as_ref();
        expr = format!("if(isnull('{field}'),{expr},'{field}')");
    }
    Some(expr)
}

/// Builds a `json_object(...)` expression from `(field name, expression)`
/// members. Members are sorted by field name before rendering.
pub fn json_object<N: AsRef<str>>(mut members: Vec<(N, String)>) -> String {
    members.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
    let pairs = members
        .iter()
        .map(|(name, expr)| format!("{},{}", d_quot(name.as_ref()), expr));
    format!("json_object({})", comma_sep(pairs))
}

/// `mvindex('<multi_field>', <index_field>)`
pub fn mvindex(multi_field: &str, index_field: &str) -> String {
    format!("mvindex('{multi_field}', {index_field})")
}

/// `mvfind('<multi_field>', "<value>")`
pub fn mvfind(multi_field: &str, value: &str) -> String {
    format!("mvfind('{multi_field}', \"{value}\")")
}
