//! Declarative mapping from output field names to resolution rules.

use compact_str::{CompactString, ToCompactString};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::error::{QueryGenError, Result};
use crate::helpers::{comma_sep, dedup_eval, fallback_expr, json_object, s_quot};

/// Removes the metadata fields the search service adds to every result.
pub const EXCLUDE_FIELDS_CMD: &str = "fields - _*";

/// How to obtain the value of one output field and where to place it.
///
/// The default value means the output field is copied as-is from the input
/// under its own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct FieldSpec {
    /// Input fields to read from. Each field is a fallback for when all the
    /// fields that precede it are NULL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub src_fields: SmallVec<[CompactString; 2]>,
    /// Expression generating the value. Overrides the `src_fields` fallback
    /// logic when present, and may be a literal.
    #[cfg_attr(feature = "serde", serde(default))]
    pub src_expr: Option<CompactString>,
    /// JSON sub-object the field resides in when included in the output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sub_obj: Option<CompactString>,
}

impl FieldSpec {
    /// Copy the field as-is
    pub const fn new() -> Self {
        Self {
            src_fields: SmallVec::new_const(),
            src_expr: None,
            sub_obj: None,
        }
    }

    /// Read the value from the first non-null field of `fields`
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new().with_src_fields(fields)
    }

    /// Compute the value with `expr`
    pub fn from_expr(expr: impl AsRef<str>) -> Self {
        Self::new().with_expr(expr)
    }

    pub fn with_src_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.src_fields = fields
            .into_iter()
            .map(|f| f.as_ref().to_compact_string())
            .collect();
        self
    }

    pub fn with_expr(mut self, expr: impl AsRef<str>) -> Self {
        self.src_expr = Some(expr.as_ref().to_compact_string());
        self
    }

    /// Place the field inside the `sub_obj` JSON container
    pub fn in_sub_object(mut self, sub_obj: impl AsRef<str>) -> Self {
        self.sub_obj = Some(sub_obj.as_ref().to_compact_string());
        self
    }

    /// The value expression, if any: `src_expr`, else the fallback chain
    fn value_expr(&self) -> Option<String> {
        match &self.src_expr {
            Some(expr) => Some(expr.to_string()),
            None => fallback_expr(self.src_fields.as_slice()),
        }
    }
}

/// The result of resolving requested fields against a [`FieldSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Input fields to collapse to a single value, in first-use order
    pub dedup_fields: Vec<CompactString>,
    /// `name=expr` assignments; plain fields first, then one `json_object`
    /// per sub-object in first-encountered order
    pub assignments: Vec<String>,
    /// Sorted top-level output fields
    pub selection: Vec<CompactString>,
}

impl Resolution {
    /// Renders the resolved stages, each preceded by `|`
    pub fn write_stages(&self, out: &mut String) {
        if !self.dedup_fields.is_empty() {
            out.push('|');
            out.push_str(&dedup_eval(&self.dedup_fields));
        }
        if !self.assignments.is_empty() {
            out.push_str("|eval ");
            out.push_str(&comma_sep(&self.assignments));
        }
        out.push_str("|fields ");
        out.push_str(&comma_sep(&self.selection));
        out.push('|');
        out.push_str(EXCLUDE_FIELDS_CMD);
    }
}

/// A set of fields that can be included in the query output, keyed by output
/// field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    specs: HashMap<CompactString, FieldSpec>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the spec for `name`
    pub fn with(mut self, name: impl AsRef<str>, spec: FieldSpec) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn insert(&mut self, name: impl AsRef<str>, spec: FieldSpec) -> Option<FieldSpec> {
        self.specs.insert(name.as_ref().to_compact_string(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Output field names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.specs.keys().map(CompactString::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.specs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every spec of `other` into this set. Colliding names take the
    /// spec from `other` whole.
    pub fn merge(&mut self, other: &FieldSet) {
        for (name, spec) in &other.specs {
            self.specs.insert(name.clone(), spec.clone());
        }
    }

    /// Resolves `fields` into value assignments and the output selection.
    ///
    /// Fails on the first field that has no spec. A field requested more than
    /// once is resolved once.
    pub fn resolve<S: AsRef<str>>(&self, fields: &[S]) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut seen_dedup: HashSet<CompactString> = HashSet::new();
        let mut plain: Vec<String> = Vec::new();
        let mut sub_objects: Vec<(&str, Vec<(&str, String)>)> = Vec::new();
        let mut selection: Vec<&str> = Vec::new();

        for field in fields {
            let field = field.as_ref();
            if !seen.insert(field) {
                continue;
            }
            let Some(spec) = self.specs.get(field) else {
                crate::ujq_trace_unknown_field!(field);
                return Err(QueryGenError::UnknownField(field.to_compact_string()));
            };

            let dedup: &[CompactString] = &spec.src_fields;
            let own = [field.to_compact_string()];
            let dedup = if !dedup.is_empty() {
                dedup
            } else if spec.src_expr.is_none() {
                &own[..]
            } else {
                &[]
            };
            for name in dedup {
                if seen_dedup.insert(name.clone()) {
                    resolution.dedup_fields.push(name.clone());
                }
            }

            let expr = spec.value_expr();
            match spec.sub_obj.as_deref() {
                None => {
                    if let Some(expr) = expr {
                        plain.push(format!("{field}={expr}"));
                    }
                    selection.push(field);
                }
                Some(sub_obj) => {
                    let expr = expr.unwrap_or_else(|| s_quot(field));
                    match sub_objects.iter_mut().find(|(name, _)| *name == sub_obj) {
                        Some((_, members)) => members.push((field, expr)),
                        None => {
                            sub_objects.push((sub_obj, vec![(field, expr)]));
                            selection.push(sub_obj);
                        }
                    }
                }
            }
        }

        resolution.assignments = plain;
        for (sub_obj, members) in sub_objects {
            resolution
                .assignments
                .push(format!("{sub_obj}={}", json_object(members)));
        }

        selection.sort_unstable();
        selection.dedup();
        resolution.selection = selection.into_iter().map(Into::into).collect();
        Ok(resolution)
    }

    /// Generates a query running `search_expr` whose output includes `fields`.
    pub fn query_gen<S: AsRef<str>>(&self, search_expr: &str, fields: &[S]) -> Result<String> {
        let resolution = self.resolve(fields)?;
        let mut query = String::from(search_expr);
        resolution.write_stages(&mut query);
        Ok(query)
    }
}

impl<N: AsRef<str>> FromIterator<(N, FieldSpec)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (N, FieldSpec)>>(iter: T) -> Self {
        Self {
            specs: iter
                .into_iter()
                .map(|(name, spec)| (name.as_ref().to_compact_string(), spec))
                .collect(),
        }
    }
}

impl<N: AsRef<str>> Extend<(N, FieldSpec)> for FieldSet {
    fn extend<T: IntoIterator<Item = (N, FieldSpec)>>(&mut self, iter: T) {
        for (name, spec) in iter {
            self.insert(name, spec);
        }
    }
}
