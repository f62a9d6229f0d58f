//! Composable narrowing conditions that also contribute derivable fields.

use compact_str::{CompactString, ToCompactString};

use crate::fieldset::{FieldSet, FieldSpec};
use crate::helpers::{in_list, mvfind, mvindex};

/// Sub-object receiving the fields contributed by the built-in filters
pub const FILTER_SUB_OBJECT: &str = "properties";

const CONDITIONS_TYPE: &str = "responseObject.status.conditions{}.type";
const CONDITIONS_REASON: &str = "responseObject.status.conditions{}.reason";
const CONDITIONS_STATUS: &str = "responseObject.status.conditions{}.status";
const CONDITIONS_MESSAGE: &str = "responseObject.status.conditions{}.message";
const TASK_RESULTS_NAME: &str = "responseObject.status.taskResults{}.name";
const TASK_RESULTS_VALUE: &str = "responseObject.status.taskResults{}.value";

/// Implemented by every filter attached to a query.
///
/// Builders only ever call these two methods; a new kind of filter is added
/// by implementing this trait.
pub trait Filter {
    /// Commands narrowing down search results, inserted right after the
    /// search command in order.
    fn commands(&self) -> Vec<String>;

    /// All the fields this filter makes available to the query output.
    fn field_set(&self) -> FieldSet;
}

impl<F: Filter + ?Sized> Filter for &F {
    fn commands(&self) -> Vec<String> {
        (**self).commands()
    }

    fn field_set(&self) -> FieldSet {
        (**self).field_set()
    }
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn commands(&self) -> Vec<String> {
        (**self).commands()
    }

    fn field_set(&self) -> FieldSet {
        (**self).field_set()
    }
}

/// Optional narrowing for [`StatusConditionFilter`].
/// All options are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusConditionOpts {
    /// Only match conditions with one of these reasons
    pub reasons: Vec<CompactString>,
    /// Only match conditions with one of these statuses
    pub statuses: Vec<CompactString>,
    /// Only match conditions whose message is `like` this pattern (`%` is
    /// the wildcard)
    pub message: Option<CompactString>,
}

/// Matches audit records of any K8s resource by one of its status conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConditionFilter {
    /// The status condition's `type` value
    c_type: CompactString,
    /// Field tracking the position of the matching status condition
    index_field: CompactString,
    opts: StatusConditionOpts,
}

impl StatusConditionFilter {
    pub const DEFAULT_INDEX_FIELD: &'static str = "status_condition_index";

    pub fn new(c_type: impl AsRef<str>) -> Self {
        Self {
            c_type: c_type.as_ref().to_compact_string(),
            index_field: CompactString::const_new(Self::DEFAULT_INDEX_FIELD),
            opts: StatusConditionOpts::default(),
        }
    }

    pub fn with_reasons<I, S>(mut self, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.opts.reasons = reasons
            .into_iter()
            .map(|r| r.as_ref().to_compact_string())
            .collect();
        self
    }

    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.opts.statuses = statuses
            .into_iter()
            .map(|s| s.as_ref().to_compact_string())
            .collect();
        self
    }

    pub fn with_message(mut self, pattern: impl AsRef<str>) -> Self {
        self.opts.message = Some(pattern.as_ref().to_compact_string());
        self
    }

    pub fn with_opts(mut self, opts: StatusConditionOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Track the condition position in `index_field` instead of the default
    pub fn with_index_field(mut self, index_field: impl AsRef<str>) -> Self {
        self.index_field = index_field.as_ref().to_compact_string();
        self
    }

    pub fn index_field(&self) -> &str {
        &self.index_field
    }

    /// Expression reading `multi_field` at the matching condition's position
    pub fn at_index(&self, multi_field: &str) -> String {
        mvindex(multi_field, &self.index_field)
    }
}

impl Filter for StatusConditionFilter {
    fn commands(&self) -> Vec<String> {
        let eval_cmd = format!(
            "eval {}={}",
            self.index_field,
            mvfind(CONDITIONS_TYPE, &self.c_type)
        );

        let mut where_cmd = format!("where isnotnull({})", self.index_field);
        if !self.opts.reasons.is_empty() {
            where_cmd.push_str(&format!(
                " AND {} IN ({})",
                self.at_index(CONDITIONS_REASON),
                in_list(&self.opts.reasons)
            ));
        }
        if !self.opts.statuses.is_empty() {
            where_cmd.push_str(&format!(
                " AND {} IN ({})",
                self.at_index(CONDITIONS_STATUS),
                in_list(&self.opts.statuses)
            ));
        }
        if let Some(message) = self.opts.message.as_deref().filter(|m| !m.is_empty()) {
            where_cmd.push_str(&format!(
                " AND like({}, \"{message}\")",
                self.at_index(CONDITIONS_MESSAGE)
            ));
        }

        vec![eval_cmd, where_cmd]
    }

    fn field_set(&self) -> FieldSet {
        FieldSet::new()
            .with(
                "status_message",
                FieldSpec::from_expr(self.at_index(CONDITIONS_MESSAGE))
                    .in_sub_object(FILTER_SUB_OBJECT),
            )
            .with(
                "status_reason",
                FieldSpec::from_expr(self.at_index(CONDITIONS_REASON))
                    .in_sub_object(FILTER_SUB_OBJECT),
            )
    }
}

/// Matches audit records of Tekton TaskRuns carrying a named task result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TektonTaskResultFilter {
    /// The result key
    name: CompactString,
    /// Field tracking the position of the matching task result
    index_field: CompactString,
}

impl TektonTaskResultFilter {
    pub const DEFAULT_INDEX_FIELD: &'static str = "tekton_task_result_index";

    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_compact_string(),
            index_field: CompactString::const_new(Self::DEFAULT_INDEX_FIELD),
        }
    }

    pub fn with_index_field(mut self, index_field: impl AsRef<str>) -> Self {
        self.index_field = index_field.as_ref().to_compact_string();
        self
    }

    pub fn index_field(&self) -> &str {
        &self.index_field
    }

    /// Expression reading the matching result's value
    pub fn value_expr(&self) -> String {
        mvindex(TASK_RESULTS_VALUE, &self.index_field)
    }
}

impl Filter for TektonTaskResultFilter {
    fn commands(&self) -> Vec<String> {
        vec![
            format!(
                "eval {}={}",
                self.index_field,
                mvfind(TASK_RESULTS_NAME, &self.name)
            ),
            format!("where isnotnull({})", self.index_field),
        ]
    }

    fn field_set(&self) -> FieldSet {
        FieldSet::new().with(
            "tekton_task_result",
            FieldSpec::from_expr(self.value_expr()).in_sub_object(FILTER_SUB_OBJECT),
        )
    }
}
