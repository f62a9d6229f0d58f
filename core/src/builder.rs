use compact_str::{CompactString, ToCompactString};

use crate::error::Result;
use crate::fieldset::{FieldSet, FieldSpec};
use crate::filter::Filter;
use crate::journey::{self, COMMON_FIELDS};
use crate::registry::{K8sApiId, K8sAuditFieldSet, search_command};

/// Builder for user journey queries.
///
/// A builder is configured through chained calls and consumed by
/// [`UserJourneyQuery::render`]. The registry it reads field specs from is
/// borrowed and never modified.
#[derive(Debug, Clone)]
pub struct UserJourneyQuery<'a> {
    /// The index to be searched
    index: CompactString,
    /// The API whose audit records are searched
    api: K8sApiId,
    /// Narrows down the search results
    predicate: String,
    /// Commands executed in order right after the search command
    commands: Vec<String>,
    /// Fields to return from the query
    fields: Vec<CompactString>,
    registry: &'a K8sAuditFieldSet,
    /// Specs contributed by filters and event overrides, layered on top of
    /// the registry
    overrides: FieldSet,
}

impl<'a> UserJourneyQuery<'a> {
    /// A query over `index` reading field specs from `registry`, with no
    /// output fields requested yet
    pub fn new(index: impl AsRef<str>, registry: &'a K8sAuditFieldSet) -> Self {
        Self {
            index: index.as_ref().to_compact_string(),
            api: K8sApiId::default(),
            predicate: String::new(),
            commands: Vec::new(),
            fields: Vec::new(),
            registry,
            overrides: FieldSet::new(),
        }
    }

    /// A query over `index` requesting the fields every user journey event
    /// carries
    pub fn with_registry(index: impl AsRef<str>, registry: &'a K8sAuditFieldSet) -> Self {
        Self::new(index, registry).with_fields(COMMON_FIELDS)
    }

    /// Searches the audit records of `api` and uses its field overrides
    pub fn for_api(mut self, api: K8sApiId) -> Self {
        self.api = api;
        self
    }

    /// Sets the expressions added to the leading search command, replacing
    /// any previous predicate.
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = predicate.into();
        self
    }

    /// Adds raw commands to the query.
    /// Each call appends to the existing commands so call order matters.
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Adds the commands of `filter` and makes its fields available. Fields
    /// of later filters replace colliding fields of earlier ones.
    pub fn with_filter<F: Filter>(mut self, filter: F) -> Self {
        self.overrides.merge(&filter.field_set());
        self.with_commands(filter.commands())
    }

    /// Adds fields to the output of the query.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .extend(fields.into_iter().map(|f| f.as_ref().to_compact_string()));
        self
    }

    /// Computes the `event` output field with `expr` and includes it in the
    /// output. Replaces the default event naming logic.
    pub fn with_event_expr(mut self, expr: impl AsRef<str>) -> Self {
        self.overrides.insert("event", FieldSpec::from_expr(expr));
        self.with_fields(["event"])
    }

    /// The effective field set: registry defaults, the API's overrides, then
    /// filter and event contributions.
    pub fn field_set(&self) -> FieldSet {
        self.registry.merged(&self.api, [&self.overrides])
    }

    /// Builds the query text.
    pub fn render(mut self) -> Result<String> {
        self.fields.sort_unstable();
        self.fields.dedup();

        let search_cmd = search_command(&self.index, &self.api, &self.predicate);
        let mut query = search_cmd;
        for command in &self.commands {
            query.push_str(" | ");
            query.push_str(command);
        }

        let query = self.field_set().query_gen(&query, &self.fields)?;
        crate::ujq_trace_query!(&query, self.fields.len());
        Ok(query)
    }
}

impl UserJourneyQuery<'static> {
    /// A user journey query over `index` using the built-in field sets
    pub fn user_journey(index: impl AsRef<str>) -> Self {
        Self::with_registry(index, journey::default_registry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryGenError;
    use crate::fieldset::EXCLUDE_FIELDS_CMD;
    use crate::filter::StatusConditionFilter;

    struct TestFilter;

    impl Filter for TestFilter {
        fn commands(&self) -> Vec<String> {
            vec![r#"eval tf1="hello""#.into(), r#"eval tf2="world""#.into()]
        }

        fn field_set(&self) -> FieldSet {
            FieldSet::new()
                .with("tf1", FieldSpec::from_fields(["tf1"]))
                .with("tf2", FieldSpec::from_fields(["tf2"]))
        }
    }

    fn registry() -> K8sAuditFieldSet {
        K8sAuditFieldSet::new(
            FieldSet::new()
                .with("messageId", FieldSpec::from_fields(["auditID"]))
                .with("type", FieldSpec::from_expr(r#""track""#))
                .with("userAgent", FieldSpec::new().in_sub_object("context"))
                .with(
                    "userId",
                    FieldSpec::from_fields(["impersonatedUser.username", "user.username"]),
                )
                .with("verb", FieldSpec::new())
                .with(
                    "apiGroup",
                    FieldSpec::from_fields(["objectRef.apiGroup"]).in_sub_object("properties"),
                ),
        )
        .with_api(
            K8sApiId::new("tekton.dev", "pipelineruns"),
            FieldSet::new().with("verb", FieldSpec::from_expr(r#""run""#)),
        )
    }

    #[test]
    fn full_pipeline() {
        let reg = registry();
        let q = UserJourneyQuery::new("idx", &reg)
            .with_fields(["messageId", "type", "userAgent", "apiGroup"])
            .with_predicate("verb=created")
            .with_event_expr(r#""Event Name""#)
            .with_commands([r#"eval foo="bar""#])
            .with_filter(TestFilter)
            .with_fields(["tf1", "tf2", "userId"])
            .render()
            .unwrap();

        assert_eq!(
            q,
            concat!(
                r#"search index="idx" log_type=audit verb=created"#,
                r#" | eval foo="bar""#,
                r#" | eval tf1="hello""#,
                r#" | eval tf2="world""#,
                "|eval objectRef.apiGroup=mvindex('objectRef.apiGroup', 0),",
                "auditID=mvindex('auditID', 0),",
                "tf1=mvindex('tf1', 0),",
                "tf2=mvindex('tf2', 0),",
                "userAgent=mvindex('userAgent', 0),",
                "impersonatedUser.username=mvindex('impersonatedUser.username', 0),",
                "user.username=mvindex('user.username', 0)",
                r#"|eval event="Event Name","#,
                "messageId='auditID',",
                "tf1='tf1',",
                "tf2='tf2',",
                r#"type="track","#,
                "userId=if(isnull('impersonatedUser.username'),'user.username','impersonatedUser.username'),",
                r#"properties=json_object("apiGroup",'objectRef.apiGroup'),"#,
                r#"context=json_object("userAgent",'userAgent')"#,
                "|fields context,event,messageId,properties,tf1,tf2,type,userId",
                "|fields - _*",
            )
        );
    }

    #[test]
    fn unknown_field() {
        let reg = registry();
        let err = UserJourneyQuery::new("idx", &reg)
            .with_fields(["not-found"])
            .render()
            .unwrap_err();
        assert_eq!(err, QueryGenError::UnknownField("not-found".into()));
    }

    #[test]
    fn filter_fields_need_the_filter() {
        let reg = registry();
        assert!(
            UserJourneyQuery::new("idx", &reg)
                .with_fields(["status_reason"])
                .render()
                .is_err()
        );
        assert!(
            UserJourneyQuery::new("idx", &reg)
                .with_filter(StatusConditionFilter::new("Succeeded"))
                .with_fields(["status_reason"])
                .render()
                .is_ok()
        );
    }

    #[test]
    fn api_scoping() {
        let reg = registry();
        let q = UserJourneyQuery::new("idx", &reg)
            .for_api(K8sApiId::new("tekton.dev", "pipelineruns"))
            .with_predicate("verb=update")
            .with_fields(["verb"])
            .render()
            .unwrap();
        assert_eq!(
            q,
            format!(
                "search index=\"idx\" log_type=audit \
                 \"objectRef.apiGroup\"=\"tekton.dev\" \"objectRef.resource\"=\"pipelineruns\" \
                 verb=update|eval verb=\"run\"|fields verb|{EXCLUDE_FIELDS_CMD}"
            )
        );
    }

    #[test]
    fn later_filter_wins() {
        struct Named(&'static str);
        impl Filter for Named {
            fn commands(&self) -> Vec<String> {
                Vec::new()
            }
            fn field_set(&self) -> FieldSet {
                FieldSet::new().with("x", FieldSpec::from_expr(self.0))
            }
        }

        let reg = registry();
        let q = UserJourneyQuery::new("idx", &reg)
            .with_filter(Named(r#""first""#))
            .with_filter(Named(r#""second""#))
            .with_fields(["x"])
            .render()
            .unwrap();
        assert!(q.contains(r#"|eval x="second"|"#), "{q}");
    }

    #[test]
    fn filter_overrides_api_defaults() {
        struct VerbFilter;
        impl Filter for VerbFilter {
            fn commands(&self) -> Vec<String> {
                Vec::new()
            }
            fn field_set(&self) -> FieldSet {
                FieldSet::new().with("verb", FieldSpec::from_expr(r#""filtered""#))
            }
        }

        let reg = registry();
        let fs = UserJourneyQuery::new("idx", &reg)
            .for_api(K8sApiId::new("tekton.dev", "pipelineruns"))
            .with_filter(VerbFilter)
            .field_set();
        assert_eq!(fs.get("verb"), Some(&FieldSpec::from_expr(r#""filtered""#)));
    }

    #[test]
    fn duplicate_fields_collapse() {
        let reg = registry();
        let once = UserJourneyQuery::new("idx", &reg)
            .with_fields(["userId", "userAgent"])
            .render()
            .unwrap();
        let twice = UserJourneyQuery::new("idx", &reg)
            .with_fields(["userAgent", "userId", "userId", "userAgent"])
            .render()
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn predicate_is_replaced() {
        let reg = registry();
        let q = UserJourneyQuery::new("idx", &reg)
            .with_predicate("verb=create")
            .with_predicate("verb=delete")
            .with_fields(["type"])
            .render()
            .unwrap();
        assert!(q.starts_with(r#"search index="idx" log_type=audit verb=delete|"#));
    }
}
