//! Named user journey queries.
//!
//! Each entry pairs a stable name and a display title with the builder calls
//! producing its query. Entries render against any registry so deployments
//! can remap source fields without touching the query definitions.

use crate::builder::UserJourneyQuery;
use crate::error::Result;
use crate::filter::{StatusConditionFilter, TektonTaskResultFilter};
use crate::journey::{
    applications_api, components_api, pipelineruns_api, releases_api, taskruns_api,
};
use crate::registry::K8sAuditFieldSet;

/// The index searched when none is configured
pub const DEFAULT_INDEX: &str = "federated:rh_rhtap_stage_audit";

/// Matches requests made by humans or on their behalf
const HUMAN_USER: &str = r#"("impersonatedUser.username"="*" OR (user.username="*" AND NOT user.username="system:*"))"#;

const BUILD_PIPELINE: &str =
    r#""responseObject.metadata.labels.pipelines.appstudio.openshift.io/type"=build"#;

const STATUS_UPDATE: &str =
    r#"verb=update "responseStatus.code"=200 "objectRef.subresource"="status""#;

const CONDITION_STATUS: &str = "responseObject.status.conditions{}.status";

const BUILD_FIELDS: [&str; 9] = [
    "application",
    "commit_sha",
    "component",
    "git_trigger_event_type",
    "git_trigger_provider",
    "name",
    "pipeline_log_url",
    "repo",
    "target_branch",
];

/// A printable query: a descriptive title and the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDesc {
    pub title: String,
    pub query: String,
}

impl QueryDesc {
    pub fn new(title: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            query: query.into(),
        }
    }
}

type BuildFn = fn(&str, &K8sAuditFieldSet) -> Result<String>;

/// A catalog entry.
pub struct NamedQuery {
    /// Stable kebab-case name used to select the query
    pub name: &'static str,
    pub title: &'static str,
    build: BuildFn,
}

impl NamedQuery {
    pub fn render(&self, index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
        (self.build)(index, registry)
    }

    pub fn describe(&self, index: &str, registry: &K8sAuditFieldSet) -> Result<QueryDesc> {
        Ok(QueryDesc::new(self.title, self.render(index, registry)?))
    }
}

impl std::fmt::Debug for NamedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedQuery")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish()
    }
}

pub static CATALOG: &[NamedQuery] = &[
    NamedQuery {
        name: "application",
        title: "Application events",
        build: application_query,
    },
    NamedQuery {
        name: "component",
        title: "Component events",
        build: component_query,
    },
    NamedQuery {
        name: "build-pipelinerun-created",
        title: "Build PipelineRun creation events",
        build: build_pipeline_run_created_query,
    },
    NamedQuery {
        name: "build-pipelinerun-started",
        title: "Build PipelineRun started events",
        build: build_pipeline_run_started_query,
    },
    NamedQuery {
        name: "clair-scan-completed",
        title: "Clair scan TaskRun completion events",
        build: clair_scan_completed_query,
    },
    NamedQuery {
        name: "build-pipelinerun-completed",
        title: "Build PipelineRun Completed or Failed event",
        build: build_pipeline_run_completed_query,
    },
    NamedQuery {
        name: "release-completed",
        title: "Release Succeeded or Failed events",
        build: release_completed_query,
    },
];

pub fn find(name: &str) -> Option<&'static NamedQuery> {
    CATALOG.iter().find(|q| q.name == name)
}

/// Renders every catalog entry, in catalog order.
pub fn describe_all(index: &str, registry: &K8sAuditFieldSet) -> Result<Vec<QueryDesc>> {
    CATALOG.iter().map(|q| q.describe(index, registry)).collect()
}

fn created_predicate(extra: &[&str]) -> String {
    let mut parts = vec![
        "verb=create",
        r#""responseStatus.code" IN (200, 201)"#,
        r#""responseObject.metadata.resourceVersion"="*""#,
    ];
    parts.extend_from_slice(extra);
    parts.join(" ")
}

/// AppStudio Application creation events
pub fn application_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    UserJourneyQuery::with_registry(index, registry)
        .for_api(applications_api())
        .with_predicate(created_predicate(&[HUMAN_USER]))
        .with_fields(["application", "name", "userId"])
        .render()
}

/// AppStudio Component creation events
pub fn component_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    UserJourneyQuery::with_registry(index, registry)
        .for_api(components_api())
        .with_predicate(created_predicate(&[HUMAN_USER]))
        .with_fields([
            "application",
            "component",
            "name",
            "src_context",
            "src_revision",
            "src_url",
            "userId",
        ])
        .render()
}

/// Creation of AppStudio build PipelineRuns
pub fn build_pipeline_run_created_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    UserJourneyQuery::with_registry(index, registry)
        .for_api(pipelineruns_api())
        .with_predicate(created_predicate(&[BUILD_PIPELINE]))
        .with_event_expr(r#""Build PipelineRun created""#)
        .with_fields(BUILD_FIELDS)
        .render()
}

/// Start of AppStudio build PipelineRuns
pub fn build_pipeline_run_started_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    UserJourneyQuery::with_registry(index, registry)
        .for_api(pipelineruns_api())
        .with_predicate(format!(
            r#"{STATUS_UPDATE} {BUILD_PIPELINE} "responseObject.status.startTime"="*""#
        ))
        .with_filter(
            StatusConditionFilter::new("Succeeded")
                .with_reasons(["Running"])
                .with_message("Tasks Completed: 0 %"),
        )
        .with_event_expr(r#""Build PipelineRun started""#)
        .with_fields(BUILD_FIELDS)
        .render()
}

/// Completion of AppStudio build PipelineRuns, successful or not
pub fn build_pipeline_run_completed_query(
    index: &str,
    registry: &K8sAuditFieldSet,
) -> Result<String> {
    let succeeded = StatusConditionFilter::new("Succeeded").with_statuses(["True", "False"]);
    let event = format!(
        r#"if({}="True","Build PipelineRun completed","Build PipelineRun failed")"#,
        succeeded.at_index(CONDITION_STATUS)
    );
    UserJourneyQuery::with_registry(index, registry)
        .for_api(pipelineruns_api())
        .with_predicate(format!(
            r#"{STATUS_UPDATE} {BUILD_PIPELINE} "responseObject.status.completionTime"="*""#
        ))
        .with_filter(&succeeded)
        .with_event_expr(event)
        .with_fields(BUILD_FIELDS)
        .with_fields(["status_message", "status_reason"])
        .render()
}

/// Completion of Clair vulnerability scan TaskRuns
pub fn clair_scan_completed_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    let scan_result = TektonTaskResultFilter::new("CLAIR_SCAN_RESULT");
    UserJourneyQuery::with_registry(index, registry)
        .for_api(taskruns_api())
        .with_predicate(format!(
            r#"{STATUS_UPDATE} "responseObject.metadata.labels.tekton.dev/pipelineTask"="clair-scan" "responseObject.status.completionTime"="*""#
        ))
        .with_filter(StatusConditionFilter::new("Succeeded").with_statuses(["True"]))
        .with_filter(&scan_result)
        .with_commands([
            format!("eval clair_scan_result_json={}", scan_result.value_expr()),
            "spath input=clair_scan_result_json".to_string(),
            "rename vulnerabilities.* AS clair_scan_result.vulnerabilities.*".to_string(),
        ])
        .with_event_expr(r#""Clair scan TaskRun completed""#)
        .with_fields([
            "application",
            "component",
            "name",
            "vulnerabilities_critical",
            "vulnerabilities_high",
            "vulnerabilities_low",
            "vulnerabilities_medium",
        ])
        .render()
}

/// Completion of AppStudio Releases, successful or not
pub fn release_completed_query(index: &str, registry: &K8sAuditFieldSet) -> Result<String> {
    let released = StatusConditionFilter::new("Released").with_statuses(["True", "False"]);
    let event = format!(
        r#"if({}="True","Release succeeded","Release failed")"#,
        released.at_index(CONDITION_STATUS)
    );
    UserJourneyQuery::with_registry(index, registry)
        .for_api(releases_api())
        .with_predicate(format!(
            r#"{STATUS_UPDATE} "responseObject.status.completionTime"="*""#
        ))
        .with_filter(&released)
        .with_event_expr(event)
        .with_fields(["application", "name", "status_message", "status_reason"])
        .render()
}
