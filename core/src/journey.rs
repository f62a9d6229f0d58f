//! Built-in field sets mapping K8s audit records to user journey events.

use std::sync::LazyLock;

use crate::fieldset::{FieldSet, FieldSpec};
use crate::registry::{K8sApiId, K8sAuditFieldSet};

/// Sub-object holding event properties
pub const PROPERTIES: &str = "properties";
/// Sub-object holding event context
pub const CONTEXT: &str = "context";

/// Fields included in every user journey event
pub const COMMON_FIELDS: [&str; 10] = [
    "apiGroup",
    "apiVersion",
    "event_subject",
    "event_verb",
    "kind",
    "messageId",
    "namespace",
    "timestamp",
    "type",
    "userAgent",
];

pub const APPSTUDIO_GROUP: &str = "appstudio.redhat.com";
pub const TEKTON_GROUP: &str = "tekton.dev";

pub fn applications_api() -> K8sApiId {
    K8sApiId::new(APPSTUDIO_GROUP, "applications")
}

pub fn components_api() -> K8sApiId {
    K8sApiId::new(APPSTUDIO_GROUP, "components")
}

pub fn releases_api() -> K8sApiId {
    K8sApiId::new(APPSTUDIO_GROUP, "releases")
}

pub fn pipelineruns_api() -> K8sApiId {
    K8sApiId::new(TEKTON_GROUP, "pipelineruns")
}

pub fn taskruns_api() -> K8sApiId {
    K8sApiId::new(TEKTON_GROUP, "taskruns")
}

fn prop<const N: usize>(src_fields: [&str; N]) -> FieldSpec {
    FieldSpec::from_fields(src_fields).in_sub_object(PROPERTIES)
}

/// The global user journey field set
pub fn user_journey_field_set() -> FieldSet {
    FieldSet::new()
        .with("messageId", FieldSpec::from_fields(["auditID"]))
        .with("timestamp", FieldSpec::from_fields(["requestReceivedTimestamp"]))
        .with("type", FieldSpec::from_expr(r#""track""#))
        .with("userAgent", FieldSpec::new().in_sub_object(CONTEXT))
        .with(
            "userId",
            FieldSpec::from_fields(["impersonatedUser.username", "user.username"]),
        )
        .with("namespace", FieldSpec::from_fields(["objectRef.namespace"]))
        .with("event_verb", FieldSpec::from_fields(["verb"]))
        .with("event_subject", FieldSpec::from_fields(["objectRef.resource"]))
        .with("apiGroup", prop(["objectRef.apiGroup"]))
        .with("apiVersion", prop(["objectRef.apiVersion"]))
        .with("kind", prop(["objectRef.resource"]))
        .with("name", prop(["objectRef.name"]))
        .with("src_url", prop(["responseObject.spec.source.git.url"]))
        .with("src_revision", prop(["responseObject.spec.source.git.revision"]))
        .with("src_context", prop(["responseObject.spec.source.git.context"]))
        .with(
            "application",
            prop([
                "responseObject.spec.application",
                "responseObject.metadata.labels.appstudio.openshift.io/application",
            ]),
        )
        .with(
            "component",
            prop([
                "responseObject.spec.componentName",
                "responseObject.metadata.labels.appstudio.openshift.io/component",
            ]),
        )
        .with(
            "commit_sha",
            prop(["responseObject.metadata.annotations.build.appstudio.redhat.com/commit_sha"]),
        )
        .with(
            "repo",
            prop(["responseObject.metadata.annotations.build.appstudio.openshift.io/repo"])
                .with_expr(
                    r#"replace('responseObject.metadata.annotations.build.appstudio.openshift.io/repo',"^([^?]*)(.*)?","\1")"#,
                ),
        )
        .with(
            "target_branch",
            prop(["responseObject.metadata.annotations.build.appstudio.redhat.com/target_branch"]),
        )
        .with(
            "git_trigger_event_type",
            prop(["responseObject.metadata.annotations.pipelinesascode.tekton.dev/event-type"]),
        )
        .with(
            "git_trigger_provider",
            prop(["responseObject.metadata.annotations.pipelinesascode.tekton.dev/git-provider"]),
        )
        .with(
            "pipeline_log_url",
            prop(["responseObject.metadata.annotations.pipelinesascode.tekton.dev/log-url"]),
        )
        .with(
            "vulnerabilities_critical",
            prop(["clair_scan_result.vulnerabilities.critical"]),
        )
        .with("vulnerabilities_high", prop(["clair_scan_result.vulnerabilities.high"]))
        .with(
            "vulnerabilities_medium",
            prop(["clair_scan_result.vulnerabilities.medium"]),
        )
        .with("vulnerabilities_low", prop(["clair_scan_result.vulnerabilities.low"]))
        .with("merge_url", prop(["build_status.pac.merge-url"]))
}

/// The user journey registry: the global field set plus the overrides for
/// APIs whose objects name themselves.
pub fn user_journey_registry() -> K8sAuditFieldSet {
    K8sAuditFieldSet::new(user_journey_field_set())
        .with_api(
            applications_api(),
            FieldSet::new().with("application", prop(["objectRef.name"])),
        )
        .with_api(
            components_api(),
            FieldSet::new().with(
                "component",
                prop(["responseObject.spec.componentName", "objectRef.name"]),
            ),
        )
        .with_api(
            releases_api(),
            FieldSet::new().with(
                "application",
                prop([
                    "responseObject.metadata.labels.appstudio.openshift.io/application",
                    "responseObject.spec.application",
                ]),
            ),
        )
}

static DEFAULT_REGISTRY: LazyLock<K8sAuditFieldSet> = LazyLock::new(user_journey_registry);

/// The process-wide user journey registry, built on first use
pub fn default_registry() -> &'static K8sAuditFieldSet {
    &DEFAULT_REGISTRY
}
