//! Field sets scoped to K8s API resource types.

use std::fmt;

use compact_str::{CompactString, ToCompactString};
use hashbrown::HashMap;

use crate::error::Result;
use crate::fieldset::FieldSet;

/// Identifies a K8s API by its API group and resource names.
///
/// The default value stands for "any API".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct K8sApiId {
    pub api_group: CompactString,
    pub resource: CompactString,
}

impl K8sApiId {
    pub fn new(api_group: impl AsRef<str>, resource: impl AsRef<str>) -> Self {
        Self {
            api_group: api_group.as_ref().to_compact_string(),
            resource: resource.as_ref().to_compact_string(),
        }
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.api_group.is_empty() && self.resource.is_empty()
    }

    /// Search terms restricting audit records to this API. Empty for the
    /// default value.
    pub fn search_terms(&self) -> String {
        if self.is_default() {
            return String::new();
        }
        format!(
            "\"objectRef.apiGroup\"=\"{}\" \"objectRef.resource\"=\"{}\"",
            self.api_group, self.resource
        )
    }
}

impl fmt::Display for K8sApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("*")
        } else {
            write!(f, "{}/{}", self.api_group, self.resource)
        }
    }
}

/// Maps K8s API identifiers to field sets.
///
/// The entry for [`K8sApiId::default`] applies to every API. The entry for a
/// specific API, when present, is layered on top of it, so different APIs can
/// use different field settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct K8sAuditFieldSet {
    sets: HashMap<K8sApiId, FieldSet>,
}

impl K8sAuditFieldSet {
    /// A registry whose global entry is `defaults`
    pub fn new(defaults: FieldSet) -> Self {
        let mut sets = HashMap::new();
        sets.insert(K8sApiId::default(), defaults);
        Self { sets }
    }

    /// Sets the field set layered on top of the global entry for `api`
    pub fn with_api(mut self, api: K8sApiId, fields: FieldSet) -> Self {
        self.sets.insert(api, fields);
        self
    }

    /// Layers `fields` on top of the existing entry for `api`
    pub fn extend_api(mut self, api: K8sApiId, fields: &FieldSet) -> Self {
        self.sets.entry(api).or_default().merge(fields);
        self
    }

    pub fn get(&self, api: &K8sApiId) -> Option<&FieldSet> {
        self.sets.get(api)
    }

    /// APIs with a specific entry, sorted
    pub fn apis(&self) -> Vec<&K8sApiId> {
        let mut apis: Vec<&K8sApiId> = self.sets.keys().filter(|a| !a.is_default()).collect();
        apis.sort_unstable();
        apis
    }

    /// Builds the effective field set for `api`: the global entry, then the
    /// entry for `api`, then every `extra` set in order. Later sources replace
    /// colliding specs whole.
    pub fn merged<'e, I>(&self, api: &K8sApiId, extra: I) -> FieldSet
    where
        I: IntoIterator<Item = &'e FieldSet>,
    {
        let mut fields = self.sets.get(&K8sApiId::default()).cloned().unwrap_or_default();
        if !api.is_default() {
            if let Some(specific) = self.sets.get(api) {
                fields.merge(specific);
            }
        }
        for set in extra {
            fields.merge(set);
        }
        fields
    }

    /// Generates a query over the audit records of `api` in `index`.
    pub fn query_gen<'e, S, I>(
        &self,
        index: &str,
        api: &K8sApiId,
        search_expr: &str,
        fields: &[S],
        extra: I,
    ) -> Result<String>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = &'e FieldSet>,
    {
        let search_cmd = search_command(index, api, search_expr);
        self.merged(api, extra).query_gen(&search_cmd, fields)
    }
}

/// The leading `search` command of every audit query
pub fn search_command(index: &str, api: &K8sApiId, predicate: &str) -> String {
    let mut cmd = format!("search index=\"{index}\" log_type=audit");
    for part in [api.search_terms().as_str(), predicate] {
        if !part.is_empty() {
            cmd.push(' ');
            cmd.push_str(part);
        }
    }
    cmd.trim().to_string()
}
