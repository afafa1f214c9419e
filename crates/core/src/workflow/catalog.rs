//! Built-in catalogue of the suite's test workflows.

use super::WorkflowName;

/// Workflow files run when no explicit list is supplied.
pub const BUILTIN_WORKFLOWS: &[&str] = &[
    "login-nc-v27.yml",
    "login-nc-v28.yml",
    "login-oc-v10.yml",
    "login-ocis-v5.yml",
    "login-os-v1.yml",
    "login-sf-v11.yml",
    "share-link-nc-v27-nc-v27.yml",
    "share-link-nc-v27-nc-v28.yml",
    "share-link-nc-v27-oc-v10.yml",
    "share-link-nc-v27-os-v1.yml",
    "share-link-nc-v28-nc-v27.yml",
    "share-link-nc-v28-nc-v28.yml",
    "share-link-nc-v28-oc-v10.yml",
    "share-link-oc-v10-nc-v27.yml",
    "share-link-oc-v10-nc-v28.yml",
    "share-link-oc-v10-oc-v10.yml",
    "share-with-nc-v27-nc-v27.yml",
    "share-with-nc-v27-nc-v28.yml",
    "share-with-nc-v27-oc-v10.yml",
    "share-with-nc-v27-os-v1.yml",
    "share-with-nc-v28-nc-v27.yml",
    "share-with-nc-v28-nc-v28.yml",
    "share-with-nc-v28-oc-v10.yml",
    "share-with-nc-v28-os-v1.yml",
    "share-with-oc-v10-nc-v27.yml",
    "share-with-oc-v10-nc-v28.yml",
    "share-with-oc-v10-oc-v10.yml",
    "share-with-oc-v10-os-v1.yml",
    "share-with-os-v1-nc-v27.yml",
    "share-with-os-v1-nc-v28.yml",
    "share-with-os-v1-oc-v10.yml",
    "share-with-os-v1-os-v1.yml",
    "share-with-sf-v11-sf-v11.yml",
    "invite-link-nc-sm-v27-nc-sm-v27.yml",
    "invite-link-nc-sm-v27-oc-sm-v10.yml",
    "invite-link-nc-sm-v27-ocis-v5.yml",
    "invite-link-oc-sm-v10-nc-sm-v27.yml",
    "invite-link-oc-sm-v10-oc-sm-v10.yml",
    "invite-link-oc-sm-v10-ocis-v5.yml",
    "invite-link-ocis-v5-nc-sm-v27.yml",
    "invite-link-ocis-v5-oc-sm-v10.yml",
    "invite-link-ocis-v5-ocis-v5.yml",
];

pub fn builtin_workflows() -> Vec<WorkflowName> {
    BUILTIN_WORKFLOWS.iter().copied().map(WorkflowName::from).collect()
}
