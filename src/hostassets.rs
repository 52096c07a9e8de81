//! Host asset operations: deactivate, uninstall, clean, and search.
//!
//! This module covers the asset side of the QPS REST 2.0 API. Two families:
//!
//! - **By id** — the target is named in the path and no request body is
//!   needed. Each of these is a single-entity mutation, so the response
//!   must report SUCCESS with count exactly 1.
//! - **By criteria** — the target set is a filter in the request body.
//!   Bulk actions may affect any number of entities, so only the response
//!   code is validated.
//!
//! ## Endpoints
//!
//! | Function | API Path |
//! |----------|----------|
//! | [`deactivate_by_id`] | POST `qps/rest/2.0/deactivateByID/am/asset/{id}` |
//! | [`uninstall_by_id`] | POST `qps/rest/2.0/uninstallByID/am/asset/{id}` |
//! | [`clean_by_criteria`] | POST `qps/rest/2.0/deactivate/am/asset`, `.../uninstall/am/asset`, `.../delete/am/tag` |
//! | [`resolve_host_id`] | POST `qps/rest/2.0/search/am/hostasset/` |

use crate::client::QualysClient;
use crate::envelope::{self, AckEnvelope, Criteria, FilterRequest, HostEnvelope};
use crate::error::{QualysError, Result};
use crate::validate;

/// Deactivates the agent modules (VM and PC) on a host asset.
///
/// # Errors
///
/// - [`QualysError::CountMismatch`] — the API reported SUCCESS but did not
///   deactivate exactly one asset (unknown id, already deactivated).
/// - [`QualysError::Unsuccessful`] — non-SUCCESS response code.
/// - [`QualysError::Transport`] / [`QualysError::Network`] /
///   [`QualysError::Decode`] — HTTP or codec failure.
pub async fn deactivate_by_id(client: &QualysClient, id: &str) -> Result<()> {
    let path = format!("qps/rest/2.0/deactivateByID/am/asset/{id}?=&module=AGENT_VM%2CAGENT_PC");
    let ack: AckEnvelope = envelope::decode(&client.post(&path, None).await?)?;
    validate::expect_count(&ack, 1)
}

/// Uninstalls the agent from a host asset, removing it from the inventory.
///
/// # Errors
///
/// Same error variants as [`deactivate_by_id`].
pub async fn uninstall_by_id(client: &QualysClient, id: &str) -> Result<()> {
    let path = format!("qps/rest/2.0/uninstallByID/am/asset/{id}?=");
    let ack: AckEnvelope = envelope::decode(&client.post(&path, None).await?)?;
    validate::expect_count(&ack, 1)
}

/// Deactivates and then uninstalls a host by id, in that order.
///
/// The sequence short-circuits: if deactivation fails (including a
/// confirmed-but-count-zero response), uninstall is never attempted. The
/// operation is not transactional; a failure after deactivation leaves
/// the asset deactivated but still installed.
pub async fn clean_by_id(client: &QualysClient, id: &str) -> Result<()> {
    deactivate_by_id(client, id).await?;
    uninstall_by_id(client, id).await
}

/// Selects which criteria-based cleanup actions to run, and the failure
/// policy across them.
#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    /// Deactivate the agent modules on matching assets.
    pub deactivate: bool,
    /// Uninstall the agent from matching assets.
    pub uninstall: bool,
    /// Delete matching tags.
    pub delete_tag: bool,
    /// Stop at the first failing action instead of attempting the rest.
    ///
    /// Off by default: every requested action is attempted even when an
    /// earlier one failed, and the first error encountered is returned
    /// once all have run. Callers that need all-or-nothing-from-here
    /// semantics set this flag.
    pub stop_on_error: bool,
}

/// Runs the requested cleanup actions against a single filter predicate.
///
/// Builds one filter-based request per requested action. Actions run in a
/// fixed order: deactivate, uninstall, delete-tag. Only the response code
/// is validated, since bulk actions may affect any number of entities.
///
/// Failure policy follows [`SweepPlan::stop_on_error`]. Note the contrast
/// with [`clean_by_id`], which always short-circuits. With the default
/// policy, a returned error does not say which of the later actions
/// succeeded.
///
/// # Errors
///
/// The first error encountered, after all requested actions ran (default)
/// or immediately (`stop_on_error`).
pub async fn clean_by_criteria(
    client: &QualysClient,
    criteria: &Criteria,
    plan: &SweepPlan,
) -> Result<()> {
    let body = envelope::encode(&FilterRequest::single(criteria.clone()))?;

    let steps = [
        (
            plan.deactivate,
            "qps/rest/2.0/deactivate/am/asset?module=AGENT_VM%2CAGENT_PC",
        ),
        (plan.uninstall, "qps/rest/2.0/uninstall/am/asset"),
        (plan.delete_tag, "qps/rest/2.0/delete/am/tag"),
    ];

    let mut first_error = None;
    for (requested, path) in steps {
        if !requested {
            continue;
        }
        if let Err(err) = filter_action(client, path, body.clone()).await {
            if plan.stop_on_error {
                return Err(err);
            }
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn filter_action(client: &QualysClient, path: &str, body: String) -> Result<()> {
    let ack: AckEnvelope = envelope::decode(&client.post(path, Some(body)).await?)?;
    validate::expect_success(&ack)
}

/// Searches the host-asset inventory and returns the single matching id.
///
/// # Errors
///
/// - [`QualysError::CountMismatch`] — no match, or more than one. The two
///   cases are not distinguished.
/// - [`QualysError::MissingPayload`] — count said 1 but no `HostAsset`
///   record came back.
/// - Transport/codec variants as with every operation.
pub async fn resolve_host_id(client: &QualysClient, criteria: &Criteria) -> Result<String> {
    let body = envelope::encode(&FilterRequest::single(criteria.clone()))?;
    let response = client
        .post("qps/rest/2.0/search/am/hostasset/", Some(body))
        .await?;
    let result: HostEnvelope = envelope::decode(&response)?;
    validate::expect_count(&result, 1)?;
    result
        .host_id()
        .map(str::to_owned)
        .ok_or(QualysError::MissingPayload {
            element: "HostAsset",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_plan_defaults_to_no_actions_and_continue_on_error() {
        let plan = SweepPlan::default();
        assert!(!plan.deactivate);
        assert!(!plan.uninstall);
        assert!(!plan.delete_tag);
        assert!(!plan.stop_on_error);
    }
}
