//! Tag operations: search, create, and attach to assets.
//!
//! Tags are named labels, optionally colored, attachable to one or more
//! assets. The `tag` CLI command composes these operations into a
//! strictly sequential flow: the created (or found) tag id feeds the
//! asset-update step, so the steps may not be reordered.
//!
//! ## Endpoints
//!
//! | Function | API Path |
//! |----------|----------|
//! | [`search_tag_id`] | POST `qps/rest/2.0/search/am/tag` |
//! | [`create_tag`] | POST `qps/rest/2.0/create/am/tag` |
//! | [`add_tag_to_assets`] | POST `qps/rest/2.0/update/am/asset` |

use crate::client::QualysClient;
use crate::envelope::{
    self, AckEnvelope, CreateTagRequest, Criteria, FilterRequest, TagAssetRequest, TagEnvelope,
};
use crate::error::{QualysError, Result};
use crate::hostassets;
use crate::validate;

/// Searches for a tag by exact name and returns its id.
///
/// Both "tag not found" (count 0) and "tag name ambiguous" (count > 1)
/// fail with [`QualysError::CountMismatch`]; the caller cannot tell them
/// apart.
pub async fn search_tag_id(client: &QualysClient, name: &str) -> Result<String> {
    let body = envelope::encode(&FilterRequest::single(Criteria::equals("name", name)))?;
    let response = client.post("qps/rest/2.0/search/am/tag", Some(body)).await?;
    let result: TagEnvelope = envelope::decode(&response)?;
    validate::expect_count(&result, 1)?;
    result
        .tag_id()
        .map(str::to_owned)
        .ok_or(QualysError::MissingPayload { element: "Tag" })
}

/// Creates a tag with the given name and color, returning the new tag id.
///
/// # Errors
///
/// - [`QualysError::CountMismatch`] — the API reported SUCCESS but did not
///   create exactly one tag.
/// - [`QualysError::MissingPayload`] — no `Tag` record in the response.
/// - Transport/codec variants as with every operation.
pub async fn create_tag(client: &QualysClient, name: &str, color: &str) -> Result<String> {
    let body = envelope::encode(&CreateTagRequest::new(name, color))?;
    let response = client.post("qps/rest/2.0/create/am/tag", Some(body)).await?;
    let result: TagEnvelope = envelope::decode(&response)?;
    validate::expect_count(&result, 1)?;
    result
        .tag_id()
        .map(str::to_owned)
        .ok_or(QualysError::MissingPayload { element: "Tag" })
}

/// The outcome of [`ensure_tag`]: the tag id and whether it was created by
/// this call or found by the idempotent search.
#[derive(Debug, Clone)]
pub struct EnsuredTag {
    /// The tag id, created or found.
    pub id: String,
    /// `true` when this call created the tag.
    pub created: bool,
}

/// Returns a usable tag id, creating the tag when necessary.
///
/// With `idempotent` set, an existing tag with the same name is reused and
/// creation is skipped. There is no color guarantee on reuse; the
/// existing tag keeps whatever color it has. A failed search (not found,
/// ambiguous, or any transport error) falls through to creation, matching
/// the fire-and-forget search of the original command.
pub async fn ensure_tag(
    client: &QualysClient,
    name: &str,
    color: &str,
    idempotent: bool,
) -> Result<EnsuredTag> {
    if idempotent {
        if let Ok(id) = search_tag_id(client, name).await {
            return Ok(EnsuredTag { id, created: false });
        }
    }
    let id = create_tag(client, name, color).await?;
    Ok(EnsuredTag { id, created: true })
}

/// Adds a tag (by id) to the assets matched by a filter.
///
/// Every call site filters down to a single asset, so the response must
/// report SUCCESS with count exactly 1.
pub async fn add_tag_to_assets(
    client: &QualysClient,
    criteria: Criteria,
    tag_id: &str,
) -> Result<()> {
    let body = envelope::encode(&TagAssetRequest::new(criteria, tag_id))?;
    let response = client.post("qps/rest/2.0/update/am/asset", Some(body)).await?;
    let ack: AckEnvelope = envelope::decode(&response)?;
    validate::expect_count(&ack, 1)
}

/// Tags the host asset with the given IP address, returning the host id.
///
/// Two sequential steps: resolve the host id by `address EQUALS addr`,
/// then attach the tag via an `id EQUALS <host-id>` filter. The second
/// step depends on the first's result, so they cannot be reordered or
/// parallelized.
pub async fn tag_asset_by_address(
    client: &QualysClient,
    addr: &str,
    tag_id: &str,
) -> Result<String> {
    let host_id = hostassets::resolve_host_id(client, &Criteria::equals("address", addr)).await?;
    add_tag_to_assets(client, Criteria::equals("id", &host_id), tag_id).await?;
    Ok(host_id)
}
