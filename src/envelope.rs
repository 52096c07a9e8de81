//! XML envelope codec for the Qualys QPS REST API.
//!
//! Every request and response on this API is a `ServiceRequest` /
//! `ServiceResponse` XML document. This module defines the typed shapes and
//! the two codec entry points:
//!
//! - [`encode`] serializes any request shape under a `ServiceRequest` root,
//!   prefixed with the standard UTF-8 XML declaration. Field order is fixed
//!   by the shape definition; `field` and `operator` are attributes of a
//!   `Criteria` element and the criteria value is element text, as the
//!   Qualys schema requires.
//! - [`decode`] deserializes a response body into one of the typed envelope
//!   variants. A malformed body, a shape mismatch, or a missing
//!   `responseCode` element fails with [`QualysError::Decode`].
//!
//! Response envelopes come in three variants (acknowledgement, tag, and
//! host asset) sharing the success/count contract through the [`Envelope`]
//! trait, which is what the `validate` module consumes.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;

/// The XML declaration prefixed to every encoded request.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Minimal valid request body, sent when an operation POSTs with no payload
/// (the by-id endpoints identify their target in the path).
pub const EMPTY_SERVICE_REQUEST: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ServiceRequest>\n</ServiceRequest>";

/// The comparison operator used by every current call site.
pub const OPERATOR_EQUALS: &str = "EQUALS";

// ── Request shapes ─────────────────────────────────────────────────────

/// A single field/operator/value filter predicate.
///
/// Serializes as `<Criteria field="..." operator="...">value</Criteria>`:
/// `field` and `operator` are attributes, the compared value is text
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// The asset or tag field the filter applies to (e.g. `name`,
    /// `address`, `id`).
    #[serde(rename = "@field")]
    pub field: String,
    /// The comparison operator. All current call sites use `EQUALS`.
    #[serde(rename = "@operator")]
    pub operator: String,
    /// The literal value to compare against.
    #[serde(rename = "$text")]
    pub value: String,
}

impl Criteria {
    /// Builds an equality predicate on `field`.
    pub fn equals(field: &str, value: &str) -> Self {
        Criteria {
            field: field.to_string(),
            operator: OPERATOR_EQUALS.to_string(),
            value: value.to_string(),
        }
    }
}

/// The `<filters>` element wrapping one or more `Criteria` predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// The filter predicates, ANDed together by the API.
    #[serde(rename = "Criteria")]
    pub criteria: Vec<Criteria>,
}

/// A `ServiceRequest` carrying only a filter list: the body of search and
/// bulk-action operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// The filter predicates.
    pub filters: Filters,
}

impl FilterRequest {
    /// Wraps a single predicate in a request body.
    pub fn single(criteria: Criteria) -> Self {
        FilterRequest {
            filters: Filters {
                criteria: vec![criteria],
            },
        }
    }
}

/// A `ServiceRequest` creating a tag: `data > Tag > { name, color }`,
/// name before color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTagRequest {
    /// The `<data>` element.
    pub data: TagData,
}

/// The `<data>` wrapper of a tag-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagData {
    /// The tag to create.
    #[serde(rename = "Tag")]
    pub tag: TagFields,
}

/// Name and color of a tag being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    /// Tag name. Serialized before `color`; the schema fixes this order.
    pub name: String,
    /// Tag color as a `#RRGGBB` string.
    pub color: String,
}

impl CreateTagRequest {
    /// Builds a tag-creation body.
    pub fn new(name: &str, color: &str) -> Self {
        CreateTagRequest {
            data: TagData {
                tag: TagFields {
                    name: name.to_string(),
                    color: color.to_string(),
                },
            },
        }
    }
}

/// A `ServiceRequest` adding a tag (by id) to the assets matched by a
/// filter: `filters > Criteria` followed by
/// `data > Asset > tags > add > TagSimple > id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssetRequest {
    /// The filter selecting which assets to update.
    pub filters: Filters,
    /// The `<data>` element carrying the tag addition.
    pub data: AssetData,
}

/// The `<data>` wrapper of an asset-update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    /// The asset mutation.
    #[serde(rename = "Asset")]
    pub asset: AssetTags,
}

/// The `<Asset>` element of an asset-update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTags {
    /// The tag changes to apply.
    pub tags: TagChanges,
}

/// The `<tags>` element; only additions are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagChanges {
    /// Tags to add.
    pub add: TagAdditions,
}

/// The `<add>` element wrapping the tag reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAdditions {
    /// The tag, referenced by id only.
    #[serde(rename = "TagSimple")]
    pub tag_simple: TagSimple,
}

/// A tag reference carrying just the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSimple {
    /// The tag id.
    pub id: String,
}

impl TagAssetRequest {
    /// Builds an asset-update body attaching `tag_id` to the assets matched
    /// by `criteria`.
    pub fn new(criteria: Criteria, tag_id: &str) -> Self {
        TagAssetRequest {
            filters: Filters {
                criteria: vec![criteria],
            },
            data: AssetData {
                asset: AssetTags {
                    tags: TagChanges {
                        add: TagAdditions {
                            tag_simple: TagSimple {
                                id: tag_id.to_string(),
                            },
                        },
                    },
                },
            },
        }
    }
}

// ── Response shapes ────────────────────────────────────────────────────

/// The success/count contract shared by every response envelope variant.
///
/// The `validate` module works against this trait so the same checks apply
/// to acknowledgement, tag, and host-asset envelopes.
pub trait Envelope {
    /// The mandatory `responseCode` value.
    fn response_code(&self) -> &str;
    /// The optional `count` value. `None` when the element was absent.
    fn count(&self) -> Option<u32>;
}

/// A bare acknowledgement envelope: response code and count, payload
/// ignored. Used by deactivate, uninstall, delete, and update operations.
#[derive(Debug, Deserialize)]
pub struct AckEnvelope {
    /// The Qualys response code.
    #[serde(rename = "responseCode")]
    pub response_code: String,
    /// Number of entities the operation affected.
    #[serde(default)]
    pub count: Option<u32>,
}

impl Envelope for AckEnvelope {
    fn response_code(&self) -> &str {
        &self.response_code
    }

    fn count(&self) -> Option<u32> {
        self.count
    }
}

/// A tag envelope: `data > Tag` records, as returned by tag search and tag
/// creation.
#[derive(Debug, Deserialize)]
pub struct TagEnvelope {
    /// The Qualys response code.
    #[serde(rename = "responseCode")]
    pub response_code: String,
    /// Number of matched/created tags.
    #[serde(default)]
    pub count: Option<u32>,
    /// The `<data>` payload, absent on empty results.
    #[serde(default)]
    pub data: Option<TagRecords>,
}

/// The `<data>` element of a tag envelope.
#[derive(Debug, Default, Deserialize)]
pub struct TagRecords {
    /// The returned tags. Search results may carry several.
    #[serde(rename = "Tag", default)]
    pub tags: Vec<TagRecord>,
}

/// A tag as returned by the API. Fields beyond id/name are ignored.
#[derive(Debug, Deserialize)]
pub struct TagRecord {
    /// The tag id.
    pub id: String,
    /// The tag name, when returned.
    #[serde(default)]
    pub name: Option<String>,
}

impl TagEnvelope {
    /// Returns the id of the first (and, at every call site, only) tag in
    /// the payload.
    pub fn tag_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.tags.first())
            .map(|tag| tag.id.as_str())
    }
}

impl Envelope for TagEnvelope {
    fn response_code(&self) -> &str {
        &self.response_code
    }

    fn count(&self) -> Option<u32> {
        self.count
    }
}

/// A host-asset envelope: `data > HostAsset` records, as returned by the
/// host-asset search endpoint.
#[derive(Debug, Deserialize)]
pub struct HostEnvelope {
    /// The Qualys response code.
    #[serde(rename = "responseCode")]
    pub response_code: String,
    /// Number of matched host assets.
    #[serde(default)]
    pub count: Option<u32>,
    /// The `<data>` payload, absent on empty results.
    #[serde(default)]
    pub data: Option<HostRecords>,
}

/// The `<data>` element of a host-asset envelope.
#[derive(Debug, Default, Deserialize)]
pub struct HostRecords {
    /// The returned host assets.
    #[serde(rename = "HostAsset", default)]
    pub host_assets: Vec<HostRecord>,
}

/// A host asset as returned by the API. The search response carries many
/// more fields; only the id is needed here.
#[derive(Debug, Deserialize)]
pub struct HostRecord {
    /// The host asset id.
    pub id: String,
}

impl HostEnvelope {
    /// Returns the id of the first matched host asset.
    pub fn host_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.host_assets.first())
            .map(|host| host.id.as_str())
    }
}

impl Envelope for HostEnvelope {
    fn response_code(&self) -> &str {
        &self.response_code
    }

    fn count(&self) -> Option<u32> {
        self.count
    }
}

// ── Codec ──────────────────────────────────────────────────────────────

/// Serializes a request shape to XML under a `ServiceRequest` root,
/// prefixed with the UTF-8 XML declaration.
///
/// Output is deterministic: element order follows the shape's field order
/// and nested elements are indented two spaces.
pub fn encode<T: Serialize>(request: &T) -> Result<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some("ServiceRequest"))?;
    serializer.indent(' ', 2);
    request.serialize(serializer)?;
    Ok(format!("{XML_DECLARATION}\n{body}"))
}

/// Deserializes a response body into the expected envelope shape.
pub fn decode<T: DeserializeOwned>(xml: &str) -> Result<T> {
    Ok(quick_xml::de::from_str(xml)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_filter_encodes_to_documented_schema() {
        let request = FilterRequest::single(Criteria::equals("name", "abc123"));
        let xml = encode(&request).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <ServiceRequest>\n  \
                        <filters>\n    \
                        <Criteria field=\"name\" operator=\"EQUALS\">abc123</Criteria>\n  \
                        </filters>\n\
                        </ServiceRequest>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn equality_filter_round_trips() {
        // Round-trip law: decoding an encoded filter yields a structure
        // identical to constructing the filter directly.
        let request = FilterRequest::single(Criteria::equals("name", "abc123"));
        let xml = encode(&request).unwrap();
        let restored: FilterRequest = decode(&xml).unwrap();
        assert_eq!(restored, request);
    }

    #[test]
    fn criteria_value_is_escaped_and_round_trips() {
        let request = FilterRequest::single(Criteria::equals("name", "a&b<c"));
        let xml = encode(&request).unwrap();
        assert!(
            xml.contains("a&amp;b&lt;c"),
            "special characters must be escaped in the wire form: {xml}"
        );
        let restored: FilterRequest = decode(&xml).unwrap();
        assert_eq!(restored, request);
    }

    #[test]
    fn create_tag_encodes_name_before_color() {
        let request = CreateTagRequest::new("EES-smp-testtag", "#FFFFFF");
        let xml = encode(&request).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <ServiceRequest>\n  \
                        <data>\n    \
                        <Tag>\n      \
                        <name>EES-smp-testtag</name>\n      \
                        <color>#FFFFFF</color>\n    \
                        </Tag>\n  \
                        </data>\n\
                        </ServiceRequest>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn tag_asset_request_nests_filter_then_data() {
        let request = TagAssetRequest::new(Criteria::equals("id", "441126"), "25697744");
        let xml = encode(&request).unwrap();
        // The schema requires filters before data, and the tag reference
        // wrapped as data > Asset > tags > add > TagSimple > id.
        let filters_at = xml.find("<filters>").expect("filters element");
        let data_at = xml.find("<data>").expect("data element");
        assert!(filters_at < data_at, "filters must precede data");
        assert!(xml.contains("<Criteria field=\"id\" operator=\"EQUALS\">441126</Criteria>"));
        assert!(xml.contains("<TagSimple>"));
        assert!(xml.contains("<id>25697744</id>"));
    }

    #[test]
    fn empty_service_request_carries_declaration() {
        assert!(EMPTY_SERVICE_REQUEST.starts_with(XML_DECLARATION));
        assert!(EMPTY_SERVICE_REQUEST.contains("<ServiceRequest>"));
    }

    #[test]
    fn ack_envelope_decodes_code_and_count() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceResponse xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <responseCode>SUCCESS</responseCode>
  <count>1</count>
</ServiceResponse>"#;
        let envelope: AckEnvelope = decode(xml).unwrap();
        assert_eq!(envelope.response_code, "SUCCESS");
        assert_eq!(envelope.count, Some(1));
    }

    #[test]
    fn ack_envelope_without_count_decodes_to_none() {
        let xml = "<ServiceResponse><responseCode>SUCCESS</responseCode></ServiceResponse>";
        let envelope: AckEnvelope = decode(xml).unwrap();
        assert_eq!(envelope.count, None);
    }

    #[test]
    fn envelope_without_response_code_fails_to_decode() {
        // Every Qualys envelope must carry a responseCode; its absence is a
        // codec failure, not a silent default.
        let xml = "<ServiceResponse><count>1</count></ServiceResponse>";
        assert!(decode::<AckEnvelope>(xml).is_err());
    }

    #[test]
    fn malformed_xml_fails_to_decode() {
        assert!(decode::<AckEnvelope>("<ServiceResponse><responseCode>").is_err());
    }

    #[test]
    fn tag_envelope_exposes_first_tag_id() {
        let xml = r#"<ServiceResponse>
  <responseCode>SUCCESS</responseCode>
  <count>1</count>
  <data>
    <Tag>
      <id>25697744</id>
      <name>abc123</name>
    </Tag>
  </data>
</ServiceResponse>"#;
        let envelope: TagEnvelope = decode(xml).unwrap();
        assert_eq!(envelope.count, Some(1));
        assert_eq!(envelope.tag_id(), Some("25697744"));
        assert_eq!(
            envelope.data.as_ref().unwrap().tags[0].name.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn tag_envelope_with_empty_result_has_no_id() {
        let xml = r#"<ServiceResponse>
  <responseCode>SUCCESS</responseCode>
  <count>0</count>
</ServiceResponse>"#;
        let envelope: TagEnvelope = decode(xml).unwrap();
        assert_eq!(envelope.count, Some(0));
        assert_eq!(envelope.tag_id(), None);
    }

    #[test]
    fn host_envelope_ignores_extra_host_fields() {
        // The real search response carries dozens of HostAsset children;
        // everything but the id must be skipped without error.
        let xml = r#"<ServiceResponse>
  <responseCode>SUCCESS</responseCode>
  <count>1</count>
  <data>
    <HostAsset>
      <id>441126</id>
      <name>host01.internal</name>
      <address>10.0.0.15</address>
      <trackingMethod>QAGENT</trackingMethod>
    </HostAsset>
  </data>
</ServiceResponse>"#;
        let envelope: HostEnvelope = decode(xml).unwrap();
        assert_eq!(envelope.host_id(), Some("441126"));
    }
}
