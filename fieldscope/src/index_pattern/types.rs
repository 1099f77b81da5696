//! Editor-facing index pattern types.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of the synthetic field that stands for "count of documents".
pub const DOCUMENT_FIELD_NAME: &str = "___records___";

/// Display name of the synthetic document field.
pub const DOCUMENT_FIELD_DISPLAY_NAME: &str = "Records";

/// Field type of the synthetic document field.
pub const DOCUMENT_FIELD_TYPE: &str = "document";

/// Cache of loaded index patterns keyed by id.
///
/// Patterns are shared behind `Arc` so that copying a cache into a new one
/// never clones field lists.
pub type IndexPatternMap = BTreeMap<String, Arc<IndexPattern>>;

/// Restriction parameters for one aggregation on one field.
///
/// `agg` names the only aggregation type allowed; anything else the index
/// reports (interval, time zone, ...) is kept verbatim in `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRestriction {
    /// Aggregation type this restriction applies to.
    pub agg: String,

    /// Remaining restriction parameters.
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl AggregationRestriction {
    /// Create a restriction without extra parameters.
    pub fn new(agg: impl Into<String>) -> Self {
        Self {
            agg: agg.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Aggregation name → restriction, as attached to a single field.
pub type AggregationRestrictions = BTreeMap<String, AggregationRestriction>;

/// Restriction metadata carried by rollup-style data views.
///
/// `aggs` maps aggregation name → field name → restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggs: Option<BTreeMap<String, BTreeMap<String, AggregationRestriction>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A field as the editor sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatternField {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub aggregatable: bool,
    pub searchable: bool,

    /// True when the name is one of the owning pattern's meta fields.
    #[serde(default)]
    pub meta: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub es_types: Vec<String>,

    #[serde(default)]
    pub scripted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_restrictions: Option<AggregationRestrictions>,
}

impl IndexPatternField {
    /// The synthetic "document count" field appended to every pattern.
    pub fn document() -> Self {
        Self {
            name: DOCUMENT_FIELD_NAME.to_string(),
            display_name: DOCUMENT_FIELD_DISPLAY_NAME.to_string(),
            field_type: DOCUMENT_FIELD_TYPE.to_string(),
            aggregatable: true,
            searchable: true,
            meta: false,
            es_types: Vec::new(),
            scripted: false,
            custom_label: None,
            aggregation_restrictions: None,
        }
    }

    /// Whether this is the synthetic document field.
    pub fn is_document(&self) -> bool {
        self.field_type == DOCUMENT_FIELD_TYPE
    }
}

/// A loaded, converted index pattern.
///
/// Immutable once built. A reload replaces the whole value in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPattern {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Fields sorted by display name, document field included.
    pub fields: Vec<IndexPatternField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_meta: Option<TypeMeta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_format_map: Option<BTreeMap<String, serde_json::Value>>,

    pub has_restrictions: bool,

    pub(crate) persisted: bool,
}

impl IndexPattern {
    /// Whether the data view is saved (as opposed to an ad-hoc view).
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Look up a field by its name.
    pub fn get_field_by_name(&self, name: &str) -> Option<&IndexPatternField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate over field names, document field included.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Id/title summary returned by the data view listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPatternRef {
    pub id: String,
    pub title: String,
}

impl IndexPatternRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
