//! Conversion from raw data views to editor index patterns.
//!
//! A [`RawDataView`] is what a data view source returns. [`convert_data_view`]
//! turns it into an [`IndexPattern`]:
//!
//! 1. Drop nested subfields and fields that are neither aggregatable nor scripted
//! 2. Append the synthetic document field
//! 3. Flag meta fields
//! 4. Attach aggregation restrictions from `typeMeta.aggs`
//! 5. Sort by display name

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{AggregationRestrictions, IndexPattern, IndexPatternField, TypeMeta};

/// Meta fields assumed when a data view does not list its own.
pub const DEFAULT_META_FIELDS: &[&str] = &["_source", "_id", "_type", "_index", "_score"];

/// Nested-field marker on a raw field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi: Option<serde_json::Value>,
}

/// A field as stored in a data view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub es_types: Vec<String>,
    #[serde(default)]
    pub aggregatable: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub scripted: bool,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub sub_type: Option<RawSubType>,
}

impl RawField {
    /// Create an aggregatable, searchable field of the given type.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            es_types: Vec::new(),
            aggregatable: true,
            searchable: true,
            scripted: false,
            custom_label: None,
            sub_type: None,
        }
    }

    fn is_nested(&self) -> bool {
        self.sub_type
            .as_ref()
            .map(|s| s.nested.is_some())
            .unwrap_or(false)
    }

    fn display_name(&self) -> String {
        self.custom_label
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }
}

/// A full data view as returned by a [`DataViewSource`](crate::source::DataViewSource).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataView {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub time_field_name: Option<String>,
    #[serde(default, deserialize_with = "fields_from_list_or_map")]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub type_meta: Option<TypeMeta>,
    #[serde(default)]
    pub meta_fields: Option<Vec<String>>,
    #[serde(default)]
    pub field_format_map: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default = "default_persisted")]
    pub persisted: bool,
}

fn default_persisted() -> bool {
    true
}

/// The REST API returns fields keyed by name; fixtures list them.
fn fields_from_list_or_map<'de, D>(deserializer: D) -> Result<Vec<RawField>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldList {
        List(Vec<RawField>),
        Map(BTreeMap<String, RawField>),
    }

    Ok(match FieldList::deserialize(deserializer)? {
        FieldList::List(fields) => fields,
        FieldList::Map(fields) => fields.into_values().collect(),
    })
}

impl RawDataView {
    /// Create a persisted data view with no fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            name: None,
            time_field_name: None,
            fields: Vec::new(),
            type_meta: None,
            meta_fields: None,
            field_format_map: None,
            persisted: true,
        }
    }

    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field_name = Some(name.into());
        self
    }

    pub fn with_type_meta(mut self, type_meta: TypeMeta) -> Self {
        self.type_meta = Some(type_meta);
        self
    }

    pub fn with_meta_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_fields = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Convert a raw data view into an editor index pattern.
pub fn convert_data_view(raw: RawDataView) -> IndexPattern {
    let meta_keys: HashSet<&str> = match &raw.meta_fields {
        Some(names) => names.iter().map(String::as_str).collect(),
        None => DEFAULT_META_FIELDS.iter().copied().collect(),
    };

    let mut fields: Vec<IndexPatternField> = raw
        .fields
        .iter()
        .filter(|f| !f.is_nested() && (f.aggregatable || f.scripted))
        .map(|f| IndexPatternField {
            name: f.name.clone(),
            display_name: f.display_name(),
            field_type: f.field_type.clone(),
            aggregatable: f.aggregatable,
            searchable: f.searchable,
            meta: meta_keys.contains(f.name.as_str()),
            es_types: f.es_types.clone(),
            scripted: f.scripted,
            custom_label: f.custom_label.clone(),
            aggregation_restrictions: None,
        })
        .collect();
    fields.push(IndexPatternField::document());

    let has_restrictions = raw
        .type_meta
        .as_ref()
        .map(|m| m.aggs.is_some())
        .unwrap_or(false);

    if let Some(aggs) = raw.type_meta.as_ref().and_then(|m| m.aggs.as_ref()) {
        for field in &mut fields {
            let restrictions: AggregationRestrictions = aggs
                .iter()
                .filter_map(|(agg, by_field)| {
                    by_field
                        .get(&field.name)
                        .map(|restriction| (agg.clone(), restriction.clone()))
                })
                .collect();

            if !restrictions.is_empty() {
                field.aggregation_restrictions = Some(restrictions);
            }
        }
    }

    fields.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    IndexPattern {
        id: raw.id,
        title: raw.title,
        name: raw.name,
        fields,
        type_meta: raw.type_meta,
        time_field_name: raw.time_field_name,
        field_format_map: raw.field_format_map,
        has_restrictions,
        persisted: raw.persisted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_pattern::types::{AggregationRestriction, DOCUMENT_FIELD_NAME};
    use proptest::prelude::*;

    fn rollup_type_meta() -> TypeMeta {
        let mut date_histogram = BTreeMap::new();
        date_histogram.insert(
            "timestamp".to_string(),
            AggregationRestriction::new("date_histogram")
                .with_param("fixed_interval", serde_json::json!("1d"))
                .with_param("time_zone", serde_json::json!("UTC")),
        );
        let mut sum = BTreeMap::new();
        sum.insert("bytes".to_string(), AggregationRestriction::new("sum"));
        let mut histogram = BTreeMap::new();
        histogram.insert(
            "bytes".to_string(),
            AggregationRestriction::new("histogram")
                .with_param("interval", serde_json::json!(1000)),
        );

        let mut aggs = BTreeMap::new();
        aggs.insert("date_histogram".to_string(), date_histogram);
        aggs.insert("sum".to_string(), sum);
        aggs.insert("histogram".to_string(), histogram);

        TypeMeta {
            aggs: Some(aggs),
            params: None,
        }
    }

    #[test]
    fn test_document_field_is_appended() {
        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*").with_field(RawField::new("host", "string")),
        );

        assert_eq!(pattern.fields.len(), 2);
        assert!(pattern.get_field_by_name(DOCUMENT_FIELD_NAME).is_some());
    }

    #[test]
    fn test_fields_sorted_by_display_name() {
        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*")
                .with_field(RawField::new("start_date", "date"))
                .with_field(RawField::new("bytes", "number"))
                .with_field(RawField::new("dest", "string")),
        );

        let names: Vec<&str> = pattern.fields.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, vec!["Records", "bytes", "dest", "start_date"]);
    }

    #[test]
    fn test_meta_flag_uses_meta_fields() {
        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*")
                .with_field(RawField::new("_id", "string"))
                .with_field(RawField::new("source", "string"))
                .with_meta_fields(["_id", "_index"]),
        );

        assert!(pattern.get_field_by_name("_id").unwrap().meta);
        assert!(!pattern.get_field_by_name("source").unwrap().meta);
    }

    #[test]
    fn test_meta_flag_defaults() {
        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*").with_field(RawField::new("_index", "string")),
        );
        assert!(pattern.get_field_by_name("_index").unwrap().meta);
    }

    #[test]
    fn test_skips_nested_and_non_aggregatable_fields() {
        let mut nested = RawField::new("user.name", "string");
        nested.sub_type = Some(RawSubType {
            nested: Some(serde_json::json!({ "path": "user" })),
            multi: None,
        });
        let mut unaggregatable = RawField::new("message", "string");
        unaggregatable.aggregatable = false;
        let mut scripted = RawField::new("hour_of_day", "number");
        scripted.aggregatable = false;
        scripted.scripted = true;

        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*")
                .with_field(nested)
                .with_field(unaggregatable)
                .with_field(scripted),
        );

        assert!(pattern.get_field_by_name("user.name").is_none());
        assert!(pattern.get_field_by_name("message").is_none());
        assert!(pattern.get_field_by_name("hour_of_day").is_some());
    }

    #[test]
    fn test_custom_label_becomes_display_name() {
        let mut field = RawField::new("bytes", "number");
        field.custom_label = Some("Bytes transferred".to_string());
        let pattern = convert_data_view(RawDataView::new("a", "logs-*").with_field(field));

        let bytes = pattern.get_field_by_name("bytes").unwrap();
        assert_eq!(bytes.display_name, "Bytes transferred");
    }

    #[test]
    fn test_aggregation_restrictions() {
        let pattern = convert_data_view(
            RawDataView::new("rollup", "my-rollup-index")
                .with_field(RawField::new("timestamp", "date"))
                .with_field(RawField::new("bytes", "number"))
                .with_field(RawField::new("source", "string"))
                .with_type_meta(rollup_type_meta()),
        );

        assert!(pattern.has_restrictions);

        let timestamp = pattern.get_field_by_name("timestamp").unwrap();
        let restrictions = timestamp.aggregation_restrictions.as_ref().unwrap();
        assert_eq!(restrictions.len(), 1);
        assert_eq!(restrictions["date_histogram"].agg, "date_histogram");
        assert_eq!(
            restrictions["date_histogram"].params.get("time_zone"),
            Some(&serde_json::json!("UTC"))
        );

        let bytes = pattern.get_field_by_name("bytes").unwrap();
        let restrictions = bytes.aggregation_restrictions.as_ref().unwrap();
        let aggs: Vec<&str> = restrictions.keys().map(String::as_str).collect();
        assert_eq!(aggs, vec!["histogram", "sum"]);

        assert!(pattern
            .get_field_by_name("source")
            .unwrap()
            .aggregation_restrictions
            .is_none());
    }

    #[test]
    fn test_no_type_meta_means_no_restrictions() {
        let pattern = convert_data_view(
            RawDataView::new("a", "logs-*").with_field(RawField::new("bytes", "number")),
        );
        assert!(!pattern.has_restrictions);
        assert!(pattern.fields.iter().all(|f| f.aggregation_restrictions.is_none()));
    }

    #[test]
    fn test_type_meta_without_aggs_has_no_restrictions() {
        let pattern = convert_data_view(RawDataView::new("a", "logs-*").with_type_meta(TypeMeta {
            aggs: None,
            params: Some(serde_json::json!({ "rollup_index": "r" })),
        }));
        assert!(!pattern.has_restrictions);
    }

    #[test]
    fn test_deserialize_fields_as_map() {
        let raw: RawDataView = serde_json::from_value(serde_json::json!({
            "id": "ff959d40",
            "title": "kibana_sample_data_logs",
            "timeFieldName": "timestamp",
            "fields": {
                "bytes": { "name": "bytes", "type": "number", "aggregatable": true, "searchable": true },
                "timestamp": { "name": "timestamp", "type": "date", "aggregatable": true, "searchable": true }
            }
        }))
        .unwrap();

        assert_eq!(raw.fields.len(), 2);
        assert_eq!(raw.time_field_name.as_deref(), Some("timestamp"));
        assert!(raw.persisted);
    }

    #[test]
    fn test_deserialize_fields_as_list() {
        let raw: RawDataView = serde_json::from_value(serde_json::json!({
            "id": "a",
            "title": "logs-*",
            "fields": [ { "name": "bytes", "type": "number", "esTypes": ["long"] } ],
            "persisted": false
        }))
        .unwrap();

        assert_eq!(raw.fields[0].es_types, vec!["long".to_string()]);
        assert!(!raw.fields[0].aggregatable);
        assert!(!convert_data_view(raw).is_persisted());
    }

    proptest! {
        #[test]
        fn prop_every_field_has_document_and_sorted(names in proptest::collection::vec("[a-z_]{1,12}", 0..20)) {
            let mut raw = RawDataView::new("p", "p-*");
            for name in &names {
                raw = raw.with_field(RawField::new(name.clone(), "string"));
            }
            let pattern = convert_data_view(raw);

            prop_assert_eq!(pattern.fields.len(), names.len() + 1);
            prop_assert!(pattern.fields.iter().any(|f| f.is_document()));
            for pair in pattern.fields.windows(2) {
                prop_assert!(pair[0].display_name <= pair[1].display_name);
            }
        }
    }
}
