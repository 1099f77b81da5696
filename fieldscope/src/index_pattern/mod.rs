//! Index pattern data model.
//!
//! Raw data views come from a [`DataViewSource`](crate::source::DataViewSource)
//! and are converted once into [`IndexPattern`] values, which the loader keeps
//! in an [`IndexPatternMap`].

mod convert;
mod types;

pub use convert::{convert_data_view, RawDataView, RawField, RawSubType, DEFAULT_META_FIELDS};
pub use types::{
    AggregationRestriction, AggregationRestrictions, IndexPattern, IndexPatternField,
    IndexPatternMap, IndexPatternRef, TypeMeta, DOCUMENT_FIELD_DISPLAY_NAME, DOCUMENT_FIELD_NAME,
    DOCUMENT_FIELD_TYPE,
};
