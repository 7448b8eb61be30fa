//! University API resource shape.
//!
//! A room resource is split into independently requested and independently
//! authorized field-sets. Each field-set ends up as its own sub-resource in
//! the envelope, so one failing field-set never blanks out the others.

pub mod envelope;
pub mod translate;

pub use envelope::{Link, Metadata, Property, Resource, Scalar, SubResource, ValidationResponse};
pub use translate::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSet {
    Basic,
    AvState,
    AvConfig,
}

impl FieldSet {
    pub const AVAILABLE: [FieldSet; 3] = [FieldSet::Basic, FieldSet::AvState, FieldSet::AvConfig];
    pub const DEFAULT: [FieldSet; 1] = [FieldSet::Basic];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSet::Basic => "basic",
            FieldSet::AvState => "av_state",
            FieldSet::AvConfig => "av_config",
        }
    }

    /// Unknown names yield `None` and are skipped by callers.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "basic" => Some(FieldSet::Basic),
            "av_state" => Some(FieldSet::AvState),
            "av_config" => Some(FieldSet::AvConfig),
            _ => None,
        }
    }
}

/// Field-set names for a request: the endpoint's default first, then every
/// comma-separated name from `?field_sets=`, without duplicates.
pub fn requested_field_sets(default: FieldSet, query: Option<&str>) -> Vec<String> {
    let mut names = vec![default.as_str().to_string()];
    for name in query.unwrap_or_default().split(',').map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// What a field-set produced for the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Denied,
    NotApplicable,
    Failed(String),
}
