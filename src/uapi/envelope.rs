use std::collections::BTreeMap;

use serde::Serialize;

/// Validation code for a sub-resource that was produced successfully.
pub const CODE_OK: u16 = 201;
pub const CODE_FORBIDDEN: u16 = 403;
pub const CODE_NOT_FOUND: u16 = 404;
pub const CODE_FAILED: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub method: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            method: method.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ValidationResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn success() -> Self {
        Self::new(CODE_OK, "success")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiType {
    ReadOnly,
    Modifiable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Flag(bool),
    Number(i64),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Flag(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(i64::from(value))
    }
}

pub type PropertyMap = BTreeMap<String, Property>;

/// One UAPI property. Serializes to the usual `{api_type, key, value}`,
/// `{api_type, object}` or `{api_type, object_array}` shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Property {
    Scalar {
        api_type: ApiType,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        key: bool,
        value: Scalar,
    },
    Object {
        api_type: ApiType,
        object: PropertyMap,
    },
    Array {
        api_type: ApiType,
        object_array: Vec<PropertyMap>,
    },
}

impl Property {
    pub fn key(value: impl Into<Scalar>) -> Self {
        Property::Scalar {
            api_type: ApiType::ReadOnly,
            key: true,
            value: value.into(),
        }
    }

    pub fn read_only(value: impl Into<Scalar>) -> Self {
        Property::Scalar {
            api_type: ApiType::ReadOnly,
            key: false,
            value: value.into(),
        }
    }

    pub fn modifiable(value: impl Into<Scalar>) -> Self {
        Property::Scalar {
            api_type: ApiType::Modifiable,
            key: false,
            value: value.into(),
        }
    }

    pub fn array(api_type: ApiType, items: Vec<PropertyMap>) -> Self {
        Property::Array {
            api_type,
            object_array: items,
        }
    }

    pub fn scalar_value(&self) -> Option<&Scalar> {
        match self {
            Property::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubMetadata {
    pub validation_response: ValidationResponse,
}

/// One field-set's part of the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubResource {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Link>,
    pub metadata: SubMetadata,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl SubResource {
    /// A sub-resource that carries nothing but a validation response.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self {
            metadata: SubMetadata {
                validation_response: ValidationResponse::new(code, message),
            },
            ..Default::default()
        }
    }

    pub fn code(&self) -> Option<u16> {
        self.metadata.validation_response.code
    }

    pub fn link(mut self, name: &str, link: Link) -> Self {
        self.links.insert(name.to_string(), link);
        self
    }

    pub fn property(mut self, name: &str, property: Property) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub field_sets_returned: Vec<String>,
    pub field_sets_available: Vec<String>,
    pub field_sets_default: Vec<String>,
    pub validation_response: ValidationResponse,
}

/// The whole UAPI room resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub links: BTreeMap<String, Link>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub av_state: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub av_config: Option<SubResource>,
}
