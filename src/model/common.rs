use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

pub type Id = String;

/// Raw field map of a stored document. Reference fields hold `DocRef` values
/// in their serialized form, everything else is plain JSON.
pub type FieldMap = serde_json::Map<String, Value>;

/// The named collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Images,
    ContentImages,
    StyleImages,
    StylizedImages,
    ProductCards,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Images => "images",
            Collection::ContentImages => "content-images",
            Collection::StyleImages => "style-images",
            Collection::StylizedImages => "stylized-images",
            Collection::ProductCards => "product-cards",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "images" => Some(Collection::Images),
            "content-images" => Some(Collection::ContentImages),
            "style-images" => Some(Collection::StyleImages),
            "stylized-images" => Some(Collection::StylizedImages),
            "product-cards" => Some(Collection::ProductCards),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reference to a document in a named collection. Stored inside field maps
/// as `{"$ref": "<collection>/<id>"}` so that raw documents never carry
/// resolved data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocRef {
    pub collection: Collection,
    pub id: Id,
}

impl DocRef {
    pub fn new(collection: Collection, id: impl Into<Id>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// The serialized form of this reference, usable as a stored field value
    /// and as a query predicate operand.
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "$ref": format!("{}/{}", self.collection.name(), self.id) })
    }

    /// Detect a reference inside a raw field value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let target = value.as_object()?.get("$ref")?.as_str()?;
        let (collection, id) = target.split_once('/')?;
        Some(Self {
            collection: Collection::from_name(collection)?,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection.name(), self.id)
    }
}

impl Serialize for DocRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RefRepr {
            target: format!("{}/{}", self.collection.name(), self.id),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = RefRepr::deserialize(deserializer)?;
        let (collection, id) = repr
            .target
            .split_once('/')
            .ok_or_else(|| D::Error::custom(format!("malformed reference: {}", repr.target)))?;
        let collection = Collection::from_name(collection)
            .ok_or_else(|| D::Error::custom(format!("unknown collection: {collection}")))?;
        Ok(DocRef::new(collection, id))
    }
}

#[derive(Serialize, Deserialize)]
struct RefRepr {
    #[serde(rename = "$ref")]
    target: String,
}

/// Whether a reference field holds a single reference or a set of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefArity {
    One,
    Many,
}

/// Descriptor for one reference-typed field of an entity kind.
pub struct RefField {
    pub name: &'static str,
    pub target: Collection,
    pub arity: RefArity,
}

/// The enumerated reference fields of each collection. This table is what
/// makes population generic: the resolver walks it instead of inspecting
/// arbitrary values at runtime.
///
/// The graph formed by these entries must stay acyclic; the resolver recurses
/// without a depth limit and relies on it.
pub fn ref_fields(collection: Collection) -> &'static [RefField] {
    match collection {
        Collection::Images => &[],
        Collection::ContentImages => &[RefField {
            name: "image",
            target: Collection::Images,
            arity: RefArity::One,
        }],
        Collection::StyleImages => &[RefField {
            name: "image",
            target: Collection::Images,
            arity: RefArity::One,
        }],
        Collection::StylizedImages => &[
            RefField {
                name: "contentImage",
                target: Collection::ContentImages,
                arity: RefArity::One,
            },
            RefField {
                name: "styleImage",
                target: Collection::StyleImages,
                arity: RefArity::One,
            },
            RefField {
                name: "image",
                target: Collection::Images,
                arity: RefArity::One,
            },
        ],
        Collection::ProductCards => &[
            RefField {
                name: "contentImage",
                target: Collection::ContentImages,
                arity: RefArity::One,
            },
            RefField {
                name: "appliedStyleImages",
                target: Collection::StyleImages,
                arity: RefArity::Many,
            },
            RefField {
                name: "resultingStylizedImages",
                target: Collection::StylizedImages,
                arity: RefArity::Many,
            },
        ],
    }
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Serialize an entity into the raw field map the store persists.
pub fn fields_of<T: Serialize>(entity: &T) -> crate::error::Result<FieldMap> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(crate::error::Error::Inconsistency(format!(
            "entity serialized to a non-object value: {other}"
        ))),
        Err(err) => Err(crate::error::Error::Inconsistency(format!(
            "entity failed to serialize: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ref_round_trips_through_serde() {
        let doc_ref = DocRef::new(Collection::StyleImages, "abc-123");
        let value = serde_json::to_value(&doc_ref).unwrap();
        assert_eq!(value, serde_json::json!({"$ref": "style-images/abc-123"}));
        let back: DocRef = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc_ref);
    }

    #[test]
    fn doc_ref_detection_ignores_plain_values() {
        assert!(DocRef::from_value(&Value::String("images/x".into())).is_none());
        assert!(DocRef::from_value(&serde_json::json!({"url": "images/x"})).is_none());
        assert!(DocRef::from_value(&serde_json::json!({"$ref": "no-such-collection/x"})).is_none());
        let detected = DocRef::from_value(&serde_json::json!({"$ref": "images/x"})).unwrap();
        assert_eq!(detected, DocRef::new(Collection::Images, "x"));
    }

    #[test]
    fn reference_graph_stays_acyclic() {
        // images < content/style < stylized < product cards
        fn rank(c: Collection) -> u8 {
            match c {
                Collection::Images => 0,
                Collection::ContentImages | Collection::StyleImages => 1,
                Collection::StylizedImages => 2,
                Collection::ProductCards => 3,
            }
        }
        for collection in [
            Collection::Images,
            Collection::ContentImages,
            Collection::StyleImages,
            Collection::StylizedImages,
            Collection::ProductCards,
        ] {
            for field in ref_fields(collection) {
                assert!(
                    rank(field.target) < rank(collection),
                    "{}.{} must point toward the leaves",
                    collection,
                    field.name
                );
            }
        }
    }
}
