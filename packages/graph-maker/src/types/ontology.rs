//! Ontology - the schema handed to the oracle.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::OntologyError;

/// Permitted entity labels plus a free-text relationship descriptor.
///
/// Labels keep caller order; uniqueness is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ontology {
    pub labels: Vec<String>,
    pub relationship_descriptor: String,
}

impl Ontology {
    /// Create a new ontology.
    pub fn new(
        labels: impl IntoIterator<Item = impl Into<String>>,
        relationship_descriptor: impl Into<String>,
    ) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            relationship_descriptor: relationship_descriptor.into(),
        }
    }

    /// Plain mapping form used when handing the ontology across a boundary.
    pub fn to_transport(&self) -> Value {
        json!({
            "labels": self.labels,
            "relationship_descriptor": self.relationship_descriptor,
        })
    }

    /// Rebuild from the mapping produced by [`Ontology::to_transport`].
    pub fn from_transport(value: &Value) -> Result<Self, OntologyError> {
        let labels = value
            .get("labels")
            .ok_or(OntologyError::MissingField("labels"))?
            .as_array()
            .ok_or(OntologyError::InvalidField {
                field: "labels",
                expected: "an array of strings",
            })?
            .iter()
            .map(|l| {
                l.as_str().map(str::to_string).ok_or(OntologyError::InvalidField {
                    field: "labels",
                    expected: "an array of strings",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let relationship_descriptor = value
            .get("relationship_descriptor")
            .ok_or(OntologyError::MissingField("relationship_descriptor"))?
            .as_str()
            .ok_or(OntologyError::InvalidField {
                field: "relationship_descriptor",
                expected: "a string",
            })?
            .to_string();

        Ok(Self {
            labels,
            relationship_descriptor,
        })
    }

    /// Parse an ontology from a JSON document in transport form.
    pub fn from_json_str(json: &str) -> Result<Self, OntologyError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_transport(&value)
    }

    /// Labels joined for display in prompts.
    pub fn label_list(&self) -> String {
        self.labels.join(", ")
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Ontology {
        Ontology::new(["Person", "Place", "Organization"], "who works where and lives where")
    }

    #[test]
    fn test_transport_round_trip() {
        let ontology = sample();
        let rebuilt = Ontology::from_transport(&ontology.to_transport()).unwrap();
        assert_eq!(rebuilt.labels, ontology.labels);
        assert_eq!(rebuilt.relationship_descriptor, ontology.relationship_descriptor);
        assert_eq!(rebuilt, ontology);
    }

    #[test]
    fn test_round_trip_keeps_order_and_duplicates() {
        let ontology = Ontology::new(["Z", "A", "Z"], "");
        let rebuilt = Ontology::from_transport(&ontology.to_transport()).unwrap();
        assert_eq!(rebuilt.labels, vec!["Z", "A", "Z"]);
    }

    #[test]
    fn test_from_transport_missing_field() {
        let err = Ontology::from_transport(&json!({"labels": []})).unwrap_err();
        assert!(matches!(err, OntologyError::MissingField("relationship_descriptor")));
    }

    #[test]
    fn test_from_transport_invalid_labels() {
        let err = Ontology::from_transport(&json!({
            "labels": [1, 2],
            "relationship_descriptor": "x"
        }))
        .unwrap_err();
        assert!(matches!(err, OntologyError::InvalidField { field: "labels", .. }));
    }

    #[test]
    fn test_label_list_and_membership() {
        let ontology = sample();
        assert_eq!(ontology.label_list(), "Person, Place, Organization");
        assert!(ontology.contains_label("Place"));
        assert!(!ontology.contains_label("place"));
    }

    #[test]
    fn test_from_json_str() {
        let ontology = Ontology::from_json_str(
            r#"{"labels": ["Person"], "relationship_descriptor": "family ties"}"#,
        )
        .unwrap();
        assert_eq!(ontology.labels, vec!["Person"]);
        assert!(Ontology::from_json_str("not json").is_err());
    }

    proptest! {
        #[test]
        fn prop_transport_round_trip(
            labels in prop::collection::vec("\\PC{0,16}", 0..12),
            descriptor in "\\PC{0,64}",
        ) {
            let ontology = Ontology::new(labels.clone(), descriptor.clone());

            let rebuilt = Ontology::from_transport(&ontology.to_transport()).unwrap();
            prop_assert_eq!(&rebuilt, &ontology);
            prop_assert_eq!(rebuilt.labels, labels);
            prop_assert_eq!(rebuilt.relationship_descriptor, descriptor);

            let text = ontology.to_transport().to_string();
            prop_assert_eq!(Ontology::from_json_str(&text).unwrap(), ontology);
        }
    }
}
