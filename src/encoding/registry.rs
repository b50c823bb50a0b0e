//! Encoder registry built once from the encoder artifact.
//!
//! Each categorical field owns an ordered label list. A label's code is its
//! position in that list, so the list order must be preserved exactly as the
//! artifact stores it: it is what the model was trained against.

use std::collections::{BTreeMap, HashMap};

use crate::domain::Field;
use crate::error::DashError;

/// Bidirectional label/code mapping for one field.
#[derive(Debug, Clone)]
pub struct CategoricalField {
    field: Field,
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl CategoricalField {
    /// Build a field from its ordered labels.
    ///
    /// Returns an error message if a label repeats (codes would not be inverses).
    pub fn new(field: Field, labels: Vec<String>) -> Result<Self, String> {
        let mut codes = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            let code = u32::try_from(idx).map_err(|_| format!("too many {field} labels"))?;
            if codes.insert(label.clone(), code).is_some() {
                return Err(format!("duplicate {field} label '{label}'"));
            }
        }
        Ok(Self { field, labels, codes })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<u32, DashError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| DashError::UnknownLabel {
                field: self.field,
                label: label.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Result<&str, DashError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
            .ok_or(DashError::UnknownCode {
                field: self.field,
                code,
            })
    }
}

/// Immutable set of encoders, one per `Field`.
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    fields: BTreeMap<Field, CategoricalField>,
}

impl EncoderRegistry {
    /// Build a registry from `artifact key -> ordered labels`.
    ///
    /// Every field in `Field::ALL` must be present; extra keys are ignored.
    pub fn from_label_map(mut raw: HashMap<String, Vec<String>>) -> Result<Self, String> {
        let mut fields = BTreeMap::new();
        for field in Field::ALL {
            let labels = raw
                .remove(field.artifact_key())
                .ok_or_else(|| format!("missing encoder for '{}'", field.artifact_key()))?;
            fields.insert(field, CategoricalField::new(field, labels)?);
        }
        Ok(Self { fields })
    }

    pub fn field(&self, field: Field) -> &CategoricalField {
        // Construction guarantees every field is present.
        &self.fields[&field]
    }

    /// Labels in code order, for populating choice lists.
    pub fn labels(&self, field: Field) -> &[String] {
        self.field(field).labels()
    }

    pub fn encode(&self, field: Field, label: &str) -> Result<u32, DashError> {
        self.field(field).encode(label)
    }

    pub fn decode(&self, field: Field, code: u32) -> Result<&str, DashError> {
        self.field(field).decode(code)
    }

    /// `artifact key -> labels`, the shape stored on disk.
    pub fn to_label_map(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(field, enc)| (field.artifact_key().to_string(), enc.labels.clone()))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_registry() -> EncoderRegistry {
        let mut raw = HashMap::new();
        raw.insert("Provinsi".to_string(), vec!["ACEH".to_string(), "BALI".to_string()]);
        raw.insert(
            "Kabupaten Kota".to_string(),
            vec!["BANDA ACEH".to_string(), "DENPASAR".to_string()],
        );
        raw.insert(
            "Nama Pasar".to_string(),
            vec!["Pasar Aceh".to_string(), "Pasar Badung".to_string()],
        );
        raw.insert(
            "Nama Variant".to_string(),
            vec!["Beras Medium".to_string(), "Cabai Merah".to_string(), "Gula Pasir".to_string()],
        );
        EncoderRegistry::from_label_map(raw).unwrap()
    }

    #[test]
    fn encode_decode_round_trip_for_every_label() {
        let registry = sample_registry();
        for field in Field::ALL {
            for label in registry.labels(field) {
                let code = registry.encode(field, label).unwrap();
                assert_eq!(registry.decode(field, code).unwrap(), label);
            }
        }
    }

    #[test]
    fn codes_follow_artifact_order() {
        let registry = sample_registry();
        assert_eq!(registry.encode(Field::Commodity, "Beras Medium").unwrap(), 0);
        assert_eq!(registry.encode(Field::Commodity, "Gula Pasir").unwrap(), 2);
    }

    #[test]
    fn unknown_label_and_code_are_errors() {
        let registry = sample_registry();
        let err = registry.encode(Field::Province, "PAPUA").unwrap_err();
        assert_eq!(
            err,
            DashError::UnknownLabel {
                field: Field::Province,
                label: "PAPUA".to_string()
            }
        );
        assert!(matches!(
            registry.decode(Field::Market, 2),
            Err(DashError::UnknownCode { code: 2, .. })
        ));
    }

    #[test]
    fn duplicate_labels_and_missing_fields_are_rejected() {
        let dup = CategoricalField::new(Field::City, vec!["A".to_string(), "A".to_string()]);
        assert!(dup.is_err());

        let mut raw = HashMap::new();
        raw.insert("Provinsi".to_string(), vec!["ACEH".to_string()]);
        let err = EncoderRegistry::from_label_map(raw).unwrap_err();
        assert!(err.contains("Kabupaten Kota"), "{err}");
    }
}
