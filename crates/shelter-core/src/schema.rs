// crates/shelter-core/src/schema.rs

//! Explicit per-source declarations: which columns must exist, which may
//! exist, which column carries the join key, and what each column means.

use crate::encoding::{AcceptanceMap, CapabilityEncoding};
use crate::error::{Result, ShelterError};
use crate::model::HazardType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{required, optional, key}` column declaration for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl SchemaDescriptor {
    pub fn new<S: Into<String>>(
        required: impl IntoIterator<Item = S>,
        optional: impl IntoIterator<Item = S>,
        key: Option<&str>,
    ) -> Self {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            optional: optional.into_iter().map(Into::into).collect(),
            key: key.map(str::to_owned),
        }
    }

    /// Required columns (and the key column, when declared) absent from `present`.
    pub fn missing(&self, present: &[String]) -> Vec<String> {
        self.required
            .iter()
            .chain(self.key.iter())
            .filter(|col| !present.iter().any(|p| p == *col))
            .cloned()
            .collect()
    }

    /// Declared columns found in `present`, in declaration order
    /// (key, required, optional). Everything else is dropped.
    pub fn retained(&self, present: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for col in self.key.iter().chain(&self.required).chain(&self.optional) {
            if present.iter().any(|p| p == col) && !out.contains(col) {
                out.push(col.clone());
            }
        }
        out
    }

    pub fn declares(&self, column: &str) -> bool {
        self.key.as_deref() == Some(column)
            || self.required.iter().any(|c| c == column)
            || self.optional.iter().any(|c| c == column)
    }

    pub fn is_required(&self, column: &str) -> bool {
        self.required.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    /// The primary table: name, address, coordinates, optional inline capabilities.
    Facilities,
    /// Secondary table carrying per-hazard capability columns.
    HazardCapability,
}

/// Meaning of each column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub acceptance: Option<String>,
    #[serde(default)]
    pub hazards: BTreeMap<HazardType, String>,
}

impl FieldMap {
    pub fn facility(name: &str, address: &str, latitude: &str, longitude: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            address: Some(address.to_owned()),
            latitude: Some(latitude.to_owned()),
            longitude: Some(longitude.to_owned()),
            ..Self::default()
        }
    }

    pub fn acceptance(mut self, column: &str) -> Self {
        self.acceptance = Some(column.to_owned());
        self
    }

    pub fn hazard(mut self, hazard: HazardType, column: &str) -> Self {
        self.hazards.insert(hazard, column.to_owned());
        self
    }

    fn site_columns(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("name", self.name.as_deref()),
            ("address", self.address.as_deref()),
            ("latitude", self.latitude.as_deref()),
            ("longitude", self.longitude.as_deref()),
        ]
    }
}

/// Declaration of one input source (everything except where its bytes live).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub role: SourceRole,
    pub schema: SchemaDescriptor,
    pub fields: FieldMap,
    #[serde(default)]
    pub capability_encoding: CapabilityEncoding,
    #[serde(default)]
    pub acceptance_encoding: AcceptanceMap,
}

impl SourceSpec {
    pub fn facilities(id: &str, schema: SchemaDescriptor, fields: FieldMap) -> Self {
        Self {
            id: id.to_owned(),
            role: SourceRole::Facilities,
            schema,
            fields,
            capability_encoding: CapabilityEncoding::default(),
            acceptance_encoding: AcceptanceMap::default(),
        }
    }

    pub fn hazard_capability(
        id: &str,
        schema: SchemaDescriptor,
        hazards: impl IntoIterator<Item = (HazardType, String)>,
    ) -> Self {
        Self {
            id: id.to_owned(),
            role: SourceRole::HazardCapability,
            schema,
            fields: FieldMap {
                hazards: hazards.into_iter().collect(),
                ..FieldMap::default()
            },
            capability_encoding: CapabilityEncoding::default(),
            acceptance_encoding: AcceptanceMap::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: CapabilityEncoding) -> Self {
        self.capability_encoding = encoding;
        self
    }

    /// Checks that the field map is consistent with the schema.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ShelterError::Config(format!("source `{}`: {msg}", self.id)));

        if self.id.trim().is_empty() {
            return Err(ShelterError::Config("source id must not be empty".into()));
        }

        match self.role {
            SourceRole::Facilities => {
                for (field, column) in self.fields.site_columns() {
                    match column {
                        None => return fail(format!("facilities source must map `{field}`")),
                        Some(col) if !self.schema.is_required(col) => {
                            return fail(format!("column `{col}` for `{field}` must be required"))
                        }
                        Some(_) => {}
                    }
                }
            }
            SourceRole::HazardCapability => {
                if self.fields.site_columns().iter().any(|(_, c)| c.is_some())
                    || self.fields.acceptance.is_some()
                {
                    return fail("hazard capability sources map hazard columns only".into());
                }
                if self.fields.hazards.is_empty() {
                    return fail("hazard capability source maps no hazard columns".into());
                }
                if self.schema.key.is_none() {
                    return fail("hazard capability source needs a key column".into());
                }
            }
        }

        let mapped = self
            .fields
            .acceptance
            .iter()
            .chain(self.fields.hazards.values());
        for col in mapped {
            if !self.schema.declares(col) {
                return fail(format!("column `{col}` is mapped but not declared in the schema"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility_schema() -> SchemaDescriptor {
        SchemaDescriptor::new(
            ["name", "address", "latitude", "longitude"],
            ["acceptance", "quake"],
            Some("id"),
        )
    }

    #[test]
    fn missing_lists_required_and_key() {
        let present = vec!["name".to_string(), "address".to_string(), "longitude".to_string()];
        assert_eq!(facility_schema().missing(&present), ["latitude", "id"]);
    }

    #[test]
    fn retained_drops_undeclared_columns() {
        let present: Vec<String> = ["extra", "longitude", "id", "name", "quake", "address", "latitude"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            facility_schema().retained(&present),
            ["id", "name", "address", "latitude", "longitude", "quake"]
        );
    }

    #[test]
    fn facility_spec_validates() {
        let spec = SourceSpec::facilities(
            "facilities",
            facility_schema(),
            FieldMap::facility("name", "address", "latitude", "longitude")
                .acceptance("acceptance")
                .hazard(HazardType::Earthquake, "quake"),
        );
        spec.validate().unwrap();
    }

    #[test]
    fn undeclared_hazard_column_is_a_config_error() {
        let spec = SourceSpec::facilities(
            "facilities",
            facility_schema(),
            FieldMap::facility("name", "address", "latitude", "longitude")
                .hazard(HazardType::Flood, "flood"),
        );
        assert!(matches!(spec.validate(), Err(ShelterError::Config(_))));
    }

    #[test]
    fn coordinates_must_be_required_columns() {
        let schema = SchemaDescriptor::new(["name", "address", "latitude"], ["longitude"], None);
        let spec = SourceSpec::facilities(
            "facilities",
            schema,
            FieldMap::facility("name", "address", "latitude", "longitude"),
        );
        assert!(spec.validate().is_err());
    }

    #[test]
    fn hazard_source_needs_key() {
        let spec = SourceSpec::hazard_capability(
            "hazards",
            SchemaDescriptor::new(["quake"], [], None),
            [(HazardType::Earthquake, "quake".to_string())],
        );
        assert!(spec.validate().is_err());
    }
}
