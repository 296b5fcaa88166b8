//! Hospitals (facilities).
//!
//! Names are unique case-insensitively. Deleting a hospital never deletes its doctors; the
//! detaching of doctors is coordinated by [`AppData::delete_hospital`](crate::AppData::delete_hospital).

use super::shared::{required, same_name, Collection, Record, SeedPolicy};
use crate::constants::{HOSPITALS_KEY, HOSPITAL_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub province: String,
    pub district: String,
    pub category: String,
}

impl Record for Hospital {
    const KIND: &'static str = "Hospital";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewHospital {
    pub name: String,
    pub province: String,
    pub district: String,
    pub category: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HospitalPatch {
    pub name: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub category: Option<String>,
}

pub struct HospitalRepository {
    records: Collection<Hospital>,
}

impl HospitalRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(store, HOSPITALS_KEY, SeedPolicy::WhenMissing, seed::hospitals)?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Hospital] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Hospital> {
        self.records.get(id)
    }

    fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.records
            .items()
            .iter()
            .any(|h| Some(h.id.as_str()) != except_id && same_name(&h.name, name))
    }

    /// Creates a hospital. All four fields are required.
    ///
    /// # Errors
    ///
    /// - [`DataError::Validation`] naming the first missing field
    /// - [`DataError::Conflict`] if a hospital with the same name exists
    pub fn create(&mut self, new: NewHospital) -> DataResult<Hospital> {
        let name = required(&new.name, "Hospital name is required.")?;
        let province = required(&new.province, "Province is required.")?;
        let district = required(&new.district, "District is required.")?;
        let category = required(&new.category, "Category is required.")?;

        if self.name_taken(&name, None) {
            return Err(DataError::conflict("This hospital already exists."));
        }

        let hospital = Hospital {
            id: next_id(HOSPITAL_ID_PREFIX, self.records.ids()),
            name,
            province,
            district,
            category,
        };
        self.records.insert_first(hospital.clone())?;
        tracing::info!("created hospital {}", hospital.id);
        Ok(hospital)
    }

    /// Merge-patches a hospital; supplied fields overwrite, others are kept.
    pub fn update(&mut self, id: &str, patch: HospitalPatch) -> DataResult<Hospital> {
        let index = self.records.position(id)?;
        let mut hospital = self.records.items()[index].clone();

        if let Some(name) = patch.name {
            let name = required(&name, "Hospital name is required.")?;
            if self.name_taken(&name, Some(id)) {
                return Err(DataError::conflict("Another hospital already uses this name."));
            }
            hospital.name = name;
        }
        if let Some(province) = patch.province {
            hospital.province = required(&province, "Province is required.")?;
        }
        if let Some(district) = patch.district {
            hospital.district = required(&district, "District is required.")?;
        }
        if let Some(category) = patch.category {
            hospital.category = required(&category, "Category is required.")?;
        }

        self.records.replace_at(index, hospital.clone())?;
        Ok(hospital)
    }

    pub(crate) fn delete(&mut self, id: &str) -> DataResult<Hospital> {
        let index = self.records.position(id)?;
        let removed = self.records.remove_at(index)?;
        tracing::info!("deleted hospital {}", removed.id);
        Ok(removed)
    }

    /// Puts back a snapshot taken before a multi-collection write that failed half way.
    pub(crate) fn restore(&mut self, snapshot: Vec<Hospital>) -> DataResult<()> {
        self.records.commit(snapshot)
    }
}
