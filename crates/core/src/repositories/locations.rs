use super::shared::{Collection, Record, SeedPolicy};
use crate::constants::{LOCATIONS_KEY, LOCATION_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const ALL_LEVELS_REQUIRED: &str = "Please select Province, District, Sector, Cell, and Village.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub id: String,
    pub province: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

impl Record for Location {
    const KIND: &'static str = "Location";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewLocation {
    pub province: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LocationPatch {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub cell: Option<String>,
    pub village: Option<String>,
}

fn level(value: &str) -> DataResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DataError::validation(ALL_LEVELS_REQUIRED));
    }
    Ok(value.to_owned())
}

pub struct LocationRepository {
    records: Collection<Location>,
}

impl LocationRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records =
            Collection::load(store, LOCATIONS_KEY, SeedPolicy::WhenMissing, seed::locations)?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Location] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.records.get(id)
    }

    /// Creates a location. All five levels are required; duplicates are allowed.
    pub fn create(&mut self, new: NewLocation) -> DataResult<Location> {
        let location = Location {
            id: next_id(LOCATION_ID_PREFIX, self.records.ids()),
            province: level(&new.province)?,
            district: level(&new.district)?,
            sector: level(&new.sector)?,
            cell: level(&new.cell)?,
            village: level(&new.village)?,
        };
        self.records.insert_first(location.clone())?;
        Ok(location)
    }

    pub fn update(&mut self, id: &str, patch: LocationPatch) -> DataResult<Location> {
        let index = self.records.position(id)?;
        let mut location = self.records.items()[index].clone();

        for (field, value) in [
            (&mut location.province, patch.province),
            (&mut location.district, patch.district),
            (&mut location.sector, patch.sector),
            (&mut location.cell, patch.cell),
            (&mut location.village, patch.village),
        ] {
            if let Some(value) = value {
                *field = level(&value)?;
            }
        }

        self.records.replace_at(index, location.clone())?;
        Ok(location)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Location> {
        let index = self.records.position(id)?;
        self.records.remove_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> LocationRepository {
        LocationRepository::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn huye() -> NewLocation {
        NewLocation {
            province: "Southern".into(),
            district: "Huye".into(),
            sector: "Ngoma".into(),
            cell: "Butare".into(),
            village: "Agahenerezo".into(),
        }
    }

    #[test]
    fn every_level_is_required() {
        let mut repo = repo();
        let err = repo
            .create(NewLocation {
                cell: " ".into(),
                ..huye()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), ALL_LEVELS_REQUIRED);
    }

    #[test]
    fn duplicates_are_allowed() {
        let mut repo = repo();
        let a = repo.create(huye()).unwrap();
        let b = repo.create(huye()).unwrap();
        assert_eq!(a.id, "L002");
        assert_eq!(b.id, "L003");
    }

    #[test]
    fn update_rejects_blanking_a_level() {
        let mut repo = repo();
        let err = repo
            .update(
                "L001",
                LocationPatch {
                    village: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
        assert_eq!(repo.get("L001").unwrap().village, "Bibare I");
    }
}
