//! Billable services offered at facilities.

use super::shared::{required, same_name, Collection, Record, SeedPolicy};
use crate::constants::{SERVICES_KEY, SERVICE_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_rwf: f64,
}

impl Record for Service {
    const KIND: &'static str = "Service";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub price_rwf: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_rwf: Option<f64>,
}

fn valid_price(price: Option<f64>) -> DataResult<f64> {
    match price {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p),
        _ => Err(DataError::validation("Price must be a valid number (>= 0).")),
    }
}

pub struct ServiceRepository {
    records: Collection<Service>,
}

impl ServiceRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(store, SERVICES_KEY, SeedPolicy::WhenMissing, seed::services)?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Service] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Service> {
        self.records.get(id.trim())
    }

    fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.records
            .items()
            .iter()
            .any(|s| Some(s.id.as_str()) != except_id && same_name(&s.name, name))
    }

    pub fn create(&mut self, new: NewService) -> DataResult<Service> {
        let name = required(&new.name, "Service name is required.")?;
        let category = required(&new.category, "Category is required.")?;
        let price_rwf = valid_price(new.price_rwf)?;

        if self.name_taken(&name, None) {
            return Err(DataError::conflict("This service already exists."));
        }

        let service = Service {
            id: next_id(SERVICE_ID_PREFIX, self.records.ids()),
            name,
            category,
            price_rwf,
        };
        self.records.insert_first(service.clone())?;
        tracing::info!("created service {}", service.id);
        Ok(service)
    }

    pub fn update(&mut self, id: &str, patch: ServicePatch) -> DataResult<Service> {
        let index = self.records.position(id)?;
        let mut service = self.records.items()[index].clone();

        if let Some(name) = patch.name {
            let name = required(&name, "Service name is required.")?;
            if self.name_taken(&name, Some(id)) {
                return Err(DataError::conflict("Another service already uses this name."));
            }
            service.name = name;
        }
        if let Some(category) = patch.category {
            service.category = required(&category, "Category is required.")?;
        }
        if patch.price_rwf.is_some() {
            service.price_rwf = valid_price(patch.price_rwf)?;
        }

        self.records.replace_at(index, service.clone())?;
        Ok(service)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Service> {
        let index = self.records.position(id)?;
        self.records.remove_at(index)
    }
}
