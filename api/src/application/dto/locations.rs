use serde::{Deserialize, Serialize};

use crate::domain::locations::location::{City, Province};

// Cached shapes of the location lists

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDto {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
}

impl From<Province> for ProvinceDto {
    fn from(p: Province) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

impl From<City> for CityDto {
    fn from(c: City) -> Self {
        Self {
            id: c.id,
            province_id: c.province_id,
            name: c.name,
        }
    }
}
