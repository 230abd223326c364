use crate::application::dto::locations::{CityDto, ProvinceDto};
use crate::application::ports::cache_port::CachePort;
use crate::application::ports::location_repository::LocationRepository;
use crate::application::services::cache;
use crate::domain::locations::location::Courier;

/// Location reference data. Provinces and cities rarely change, so both
/// lists are served from the cache.
pub struct Locations<'a, L, C>
where
    L: LocationRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub repo: &'a L,
    pub cache: &'a C,
    pub ttl_secs: u64,
}

impl<'a, L, C> Locations<'a, L, C>
where
    L: LocationRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn provinces(&self) -> anyhow::Result<Vec<ProvinceDto>> {
        if let Some(hit) = cache::get_json(self.cache, cache::PROVINCES_KEY).await {
            return Ok(hit);
        }
        let list: Vec<ProvinceDto> = self
            .repo
            .list_provinces()
            .await?
            .into_iter()
            .map(ProvinceDto::from)
            .collect();
        cache::set_json(self.cache, cache::PROVINCES_KEY, &list, self.ttl_secs).await;
        Ok(list)
    }

    pub async fn cities(&self, province_id: i32) -> anyhow::Result<Vec<CityDto>> {
        let key = cache::cities_key(province_id);
        if let Some(hit) = cache::get_json(self.cache, &key).await {
            return Ok(hit);
        }
        let list: Vec<CityDto> = self
            .repo
            .list_cities(province_id)
            .await?
            .into_iter()
            .map(CityDto::from)
            .collect();
        cache::set_json(self.cache, &key, &list, self.ttl_secs).await;
        Ok(list)
    }

    pub async fn couriers(&self) -> anyhow::Result<Vec<Courier>> {
        self.repo.list_couriers().await
    }
}
