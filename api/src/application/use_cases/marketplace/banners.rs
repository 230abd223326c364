use crate::application::ports::banner_repository::BannerRepository;
use crate::application::use_cases::marketplace::MarketplaceError;
use crate::domain::marketplace::banner::{Banner, NewBanner};

pub struct CreateBanner<'a, B: BannerRepository + ?Sized> {
    pub banners: &'a B,
}

impl<'a, B: BannerRepository + ?Sized> CreateBanner<'a, B> {
    pub async fn execute(&self, mut input: NewBanner) -> Result<Banner, MarketplaceError> {
        input.title = input.title.trim().to_string();
        if input.title.is_empty() {
            return Err(MarketplaceError::InvalidInput("title is required".into()));
        }
        if !is_http_url(&input.image_url) {
            return Err(MarketplaceError::InvalidInput("image_url must be an http(s) url".into()));
        }
        if input.link_url.as_deref().is_some_and(|u| !is_http_url(u)) {
            return Err(MarketplaceError::InvalidInput("link_url must be an http(s) url".into()));
        }
        if input.end_at <= input.start_at {
            return Err(MarketplaceError::InvalidInput("end_at must be after start_at".into()));
        }
        Ok(self.banners.create(&input).await?)
    }
}

pub struct ListBanners<'a, B: BannerRepository + ?Sized> {
    pub banners: &'a B,
}

impl<'a, B: BannerRepository + ?Sized> ListBanners<'a, B> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Banner>> {
        self.banners.list_active(chrono::Utc::now()).await
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}
