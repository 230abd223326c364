use std::sync::Arc;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::banner_repository::BannerRepository;
use crate::application::ports::cache_port::CachePort;
use crate::application::ports::cart_repository::CartRepository;
use crate::application::ports::chat_repository::ChatRepository;
use crate::application::ports::location_repository::LocationRepository;
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::ports::voucher_repository::VoucherRepository;
use crate::application::ports::wallet_repository::WalletRepository;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    address_repo: Arc<dyn AddressRepository>,
    location_repo: Arc<dyn LocationRepository>,
    shop_repo: Arc<dyn ShopRepository>,
    product_repo: Arc<dyn ProductRepository>,
    cart_repo: Arc<dyn CartRepository>,
    voucher_repo: Arc<dyn VoucherRepository>,
    order_repo: Arc<dyn OrderRepository>,
    wallet_repo: Arc<dyn WalletRepository>,
    banner_repo: Arc<dyn BannerRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    cache: Arc<dyn CachePort>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        address_repo: Arc<dyn AddressRepository>,
        location_repo: Arc<dyn LocationRepository>,
        shop_repo: Arc<dyn ShopRepository>,
        product_repo: Arc<dyn ProductRepository>,
        cart_repo: Arc<dyn CartRepository>,
        voucher_repo: Arc<dyn VoucherRepository>,
        order_repo: Arc<dyn OrderRepository>,
        wallet_repo: Arc<dyn WalletRepository>,
        banner_repo: Arc<dyn BannerRepository>,
        chat_repo: Arc<dyn ChatRepository>,
        cache: Arc<dyn CachePort>,
    ) -> Self {
        Self {
            user_repo,
            address_repo,
            location_repo,
            shop_repo,
            product_repo,
            cart_repo,
            voucher_repo,
            order_repo,
            wallet_repo,
            banner_repo,
            chat_repo,
            cache,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn address_repo(&self) -> Arc<dyn AddressRepository> {
        self.services.address_repo.clone()
    }

    pub fn location_repo(&self) -> Arc<dyn LocationRepository> {
        self.services.location_repo.clone()
    }

    pub fn shop_repo(&self) -> Arc<dyn ShopRepository> {
        self.services.shop_repo.clone()
    }

    pub fn product_repo(&self) -> Arc<dyn ProductRepository> {
        self.services.product_repo.clone()
    }

    pub fn cart_repo(&self) -> Arc<dyn CartRepository> {
        self.services.cart_repo.clone()
    }

    pub fn voucher_repo(&self) -> Arc<dyn VoucherRepository> {
        self.services.voucher_repo.clone()
    }

    pub fn order_repo(&self) -> Arc<dyn OrderRepository> {
        self.services.order_repo.clone()
    }

    pub fn wallet_repo(&self) -> Arc<dyn WalletRepository> {
        self.services.wallet_repo.clone()
    }

    pub fn banner_repo(&self) -> Arc<dyn BannerRepository> {
        self.services.banner_repo.clone()
    }

    pub fn chat_repo(&self) -> Arc<dyn ChatRepository> {
        self.services.chat_repo.clone()
    }

    pub fn cache(&self) -> Arc<dyn CachePort> {
        self.services.cache.clone()
    }
}
