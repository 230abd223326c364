//! In-memory port implementations for use-case tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::banner_repository::BannerRepository;
use crate::application::ports::cache_port::CachePort;
use crate::application::ports::cart_repository::{CartLine, CartRepository};
use crate::application::ports::chat_repository::ChatRepository;
use crate::application::ports::location_repository::LocationRepository;
use crate::application::ports::order_repository::{
    CreateInvoiceError, OrderRepository, RefundChange, ReviewTarget, Transition,
};
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::ports::voucher_repository::VoucherRepository;
use crate::application::ports::wallet_repository::{PayOutcome, WalletRepository};
use crate::application::services::hashing;
use crate::application::use_cases::orders::checkout::Checkout;
use crate::domain::chats::chat::{ChatMessage, ChatRoom, Sender};
use crate::domain::locations::location::{City, Courier, Province};
use crate::domain::marketplace::banner::{Banner, NewBanner};
use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::domain::orders::invoice::{
    Invoice, InvoiceDetail, InvoiceStatus, NewInvoice, RefundRequest, RefundStatus, ShopOrder,
    ShopOrderDetail, TransactionLine,
};
use crate::domain::orders::status::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::pricing::DiscountType;
use crate::domain::products::product::{
    Category, NewProduct, NewPromotion, NewSku, Product, ProductDetail, ProductQuery, ProductSort,
    ProductSummary, ProductUpdate, Promotion, Review, Sku, SkuRef, SkuUpdate,
};
use crate::domain::shops::shop::Shop;
use crate::domain::shops::voucher::{NewVoucher, ShopVoucher};
use crate::domain::users::user::{
    Address, NewAddress, ProfileUpdate, Role, User, UserCredentials, UserProfile,
};
use crate::domain::wallets::wallet::{HistoryKind, Wallet, WalletHistory};

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> (Vec<T>, i64) {
    let out = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    (out, items.len() as i64)
}

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

// --- cache ---

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_secs: u64) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, _ttl_secs: u64) -> anyhow::Result<i64> {
        let mut entries = self.entries.lock().unwrap();
        let next = entries
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}

// --- users ---

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<(UserCredentials, UserProfile)>>,
}

impl InMemoryUsers {
    pub fn seed(&self, email: &str, username: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            full_name: username.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        let creds = UserCredentials {
            user: user.clone(),
            password_hash: hashing::hash_secret(password).unwrap(),
        };
        self.rows
            .lock()
            .unwrap()
            .push((creds, UserProfile::default()));
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push((
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
            UserProfile::default(),
        ));
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|(c, _)| c.user.email == email))
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|(c, _)| c.user.username == username))
    }

    async fn find_credentials(&self, identifier: &str) -> anyhow::Result<Option<UserCredentials>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c.user.email == identifier || c.user.username == identifier)
            .map(|(c, _)| c.clone()))
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c.user.id == id)
            .map(|(c, _)| c.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self
            .find_credentials_by_id(id)
            .await?
            .map(|c| c.user))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((c, _)) = rows.iter_mut().find(|(c, _)| c.user.id == id) {
            c.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn get_profile(&self, id: Uuid) -> anyhow::Result<UserProfile> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c.user.id == id)
            .map(|(_, p)| p.clone())
            .unwrap_or_default())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some((c, p)) = rows.iter_mut().find(|(c, _)| c.user.id == id) {
            if let Some(name) = &update.full_name {
                c.user.full_name = name.clone();
            }
            if update.phone.is_some() {
                p.phone = update.phone.clone();
            }
            if update.gender.is_some() {
                p.gender = update.gender.clone();
            }
            if update.birth_date.is_some() {
                p.birth_date = update.birth_date;
            }
            if update.avatar_url.is_some() {
                p.avatar_url = update.avatar_url.clone();
            }
        }
        Ok(())
    }
}

// --- locations ---

fn couriers() -> Vec<Courier> {
    vec![
        Courier {
            id: 1,
            code: "jne".into(),
            name: "JNE Reguler".into(),
            base_fee: dec(9000),
            per_kg_fee: dec(2000),
        },
        Courier {
            id: 2,
            code: "sicepat".into(),
            name: "SiCepat".into(),
            base_fee: dec(8000),
            per_kg_fee: dec(1500),
        },
    ]
}

pub struct InMemoryLocations {
    provinces: Mutex<Vec<Province>>,
    cities: Mutex<Vec<City>>,
}

impl InMemoryLocations {
    pub fn seeded() -> Self {
        Self {
            provinces: Mutex::new(vec![
                Province {
                    id: 1,
                    name: "DKI Jakarta".into(),
                },
                Province {
                    id: 2,
                    name: "Jawa Barat".into(),
                },
            ]),
            cities: Mutex::new(vec![City {
                id: 1,
                province_id: 1,
                name: "Jakarta Selatan".into(),
            }]),
        }
    }

    pub fn clear(&self) {
        self.provinces.lock().unwrap().clear();
        self.cities.lock().unwrap().clear();
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocations {
    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>> {
        Ok(self.provinces.lock().unwrap().clone())
    }

    async fn list_cities(&self, province_id: i32) -> anyhow::Result<Vec<City>> {
        Ok(self
            .cities
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.province_id == province_id)
            .cloned()
            .collect())
    }

    async fn get_city(&self, city_id: i32) -> anyhow::Result<Option<City>> {
        Ok(self
            .cities
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == city_id)
            .cloned())
    }

    async fn list_couriers(&self) -> anyhow::Result<Vec<Courier>> {
        Ok(couriers())
    }
}

// --- addresses ---

pub fn new_address(label: &str) -> NewAddress {
    NewAddress {
        label: label.to_string(),
        recipient: "Budi".into(),
        phone: "081234567890".into(),
        province_id: 1,
        city_id: 1,
        street: "Jl. Sudirman 1".into(),
        postal_code: "12190".into(),
    }
}

#[derive(Default)]
pub struct InMemoryAddresses {
    // (insertion sequence, address)
    rows: Mutex<Vec<(u64, Address)>>,
}

impl InMemoryAddresses {
    pub fn seed(&self, user_id: Uuid, label: &str, is_default: bool) -> Address {
        let mut rows = self.rows.lock().unwrap();
        let input = new_address(label);
        let address = Address {
            id: Uuid::new_v4(),
            user_id,
            label: input.label,
            recipient: input.recipient,
            phone: input.phone,
            province_id: input.province_id,
            city_id: input.city_id,
            street: input.street,
            postal_code: input.postal_code,
            is_default,
            created_at: Utc::now(),
        };
        let seq = rows.len() as u64;
        rows.push((seq, address.clone()));
        address
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddresses {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Address>> {
        let mut rows: Vec<(u64, Address)> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, a)| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|(sa, a), (sb, b)| b.is_default.cmp(&a.is_default).then(sb.cmp(sa)));
        Ok(rows.into_iter().map(|(_, a)| a).collect())
    }

    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Address>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(_, a)| a.user_id == user_id && a.id == id)
            .map(|(_, a)| a.clone()))
    }

    async fn create(
        &self,
        user_id: Uuid,
        address: &NewAddress,
        max: i64,
    ) -> anyhow::Result<Option<Address>> {
        let mut rows = self.rows.lock().unwrap();
        let count = rows.iter().filter(|(_, a)| a.user_id == user_id).count() as i64;
        if count >= max {
            return Ok(None);
        }
        let created = Address {
            id: Uuid::new_v4(),
            user_id,
            label: address.label.clone(),
            recipient: address.recipient.clone(),
            phone: address.phone.clone(),
            province_id: address.province_id,
            city_id: address.city_id,
            street: address.street.clone(),
            postal_code: address.postal_code.clone(),
            is_default: count == 0,
            created_at: Utc::now(),
        };
        let seq = rows.len() as u64;
        rows.push((seq, created.clone()));
        Ok(Some(created))
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        address: &NewAddress,
    ) -> anyhow::Result<Option<Address>> {
        let mut rows = self.rows.lock().unwrap();
        let Some((_, a)) = rows
            .iter_mut()
            .find(|(_, a)| a.user_id == user_id && a.id == id)
        else {
            return Ok(None);
        };
        a.label = address.label.clone();
        a.recipient = address.recipient.clone();
        a.phone = address.phone.clone();
        a.province_id = address.province_id;
        a.city_id = address.city_id;
        a.street = address.street.clone();
        a.postal_code = address.postal_code.clone();
        Ok(Some(a.clone()))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, a)| !(a.user_id == user_id && a.id == id));
        Ok(rows.len() != before)
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.iter().any(|(_, a)| a.user_id == user_id && a.id == id) {
            return Ok(false);
        }
        for (_, a) in rows.iter_mut().filter(|(_, a)| a.user_id == user_id) {
            a.is_default = a.id == id;
        }
        Ok(true)
    }
}

// --- shops ---

#[derive(Default)]
struct ShopState {
    shops: Vec<Shop>,
    couriers: HashMap<Uuid, Vec<i32>>,
}

#[derive(Clone, Default)]
pub struct InMemoryShops {
    state: Arc<Mutex<ShopState>>,
}

impl InMemoryShops {
    pub fn seed_shop(&self, owner: Uuid, name: &str, courier_ids: &[i32]) -> Shop {
        let shop = Shop {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_string(),
            slug: crate::domain::products::slug::slugify(name),
            description: String::new(),
            address_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let mut state = self.state.lock().unwrap();
        state.shops.push(shop.clone());
        state.couriers.insert(shop.id, courier_ids.to_vec());
        shop
    }

    fn name_of(&self, shop_id: Uuid) -> String {
        self.state
            .lock()
            .unwrap()
            .shops
            .iter()
            .find(|s| s.id == shop_id)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ShopRepository for InMemoryShops {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
        description: &str,
        address_id: Uuid,
    ) -> anyhow::Result<Shop> {
        let shop = Shop {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            address_id,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().shops.push(shop.clone());
        Ok(shop)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Shop>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shops
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Shop>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shops
            .iter()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn get_by_owner(&self, user_id: Uuid) -> anyhow::Result<Option<Shop>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shops
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn name_exists(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shops
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name)))
    }

    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shops
            .iter()
            .any(|s| s.slug == slug))
    }

    async fn update(
        &self,
        shop_id: Uuid,
        description: Option<String>,
        address_id: Option<Uuid>,
    ) -> anyhow::Result<Shop> {
        let mut state = self.state.lock().unwrap();
        let shop = state
            .shops
            .iter_mut()
            .find(|s| s.id == shop_id)
            .ok_or_else(|| anyhow::anyhow!("shop missing"))?;
        if let Some(d) = description {
            shop.description = d;
        }
        if let Some(a) = address_id {
            shop.address_id = a;
        }
        Ok(shop.clone())
    }

    async fn set_couriers(&self, shop_id: Uuid, courier_ids: &[i32]) -> anyhow::Result<bool> {
        let known = couriers();
        if !courier_ids.iter().all(|id| known.iter().any(|c| c.id == *id)) {
            return Ok(false);
        }
        self.state
            .lock()
            .unwrap()
            .couriers
            .insert(shop_id, courier_ids.to_vec());
        Ok(true)
    }

    async fn list_couriers(&self, shop_id: Uuid) -> anyhow::Result<Vec<Courier>> {
        let enabled = self
            .state
            .lock()
            .unwrap()
            .couriers
            .get(&shop_id)
            .cloned()
            .unwrap_or_default();
        Ok(couriers()
            .into_iter()
            .filter(|c| enabled.contains(&c.id))
            .collect())
    }

    async fn find_courier(
        &self,
        shop_id: Uuid,
        courier_id: i32,
    ) -> anyhow::Result<Option<Courier>> {
        Ok(self
            .list_couriers(shop_id)
            .await?
            .into_iter()
            .find(|c| c.id == courier_id))
    }
}

// --- products ---

pub fn new_sku(name: &str, price: Decimal, stock: i32) -> NewSku {
    NewSku {
        name: name.to_string(),
        price,
        stock,
        weight_grams: 500,
        bulk_price: None,
        bulk_min_quantity: None,
    }
}

#[derive(Default)]
struct ProductState {
    categories: Vec<Category>,
    products: Vec<Product>,
    skus: Vec<Sku>,
    shop_names: HashMap<Uuid, (String, String)>,
    promotions: Vec<Promotion>,
    favorites: Vec<(Uuid, Uuid)>,
}

#[derive(Clone, Default)]
pub struct InMemoryProducts {
    state: Arc<Mutex<ProductState>>,
}

impl InMemoryProducts {
    pub fn seeded() -> Self {
        let repo = Self::default();
        repo.state.lock().unwrap().categories = vec![
            Category {
                id: 1,
                name: "Fashion".into(),
                slug: "fashion".into(),
                parent_id: None,
            },
            Category {
                id: 2,
                name: "Aksesoris".into(),
                slug: "aksesoris".into(),
                parent_id: None,
            },
        ];
        repo
    }

    pub fn seed_product(&self, shop: &Shop, name: &str, price: Decimal, stock: i32) -> (Product, Sku) {
        self.seed_product_with(shop, name, price, stock, 500, 1)
    }

    pub fn seed_product_with(
        &self,
        shop: &Shop,
        name: &str,
        price: Decimal,
        stock: i32,
        weight_grams: i32,
        category_id: i32,
    ) -> (Product, Sku) {
        let product = Product {
            id: Uuid::new_v4(),
            shop_id: shop.id,
            category_id,
            name: name.to_string(),
            slug: crate::domain::products::slug::slugify(&format!("{} {}", shop.slug, name)),
            description: String::new(),
            is_archived: false,
            sold_count: 0,
            favorite_count: 0,
            created_at: Utc::now(),
        };
        let sku = Sku {
            id: Uuid::new_v4(),
            product_id: product.id,
            name: "Default".into(),
            price,
            stock,
            weight_grams,
            bulk_price: None,
            bulk_min_quantity: None,
        };
        let mut state = self.state.lock().unwrap();
        state
            .shop_names
            .insert(shop.id, (shop.name.clone(), shop.slug.clone()));
        state.products.push(product.clone());
        state.skus.push(sku.clone());
        (product, sku)
    }

    pub fn sku(&self, sku_id: Uuid) -> Option<Sku> {
        self.state
            .lock()
            .unwrap()
            .skus
            .iter()
            .find(|s| s.id == sku_id)
            .cloned()
    }

    pub fn product(&self, product_id: Uuid) -> Option<Product> {
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
    }

    pub fn edit_sku(&self, sku_id: Uuid, f: impl FnOnce(&mut Sku)) {
        let mut state = self.state.lock().unwrap();
        if let Some(sku) = state.skus.iter_mut().find(|s| s.id == sku_id) {
            f(sku);
        }
    }

    pub fn seed_promotion(&self, product_id: Uuid, kind: DiscountType, amount: Decimal) {
        let mut state = self.state.lock().unwrap();
        let shop_id = state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.shop_id)
            .unwrap_or_default();
        state.promotions.push(Promotion {
            id: Uuid::new_v4(),
            shop_id,
            product_id,
            name: "Promo".into(),
            discount_type: kind,
            amount,
            start_at: Utc::now() - Duration::hours(1),
            end_at: Utc::now() + Duration::days(1),
        });
    }

    fn detail(state: &ProductState, product: &Product) -> ProductDetail {
        let (shop_name, shop_slug) = state
            .shop_names
            .get(&product.shop_id)
            .cloned()
            .unwrap_or_default();
        let category_name = state
            .categories
            .iter()
            .find(|c| c.id == product.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        ProductDetail {
            product: product.clone(),
            shop_name,
            shop_slug,
            category_name,
            skus: state
                .skus
                .iter()
                .filter(|s| s.product_id == product.id)
                .cloned()
                .collect(),
            rating: None,
            review_count: 0,
        }
    }

    fn summary(state: &ProductState, product: &Product) -> ProductSummary {
        let prices: Vec<Decimal> = state
            .skus
            .iter()
            .filter(|s| s.product_id == product.id)
            .map(|s| s.price)
            .collect();
        ProductSummary {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            shop_id: product.shop_id,
            shop_name: state
                .shop_names
                .get(&product.shop_id)
                .map(|(n, _)| n.clone())
                .unwrap_or_default(),
            min_price: prices.iter().copied().min().unwrap_or_default(),
            max_price: prices.iter().copied().max().unwrap_or_default(),
            sold_count: product.sold_count,
            rating: None,
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn category_exists(&self, id: i32) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .iter()
            .any(|c| c.id == id))
    }

    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .products
            .iter()
            .any(|p| p.slug == slug))
    }

    async fn create_product(
        &self,
        shop_id: Uuid,
        product: &NewProduct,
    ) -> anyhow::Result<ProductDetail> {
        let mut state = self.state.lock().unwrap();
        let created = Product {
            id: Uuid::new_v4(),
            shop_id,
            category_id: product.category_id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            is_archived: false,
            sold_count: 0,
            favorite_count: 0,
            created_at: Utc::now(),
        };
        for sku in &product.skus {
            state.skus.push(Sku {
                id: Uuid::new_v4(),
                product_id: created.id,
                name: sku.name.clone(),
                price: sku.price,
                stock: sku.stock,
                weight_grams: sku.weight_grams,
                bulk_price: sku.bulk_price,
                bulk_min_quantity: sku.bulk_min_quantity,
            });
        }
        state.products.push(created.clone());
        Ok(Self::detail(&state, &created))
    }

    async fn update_product(
        &self,
        shop_id: Uuid,
        product_id: Uuid,
        update: &ProductUpdate,
    ) -> anyhow::Result<Option<Product>> {
        let mut state = self.state.lock().unwrap();
        let Some(p) = state
            .products
            .iter_mut()
            .find(|p| p.id == product_id && p.shop_id == shop_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            p.name = name.clone();
        }
        if let Some(d) = &update.description {
            p.description = d.clone();
        }
        if let Some(a) = update.is_archived {
            p.is_archived = a;
        }
        Ok(Some(p.clone()))
    }

    async fn update_sku(
        &self,
        shop_id: Uuid,
        sku_id: Uuid,
        update: &SkuUpdate,
    ) -> anyhow::Result<Option<(Sku, String)>> {
        let mut state = self.state.lock().unwrap();
        let Some(product_id) = state.skus.iter().find(|s| s.id == sku_id).map(|s| s.product_id)
        else {
            return Ok(None);
        };
        let Some(slug) = state
            .products
            .iter()
            .find(|p| p.id == product_id && p.shop_id == shop_id)
            .map(|p| p.slug.clone())
        else {
            return Ok(None);
        };
        let sku = state
            .skus
            .iter_mut()
            .find(|s| s.id == sku_id)
            .ok_or_else(|| anyhow::anyhow!("sku missing"))?;
        if let Some(price) = update.price {
            sku.price = price;
        }
        if let Some(stock) = update.stock {
            sku.stock = stock;
        }
        Ok(Some((sku.clone(), slug)))
    }

    async fn get_owned(&self, shop_id: Uuid, product_id: Uuid) -> anyhow::Result<Option<Product>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == product_id && p.shop_id == shop_id)
            .cloned())
    }

    async fn search(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<ProductSummary> = state
            .products
            .iter()
            .filter(|p| !p.is_archived)
            .filter(|p| {
                query
                    .q
                    .as_ref()
                    .map_or(true, |q| p.name.to_lowercase().contains(&q.to_lowercase()))
            })
            .filter(|p| query.category_id.map_or(true, |c| p.category_id == c))
            .filter(|p| query.shop_id.map_or(true, |s| p.shop_id == s))
            .map(|p| Self::summary(&state, p))
            .filter(|s| query.min_price.map_or(true, |m| s.min_price >= m))
            .filter(|s| query.max_price.map_or(true, |m| s.min_price <= m))
            .collect();
        match query.sort {
            ProductSort::PriceAsc => found.sort_by(|a, b| a.min_price.cmp(&b.min_price)),
            ProductSort::PriceDesc => found.sort_by(|a, b| b.min_price.cmp(&a.min_price)),
            ProductSort::BestSelling => found.sort_by(|a, b| b.sold_count.cmp(&a.sold_count)),
            ProductSort::Newest => found.reverse(),
        }
        Ok(page_of(&found, page))
    }

    async fn get_detail_by_slug(&self, slug: &str) -> anyhow::Result<Option<ProductDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| Self::detail(&state, p)))
    }

    async fn find_sku(&self, sku_id: Uuid) -> anyhow::Result<Option<SkuRef>> {
        let state = self.state.lock().unwrap();
        let Some(sku) = state.skus.iter().find(|s| s.id == sku_id) else {
            return Ok(None);
        };
        Ok(state
            .products
            .iter()
            .find(|p| p.id == sku.product_id)
            .map(|p| SkuRef {
                sku_id: sku.id,
                product_id: p.id,
                shop_id: p.shop_id,
                stock: sku.stock,
                is_archived: p.is_archived,
            }))
    }

    async fn active_promotion(
        &self,
        product_id: Uuid,
        now: chrono::DateTime<Utc>,
    ) -> anyhow::Result<Option<Promotion>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .promotions
            .iter()
            .find(|p| p.product_id == product_id && p.start_at <= now && now <= p.end_at)
            .cloned())
    }

    async fn create_promotion(
        &self,
        shop_id: Uuid,
        promotion: &NewPromotion,
    ) -> anyhow::Result<Promotion> {
        let created = Promotion {
            id: Uuid::new_v4(),
            shop_id,
            product_id: promotion.product_id,
            name: promotion.name.clone(),
            discount_type: promotion.discount_type,
            amount: promotion.amount,
            start_at: promotion.start_at,
            end_at: promotion.end_at,
        };
        self.state.lock().unwrap().promotions.push(created.clone());
        Ok(created)
    }

    async fn list_promotions(&self, shop_id: Uuid) -> anyhow::Result<Vec<Promotion>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .promotions
            .iter()
            .filter(|p| p.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn list_reviews(
        &self,
        _product_id: Uuid,
        _page: PageRequest,
    ) -> anyhow::Result<(Vec<Review>, i64)> {
        Ok((Vec::new(), 0))
    }

    async fn toggle_favorite(&self, user_id: Uuid, product_id: Uuid) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state
            .favorites
            .iter()
            .position(|f| *f == (user_id, product_id))
        {
            state.favorites.remove(pos);
            Ok(false)
        } else {
            state.favorites.push((user_id, product_id));
            Ok(true)
        }
    }

    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)> {
        let state = self.state.lock().unwrap();
        let found: Vec<ProductSummary> = state
            .favorites
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, pid)| state.products.iter().find(|p| p.id == *pid))
            .map(|p| Self::summary(&state, p))
            .collect();
        Ok(page_of(&found, page))
    }

    async fn product_exists(&self, product_id: Uuid) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .products
            .iter()
            .any(|p| p.id == product_id && !p.is_archived))
    }
}

// --- carts ---

#[derive(Clone, Copy)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    sku_id: Uuid,
    quantity: i32,
}

#[derive(Clone)]
pub struct InMemoryCarts {
    rows: Arc<Mutex<Vec<CartRow>>>,
    products: InMemoryProducts,
    shops: InMemoryShops,
}

impl InMemoryCarts {
    pub fn new(products: &InMemoryProducts, shops: &InMemoryShops) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            products: products.clone(),
            shops: shops.clone(),
        }
    }

    pub fn seed(&self, user_id: Uuid, sku_id: Uuid, quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(CartRow {
            id,
            user_id,
            sku_id,
            quantity,
        });
        id
    }

    fn remove(&self, id: Uuid) -> bool {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }

    fn has(&self, id: Uuid) -> bool {
        self.rows.lock().unwrap().iter().any(|r| r.id == id)
    }

    fn join(&self, row: CartRow) -> Option<CartLine> {
        let sku = self.products.sku(row.sku_id)?;
        let product = self.products.product(sku.product_id)?;
        Some(CartLine {
            cart_item_id: row.id,
            user_id: row.user_id,
            quantity: row.quantity,
            sku_id: sku.id,
            sku_name: sku.name,
            price: sku.price,
            stock: sku.stock,
            weight_grams: sku.weight_grams,
            bulk_price: sku.bulk_price,
            bulk_min_quantity: sku.bulk_min_quantity,
            product_id: product.id,
            product_name: product.name,
            product_slug: product.slug,
            category_id: product.category_id,
            shop_id: product.shop_id,
            shop_name: self.shops.name_of(product.shop_id),
        })
    }
}

#[async_trait]
impl CartRepository for InMemoryCarts {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
        let rows: Vec<CartRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .copied()
            .collect();
        Ok(rows.into_iter().filter_map(|r| self.join(r)).collect())
    }

    async fn get_line(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<Option<CartLine>> {
        let row = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == cart_item_id && r.user_id == user_id)
            .copied();
        Ok(row.and_then(|r| self.join(r)))
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        sku_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<Option<(Uuid, i32)>> {
        let Some(stock) = self.products.sku(sku_id).map(|s| s.stock) else {
            return Ok(None);
        };
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.user_id == user_id && r.sku_id == sku_id)
        {
            if i64::from(row.quantity) + i64::from(quantity) > i64::from(stock) {
                return Ok(None);
            }
            row.quantity += quantity;
            return Ok(Some((row.id, row.quantity)));
        }
        if quantity > stock {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        rows.push(CartRow {
            id,
            user_id,
            sku_id,
            quantity,
        });
        Ok(Some((id, quantity)))
    }

    async fn quantity_for_sku(&self, user_id: Uuid, sku_id: Uuid) -> anyhow::Result<i32> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.sku_id == sku_id)
            .map(|r| r.quantity)
            .unwrap_or(0))
    }

    async fn update_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| r.id == cart_item_id && r.user_id == user_id)
        {
            Some(row) => {
                row.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == cart_item_id && r.user_id == user_id));
        Ok(rows.len() != before)
    }
}

// --- vouchers ---

pub fn shop_voucher_input(code: &str) -> NewVoucher {
    NewVoucher {
        code: code.to_string(),
        name: "Hemat".into(),
        discount_type: DiscountType::Percent,
        amount: dec(10),
        max_discount: None,
        category_id: None,
        min_spending: Decimal::ZERO,
        quota: 10,
        start_at: Utc::now() - Duration::hours(1),
        end_at: Utc::now() + Duration::days(7),
    }
}

#[derive(Default)]
struct VoucherState {
    shop: Vec<(ShopVoucher, bool)>,
    marketplace: Vec<MarketplaceVoucher>,
}

#[derive(Clone, Default)]
pub struct InMemoryVouchers {
    state: Arc<Mutex<VoucherState>>,
}

impl InMemoryVouchers {
    pub fn seed_shop_voucher(&self, shop_id: Uuid, voucher: &NewVoucher) -> ShopVoucher {
        let created = ShopVoucher {
            id: Uuid::new_v4(),
            shop_id,
            code: voucher.code.clone(),
            name: voucher.name.clone(),
            discount_type: voucher.discount_type,
            amount: voucher.amount,
            min_spending: voucher.min_spending,
            quota: voucher.quota,
            start_at: voucher.start_at,
            end_at: voucher.end_at,
        };
        self.state
            .lock()
            .unwrap()
            .shop
            .push((created.clone(), false));
        created
    }

    pub fn seed_marketplace_voucher(&self, voucher: &NewVoucher) -> MarketplaceVoucher {
        let created = MarketplaceVoucher {
            id: Uuid::new_v4(),
            code: voucher.code.clone(),
            name: voucher.name.clone(),
            category_id: voucher.category_id,
            discount_type: voucher.discount_type,
            amount: voucher.amount,
            max_discount: voucher.max_discount,
            min_spending: voucher.min_spending,
            quota: voucher.quota,
            start_at: voucher.start_at,
            end_at: voucher.end_at,
        };
        self.state.lock().unwrap().marketplace.push(created.clone());
        created
    }

    pub fn marketplace_quota(&self, code: &str) -> Option<i32> {
        self.state
            .lock()
            .unwrap()
            .marketplace
            .iter()
            .find(|v| v.code == code)
            .map(|v| v.quota)
    }

    fn take_shop_quota(&self, id: Uuid) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.shop.iter_mut().find(|(v, _)| v.id == id) {
            Some((v, _)) if v.quota > 0 => {
                v.quota -= 1;
                true
            }
            _ => false,
        }
    }

    fn take_marketplace_quota(&self, id: Uuid) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.marketplace.iter_mut().find(|v| v.id == id) {
            Some(v) if v.quota > 0 => {
                v.quota -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl VoucherRepository for InMemoryVouchers {
    async fn create_shop_voucher(
        &self,
        shop_id: Uuid,
        voucher: &NewVoucher,
    ) -> anyhow::Result<ShopVoucher> {
        Ok(self.seed_shop_voucher(shop_id, voucher))
    }

    async fn shop_code_exists(&self, shop_id: Uuid, code: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shop
            .iter()
            .any(|(v, deleted)| !deleted && v.shop_id == shop_id && v.code == code))
    }

    async fn list_shop_vouchers(&self, shop_id: Uuid) -> anyhow::Result<Vec<ShopVoucher>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shop
            .iter()
            .filter(|(v, deleted)| !deleted && v.shop_id == shop_id)
            .map(|(v, _)| v.clone())
            .collect())
    }

    async fn list_active_shop_vouchers(
        &self,
        shop_id: Uuid,
        now: chrono::DateTime<Utc>,
    ) -> anyhow::Result<Vec<ShopVoucher>> {
        Ok(self
            .list_shop_vouchers(shop_id)
            .await?
            .into_iter()
            .filter(|v| v.is_redeemable(now))
            .collect())
    }

    async fn delete_shop_voucher(&self, shop_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .shop
            .iter_mut()
            .find(|(v, deleted)| !deleted && v.shop_id == shop_id && v.id == id)
        {
            Some((_, deleted)) => {
                *deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_shop_voucher(
        &self,
        shop_id: Uuid,
        code: &str,
    ) -> anyhow::Result<Option<ShopVoucher>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .shop
            .iter()
            .find(|(v, deleted)| !deleted && v.shop_id == shop_id && v.code == code)
            .map(|(v, _)| v.clone()))
    }

    async fn create_marketplace_voucher(
        &self,
        voucher: &NewVoucher,
    ) -> anyhow::Result<MarketplaceVoucher> {
        Ok(self.seed_marketplace_voucher(voucher))
    }

    async fn marketplace_code_exists(&self, code: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .marketplace
            .iter()
            .any(|v| v.code == code))
    }

    async fn list_active_marketplace_vouchers(
        &self,
        now: chrono::DateTime<Utc>,
    ) -> anyhow::Result<Vec<MarketplaceVoucher>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .marketplace
            .iter()
            .filter(|v| v.is_redeemable(now))
            .cloned()
            .collect())
    }

    async fn find_marketplace_voucher(
        &self,
        code: &str,
    ) -> anyhow::Result<Option<MarketplaceVoucher>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .marketplace
            .iter()
            .find(|v| v.code == code)
            .cloned())
    }
}

// --- orders ---

#[derive(Default)]
struct OrderState {
    invoices: Vec<Invoice>,
    shop_orders: Vec<ShopOrder>,
    lines: Vec<TransactionLine>,
    transitions: Vec<Transition>,
    reviews: Vec<Review>,
    refunds: Vec<RefundRequest>,
    fail_next: Option<CreateInvoiceError>,
    reject_next: bool,
}

/// Order store. When linked to products, carts and vouchers, creating an
/// invoice also decrements stock and quotas and clears the cart, and a
/// failure leaves all of them untouched.
#[derive(Default)]
pub struct InMemoryOrders {
    state: Mutex<OrderState>,
    links: Option<(InMemoryProducts, InMemoryCarts, InMemoryVouchers)>,
}

impl InMemoryOrders {
    pub fn linked(
        products: &InMemoryProducts,
        carts: &InMemoryCarts,
        vouchers: &InMemoryVouchers,
    ) -> Self {
        Self {
            state: Mutex::new(OrderState::default()),
            links: Some((products.clone(), carts.clone(), vouchers.clone())),
        }
    }

    pub fn fail_next(&self, err: CreateInvoiceError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    pub fn reject_next_transition(&self) {
        self.state.lock().unwrap().reject_next = true;
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.state.lock().unwrap().transitions.last().cloned()
    }

    pub fn seed_invoice(&self, user_id: Uuid) -> Uuid {
        let invoice = Invoice {
            id: Uuid::new_v4(),
            user_id,
            address_snapshot: "Budi".into(),
            marketplace_voucher_id: None,
            total_goods: Decimal::ZERO,
            shop_discount: Decimal::ZERO,
            marketplace_discount: Decimal::ZERO,
            total_shipping: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            status: InvoiceStatus::WaitingPayment,
            paid_at: None,
            created_at: Utc::now(),
        };
        let id = invoice.id;
        self.state.lock().unwrap().invoices.push(invoice);
        id
    }

    pub fn seed_shop_order(
        &self,
        buyer_id: Uuid,
        shop_id: Uuid,
        total: Decimal,
        status: OrderStatus,
    ) -> ShopOrder {
        let invoice_id = self.seed_invoice(buyer_id);
        let order = ShopOrder {
            id: Uuid::new_v4(),
            invoice_id,
            shop_id,
            shop_name: "Toko".into(),
            buyer_id,
            shop_voucher_id: None,
            courier_id: 1,
            subtotal: total,
            shop_discount: Decimal::ZERO,
            marketplace_discount: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            total,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().shop_orders.push(order.clone());
        order
    }

    pub fn seed_line(&self, shop_order_id: Uuid) -> Uuid {
        let line = TransactionLine {
            id: Uuid::new_v4(),
            shop_order_id,
            sku_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Kaos".into(),
            sku_name: "Default".into(),
            quantity: 1,
            unit_price: dec(10000),
            discounted_unit_price: dec(10000),
            total: dec(10000),
        };
        let id = line.id;
        self.state.lock().unwrap().lines.push(line);
        id
    }

    fn detail(state: &OrderState, order: &ShopOrder) -> ShopOrderDetail {
        ShopOrderDetail {
            order: order.clone(),
            lines: state
                .lines
                .iter()
                .filter(|l| l.shop_order_id == order.id)
                .cloned()
                .collect(),
            history: Vec::new(),
        }
    }

    fn apply_links(&self, invoice: &NewInvoice) -> Result<(), CreateInvoiceError> {
        let Some((products, carts, vouchers)) = &self.links else {
            return Ok(());
        };
        // Check everything first so a failure writes nothing
        for shop in &invoice.shops {
            for line in &shop.lines {
                let stock = products.sku(line.sku_id).map(|s| s.stock).unwrap_or(0);
                if stock < line.quantity {
                    return Err(CreateInvoiceError::StockExhausted(line.sku_id));
                }
                if !carts.has(line.cart_item_id) {
                    return Err(CreateInvoiceError::CartItemGone(line.cart_item_id));
                }
            }
        }
        for shop in &invoice.shops {
            if let Some(id) = shop.shop_voucher_id {
                if !vouchers.take_shop_quota(id) {
                    return Err(CreateInvoiceError::VoucherExhausted);
                }
            }
            for line in &shop.lines {
                products.edit_sku(line.sku_id, |s| s.stock -= line.quantity);
                carts.remove(line.cart_item_id);
            }
        }
        if let Some(id) = invoice.marketplace_voucher_id {
            if !vouchers.take_marketplace_quota(id) {
                return Err(CreateInvoiceError::VoucherExhausted);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, CreateInvoiceError> {
        if let Some(err) = self.state.lock().unwrap().fail_next.take() {
            return Err(err);
        }
        self.apply_links(invoice)?;
        let now = Utc::now();
        let created = Invoice {
            id: Uuid::new_v4(),
            user_id: invoice.user_id,
            address_snapshot: invoice.address_snapshot.clone(),
            marketplace_voucher_id: invoice.marketplace_voucher_id,
            total_goods: invoice.total_goods,
            shop_discount: invoice.shop_discount,
            marketplace_discount: invoice.marketplace_discount,
            total_shipping: invoice.total_shipping,
            total_payment: invoice.total_payment,
            status: InvoiceStatus::WaitingPayment,
            paid_at: None,
            created_at: now,
        };
        let mut state = self.state.lock().unwrap();
        for shop in &invoice.shops {
            let order = ShopOrder {
                id: Uuid::new_v4(),
                invoice_id: created.id,
                shop_id: shop.shop_id,
                shop_name: shop.shop_name.clone(),
                buyer_id: invoice.user_id,
                shop_voucher_id: shop.shop_voucher_id,
                courier_id: shop.courier_id,
                subtotal: shop.subtotal,
                shop_discount: shop.shop_discount,
                marketplace_discount: shop.marketplace_discount,
                shipping_cost: shop.shipping_cost,
                total: shop.total,
                status: OrderStatus::WaitingPayment,
                created_at: now,
                updated_at: now,
            };
            for line in &shop.lines {
                state.lines.push(TransactionLine {
                    id: Uuid::new_v4(),
                    shop_order_id: order.id,
                    sku_id: line.sku_id,
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    sku_name: line.sku_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discounted_unit_price: line.discounted_unit_price,
                    total: line.total,
                });
            }
            state.shop_orders.push(order);
        }
        state.invoices.push(created.clone());
        Ok(created)
    }

    async fn get_invoice(
        &self,
        user_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<Option<InvoiceDetail>> {
        let state = self.state.lock().unwrap();
        let Some(invoice) = state
            .invoices
            .iter()
            .find(|i| i.id == invoice_id && i.user_id == user_id)
        else {
            return Ok(None);
        };
        let shops = state
            .shop_orders
            .iter()
            .filter(|o| o.invoice_id == invoice.id)
            .map(|o| Self::detail(&state, o))
            .collect();
        Ok(Some(InvoiceDetail {
            invoice: invoice.clone(),
            shops,
        }))
    }

    async fn list_for_buyer(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)> {
        let state = self.state.lock().unwrap();
        let found: Vec<ShopOrder> = state
            .shop_orders
            .iter()
            .filter(|o| o.buyer_id == user_id && status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok(page_of(&found, page))
    }

    async fn list_for_shop(
        &self,
        shop_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)> {
        let state = self.state.lock().unwrap();
        let found: Vec<ShopOrder> = state
            .shop_orders
            .iter()
            .filter(|o| o.shop_id == shop_id && status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok(page_of(&found, page))
    }

    async fn get_shop_order(&self, id: Uuid) -> anyhow::Result<Option<ShopOrderDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .shop_orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| Self::detail(&state, o)))
    }

    async fn transition(&self, transition: &Transition) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        if std::mem::take(&mut state.reject_next) {
            return Ok(false);
        }
        let Some(order) = state
            .shop_orders
            .iter_mut()
            .find(|o| o.id == transition.shop_order_id && o.status == transition.from)
        else {
            return Ok(false);
        };
        order.status = transition.to;
        let order_id = order.id;
        match &transition.refund {
            Some(RefundChange::Open { user_id, reason }) => state.refunds.push(RefundRequest {
                id: Uuid::new_v4(),
                shop_order_id: order_id,
                user_id: *user_id,
                reason: reason.clone(),
                status: RefundStatus::Pending,
                created_at: Utc::now(),
            }),
            Some(RefundChange::Resolve(status)) => {
                for r in state
                    .refunds
                    .iter_mut()
                    .filter(|r| r.shop_order_id == order_id && r.status == RefundStatus::Pending)
                {
                    r.status = *status;
                }
            }
            None => {}
        }
        state.transitions.push(transition.clone());
        Ok(true)
    }

    async fn find_review_target(&self, transaction_id: Uuid) -> anyhow::Result<Option<ReviewTarget>> {
        let state = self.state.lock().unwrap();
        let Some(line) = state.lines.iter().find(|l| l.id == transaction_id) else {
            return Ok(None);
        };
        Ok(state
            .shop_orders
            .iter()
            .find(|o| o.id == line.shop_order_id)
            .map(|o| ReviewTarget {
                transaction_id: line.id,
                product_id: line.product_id,
                buyer_id: o.buyer_id,
                status: o.status,
            }))
    }

    async fn create_review(
        &self,
        target: &ReviewTarget,
        rating: i16,
        comment: Option<&str>,
    ) -> anyhow::Result<Option<Review>> {
        let mut state = self.state.lock().unwrap();
        if state
            .reviews
            .iter()
            .any(|r| r.transaction_id == target.transaction_id)
        {
            return Ok(None);
        }
        let review = Review {
            id: Uuid::new_v4(),
            transaction_id: target.transaction_id,
            product_id: target.product_id,
            user_id: target.buyer_id,
            username: "buyer".into(),
            rating,
            comment: comment.map(str::to_string),
            created_at: Utc::now(),
        };
        state.reviews.push(review.clone());
        Ok(Some(review))
    }

    async fn list_refunds_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<RefundRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .refunds
            .iter()
            .filter(|r| {
                state
                    .shop_orders
                    .iter()
                    .any(|o| o.id == r.shop_order_id && o.shop_id == shop_id)
            })
            .cloned()
            .collect())
    }

    async fn get_refund(&self, id: Uuid) -> anyhow::Result<Option<RefundRequest>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .refunds
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }
}

// --- wallets ---

#[derive(Default)]
struct WalletState {
    wallets: Vec<Wallet>,
    history: Vec<WalletHistory>,
    bills: HashMap<Uuid, Decimal>,
}

#[derive(Default)]
pub struct InMemoryWallets {
    state: Mutex<WalletState>,
}

impl InMemoryWallets {
    /// Registers the unpaid amount of an invoice.
    pub fn bill(&self, invoice_id: Uuid, amount: Decimal) {
        self.state.lock().unwrap().bills.insert(invoice_id, amount);
    }
}

#[async_trait]
impl WalletRepository for InMemoryWallets {
    async fn create(&self, user_id: Uuid, pin_hash: &str) -> anyhow::Result<Wallet> {
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            balance: Decimal::ZERO,
            pin_hash: pin_hash.to_string(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().wallets.push(wallet.clone());
        Ok(wallet)
    }

    async fn get_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Wallet>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .wallets
            .iter()
            .find(|w| w.user_id == user_id)
            .cloned())
    }

    async fn history(
        &self,
        wallet_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<WalletHistory>, i64)> {
        let state = self.state.lock().unwrap();
        let found: Vec<WalletHistory> = state
            .history
            .iter()
            .rev()
            .filter(|h| h.wallet_id == wallet_id)
            .cloned()
            .collect();
        Ok(page_of(&found, page))
    }

    async fn top_up(
        &self,
        wallet_id: Uuid,
        amount: Decimal,
        max_balance: Decimal,
    ) -> anyhow::Result<Option<Wallet>> {
        let mut state = self.state.lock().unwrap();
        let wallet = state
            .wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| anyhow::anyhow!("wallet missing"))?;
        if wallet.balance + amount > max_balance {
            return Ok(None);
        }
        wallet.balance += amount;
        let updated = wallet.clone();
        state.history.push(WalletHistory {
            id: Uuid::new_v4(),
            wallet_id,
            amount,
            kind: HistoryKind::TopUp,
            reference_id: None,
            created_at: Utc::now(),
        });
        Ok(Some(updated))
    }

    async fn update_pin(&self, wallet_id: Uuid, pin_hash: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(w) = state.wallets.iter_mut().find(|w| w.id == wallet_id) {
            w.pin_hash = pin_hash.to_string();
        }
        Ok(())
    }

    async fn pay_invoice(
        &self,
        wallet_id: Uuid,
        _user_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<PayOutcome> {
        let mut state = self.state.lock().unwrap();
        let amount = match state.bills.get(&invoice_id) {
            Some(a) if *a > Decimal::ZERO => *a,
            _ => return Ok(PayOutcome::NothingToPay),
        };
        let wallet = state
            .wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| anyhow::anyhow!("wallet missing"))?;
        if wallet.balance < amount {
            return Ok(PayOutcome::InsufficientBalance);
        }
        wallet.balance -= amount;
        let wallet = wallet.clone();
        state.bills.remove(&invoice_id);
        state.history.push(WalletHistory {
            id: Uuid::new_v4(),
            wallet_id,
            amount: -amount,
            kind: HistoryKind::Payment,
            reference_id: Some(invoice_id),
            created_at: Utc::now(),
        });
        Ok(PayOutcome::Paid { wallet, amount })
    }
}

// --- banners ---

#[derive(Default)]
pub struct InMemoryBanners {
    rows: Mutex<Vec<Banner>>,
}

#[async_trait]
impl BannerRepository for InMemoryBanners {
    async fn create(&self, banner: &NewBanner) -> anyhow::Result<Banner> {
        let created = Banner {
            id: Uuid::new_v4(),
            title: banner.title.clone(),
            image_url: banner.image_url.clone(),
            link_url: banner.link_url.clone(),
            start_at: banner.start_at,
            end_at: banner.end_at,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_active(&self, now: chrono::DateTime<Utc>) -> anyhow::Result<Vec<Banner>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.start_at <= now && now <= b.end_at)
            .cloned()
            .collect())
    }
}

// --- chats ---

pub struct InMemoryChats {
    rows: Mutex<Vec<ChatMessage>>,
    shops: InMemoryShops,
}

impl InMemoryChats {
    pub fn new(shops: &InMemoryShops) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            shops: shops.clone(),
        }
    }

    fn rooms(&self, key: impl Fn(&ChatMessage) -> Option<Uuid>, name: impl Fn(Uuid) -> String) -> Vec<ChatRoom> {
        let rows = self.rows.lock().unwrap();
        let mut rooms: Vec<ChatRoom> = Vec::new();
        for m in rows.iter().rev() {
            let Some(counterpart) = key(m) else { continue };
            if rooms.iter().any(|r| r.counterpart_id == counterpart) {
                continue;
            }
            rooms.push(ChatRoom {
                counterpart_id: counterpart,
                counterpart_name: name(counterpart),
                last_message: m.message.clone(),
                last_sender: m.sender,
                last_at: m.created_at,
            });
        }
        rooms
    }
}

#[async_trait]
impl ChatRepository for InMemoryChats {
    async fn insert(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        sender: Sender,
        message: &str,
    ) -> anyhow::Result<ChatMessage> {
        let created = ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            shop_id,
            sender,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_thread(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ChatMessage>, i64)> {
        let found: Vec<ChatMessage> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id && m.shop_id == shop_id)
            .cloned()
            .collect();
        Ok(page_of(&found, page))
    }

    async fn rooms_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ChatRoom>> {
        Ok(self.rooms(
            |m| (m.user_id == user_id).then_some(m.shop_id),
            |id| self.shops.name_of(id),
        ))
    }

    async fn rooms_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<ChatRoom>> {
        Ok(self.rooms(
            |m| (m.shop_id == shop_id).then_some(m.user_id),
            |id| id.to_string(),
        ))
    }
}

// --- checkout fixture ---

/// Buyer with one address and a two-shop cart: 2x "Kaos" (50000, 500 g,
/// stock 10, category 1) from shop A and 1x "Topi" (30000, 200 g, stock 3,
/// category 2) from shop B. Both shops ship with courier 1.
pub struct CheckoutFixture {
    pub addresses: InMemoryAddresses,
    pub shops: InMemoryShops,
    pub products: InMemoryProducts,
    pub carts: InMemoryCarts,
    pub vouchers: InMemoryVouchers,
    pub orders: InMemoryOrders,
    pub buyer: Uuid,
    pub address: Address,
    pub shop_a: Shop,
    pub shop_b: Shop,
    pub kaos_product: Uuid,
    pub kaos_sku: Uuid,
    pub topi_sku: Uuid,
    pub kaos_line: Uuid,
    pub topi_line: Uuid,
}

impl CheckoutFixture {
    pub fn new() -> Self {
        let addresses = InMemoryAddresses::default();
        let shops = InMemoryShops::default();
        let products = InMemoryProducts::seeded();
        let carts = InMemoryCarts::new(&products, &shops);
        let vouchers = InMemoryVouchers::default();
        let orders = InMemoryOrders::linked(&products, &carts, &vouchers);

        let buyer = Uuid::new_v4();
        let address = addresses.seed(buyer, "Home", true);
        let shop_a = shops.seed_shop(Uuid::new_v4(), "Toko A", &[1]);
        let shop_b = shops.seed_shop(Uuid::new_v4(), "Toko B", &[1]);
        let (kaos, kaos_sku) = products.seed_product_with(&shop_a, "Kaos", dec(50000), 10, 500, 1);
        let (_, topi_sku) = products.seed_product_with(&shop_b, "Topi", dec(30000), 3, 200, 2);
        let kaos_line = carts.seed(buyer, kaos_sku.id, 2);
        let topi_line = carts.seed(buyer, topi_sku.id, 1);

        Self {
            addresses,
            shops,
            products,
            carts,
            vouchers,
            orders,
            buyer,
            address,
            shop_a,
            shop_b,
            kaos_product: kaos.id,
            kaos_sku: kaos_sku.id,
            topi_sku: topi_sku.id,
            kaos_line,
            topi_line,
        }
    }

    pub fn checkout(
        &self,
    ) -> Checkout<
        '_,
        InMemoryAddresses,
        InMemoryShops,
        InMemoryCarts,
        InMemoryProducts,
        InMemoryVouchers,
        InMemoryOrders,
    > {
        Checkout {
            addresses: &self.addresses,
            shops: &self.shops,
            carts: &self.carts,
            products: &self.products,
            vouchers: &self.vouchers,
            orders: &self.orders,
        }
    }

    pub fn add_address(&self, user_id: Uuid) -> Uuid {
        self.addresses.seed(user_id, "Home", true).id
    }

    pub fn sku_stock(&self, sku_id: Uuid) -> i32 {
        self.products.sku(sku_id).map(|s| s.stock).unwrap_or(-1)
    }

    pub fn set_stock(&self, sku_id: Uuid, stock: i32) {
        self.products.edit_sku(sku_id, |s| s.stock = stock);
    }

    pub fn set_bulk(&self, sku_id: Uuid, price: Decimal, min_quantity: i32) {
        self.products.edit_sku(sku_id, |s| {
            s.bulk_price = Some(price);
            s.bulk_min_quantity = Some(min_quantity);
        });
    }

    pub fn add_promotion(&self, product_id: Uuid, kind: DiscountType, amount: Decimal) {
        self.products.seed_promotion(product_id, kind, amount);
    }

    pub fn add_shop_voucher(
        &self,
        shop_id: Uuid,
        code: &str,
        kind: DiscountType,
        amount: Decimal,
        min_spending: Decimal,
    ) {
        let mut input = shop_voucher_input(code);
        input.discount_type = kind;
        input.amount = amount;
        input.min_spending = min_spending;
        self.vouchers.seed_shop_voucher(shop_id, &input);
    }

    pub fn add_marketplace_voucher(
        &self,
        code: &str,
        category_id: Option<i32>,
        kind: DiscountType,
        amount: Decimal,
        min_spending: Decimal,
    ) {
        let mut input = shop_voucher_input(code);
        input.category_id = category_id;
        input.discount_type = kind;
        input.amount = amount;
        input.min_spending = min_spending;
        self.vouchers.seed_marketplace_voucher(&input);
    }

    pub fn marketplace_quota(&self, code: &str) -> i32 {
        self.vouchers.marketplace_quota(code).unwrap_or(-1)
    }
}
