use uuid::Uuid;

use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::products::ProductError;
use crate::domain::pricing;
use crate::domain::products::product::{NewProduct, NewSku, ProductDetail};
use crate::domain::products::slug;

pub const MAX_SKUS: usize = 20;

pub struct CreateProduct<'a, S, P>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub shops: &'a S,
    pub products: &'a P,
}

#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub skus: Vec<NewSku>,
}

impl<'a, S, P> CreateProduct<'a, S, P>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        req: CreateProductRequest,
    ) -> Result<ProductDetail, ProductError> {
        let shop = self
            .shops
            .get_by_owner(user_id)
            .await?
            .ok_or(ProductError::ShopRequired)?;
        let name = req.name.trim().to_string();
        if name.chars().count() < 3 || name.chars().count() > 120 {
            return Err(ProductError::InvalidInput("name must be 3-120 characters".into()));
        }
        if req.skus.is_empty() || req.skus.len() > MAX_SKUS {
            return Err(ProductError::InvalidInput(format!(
                "a product needs 1-{MAX_SKUS} skus"
            )));
        }
        let mut skus = Vec::with_capacity(req.skus.len());
        for sku in req.skus {
            skus.push(validate_sku(sku).map_err(ProductError::InvalidInput)?);
        }
        if !self.products.category_exists(req.category_id).await? {
            return Err(ProductError::CategoryNotFound);
        }

        let base = slug::slugify(&format!("{} {}", shop.slug, name));
        let mut n = 0;
        let product_slug = loop {
            let candidate = slug::with_suffix(&base, n);
            if !self.products.slug_exists(&candidate).await? {
                break candidate;
            }
            n += 1;
        };

        let detail = self
            .products
            .create_product(
                shop.id,
                &NewProduct {
                    category_id: req.category_id,
                    name,
                    slug: product_slug,
                    description: req.description.trim().to_string(),
                    skus,
                },
            )
            .await?;
        tracing::info!(shop_id = %shop.id, product_id = %detail.product.id, "product_created");
        Ok(detail)
    }
}

pub(crate) fn validate_sku(mut sku: NewSku) -> Result<NewSku, String> {
    sku.name = sku.name.trim().to_string();
    if sku.name.is_empty() {
        return Err("sku name is required".into());
    }
    if !pricing::is_storable_price(sku.price) {
        return Err("sku price must be positive with at most two decimals".into());
    }
    if sku.stock < 0 {
        return Err("sku stock must not be negative".into());
    }
    if sku.weight_grams <= 0 {
        return Err("sku weight must be positive".into());
    }
    match (sku.bulk_price, sku.bulk_min_quantity) {
        (None, None) => {}
        (Some(price), Some(min)) => {
            if !pricing::is_storable_price(price) || price >= sku.price {
                return Err("bulk price must be below the unit price".into());
            }
            if min < 2 {
                return Err("bulk minimum quantity must be at least 2".into());
            }
        }
        _ => return Err("bulk price and bulk minimum quantity go together".into()),
    }
    Ok(sku)
}
