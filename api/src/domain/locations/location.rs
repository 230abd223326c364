use rust_decimal::Decimal;

use crate::domain::pricing;

#[derive(Debug, Clone)]
pub struct Province {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct City {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Courier {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub base_fee: Decimal,
    pub per_kg_fee: Decimal,
}

impl Courier {
    pub fn cost_for(&self, weight_grams: i64) -> Decimal {
        pricing::shipping_cost(self.base_fee, self.per_kg_fee, weight_grams)
    }
}
