pub mod interfaces;
pub mod validation;

use crate::interfaces::Entity;

pub struct Order {
    pub id: u64,
    pub lines: Vec<OrderLine>,
}

pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
}

impl Entity for Order {
    fn id(&self) -> u64 {
        self.id
    }
}
