use crate::interfaces::Validator;
use crate::Order;

pub struct OrderValidator;

impl Validator<Order> for OrderValidator {
    fn validate(&self, value: &Order) -> Vec<String> {
        value
            .lines
            .iter()
            .filter(|line| line.quantity == 0)
            .map(|line| format!("{} has no quantity", line.sku))
            .collect()
    }
}
