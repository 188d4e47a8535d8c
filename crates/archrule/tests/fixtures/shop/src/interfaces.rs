use crate::Order;

pub trait Entity {
    fn id(&self) -> u64;
}

pub trait Validator<T> {
    fn validate(&self, value: &T) -> Vec<String>;
}

pub trait OrderRepository {
    fn find(&self, id: u64) -> Option<Order>;
}
