pub mod order;

pub use order::{
    Customer, LineItem, Order, OrderStatus, ShippingProvider, NOT_AVAILABLE, UNKNOWN_CUSTOMER,
};
