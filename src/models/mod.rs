pub mod fulfillment;
pub mod product;

pub use fulfillment::*;
pub use product::*;
