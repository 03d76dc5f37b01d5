pub mod product;
pub mod restaurant;
