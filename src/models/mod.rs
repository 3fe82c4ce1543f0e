//! Diesel row structs and their conversions to and from domain types.

pub mod customer;
pub mod material;
pub mod order;
pub mod process;
pub mod product;
pub mod quality_check;
pub mod supplier;
pub mod user;
pub mod work_order;
