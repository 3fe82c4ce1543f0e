pub mod customer;
pub mod dashboard;
pub mod material;
pub mod money;
pub mod numbering;
pub mod order;
pub mod process;
pub mod product;
pub mod quality_check;
pub mod stats;
pub mod status;
pub mod supplier;
pub mod user;
pub mod work_order;
