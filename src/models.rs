pub mod auth;
pub mod dashboard;
pub mod finance;
pub mod goods;
pub mod tier;
pub mod vendor;
