pub mod entry;
pub mod risk;
pub mod user;
