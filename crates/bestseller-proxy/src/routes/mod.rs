pub mod bestsellers;
pub mod health;
