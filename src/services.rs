pub mod auth;
pub mod product_service;
pub mod purchase_service;
pub mod role_service;
