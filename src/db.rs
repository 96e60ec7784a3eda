pub mod user_repo;
pub use user_repo::UserRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
