pub mod traits;
pub use traits::{CustomerStore, PurchaseStore, StoreDirectory};
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod store_repo;
pub use store_repo::StoreRepository;

#[cfg(test)]
pub mod memory;
