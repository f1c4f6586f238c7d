pub mod customer;
pub mod purchase;
pub mod response;
pub mod store;
