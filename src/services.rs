pub mod customer_service;
pub mod ledger_service;
pub mod purchase_service;
pub mod store_service;
pub mod transactional_ledger;

pub use customer_service::CustomerService;
pub use ledger_service::{CashbackLedger, LedgerService};
pub use purchase_service::PurchaseService;
pub use store_service::StoreService;
pub use transactional_ledger::TransactionalLedger;
