//! Local purchase data adapters.

mod file_purchase_ledger;
mod in_memory;

pub use file_purchase_ledger::FilePurchaseLedger;
pub use in_memory::InMemoryPurchaseData;
