pub mod issuer;
pub mod overrides;

pub use issuer::{IssueOutcome, ReceiptIssuer};
pub use overrides::{FileOverrideStore, MemoryOverrideStore, OverrideEntry, OverrideStore};
