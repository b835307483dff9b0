pub mod currency;
pub mod ids;
pub mod pagination;

pub use currency::Currency;
pub use ids::{CorrelationKey, EntryId, GroupId, WalletId};
pub use pagination::Page;
