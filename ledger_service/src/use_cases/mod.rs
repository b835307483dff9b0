pub mod balance_calculator;
pub mod cancel_group;
pub mod group_entries;
pub mod group_status;
pub mod hold_credit;
pub mod hold_debit;
pub mod open_group;
pub mod reconciliation;
pub mod refund;
pub mod register_wallet;
pub mod release_group;
pub mod settle_group;
pub mod transfer;
pub mod wallet_entries;
