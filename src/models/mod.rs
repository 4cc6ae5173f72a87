pub mod ledger;
pub mod ranking;

pub use ledger::*;
pub use ranking::*;
