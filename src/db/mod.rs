pub mod connection;
pub mod errors;
pub mod ledger;


pub use connection::*;
pub use errors::*;
pub use ledger::PgLedger;
