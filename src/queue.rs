pub mod failures;
pub mod journal;
pub mod session;
pub mod store;
