// Core modules implementing scoped access, transactions, queries, and error modeling.
pub mod error;
pub mod gather;
pub mod query;
pub mod scope;
pub mod statement;
pub mod store;
pub mod tx;
