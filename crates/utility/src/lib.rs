pub mod collate;
pub mod geo;
pub mod id;
pub mod let_also;
pub mod serde;
pub mod token;
