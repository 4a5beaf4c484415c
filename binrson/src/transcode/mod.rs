//! Output formats beyond RSON and JSON.

pub mod cbor;
pub mod toml;
pub mod yaml;
