pub mod vault_access;

pub use vault_access::*;
