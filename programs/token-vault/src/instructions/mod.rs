pub mod deposit;
pub mod initialize_vault;
pub mod initialize_vault_access;
pub mod withdraw;

pub use deposit::*;
pub use initialize_vault::*;
pub use initialize_vault_access::*;
pub use withdraw::*;
