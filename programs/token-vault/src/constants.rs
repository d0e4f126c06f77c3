/// Seed tag for the program-wide transfer authority PDA.
pub const AUTHORITY_SEED: &[u8] = b"authority";

/// Seed tag for the pooled vault token account, one per mint.
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed tag for per-depositor access records, one per (mint, depositor).
pub const VAULT_ACCESS_SEED: &[u8] = b"vault-access";
