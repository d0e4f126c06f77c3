use anchor_lang::prelude::*;

/// Per-depositor claim against the pooled vault balance of one mint.
///
/// The pooled balance itself lives in the SPL token account derived from
/// `[b"vault", mint]`; this record only tracks how much of that pool the
/// depositor may withdraw. Invariant: for a given mint, the sum of all
/// record balances never exceeds the vault token account's amount.
#[account]
pub struct VaultAccess {
    /// The depositor who may deposit into and withdraw against this record
    pub authority: Pubkey,
    /// Redeemable balance inside the pooled vault account
    pub balance: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl VaultAccess {
    pub const LEN: usize = 8 + // discriminator
        32 + // authority
        8 + // balance
        1; // bump
}
