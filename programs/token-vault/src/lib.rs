pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("2PNSsoRVXfhXpLNAmATHgn4ThopPaVMS9iQrbxSKAqG9");

#[program]
pub mod token_vault {
    use super::*;

    pub fn initialize_vault(ctx: Context<InitializeVault>, vault_bump: u8) -> Result<()> {
        initialize_vault::handler(ctx, vault_bump)
    }

    pub fn initialize_vault_access(
        ctx: Context<InitializeVaultAccess>,
        access_bump: u8,
    ) -> Result<()> {
        initialize_vault_access::handler(ctx, access_bump)
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        deposit::handler(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64, vault_bump: u8) -> Result<()> {
        withdraw::handler(ctx, amount, vault_bump)
    }
}
