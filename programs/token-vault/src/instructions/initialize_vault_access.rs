use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::constants::VAULT_ACCESS_SEED;
use crate::error::VaultError;
use crate::state::VaultAccess;

#[derive(Accounts)]
pub struct InitializeVaultAccess<'info> {
    /// Strict create: re-running this for the same (mint, authority) pair
    /// fails at account creation because the address is already occupied.
    #[account(
        init,
        payer = authority,
        space = VaultAccess::LEN,
        seeds = [VAULT_ACCESS_SEED, mint.key().as_ref(), authority.key().as_ref()],
        bump
    )]
    pub vault_access: Account<'info, VaultAccess>,

    /// The asset mint the record is scoped to
    pub mint: InterfaceAccount<'info, Mint>,

    /// The depositor; becomes the record's authority and pays for it
    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeVaultAccess>, access_bump: u8) -> Result<()> {
    require_eq!(
        access_bump,
        ctx.bumps.vault_access,
        VaultError::InvalidDerivation
    );

    let vault_access = &mut ctx.accounts.vault_access;
    vault_access.authority = ctx.accounts.authority.key();
    vault_access.balance = 0;
    vault_access.bump = ctx.bumps.vault_access;

    msg!("Vault access record created");
    msg!("Record: {}", vault_access.key());
    msg!("Authority: {}", vault_access.authority);

    Ok(())
}
