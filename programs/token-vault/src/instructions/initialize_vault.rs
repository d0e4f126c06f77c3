use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{AUTHORITY_SEED, VAULT_SEED};
use crate::error::VaultError;

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    /// The pooled token account for this mint, owned by the vault authority.
    /// `init_if_needed` makes initialization idempotent: a repeat call finds
    /// the account already in place, re-validates its mint and owner through
    /// the same constraints, and succeeds without touching it.
    #[account(
        init_if_needed,
        payer = payer,
        token::mint = mint,
        token::authority = vault_authority,
        token::token_program = token_program,
        seeds = [VAULT_SEED, mint.key().as_ref()],
        bump
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// The asset mint the vault pools
    pub mint: InterfaceAccount<'info, Mint>,

    /// CHECK: keyless PDA that owns every vault token account; carries no data,
    /// validated purely by its derivation
    #[account(
        seeds = [AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitializeVault>, vault_bump: u8) -> Result<()> {
    require_eq!(vault_bump, ctx.bumps.vault, VaultError::InvalidDerivation);

    msg!("Vault ready for mint {}", ctx.accounts.mint.key());
    msg!("Vault: {}", ctx.accounts.vault.key());
    msg!("Vault authority: {}", ctx.accounts.vault_authority.key());

    Ok(())
}
