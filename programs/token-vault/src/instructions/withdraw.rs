use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{AUTHORITY_SEED, VAULT_ACCESS_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::state::VaultAccess;

#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// The pooled token account funds leave from
    #[account(
        mut,
        seeds = [VAULT_SEED, mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = vault_authority,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// The asset mint
    pub mint: InterfaceAccount<'info, Mint>,

    /// CHECK: keyless PDA that signs the outbound transfer via its seeds
    #[account(
        seeds = [AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// The withdrawing user's access record for this mint
    #[account(
        mut,
        seeds = [VAULT_ACCESS_SEED, mint.key().as_ref(), vault_access.authority.as_ref()],
        bump = vault_access.bump,
    )]
    pub vault_access: Account<'info, VaultAccess>,

    /// Where the withdrawn tokens go; any account of the right mint
    #[account(
        mut,
        token::mint = mint,
    )]
    pub destination_token_account: InterfaceAccount<'info, TokenAccount>,

    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Withdraw>, amount: u64, vault_bump: u8) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);
    require_eq!(vault_bump, ctx.bumps.vault, VaultError::InvalidDerivation);
    require_keys_eq!(
        ctx.accounts.vault_access.authority,
        ctx.accounts.authority.key(),
        VaultError::Unauthorized
    );

    // Every precondition is checked before the transfer; a failed withdrawal
    // leaves the vault and the record untouched.
    require!(
        amount <= ctx.accounts.vault_access.balance,
        VaultError::InsufficientFunds
    );

    let new_balance = ctx
        .accounts
        .vault_access
        .balance
        .checked_sub(amount)
        .ok_or(VaultError::ArithmeticUnderflow)?;

    let authority_bump = ctx.bumps.vault_authority;
    let authority_seeds: &[&[u8]] = &[AUTHORITY_SEED, &[authority_bump]];
    let signer_seeds = &[authority_seeds];

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.vault.to_account_info(),
        mint: ctx.accounts.mint.to_account_info(),
        to: ctx.accounts.destination_token_account.to_account_info(),
        authority: ctx.accounts.vault_authority.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
        signer_seeds,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.mint.decimals)?;

    ctx.accounts.vault_access.balance = new_balance;

    msg!("Withdraw successful!");
    msg!("Withdrawn: {} tokens", amount);
    msg!("Record balance: {}", new_balance);
    msg!("Vault balance: {}", ctx.accounts.vault.amount - amount);

    Ok(())
}
