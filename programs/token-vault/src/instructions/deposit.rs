use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{AUTHORITY_SEED, VAULT_ACCESS_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::state::VaultAccess;

#[derive(Accounts)]
pub struct Deposit<'info> {
    /// The pooled token account receiving the deposit
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

    /// CHECK: keyless PDA that owns the vault token account
    #[account(
        seeds = [AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// The depositor's access record for this mint. Derived from the
    /// recorded authority, so a record belonging to a different mint or
    /// depositor fails the seeds check before the handler runs.
    #[account(
        mut,
        seeds = [VAULT_ACCESS_SEED, mint.key().as_ref(), vault_access.authority.as_ref()],
        bump = vault_access.bump,
    )]
    pub vault_access: Account<'info, VaultAccess>,

    /// The depositor's source token account
    #[account(
        mut,
        token::mint = mint,
        token::authority = depositor,
    )]
    pub depositor_token_account: InterfaceAccount<'info, TokenAccount>,

    pub depositor: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    require!(amount > 0, VaultError::InvalidAmount);
    require_keys_eq!(
        ctx.accounts.vault_access.authority,
        ctx.accounts.depositor.key(),
        VaultError::Unauthorized
    );

    // Checked before the transfer so an overflowing deposit never moves funds
    let new_balance = ctx
        .accounts
        .vault_access
        .balance
        .checked_add(amount)
        .ok_or(VaultError::ArithmeticOverflow)?;

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.depositor_token_account.to_account_info(),
        mint: ctx.accounts.mint.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
        authority: ctx.accounts.depositor.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.mint.decimals)?;

    ctx.accounts.vault_access.balance = new_balance;

    msg!("Deposit successful!");
    msg!("Deposited: {} tokens", amount);
    msg!("Record balance: {}", new_balance);
    msg!("Vault balance: {}", ctx.accounts.vault.amount + amount);

    Ok(())
}
