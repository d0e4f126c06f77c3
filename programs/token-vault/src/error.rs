use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Supplied bump does not match the derived address")]
    InvalidDerivation,
    #[msg("Signer does not match the access record authority")]
    Unauthorized,
    #[msg("Withdrawal amount exceeds the recorded balance")]
    InsufficientFunds,
    #[msg("Balance update overflowed")]
    ArithmeticOverflow,
    #[msg("Balance update underflowed")]
    ArithmeticUnderflow,
}
