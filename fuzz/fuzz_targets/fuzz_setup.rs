use anchor_lang::AccountDeserialize;
use anchor_lang::InstructionData;
use anchor_lang::ToAccountMetas;
use solana_program_test::*;
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::instruction as token_instruction;
use token_vault::error::VaultError;
use token_vault::state::VaultAccess;
use token_vault::{AUTHORITY_SEED, VAULT_ACCESS_SEED, VAULT_SEED};

// Re-export for convenience
pub use solana_program_test::ProgramTestContext;

// Custom error type for setup helpers
pub type SetupResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Test environment with program loaded
pub struct TestEnv {
    pub program_id: Pubkey,
    pub context: ProgramTestContext,
}

/// Asset mint accounts
#[derive(Debug)]
pub struct MintAccounts {
    pub mint: Pubkey,
    pub mint_authority: Keypair,
    pub decimals: u8,
}

impl Clone for MintAccounts {
    fn clone(&self) -> Self {
        panic!("MintAccounts cannot be cloned due to Keypair");
    }
}

/// A depositor with a funded token account
#[derive(Debug)]
pub struct UserAccounts {
    pub owner: Keypair,
    pub token_account: Pubkey,
}

impl Clone for UserAccounts {
    fn clone(&self) -> Self {
        panic!("UserAccounts cannot be cloned due to Keypair");
    }
}

/// Complete setup: mint + vault + one depositor with an access record
pub struct CompleteSetup {
    pub mint: MintAccounts,
    pub vault: Pubkey,
    pub vault_authority: Pubkey,
    pub user: UserAccounts,
    pub vault_access: Pubkey,
}

// ============================================================================
// Core Setup Functions
// ============================================================================

/// Adapts anchor's `entry` to the fn-pointer signature `processor!` expects,
/// which requires the accounts slice lifetime to be independent of the
/// `AccountInfo` lifetime.
fn entry_wrapper(
    program_id: &Pubkey,
    accounts: &[solana_sdk::account_info::AccountInfo],
    instruction_data: &[u8],
) -> solana_sdk::entrypoint::ProgramResult {
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    token_vault::entry(program_id, accounts, instruction_data)
}

/// Creates the program test environment with the vault program as an
/// in-process builtin
pub async fn setup_program_test() -> TestEnv {
    let program_id = token_vault::id();
    let program_test = ProgramTest::new(
        "token_vault",
        program_id,
        processor!(entry_wrapper),
    );

    let context = program_test.start_with_context().await;

    TestEnv {
        program_id,
        context,
    }
}

/// Creates a new SPL token mint to serve as the vault's asset
pub async fn setup_mint(
    context: &mut ProgramTestContext,
    decimals: u8,
) -> SetupResult<MintAccounts> {
    let mint_authority = Keypair::new();
    let mint_keypair = Keypair::new();
    let mint = mint_keypair.pubkey();

    let rent = context.banks_client.get_rent().await?;
    let mint_len = 82; // Size of Mint account in SPL Token program
    let mint_rent = rent.minimum_balance(mint_len);

    let create_account_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &mint,
        mint_rent,
        mint_len as u64,
        &spl_token::id(),
    );

    let init_mint_ix = token_instruction::initialize_mint(
        &spl_token::id(),
        &mint,
        &mint_authority.pubkey(),
        None,
        decimals,
    )?;

    let blockhash = context.get_new_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[create_account_ix, init_mint_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, &mint_keypair],
        blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(MintAccounts {
        mint,
        mint_authority,
        decimals,
    })
}

/// Creates a funded user with a token account for the given mint
pub async fn setup_user(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
) -> SetupResult<UserAccounts> {
    let owner = Keypair::new();

    let rent = context.banks_client.get_rent().await?;
    let lamports = rent.minimum_balance(0) + 1_000_000_000; // 1 SOL

    let fund_ix = solana_sdk::system_instruction::transfer(
        &context.payer.pubkey(),
        &owner.pubkey(),
        lamports,
    );

    let account_len = 165; // Size of Token account in SPL Token program
    let token_account = Keypair::new();

    let create_account_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &token_account.pubkey(),
        rent.minimum_balance(account_len),
        account_len as u64,
        &spl_token::id(),
    );

    let init_account_ix = token_instruction::initialize_account(
        &spl_token::id(),
        &token_account.pubkey(),
        mint,
        &owner.pubkey(),
    )?;

    let blockhash = context.get_new_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[fund_ix, create_account_ix, init_account_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, &token_account],
        blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(UserAccounts {
        owner,
        token_account: token_account.pubkey(),
    })
}

/// Mints tokens to a token account
pub async fn mint_tokens(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    mint_authority: &Keypair,
    destination: &Pubkey,
    amount: u64,
) -> SetupResult<()> {
    let mint_to_ix = token_instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )?;

    let blockhash = context.get_new_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[mint_to_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, mint_authority],
        blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(())
}

// ============================================================================
// Instruction Submission
// ============================================================================

/// Signs and submits a single instruction with a fresh blockhash so that
/// repeated identical calls are never deduplicated by signature
pub async fn process_ix(
    context: &mut ProgramTestContext,
    ix: Instruction,
    payer: &Keypair,
    extra_signers: &[&Keypair],
) -> std::result::Result<(), BanksClientError> {
    let blockhash = context
        .get_new_latest_blockhash()
        .await
        .expect("failed to refresh blockhash");

    let mut signers: Vec<&Keypair> = vec![payer];
    signers.extend_from_slice(extra_signers);

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&payer.pubkey()),
        &signers,
        blockhash,
    );

    context.banks_client.process_transaction(tx).await
}

/// Builds the initialize_vault instruction
pub fn initialize_vault_ix(mint: &Pubkey, payer: &Pubkey, vault_bump: u8) -> Instruction {
    let (vault, _) = derive_vault_pda(mint);
    let (vault_authority, _) = derive_vault_authority_pda();

    let accounts = token_vault::accounts::InitializeVault {
        vault,
        mint: *mint,
        vault_authority,
        payer: *payer,
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: token_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: token_vault::instruction::InitializeVault { vault_bump }.data(),
    }
}

/// Builds the initialize_vault_access instruction
pub fn initialize_vault_access_ix(mint: &Pubkey, authority: &Pubkey, access_bump: u8) -> Instruction {
    let (vault_access, _) = derive_vault_access_pda(mint, authority);

    let accounts = token_vault::accounts::InitializeVaultAccess {
        vault_access,
        mint: *mint,
        authority: *authority,
        system_program: solana_sdk::system_program::ID,
    };

    Instruction {
        program_id: token_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: token_vault::instruction::InitializeVaultAccess { access_bump }.data(),
    }
}

/// Builds a deposit instruction against the given access record
pub fn deposit_ix(
    mint: &Pubkey,
    vault_access: &Pubkey,
    depositor: &Pubkey,
    depositor_token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let (vault, _) = derive_vault_pda(mint);
    let (vault_authority, _) = derive_vault_authority_pda();

    let accounts = token_vault::accounts::Deposit {
        vault,
        mint: *mint,
        vault_authority,
        vault_access: *vault_access,
        depositor_token_account: *depositor_token_account,
        depositor: *depositor,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: token_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: token_vault::instruction::Deposit { amount }.data(),
    }
}

/// Builds a withdraw instruction against the given access record
pub fn withdraw_ix(
    mint: &Pubkey,
    vault_access: &Pubkey,
    authority: &Pubkey,
    destination_token_account: &Pubkey,
    amount: u64,
    vault_bump: u8,
) -> Instruction {
    let (vault, _) = derive_vault_pda(mint);
    let (vault_authority, _) = derive_vault_authority_pda();

    let accounts = token_vault::accounts::Withdraw {
        vault,
        mint: *mint,
        vault_authority,
        vault_access: *vault_access,
        destination_token_account: *destination_token_account,
        authority: *authority,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: token_vault::id(),
        accounts: accounts.to_account_metas(None),
        data: token_vault::instruction::Withdraw { amount, vault_bump }.data(),
    }
}

/// Sets up everything: mint + vault + one funded depositor with an access record
pub async fn setup_complete_environment(
    initial_user_balance: u64,
    decimals: u8,
) -> SetupResult<(TestEnv, CompleteSetup)> {
    let mut env = setup_program_test().await;

    let mint = setup_mint(&mut env.context, decimals).await?;

    let (vault, vault_bump) = derive_vault_pda(&mint.mint);
    let (vault_authority, _) = derive_vault_authority_pda();

    let payer = env.context.payer.insecure_clone();
    let ix = initialize_vault_ix(&mint.mint, &payer.pubkey(), vault_bump);
    process_ix(&mut env.context, ix, &payer, &[]).await?;

    let user = setup_user(&mut env.context, &mint.mint).await?;

    let (vault_access, access_bump) = derive_vault_access_pda(&mint.mint, &user.owner.pubkey());
    let owner = user.owner.insecure_clone();
    let ix = initialize_vault_access_ix(&mint.mint, &owner.pubkey(), access_bump);
    process_ix(&mut env.context, ix, &owner, &[]).await?;

    if initial_user_balance > 0 {
        mint_tokens(
            &mut env.context,
            &mint.mint,
            &mint.mint_authority,
            &user.token_account,
            initial_user_balance,
        )
        .await?;
    }

    let setup = CompleteSetup {
        mint,
        vault,
        vault_authority,
        user,
        vault_access,
    };

    Ok((env, setup))
}

// ============================================================================
// PDA Derivation Helpers
// ============================================================================

/// Derive the program-wide transfer authority PDA
pub fn derive_vault_authority_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AUTHORITY_SEED], &token_vault::id())
}

/// Derive the pooled vault token account PDA for a mint
pub fn derive_vault_pda(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, mint.as_ref()], &token_vault::id())
}

/// Derive the access record PDA for a (mint, depositor) pair
pub fn derive_vault_access_pda(mint: &Pubkey, depositor: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_ACCESS_SEED, mint.as_ref(), depositor.as_ref()],
        &token_vault::id(),
    )
}

// ============================================================================
// Account State Verification Helpers
// ============================================================================

/// Fetch and return an access record's state
pub async fn get_vault_access_state(
    context: &mut ProgramTestContext,
    vault_access: &Pubkey,
) -> SetupResult<VaultAccess> {
    let account = context
        .banks_client
        .get_account(*vault_access)
        .await?
        .ok_or("Vault access account not found")?;

    let state = VaultAccess::try_deserialize(&mut account.data.as_ref())?;
    Ok(state)
}

/// Get token account balance
pub async fn get_token_balance(
    context: &mut ProgramTestContext,
    account: &Pubkey,
) -> SetupResult<u64> {
    let account_data = context
        .banks_client
        .get_account(*account)
        .await?
        .ok_or("Token account not found")?;

    // Token account structure: amount is at offset 64 (u64)
    if account_data.data.len() < 72 {
        return Err("Invalid token account data".into());
    }

    let amount = u64::from_le_bytes(
        account_data.data[64..72]
            .try_into()
            .map_err(|_| "Failed to parse amount")?,
    );

    Ok(amount)
}

/// Asserts that a transaction failed with the given program error
pub fn assert_vault_error(
    result: std::result::Result<(), BanksClientError>,
    expected: VaultError,
) {
    let expected_code = u32::from(expected);
    match result {
        Err(BanksClientError::TransactionError(TransactionError::InstructionError(
            _,
            InstructionError::Custom(code),
        ))) => {
            assert_eq!(code, expected_code, "unexpected custom error code");
        }
        other => panic!("expected custom error {}, got {:?}", expected_code, other),
    }
}
