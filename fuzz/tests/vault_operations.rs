use fuzz_helpers::*;
use solana_sdk::signature::Signer;
use token_vault::error::VaultError;

const DECIMALS: u8 = 6;

#[tokio::test]
async fn initialize_vault_is_idempotent() {
    let mut env = setup_program_test().await;
    let mint = setup_mint(&mut env.context, DECIMALS).await.unwrap();

    let (vault, vault_bump) = derive_vault_pda(&mint.mint);
    let payer = env.context.payer.insecure_clone();

    let ix = initialize_vault_ix(&mint.mint, &payer.pubkey(), vault_bump);
    process_ix(&mut env.context, ix, &payer, &[]).await.unwrap();

    // Second call finds the vault already in place and must succeed unchanged
    let ix = initialize_vault_ix(&mint.mint, &payer.pubkey(), vault_bump);
    process_ix(&mut env.context, ix, &payer, &[]).await.unwrap();

    let balance = get_token_balance(&mut env.context, &vault).await.unwrap();
    assert_eq!(balance, 0);
}

#[tokio::test]
async fn initialize_vault_rejects_wrong_bump() {
    let mut env = setup_program_test().await;
    let mint = setup_mint(&mut env.context, DECIMALS).await.unwrap();

    let (_, vault_bump) = derive_vault_pda(&mint.mint);
    let payer = env.context.payer.insecure_clone();

    let ix = initialize_vault_ix(&mint.mint, &payer.pubkey(), vault_bump.wrapping_sub(1));
    let result = process_ix(&mut env.context, ix, &payer, &[]).await;

    assert_vault_error(result, VaultError::InvalidDerivation);
}

#[tokio::test]
async fn initialize_vault_access_rejects_wrong_bump() {
    let mut env = setup_program_test().await;
    let mint = setup_mint(&mut env.context, DECIMALS).await.unwrap();

    let user = setup_user(&mut env.context, &mint.mint).await.unwrap();
    let (vault_access, access_bump) = derive_vault_access_pda(&mint.mint, &user.owner.pubkey());

    let ix = initialize_vault_access_ix(
        &mint.mint,
        &user.owner.pubkey(),
        access_bump.wrapping_sub(1),
    );
    let result = process_ix(&mut env.context, ix, &user.owner, &[]).await;
    assert_vault_error(result, VaultError::InvalidDerivation);

    // The failed transaction must roll back the record creation entirely
    let account = env
        .context
        .banks_client
        .get_account(vault_access)
        .await
        .unwrap();
    assert!(account.is_none());
}

#[tokio::test]
async fn vault_access_cannot_be_initialized_twice() {
    let (mut env, setup) = setup_complete_environment(0, DECIMALS).await.unwrap();

    let owner = setup.user.owner.insecure_clone();
    let (_, access_bump) = derive_vault_access_pda(&setup.mint.mint, &owner.pubkey());

    // The record address is already occupied, so the create must fail
    let ix = initialize_vault_access_ix(&setup.mint.mint, &owner.pubkey(), access_bump);
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert!(result.is_err());

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.authority, owner.pubkey());
    assert_eq!(record.balance, 0);
}

#[tokio::test]
async fn deposits_accumulate_in_record_and_vault() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();

    for amount in [50u64, 70, 80] {
        let ix = deposit_ix(
            &setup.mint.mint,
            &setup.vault_access,
            &owner.pubkey(),
            &setup.user.token_account,
            amount,
        );
        process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();
    }

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 200);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);

    let user_balance = get_token_balance(&mut env.context, &setup.user.token_account)
        .await
        .unwrap();
    assert_eq!(user_balance, 800);
}

#[tokio::test]
async fn withdraw_moves_funds_back() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        150,
        vault_bump,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 50);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 50);

    let user_balance = get_token_balance(&mut env.context, &setup.user.token_account)
        .await
        .unwrap();
    assert_eq!(user_balance, 950);
}

#[tokio::test]
async fn withdraw_exceeding_balance_fails_without_side_effects() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        300,
        vault_bump,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert_vault_error(result, VaultError::InsufficientFunds);

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 200);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);
}

#[tokio::test]
async fn withdraw_rejects_wrong_bump_without_side_effects() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        100,
        vault_bump.wrapping_sub(1),
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert_vault_error(result, VaultError::InvalidDerivation);

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 200);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);
}

#[tokio::test]
async fn withdraw_by_non_authority_fails() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    // An attacker names the victim's record but signs with their own key
    let attacker = setup_user(&mut env.context, &setup.mint.mint).await.unwrap();
    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &attacker.owner.pubkey(),
        &attacker.token_account,
        200,
        vault_bump,
    );
    let result = process_ix(&mut env.context, ix, &attacker.owner, &[]).await;
    assert_vault_error(result, VaultError::Unauthorized);

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 200);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);
}

#[tokio::test]
async fn deposit_against_foreign_record_fails() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();

    let intruder = setup_user(&mut env.context, &setup.mint.mint).await.unwrap();
    mint_tokens(
        &mut env.context,
        &setup.mint.mint,
        &setup.mint.mint_authority,
        &intruder.token_account,
        500,
    )
    .await
    .unwrap();

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &intruder.owner.pubkey(),
        &intruder.token_account,
        100,
    );
    let result = process_ix(&mut env.context, ix, &intruder.owner, &[]).await;
    assert_vault_error(result, VaultError::Unauthorized);

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 0);
}

#[tokio::test]
async fn zero_amounts_are_rejected() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        0,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert_vault_error(result, VaultError::InvalidAmount);

    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        0,
        vault_bump,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert_vault_error(result, VaultError::InvalidAmount);
}

#[tokio::test]
async fn deposit_exceeding_source_balance_fails() {
    let (mut env, setup) = setup_complete_environment(100, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();

    // SPL token program rejects the transfer; the record must stay unchanged
    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        500,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert!(result.is_err());

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, 0);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 0);
}

#[tokio::test]
async fn deposit_overflowing_record_fails_before_transfer() {
    let (mut env, setup) = setup_complete_environment(u64::MAX, DECIMALS).await.unwrap();
    let owner = setup.user.owner.insecure_clone();

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        u64::MAX,
    );
    process_ix(&mut env.context, ix, &owner, &[]).await.unwrap();

    // The record is saturated; one more unit would wrap it. The checked add
    // runs before the transfer, so this fails with the program's own error
    // rather than the token program's insufficient-funds error.
    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        1,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;
    assert_vault_error(result, VaultError::ArithmeticOverflow);

    let record = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record.balance, u64::MAX);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, u64::MAX);
}

// Two depositors share one pooled vault; claims stay per-depositor
#[tokio::test]
async fn pooled_vault_tracks_claims_per_depositor() {
    let (mut env, setup) = setup_complete_environment(1_000, DECIMALS).await.unwrap();
    let depositor_a = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    // A deposits 200
    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &depositor_a.pubkey(),
        &setup.user.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &depositor_a, &[]).await.unwrap();

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);

    // A withdraws everything
    let ix = withdraw_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &depositor_a.pubkey(),
        &setup.user.token_account,
        200,
        vault_bump,
    );
    process_ix(&mut env.context, ix, &depositor_a, &[]).await.unwrap();

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 0);
    let record_a = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await
        .unwrap();
    assert_eq!(record_a.balance, 0);

    // B joins, deposits 200, then overreaches
    let depositor_b = setup_user(&mut env.context, &setup.mint.mint).await.unwrap();
    mint_tokens(
        &mut env.context,
        &setup.mint.mint,
        &setup.mint.mint_authority,
        &depositor_b.token_account,
        1_000,
    )
    .await
    .unwrap();

    let (access_b, access_bump_b) =
        derive_vault_access_pda(&setup.mint.mint, &depositor_b.owner.pubkey());
    let ix = initialize_vault_access_ix(&setup.mint.mint, &depositor_b.owner.pubkey(), access_bump_b);
    process_ix(&mut env.context, ix, &depositor_b.owner, &[]).await.unwrap();

    let ix = deposit_ix(
        &setup.mint.mint,
        &access_b,
        &depositor_b.owner.pubkey(),
        &depositor_b.token_account,
        200,
    );
    process_ix(&mut env.context, ix, &depositor_b.owner, &[]).await.unwrap();

    let ix = withdraw_ix(
        &setup.mint.mint,
        &access_b,
        &depositor_b.owner.pubkey(),
        &depositor_b.token_account,
        300,
        vault_bump,
    );
    let result = process_ix(&mut env.context, ix, &depositor_b.owner, &[]).await;
    assert_vault_error(result, VaultError::InsufficientFunds);

    let vault_balance = get_token_balance(&mut env.context, &setup.vault).await.unwrap();
    assert_eq!(vault_balance, 200);
    let record_b = get_vault_access_state(&mut env.context, &access_b).await.unwrap();
    assert_eq!(record_b.balance, 200);
}
