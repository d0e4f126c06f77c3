#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::signature::Signer;

/// Fuzzable input for a deposit/withdraw sequence
#[derive(Debug, Clone, Arbitrary)]
struct VaultFuzzInput {
    /// Amount to deposit (fuzzed)
    amount: u64,
    /// Extra balance minted to the user beyond the deposit amount
    extra_balance: u64,
    /// Token decimals (for setup)
    decimals: u8,
    /// Whether to do an initial deposit first (tests accumulation)
    do_initial_deposit: bool,
    /// Initial deposit amount (if do_initial_deposit is true)
    initial_deposit_amount: u64,
    /// Amount to withdraw after depositing
    withdraw_amount: u64,
}

/// Execute a single fuzz iteration against a fresh vault
async fn fuzz_vault_once(input: VaultFuzzInput) -> Result<(), Box<dyn std::error::Error>> {
    // Constrain inputs to avoid trivial rejections
    let amount = input.amount.max(1);
    let initial_deposit = input.initial_deposit_amount.max(1);
    let decimals = input.decimals % 19; // Token decimals are typically 0-18

    let mut total_needed = amount;
    if input.do_initial_deposit {
        total_needed = total_needed.saturating_add(initial_deposit);
    }
    let initial_balance = total_needed.saturating_add(input.extra_balance % 1_000_000_000);

    let (mut env, setup) = match setup_complete_environment(initial_balance, decimals).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            return Ok(()); // Skip this iteration if setup fails
        }
    };

    let owner = setup.user.owner.insecure_clone();
    let (_, vault_bump) = derive_vault_pda(&setup.mint.mint);

    if input.do_initial_deposit {
        let ix = deposit_ix(
            &setup.mint.mint,
            &setup.vault_access,
            &owner.pubkey(),
            &setup.user.token_account,
            initial_deposit,
        );
        if process_ix(&mut env.context, ix, &owner, &[]).await.is_err() {
            return Ok(()); // Skip if the setup deposit fails
        }
    }

    let vault_before = get_token_balance(&mut env.context, &setup.vault).await?;
    let user_before = get_token_balance(&mut env.context, &setup.user.token_account).await?;
    let record_before = get_vault_access_state(&mut env.context, &setup.vault_access)
        .await?
        .balance;

    let ix = deposit_ix(
        &setup.mint.mint,
        &setup.vault_access,
        &owner.pubkey(),
        &setup.user.token_account,
        amount,
    );
    let result = process_ix(&mut env.context, ix, &owner, &[]).await;

    match result {
        Ok(_) => {
            let vault_after = get_token_balance(&mut env.context, &setup.vault).await?;
            let user_after =
                get_token_balance(&mut env.context, &setup.user.token_account).await?;
            let record_after = get_vault_access_state(&mut env.context, &setup.vault_access)
                .await?
                .balance;

            // PROPERTY 1: CONSERVATION OF TOKENS
            assert_eq!(
                vault_before + user_before,
                vault_after + user_after,
                "CRITICAL: Token conservation violated! Before: vault={} user={}, After: vault={} user={}",
                vault_before,
                user_before,
                vault_after,
                user_after
            );

            // PROPERTY 2: EXACT MOVEMENT
            assert_eq!(
                vault_after,
                vault_before + amount,
                "Vault balance should increase by exact deposit amount"
            );
            assert_eq!(
                user_after,
                user_before - amount,
                "User balance should decrease by exact deposit amount"
            );

            // PROPERTY 3: CLAIM BOOKKEEPING
            // Every unit in the pool is claimed by exactly one record
            assert_eq!(
                record_after,
                record_before + amount,
                "Access record should track the deposited amount"
            );
            assert_eq!(
                record_after, vault_after,
                "Single-depositor pool: record claim must equal pooled balance"
            );

            // Withdraw leg: within the claim it must succeed, beyond it must
            // fail without moving anything
            let withdraw_amount = input.withdraw_amount.max(1);
            let ix = withdraw_ix(
                &setup.mint.mint,
                &setup.vault_access,
                &owner.pubkey(),
                &setup.user.token_account,
                withdraw_amount,
                vault_bump,
            );
            let withdraw_result = process_ix(&mut env.context, ix, &owner, &[]).await;

            let vault_final = get_token_balance(&mut env.context, &setup.vault).await?;
            let record_final = get_vault_access_state(&mut env.context, &setup.vault_access)
                .await?
                .balance;

            if withdraw_amount <= record_after {
                assert!(
                    withdraw_result.is_ok(),
                    "Withdrawal within the recorded claim must succeed: {:?}",
                    withdraw_result
                );
                assert_eq!(vault_final, vault_after - withdraw_amount);
                assert_eq!(record_final, record_after - withdraw_amount);
            } else {
                assert!(
                    withdraw_result.is_err(),
                    "Withdrawal beyond the recorded claim must fail"
                );
                assert_eq!(vault_final, vault_after, "Failed withdrawal moved funds");
                assert_eq!(record_final, record_after, "Failed withdrawal changed the record");
            }

            println!(
                "✓ PASS - deposit={}, withdraw={}, vault: {}→{}",
                amount, withdraw_amount, vault_before, vault_final
            );
        }
        Err(e) => {
            println!("✗ Deposit failed: amount={}, error={:?}", amount, e);

            // Acceptable failures: insufficient source balance (SPL token
            // error) or checked-math rejection on the record balance
            let error_string = format!("{:?}", e);
            let acceptable_errors = ["InsufficientFunds", "Custom(1)", "ArithmeticOverflow"];

            let is_acceptable = acceptable_errors
                .iter()
                .any(|&pattern| error_string.contains(pattern));

            if !is_acceptable {
                panic!("Unexpected error during deposit: {:?}\nInput: {:?}", e, input);
            }

            // The record must be untouched by a failed deposit
            let record_after = get_vault_access_state(&mut env.context, &setup.vault_access)
                .await?
                .balance;
            assert_eq!(record_after, record_before, "Failed deposit changed the record");
        }
    }

    Ok(())
}

fuzz_target!(|input: VaultFuzzInput| {
    // Run the async fuzz test
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_vault_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
