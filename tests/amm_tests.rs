//! Swaps, balances and failure handling of the AMM contract.
//!
//! Tests that change pool balances deploy their own instance into the module ledger; tests that only touch
//! account balances share the module deployment and use distinct caller addresses.

use std::sync::LazyLock;

use starkbench::Felt;
use starkbench::runtime::{ExecutionErrorKind, ResultValue, StarknetContract, StarknetError, TransactionExecutionInfo};
use starkbench::testing::{ModuleFixtures, acquire_deployed_contract, compile_contract};
use starkbench_core::hash::storage_address;

static FIXTURES: LazyLock<ModuleFixtures> =
    LazyLock::new(|| ModuleFixtures::new().expect("failed to create the module event loop"));

const TOKEN_TYPE_A: u64 = 1;
const TOKEN_TYPE_B: u64 = 2;

fn felt(value: u64) -> Felt {
    Felt::from(value)
}

fn single(info: &TransactionExecutionInfo, name: &str) -> Felt {
    match info.result.get(name) {
        Some(ResultValue::Felt(value)) => value.clone(),
        other => panic!("Expected felt output '{name}', got {other:?}"),
    }
}

async fn fresh_amm() -> StarknetContract {
    let starknet = FIXTURES.starknet().await;
    let definition = compile_contract("amm.cairo").unwrap();
    acquire_deployed_contract(&starknet, definition).await.unwrap()
}

async fn account_balance(amm: &StarknetContract, account: u64, token: u64) -> Felt {
    let info = amm
        .method("get_account_token_balance", [felt(account), felt(token)])
        .unwrap()
        .call()
        .await
        .unwrap();
    single(&info, "balance")
}

async fn pool_balance(amm: &StarknetContract, token: u64) -> Felt {
    let info = amm.method("get_pool_token_balance", [felt(token)]).unwrap().call().await.unwrap();
    single(&info, "balance")
}

fn execution_error(err: &StarknetError) -> (ExecutionErrorKind, Option<String>) {
    let exec = err.execution().unwrap_or_else(|| panic!("Expected an execution error, got {err}"));
    (exec.kind, exec.error_message().map(str::to_string))
}

#[test]
fn test_swap_moves_tokens_between_account_and_pool() {
    FIXTURES.block_on(async {
        let amm = fresh_amm().await;
        let account = 7u64;

        amm.method("init_pool", [felt(1000), felt(2000)]).unwrap().invoke().await.unwrap();
        amm.method("add_demo_token", [felt(100), felt(100)])
            .unwrap()
            .with_caller(account)
            .invoke()
            .await
            .unwrap();

        let info = amm
            .method("swap", [felt(TOKEN_TYPE_A), felt(100)])
            .unwrap()
            .with_caller(account)
            .invoke()
            .await
            .unwrap();
        // 2000 * 100 / (1000 + 100), rounded down.
        assert_eq!(single(&info, "amount_to"), felt(181));

        assert_eq!(pool_balance(&amm, TOKEN_TYPE_A).await, felt(1100));
        assert_eq!(pool_balance(&amm, TOKEN_TYPE_B).await, felt(1819));
        assert_eq!(account_balance(&amm, account, TOKEN_TYPE_A).await, felt(0));
        assert_eq!(account_balance(&amm, account, TOKEN_TYPE_B).await, felt(281));
    });
}

#[test]
fn test_swap_back_uses_updated_ratio() {
    FIXTURES.block_on(async {
        let amm = fresh_amm().await;
        let account = 8u64;

        amm.method("init_pool", [felt(1000), felt(1000)]).unwrap().invoke().await.unwrap();
        amm.method("add_demo_token", [felt(0), felt(500)])
            .unwrap()
            .with_caller(account)
            .invoke()
            .await
            .unwrap();

        let info = amm
            .method("swap", [felt(TOKEN_TYPE_B), felt(500)])
            .unwrap()
            .with_caller(account)
            .invoke()
            .await
            .unwrap();
        // 1000 * 500 / 1500
        assert_eq!(single(&info, "amount_to"), felt(333));
        assert_eq!(pool_balance(&amm, TOKEN_TYPE_A).await, felt(667));
        assert_eq!(pool_balance(&amm, TOKEN_TYPE_B).await, felt(1500));
    });
}

#[test]
fn test_add_demo_token_is_per_caller() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();

        amm.method("add_demo_token", [felt(10), felt(20)])
            .unwrap()
            .with_caller(101u64)
            .invoke()
            .await
            .unwrap();
        amm.method("add_demo_token", [felt(5), felt(5)])
            .unwrap()
            .with_caller(101u64)
            .invoke()
            .await
            .unwrap();

        assert_eq!(account_balance(&amm, 101, TOKEN_TYPE_A).await, felt(15));
        assert_eq!(account_balance(&amm, 101, TOKEN_TYPE_B).await, felt(25));
        assert_eq!(account_balance(&amm, 102, TOKEN_TYPE_A).await, felt(0));
    });
}

#[test]
fn test_balances_live_at_hashed_storage_keys() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        amm.method("add_demo_token", [felt(3), felt(4)])
            .unwrap()
            .with_caller(103u64)
            .invoke()
            .await
            .unwrap();

        let starknet = amm.starknet();
        let key_a = storage_address("account_balance", &[felt(103), felt(TOKEN_TYPE_A)]);
        let key_b = storage_address("account_balance", &[felt(103), felt(TOKEN_TYPE_B)]);
        assert_eq!(starknet.storage_at(amm.address(), &key_a).await, felt(3));
        assert_eq!(starknet.storage_at(amm.address(), &key_b).await, felt(4));
    });
}

#[test]
fn test_call_does_not_commit() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        amm.method("add_demo_token", [felt(50), felt(50)])
            .unwrap()
            .with_caller(104u64)
            .call()
            .await
            .unwrap();
        assert_eq!(account_balance(&amm, 104, TOKEN_TYPE_A).await, felt(0));
    });
}

#[test]
fn test_unknown_token_type() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        let err = amm
            .method("swap", [felt(3), felt(10)])
            .unwrap()
            .with_caller(105u64)
            .invoke()
            .await
            .unwrap_err();
        let (kind, message) = execution_error(&err);
        assert_eq!(kind, ExecutionErrorKind::AssertEq);
        assert_eq!(message.as_deref(), Some("Unknown token type"));
    });
}

#[test]
fn test_swap_amount_out_of_range() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        let err = amm
            .method("swap", [felt(TOKEN_TYPE_A), felt(0)])
            .unwrap()
            .with_caller(106u64)
            .invoke()
            .await
            .unwrap_err();
        let (kind, message) = execution_error(&err);
        assert_eq!(kind, ExecutionErrorKind::RangeCheck);
        assert_eq!(message.as_deref(), Some("Swap amount out of range"));
    });
}

#[test]
fn test_insufficient_balance() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        amm.method("add_demo_token", [felt(10), felt(0)])
            .unwrap()
            .with_caller(107u64)
            .invoke()
            .await
            .unwrap();
        let err = amm
            .method("swap", [felt(TOKEN_TYPE_A), felt(11)])
            .unwrap()
            .with_caller(107u64)
            .invoke()
            .await
            .unwrap_err();
        let (_, message) = execution_error(&err);
        assert_eq!(message.as_deref(), Some("Insufficient balance"));
        assert!(err.to_string().contains("Error message: Insufficient balance"));
    });
}

#[test]
fn test_failed_invoke_leaves_state_unchanged() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        // The first token is credited before the second one overflows the account bound.
        let err = amm
            .method("add_demo_token", [felt(10), felt(1_073_741)])
            .unwrap()
            .with_caller(108u64)
            .invoke()
            .await
            .unwrap_err();
        let (kind, message) = execution_error(&err);
        assert_eq!(kind, ExecutionErrorKind::RangeCheck);
        assert_eq!(message.as_deref(), Some("Account balance out of range"));

        assert_eq!(account_balance(&amm, 108, TOKEN_TYPE_A).await, felt(0));
        assert_eq!(account_balance(&amm, 108, TOKEN_TYPE_B).await, felt(0));
    });
}

#[test]
fn test_failure_trace_points_into_contract() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        let err = amm
            .method("swap", [felt(3), felt(10)])
            .unwrap()
            .invoke()
            .await
            .unwrap_err();
        let exec = err.execution().unwrap();
        assert!(!exec.trace.is_empty());
        assert!(exec.trace.iter().all(|location| location.contains("amm.cairo")));
    });
}

#[test]
fn test_wrong_argument_count_is_rejected_before_execution() {
    FIXTURES.block_on(async {
        let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
        let err = amm.method("swap", [felt(TOKEN_TYPE_A)]).unwrap_err();
        assert!(matches!(err, StarknetError::InvalidArguments { .. }));
    });
}
