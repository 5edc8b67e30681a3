//! In-process simulated ledger.
//!
//! [`Starknet`] owns the ledger state behind an async mutex. Every transaction runs against a snapshot of that
//! state and replaces it only when the transaction succeeds (and is meant to be committed), so a failed
//! deployment or invocation leaves no trace.
//!
//! ## Examples
//! ```rust,no_run
//! # async fn demo(definition: starkbench::definition::ContractDefinition) -> Result<(), starkbench::runtime::StarknetError> {
//! use starkbench::runtime::Starknet;
//!
//! let starknet = Starknet::empty().await;
//! let contract = starknet.deploy(definition).await?;
//! let info = contract.method("forever_one", Vec::<u64>::new())?.call().await?;
//! assert!(info.result.get("res").is_some());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

mod calldata;
mod config;
mod contract;
mod errors;
mod memory;
mod result;
mod state;
mod vm;

pub use calldata::CallArg;
pub use config::StarknetConfig;
pub use contract::{ContractFunctionInvocation, StarknetContract};
pub use errors::{ExecutionError, ExecutionErrorKind, StarknetError};
pub use memory::{MemoryError, Relocatable};
pub use result::{CallInfo, Event, FunctionResult, ResultValue, TransactionExecutionInfo};
pub use state::{BlockInfo, ContractState};

use std::fmt;
use std::sync::Arc;

use starkbench_core::Felt;
use starkbench_core::hash::calculate_contract_address;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::definition::{ContractDefinition, EntryPointType};
use state::StarknetState;
use vm::ExecutionContext;

/// Options for [`Starknet::deploy_with`].
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Address salt. Without one, the ledger's deployment counter supplies the salt; explicit salts leave the
    /// counter alone.
    pub salt: Option<Felt>,
    pub constructor_args: Vec<CallArg>,
    pub deployer: Felt,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salt(mut self, salt: Felt) -> Self {
        self.salt = Some(salt);
        self
    }

    pub fn with_constructor_args(mut self, args: impl IntoIterator<Item = impl Into<CallArg>>) -> Self {
        self.constructor_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deployer(mut self, deployer: Felt) -> Self {
        self.deployer = deployer;
        self
    }
}

/// A contract call waiting to run.
#[derive(Debug, Clone)]
pub(crate) struct CallRequest {
    pub contract_address: Felt,
    pub selector: Felt,
    pub calldata: Vec<Felt>,
    pub caller_address: Felt,
}

/// A simulated ledger.
pub struct Starknet {
    state: Mutex<StarknetState>,
    config: StarknetConfig,
}

impl fmt::Debug for Starknet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Starknet").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Starknet {
    /// A ledger with no classes and no contracts, at block 0.
    pub async fn empty() -> Arc<Self> {
        Self::with_config(StarknetConfig::default()).await
    }

    pub async fn with_config(config: StarknetConfig) -> Arc<Self> {
        let block_info = BlockInfo {
            block_number: config.initial_block_number,
            block_timestamp: config.initial_block_timestamp,
        };
        debug!(?block_info, "creating empty ledger");
        Arc::new(Self {
            state: Mutex::new(StarknetState::new(block_info)),
            config,
        })
    }

    pub fn config(&self) -> &StarknetConfig {
        &self.config
    }

    /// Register a contract class and return its class hash.
    pub async fn declare(&self, definition: impl Into<Arc<ContractDefinition>>) -> Result<Felt, StarknetError> {
        let mut state = self.state.lock().await;
        Ok(state.declare(definition.into())?)
    }

    /// Deploy with default options: counter salt, no constructor arguments, deployer address 0.
    pub async fn deploy(
        self: &Arc<Self>,
        definition: impl Into<Arc<ContractDefinition>>,
    ) -> Result<StarknetContract, StarknetError> {
        self.deploy_with(definition, DeployOptions::default()).await
    }

    /// Declare the class, derive the contract address and run the constructor.
    ///
    /// The deployment is all or nothing: if the constructor fails, the ledger is left unchanged.
    #[tracing::instrument(skip_all, fields(salt = ?options.salt))]
    pub async fn deploy_with(
        self: &Arc<Self>,
        definition: impl Into<Arc<ContractDefinition>>,
        options: DeployOptions,
    ) -> Result<StarknetContract, StarknetError> {
        let definition = definition.into();
        let constructor_calldata = match definition.constructor_abi() {
            Some(abi) => calldata::encode_args(abi, options.constructor_args).map_err(|reason| {
                StarknetError::InvalidArguments {
                    function: abi.name.clone(),
                    reason,
                }
            })?,
            None if options.constructor_args.is_empty() => Vec::new(),
            None => {
                return Err(StarknetError::InvalidArguments {
                    function: "constructor".to_string(),
                    reason: "contract has no constructor".to_string(),
                });
            }
        };

        let mut state = self.state.lock().await;
        let mut snapshot = state.clone();
        let class_hash = snapshot.declare(Arc::clone(&definition))?;
        let derive = |salt: &Felt| calculate_contract_address(salt, &class_hash, &constructor_calldata, &options.deployer);
        let address = match &options.salt {
            Some(salt) => {
                let address = derive(salt);
                if snapshot.contracts.contains_key(&address) {
                    return Err(StarknetError::AddressOccupied(address));
                }
                address
            }
            // Counter salts skip addresses already taken by explicitly salted deployments.
            None => loop {
                let address = derive(&Felt::from(snapshot.deploy_counter));
                snapshot.deploy_counter += 1;
                if !snapshot.contracts.contains_key(&address) {
                    break address;
                }
            },
        };
        snapshot.contracts.insert(
            address.clone(),
            ContractState {
                class_hash,
                storage: Default::default(),
            },
        );

        let deploy_call_info = match definition.constructor() {
            Some(entry_point) => {
                let mut ctx = ExecutionContext::new(&mut snapshot, &self.config);
                Some(ctx.call_contract(
                    address.clone(),
                    entry_point.selector.clone(),
                    EntryPointType::Constructor,
                    constructor_calldata,
                    options.deployer.clone(),
                )?)
            }
            None => None,
        };
        *state = snapshot;
        info!(address = %format!("{address:#x}"), "contract deployed");

        Ok(StarknetContract::new(
            Arc::clone(self),
            definition,
            address,
            deploy_call_info,
        ))
    }

    /// Run an external call. With `commit`, the resulting state replaces the ledger; otherwise it is discarded.
    pub(crate) async fn execute(&self, request: CallRequest, commit: bool) -> Result<(CallInfo, u64), StarknetError> {
        let mut state = self.state.lock().await;
        if !state.contracts.contains_key(&request.contract_address) {
            return Err(StarknetError::ContractNotFound(request.contract_address));
        }
        let mut snapshot = state.clone();
        let block_number = snapshot.block_info.block_number;
        let call_info = {
            let mut ctx = ExecutionContext::new(&mut snapshot, &self.config);
            ctx.call_contract(
                request.contract_address,
                request.selector,
                EntryPointType::External,
                request.calldata,
                request.caller_address,
            )?
        };
        if commit {
            *state = snapshot;
        }
        Ok((call_info, block_number))
    }

    /// Raw storage value of a contract, zero if never written.
    pub async fn storage_at(&self, address: &Felt, key: &Felt) -> Felt {
        self.state.lock().await.storage_read(address, key)
    }

    pub async fn block_info(&self) -> BlockInfo {
        self.state.lock().await.block_info
    }

    pub async fn set_block_timestamp(&self, timestamp: u64) {
        self.state.lock().await.block_info.block_timestamp = timestamp;
    }

    /// Move to the next block and return it.
    pub async fn advance_block(&self) -> BlockInfo {
        let mut state = self.state.lock().await;
        state.block_info.block_number += 1;
        state.block_info
    }

    /// Number of deployed contracts.
    pub async fn contract_count(&self) -> usize {
        self.state.lock().await.contracts.len()
    }
}
