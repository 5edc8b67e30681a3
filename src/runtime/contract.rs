//! Handles to deployed contracts.

use std::sync::Arc;

use starkbench_core::Felt;
use starkbench_core::hash::get_selector_from_name;

use super::calldata::{CallArg, encode_args};
use super::errors::{ExecutionError, ExecutionErrorKind, StarknetError};
use super::result::{CallInfo, FunctionResult, TransactionExecutionInfo};
use super::{CallRequest, Starknet};
use crate::definition::{AbiFunction, ContractDefinition};

/// A contract deployed on a [`Starknet`] ledger.
///
/// The handle keeps its ledger alive; cloning it yields another handle to the same deployment.
#[derive(Debug, Clone)]
pub struct StarknetContract {
    starknet: Arc<Starknet>,
    definition: Arc<ContractDefinition>,
    address: Felt,
    deploy_call_info: Option<CallInfo>,
}

impl StarknetContract {
    pub(crate) fn new(
        starknet: Arc<Starknet>,
        definition: Arc<ContractDefinition>,
        address: Felt,
        deploy_call_info: Option<CallInfo>,
    ) -> Self {
        Self {
            starknet,
            definition,
            address,
            deploy_call_info,
        }
    }

    pub fn address(&self) -> &Felt {
        &self.address
    }

    pub fn definition(&self) -> &Arc<ContractDefinition> {
        &self.definition
    }

    pub fn starknet(&self) -> &Arc<Starknet> {
        &self.starknet
    }

    /// Constructor call, if the contract has a constructor.
    pub fn deploy_call_info(&self) -> Option<&CallInfo> {
        self.deploy_call_info.as_ref()
    }

    /// Prepare a call to an external or view function.
    ///
    /// `felt*` arguments are passed as arrays; their `_len` companions are filled in automatically.
    pub fn method<A>(&self, name: &str, args: impl IntoIterator<Item = A>) -> Result<ContractFunctionInvocation, StarknetError>
    where
        A: Into<CallArg>,
    {
        let function = self
            .definition
            .abi_function(name)
            .cloned()
            .ok_or_else(|| StarknetError::UnknownFunction { name: name.to_string() })?;
        let args: Vec<CallArg> = args.into_iter().map(Into::into).collect();
        let calldata = encode_args(&function, args).map_err(|reason| StarknetError::InvalidArguments {
            function: name.to_string(),
            reason,
        })?;
        Ok(ContractFunctionInvocation {
            starknet: Arc::clone(&self.starknet),
            address: self.address.clone(),
            selector: get_selector_from_name(name),
            function,
            calldata,
            caller: Felt::zero(),
        })
    }
}

/// A prepared call; run it with [`invoke`](Self::invoke) or [`call`](Self::call).
#[derive(Debug, Clone)]
pub struct ContractFunctionInvocation {
    starknet: Arc<Starknet>,
    address: Felt,
    selector: Felt,
    function: AbiFunction,
    calldata: Vec<Felt>,
    caller: Felt,
}

impl ContractFunctionInvocation {
    /// Call as if from `caller` (default 0).
    pub fn with_caller(mut self, caller: impl Into<Felt>) -> Self {
        self.caller = caller.into();
        self
    }

    /// The encoded calldata.
    pub fn calldata(&self) -> &[Felt] {
        &self.calldata
    }

    pub fn selector(&self) -> &Felt {
        &self.selector
    }

    /// Run as a transaction; state changes are kept.
    #[tracing::instrument(skip_all, fields(function = %self.function.name))]
    pub async fn invoke(self) -> Result<TransactionExecutionInfo, StarknetError> {
        self.run(true).await
    }

    /// Run without keeping any state changes.
    #[tracing::instrument(skip_all, fields(function = %self.function.name))]
    pub async fn call(self) -> Result<TransactionExecutionInfo, StarknetError> {
        self.run(false).await
    }

    async fn run(self, commit: bool) -> Result<TransactionExecutionInfo, StarknetError> {
        let request = CallRequest {
            contract_address: self.address,
            selector: self.selector,
            calldata: self.calldata,
            caller_address: self.caller,
        };
        let (call_info, block_number) = self.starknet.execute(request, commit).await?;
        let result = FunctionResult::decode(&self.function.outputs, &call_info.retdata).map_err(|reason| {
            ExecutionError::new(ExecutionErrorKind::InvalidProgram, format!("{}: {reason}", self.function.name))
        })?;
        Ok(TransactionExecutionInfo {
            result,
            call_info,
            block_number,
        })
    }
}
