//! Module-scoped test fixtures.
//!
//! A test module owns one [`ModuleFixtures`] value, normally in a `static LazyLock` inside one integration-test
//! file. The fixtures are built on first use and shared by every test in that module:
//!
//! - an event loop (a current-thread tokio runtime) that drives the module's async tests,
//! - one [`Starknet`] ledger,
//! - one deployment per contract file.
//!
//! Separate test files hold separate `ModuleFixtures`, so nothing is shared across modules. The ledger lives in
//! memory only; dropping the fixtures releases everything.
//!
//! ## Examples
//! ```rust,no_run
//! use std::sync::LazyLock;
//! use starkbench::testing::ModuleFixtures;
//!
//! static FIXTURES: LazyLock<ModuleFixtures> = LazyLock::new(|| ModuleFixtures::new().unwrap());
//!
//! FIXTURES.block_on(async {
//!     let amm = FIXTURES.deployed("amm.cairo").await.unwrap();
//!     let info = amm.method("forever_one", Vec::<u64>::new()).unwrap().call().await.unwrap();
//!     assert!(info.result.get("res").is_some());
//! });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::compiler::{CompileOptions, compile_starknet_file};
use crate::definition::ContractDefinition;
use crate::error::Result;
use crate::runtime::{Starknet, StarknetConfig, StarknetContract};

/// Directory holding the contract sources used by the test suites.
pub fn contract_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("contracts")
}

/// Options every fixture compiles with: debug info on, hint validation off, `dir` on the import path.
pub fn fixture_compile_options(dir: &Path) -> CompileOptions {
    CompileOptions::new()
        .with_debug_info(true)
        .with_disable_hint_validation(true)
        .with_cairo_path(dir)
}

/// Compile `name` from [`contract_dir`].
pub fn compile_contract(name: &str) -> Result<ContractDefinition> {
    compile_contract_in(&contract_dir(), name)
}

/// Compile `dir/name` with the fixture options.
pub fn compile_contract_in(dir: &Path, name: &str) -> Result<ContractDefinition> {
    let definition = compile_starknet_file(dir.join(name), &fixture_compile_options(dir))?;
    Ok(definition)
}

/// Deploy a compiled contract into a ledger the caller manages.
pub async fn acquire_deployed_contract(
    starknet: &Arc<Starknet>,
    definition: impl Into<Arc<ContractDefinition>>,
) -> Result<StarknetContract> {
    let contract = starknet.deploy(definition).await?;
    Ok(contract)
}

/// Fixtures shared by the tests of one module.
pub struct ModuleFixtures {
    event_loop: Runtime,
    contract_dir: PathBuf,
    config: StarknetConfig,
    starknet: OnceCell<Arc<Starknet>>,
    /// Deployments by contract file name.
    deployed: Mutex<HashMap<String, StarknetContract>>,
}

impl ModuleFixtures {
    /// Fixtures over [`contract_dir`] with a default ledger configuration.
    pub fn new() -> Result<Self> {
        let event_loop = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        debug!("module event loop created");
        Ok(Self {
            event_loop,
            contract_dir: contract_dir(),
            config: StarknetConfig::default(),
            starknet: OnceCell::new(),
            deployed: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_contract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contract_dir = dir.into();
        self
    }

    pub fn with_config(mut self, config: StarknetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn event_loop(&self) -> &Runtime {
        &self.event_loop
    }

    /// Run a test body (or any fixture future) to completion on the module's event loop.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.event_loop.block_on(future)
    }

    /// The module's ledger, created on first request.
    pub async fn starknet(&self) -> Arc<Starknet> {
        self.starknet
            .get_or_init(|| async {
                debug!("creating module ledger");
                Starknet::with_config(self.config.clone()).await
            })
            .await
            .clone()
    }

    /// The module's deployment of `name`, compiled and deployed on first request.
    ///
    /// A compilation or deployment failure is returned to every caller; nothing is cached for it.
    pub async fn deployed(&self, name: &str) -> Result<StarknetContract> {
        let mut deployed = self.deployed.lock().await;
        if let Some(contract) = deployed.get(name) {
            return Ok(contract.clone());
        }

        let definition = compile_contract_in(&self.contract_dir, name)?;
        let starknet = self.starknet().await;
        let contract = acquire_deployed_contract(&starknet, definition).await?;
        debug!(contract = name, address = %format!("{:#x}", contract.address()), "deployed module fixture");
        deployed.insert(name.to_string(), contract.clone());
        Ok(contract)
    }
}
