use {
    alloy::signers::{Signer, local::PrivateKeySigner},
    anyhow::{Context, Result},
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    url::Url,
};

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deployer=debug,ethrpc=debug")]
    pub log_filter: String,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Well known deployment to perform. `--contract` and `--nonce` override
    /// the values of the preset.
    #[clap(long, env, value_enum)]
    pub preset: Option<Preset>,

    /// Name of the contract to deploy. Either a bare contract name or a fully
    /// qualified `path/To.sol:Name`.
    #[clap(long, env, required_unless_present = "preset")]
    pub contract: Option<String>,

    /// Nonce to pin the deployment transaction to. Uses the account's next
    /// nonce when not set.
    #[clap(long, env)]
    pub nonce: Option<u64>,

    /// Constructor arguments, in declaration order.
    #[clap(long, env, num_args = 1..)]
    pub constructor_args: Vec<String>,

    /// Directory holding the compiled contract artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts_path: PathBuf,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Private key of the account sending the deployment transaction.
    #[clap(long, env)]
    pub private_key: PrivateKeySigner,

    /// Number of confirmations to wait for before reporting the deployment.
    #[clap(
        long,
        env,
        default_value = "1",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub confirmations: u64,
}

impl Arguments {
    /// The contract to deploy and the nonce to pin, with explicit arguments
    /// taking precedence over the preset.
    pub fn target(&self) -> Result<Target> {
        let contract = self
            .contract
            .clone()
            .or_else(|| self.preset.map(|preset| preset.contract().to_string()))
            .context("neither a contract nor a preset was given")?;
        let nonce = self
            .nonce
            .or_else(|| self.preset.map(|preset| preset.nonce()));
        Ok(Target { contract, nonce })
    }
}

// Custom Display implementation so that the arguments can be logged on
// start up without leaking the private key.
impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            logging,
            preset,
            contract,
            nonce,
            constructor_args,
            artifacts_path,
            node_url,
            private_key,
            confirmations,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "preset: {preset:?}")?;
        writeln!(f, "contract: {contract:?}")?;
        writeln!(f, "nonce: {nonce:?}")?;
        writeln!(f, "constructor_args: {constructor_args:?}")?;
        writeln!(f, "artifacts_path: {}", artifacts_path.display())?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "deployer: {}", private_key.address())?;
        writeln!(f, "confirmations: {confirmations}")?;
        Ok(())
    }
}

/// The deployments this tool was written for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Preset {
    Attester,
    Attestor,
}

impl Preset {
    pub fn contract(&self) -> &'static str {
        match self {
            Self::Attester => "RetrolistAttester",
            Self::Attestor => "RetrolistAttestor",
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Self::Attester => 2,
            Self::Attestor => 1,
        }
    }
}

/// What to deploy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub contract: String,
    pub nonce: Option<u64>,
}
