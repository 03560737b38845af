pub mod arguments;
pub mod artifacts;
pub mod backend;
mod constructor;
mod deployment;

pub use deployment::Deployment;
use {
    anyhow::{Context, Result, ensure},
    arguments::Arguments,
    backend::{Deploying, DeploymentRequest},
    clap::Parser,
    std::{io::Write, process::ExitCode},
};

/// Entry point of the binary: parses the arguments, sets up logging and
/// deploys the requested contract.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = match Arguments::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // `--help` is reported as an error but is not a failure.
            return match err.use_stderr() {
                true => ExitCode::FAILURE,
                false => ExitCode::SUCCESS,
            };
        }
    };
    let obs_config = observe::Config::new(
        args.logging.log_filter.as_str(),
        args.logging.use_json_logs,
    );
    observe::tracing::initialize(&obs_config);
    observe::panic_hook::install();
    tracing::info!("running deployer with validated arguments:\n{}", args);

    let backend = backend::Blockchain::new(&args.node_url, args.private_key.clone());
    execute(&args, &backend, &mut std::io::stdout(), &mut std::io::stderr()).await
}

/// Deploys the contract and reports the outcome: the deployment on `stdout`
/// on success, the error on `stderr` otherwise. Failures are not retried.
pub async fn execute(
    args: &Arguments,
    backend: &dyn Deploying,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> ExitCode {
    let result = match run(args, backend).await {
        Ok(deployment) => writeln!(stdout, "{deployment}").context("report deployment"),
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(write_err) = writeln!(stderr, "Error: {err:?}") {
                tracing::error!(?err, ?write_err, "failed to report deployment error");
            }
            ExitCode::FAILURE
        }
    }
}

/// Resolves the target's artifact, submits its deployment and waits for it
/// to be confirmed.
pub async fn run(args: &Arguments, backend: &dyn Deploying) -> Result<Deployment> {
    let target = args.target()?;
    let artifact = artifacts::Registry::new(&args.artifacts_path)
        .resolve(&target.contract)
        .with_context(|| format!("resolve artifact of {}", target.contract))?;
    let creation_code = constructor::creation_code(&artifact, &args.constructor_args)
        .context("encode constructor arguments")?;

    tracing::info!(
        contract = %artifact.fully_qualified_name(),
        nonce = ?target.nonce,
        "deploying contract"
    );
    let confirmed = backend
        .deploy(DeploymentRequest {
            contract: target.contract.clone(),
            creation_code,
            nonce: target.nonce,
            confirmations: args.confirmations,
        })
        .await
        .with_context(|| format!("deploy {}", target.contract))?;
    ensure!(
        !confirmed.address.is_zero(),
        "deployment of {} reported the zero address",
        target.contract
    );

    Ok(Deployment {
        contract: artifact.contract_name,
        address: confirmed.address,
        transaction: confirmed.transaction,
    })
}
