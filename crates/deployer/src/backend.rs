use {
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256, Bytes},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
        signers::{Signer, local::PrivateKeySigner},
        transports::TransportError,
    },
    anyhow::{Context, Result, anyhow},
    ethrpc::{AlloyProvider, alloy::errors::NodeErrorExt},
    url::Url,
};

/// A contract creation transaction to submit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeploymentRequest {
    pub contract: String,
    pub creation_code: Bytes,
    /// Pins the transaction to this nonce of the deployer account.
    pub nonce: Option<u64>,
    pub confirmations: u64,
}

/// Outcome of a mined deployment transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Confirmed {
    pub address: Address,
    pub transaction: B256,
}

/// Submits deployment transactions and waits for them to be confirmed.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Deploying: Send + Sync {
    async fn deploy(&self, request: DeploymentRequest) -> Result<Confirmed>;
}

/// Deploys contracts through a node, signing with a local key.
pub struct Blockchain {
    provider: AlloyProvider,
    deployer: Address,
}

impl Blockchain {
    pub fn new(node_url: &Url, signer: PrivateKeySigner) -> Self {
        let deployer = signer.address();
        let provider = ethrpc::alloy::provider_with_signer(node_url, "deployer", Box::new(signer));
        Self { provider, deployer }
    }

    /// The contract creation transaction for `request`. Gas, fees and the
    /// chain id are left to the provider's fillers, as is the nonce unless
    /// the request pins one.
    fn transaction(&self, request: &DeploymentRequest) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(request.creation_code.clone());
        if let Some(nonce) = request.nonce {
            tx.set_nonce(nonce);
        }
        tx
    }
}

#[async_trait::async_trait]
impl Deploying for Blockchain {
    async fn deploy(&self, request: DeploymentRequest) -> Result<Confirmed> {
        let tx = self.transaction(&request);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(submission_error)?;
        let hash = *pending.tx_hash();
        tracing::info!(
            contract = %request.contract,
            ?hash,
            "submitted deployment, waiting for confirmation"
        );

        let receipt = pending
            .with_required_confirmations(request.confirmations)
            .get_receipt()
            .await
            .map_err(|err| {
                let reason = match err.is_node_error() {
                    true => format!("failed waiting for confirmation of {hash:?}"),
                    false => format!("deployment transaction {hash:?} reverted"),
                };
                anyhow::Error::new(err).context(reason)
            })?;
        let address = deployed_address(&receipt)?;
        tracing::debug!(
            block = ?receipt.block_number(),
            gas_used = receipt.gas_used(),
            "deployment confirmed"
        );

        Ok(Confirmed {
            address,
            transaction: hash,
        })
    }
}

/// Address of the contract created by a mined deployment transaction.
fn deployed_address(receipt: &TransactionReceipt) -> Result<Address> {
    let hash = receipt.transaction_hash;
    if !receipt.status() {
        return Err(anyhow!("deployment transaction {hash:?} reverted"));
    }
    receipt
        .contract_address()
        .with_context(|| format!("receipt of {hash:?} has no contract address"))
}

fn submission_error(err: TransportError) -> anyhow::Error {
    let reason = match err.is_node_error() {
        true => "node rejected the deployment transaction",
        false => "deployment transaction reverted",
    };
    anyhow::Error::new(err).context(reason)
}
