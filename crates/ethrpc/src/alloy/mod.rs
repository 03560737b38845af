pub mod errors;
mod instrumentation;

use {
    crate::AlloyProvider,
    alloy::{
        network::{EthereumWallet, TxSigner},
        primitives::Signature,
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    instrumentation::{InstrumentationLayer, LabelingLayer},
    url::Url,
};

/// Creates a provider that signs and submits transactions with `signer`.
///
/// The provider fills in gas, fees, chain id and, unless the transaction
/// already carries one, the nonce of the signer.
pub fn provider_with_signer(
    url: &Url,
    label: &str,
    signer: Box<dyn TxSigner<Signature> + Send + Sync + 'static>,
) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(LabelingLayer {
            label: label.into(),
        })
        .layer(InstrumentationLayer)
        .http(url.clone());
    let wallet = EthereumWallet::new(signer);

    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased()
}

