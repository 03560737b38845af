use {
    alloy::primitives::{Address, B256},
    std::fmt::{self, Display, Formatter},
};

/// A contract that was deployed and confirmed on chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deployment {
    pub contract: String,
    pub address: Address,
    pub transaction: B256,
}

/// Formats as `<ContractName> <0x-address>`, the line reported on stdout.
impl Display for Deployment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.contract, self.address)
    }
}
