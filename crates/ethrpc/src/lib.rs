pub mod alloy;

pub type AlloyProvider = ::alloy::providers::DynProvider;
