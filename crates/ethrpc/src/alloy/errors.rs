use alloy::{
    providers::PendingTransactionError,
    transports::{RpcError, TransportError},
};

pub trait NodeErrorExt {
    /// Returns whether a given error is a node error: the node could not be
    /// reached or it refused the request (nonce conflicts, insufficient
    /// funds, ...). Everything else is the EVM reverting the call.
    fn is_node_error(&self) -> bool;

    /// Returns whether the error is the EVM reverting, i.e. anything that is
    /// not a node error.
    fn is_revert(&self) -> bool {
        !self.is_node_error()
    }
}

impl NodeErrorExt for TransportError {
    fn is_node_error(&self) -> bool {
        match self {
            // Reverts surface as error responses that carry revert data, which
            // may be empty (e.g. a constructor that reverts without a reason).
            // `as_revert_data` returns the raw bytes without decoding them, so
            // empty data still counts as a revert.
            RpcError::ErrorResp(err) => {
                let no_revert_data = err.as_revert_data().is_none();
                tracing::debug!(?err, %no_revert_data, "transport rpc error");
                no_revert_data
            }
            _ => true,
        }
    }
}

impl NodeErrorExt for PendingTransactionError {
    fn is_node_error(&self) -> bool {
        match self {
            PendingTransactionError::TransportError(err) => err.is_node_error(),
            _ => true,
        }
    }
}

/// Create an arbitrary alloy error that classifies as a "node" error.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_alloy_node_error() -> TransportError {
    TransportError::ErrorResp(alloy::rpc::json_rpc::ErrorPayload::internal_error())
}

/// Create an arbitrary alloy error that classifies as a revert.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_alloy_revert_error() -> TransportError {
    let payload = serde_json::from_str(
        r#"{"code":3,"message":"execution reverted","data":"0x"}"#,
    )
    .expect("valid error payload");
    TransportError::ErrorResp(payload)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::transports::TransportErrorKind,
    };

    #[test]
    fn test_node_error() {
        assert!(testing_alloy_node_error().is_node_error());
        assert!(!testing_alloy_revert_error().is_node_error());
    }

    #[test]
    fn test_revert() {
        assert!(testing_alloy_revert_error().is_revert());
        assert!(!testing_alloy_node_error().is_revert());
    }

    #[test]
    fn revert_with_reason() {
        let payload = serde_json::from_str(
            r#"{"code":3,"message":"execution reverted","data":"0xdeadbeef"}"#,
        )
        .unwrap();
        assert!(TransportError::ErrorResp(payload).is_revert());

        let payload = serde_json::from_str(
            r#"{"code":-32000,"message":"nonce too low","data":"0xdeadbeef"}"#,
        )
        .unwrap();
        assert!(TransportError::ErrorResp(payload).is_node_error());
    }

    #[test]
    fn transport_failures_are_node_errors() {
        let err = TransportErrorKind::custom_str("connection refused");
        assert!(err.is_node_error());
    }

    #[test]
    fn pending_transaction_errors() {
        let err = PendingTransactionError::TransportError(testing_alloy_revert_error());
        assert!(err.is_revert());
        let err = PendingTransactionError::TransportError(testing_alloy_node_error());
        assert!(err.is_node_error());
    }
}
