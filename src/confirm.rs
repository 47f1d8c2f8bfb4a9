//! Confirmation polling.
//!
//! A submitted transaction is polled until the cluster reports it at the
//! `confirmed` commitment level. A failed status query is logged and retried
//! on the next tick, so the loop only ends once the transaction is confirmed.

use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature, transaction::TransactionError,
};
use tracing::{info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// What the cluster currently knows about a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureState {
    /// No status yet, the transaction may still be in flight.
    Unknown,
    /// Seen, but below the `confirmed` commitment level.
    Processing,
    /// At `confirmed` or deeper. `err` is the execution error, if any.
    Confirmed { err: Option<TransactionError> },
}

pub trait SignatureStatusSource {
    async fn signature_state(&self, signature: &Signature) -> anyhow::Result<SignatureState>;
}

impl SignatureStatusSource for RpcClient {
    async fn signature_state(&self, signature: &Signature) -> anyhow::Result<SignatureState> {
        let statuses = self.get_signature_statuses(&[*signature]).await?.value;
        let state = match statuses.into_iter().next().flatten() {
            None => SignatureState::Unknown,
            Some(status) if status.satisfies_commitment(CommitmentConfig::confirmed()) => {
                SignatureState::Confirmed { err: status.err }
            }
            Some(_) => SignatureState::Processing,
        };
        Ok(state)
    }
}

/// Blocks until `signature` is confirmed and returns its execution error.
///
/// There is no retry limit and no timeout.
pub async fn wait_for_confirmation<S>(
    source: &S,
    signature: &Signature,
    interval: Duration,
) -> Option<TransactionError>
where
    S: SignatureStatusSource,
{
    info!(%signature, "waiting for tx confirmation...");
    loop {
        match source.signature_state(signature).await {
            Ok(SignatureState::Confirmed { err }) => {
                match &err {
                    None => info!(%signature, "transaction successfully confirmed"),
                    Some(err) => warn!(%signature, %err, "transaction confirmed with an error"),
                }
                return err;
            }
            Ok(SignatureState::Processing) => info!(%signature, "transaction is being processed..."),
            Ok(SignatureState::Unknown) => {
                info!(%signature, "transaction status not yet available...")
            }
            Err(err) => warn!(%signature, "failed to get signature statuses: {err:#}"),
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    use serde_json::{json, Value};
    use solana_client::rpc_request::RpcRequest;
    use solana_sdk::instruction::InstructionError;

    /// Replays a fixed script of answers, then repeats the last one.
    struct Scripted {
        script: Mutex<VecDeque<anyhow::Result<SignatureState>>>,
        last: SignatureState,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(script: Vec<anyhow::Result<SignatureState>>, last: SignatureState) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SignatureStatusSource for Scripted {
        async fn signature_state(&self, _: &Signature) -> anyhow::Result<SignatureState> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.last.clone()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_through_errors_until_confirmed() {
        let source = Scripted::new(
            vec![
                Err(anyhow::anyhow!("connection refused")),
                Ok(SignatureState::Unknown),
                Err(anyhow::anyhow!("429 too many requests")),
                Ok(SignatureState::Processing),
            ],
            SignatureState::Confirmed { err: None },
        );

        let start = tokio::time::Instant::now();
        let err = wait_for_confirmation(&source, &Signature::default(), DEFAULT_POLL_INTERVAL).await;

        assert_eq!(err, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
        assert!(start.elapsed() >= DEFAULT_POLL_INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_on_first_query_does_not_sleep() {
        let source = Scripted::new(vec![], SignatureState::Confirmed { err: None });

        let start = tokio::time::Instant::now();
        wait_for_confirmation(&source, &Signature::default(), DEFAULT_POLL_INTERVAL).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_execution_error_of_confirmed_transaction() {
        let failure = TransactionError::InstructionError(0, InstructionError::Custom(1));
        let source = Scripted::new(
            vec![Ok(SignatureState::Processing)],
            SignatureState::Confirmed {
                err: Some(failure.clone()),
            },
        );

        let err = wait_for_confirmation(&source, &Signature::default(), DEFAULT_POLL_INTERVAL).await;

        assert_eq!(err, Some(failure));
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_polling_while_never_confirmed() {
        let source = Scripted::new(vec![], SignatureState::Processing);

        let waited = tokio::time::timeout(
            Duration::from_secs(60),
            wait_for_confirmation(&source, &Signature::default(), DEFAULT_POLL_INTERVAL),
        )
        .await;

        assert!(waited.is_err());
        assert!(source.calls.load(Ordering::SeqCst) >= 25);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_polling_while_queries_fail() {
        struct Down;
        impl SignatureStatusSource for Down {
            async fn signature_state(&self, _: &Signature) -> anyhow::Result<SignatureState> {
                anyhow::bail!("rpc unavailable")
            }
        }

        let waited = tokio::time::timeout(
            Duration::from_secs(30),
            wait_for_confirmation(&Down, &Signature::default(), Duration::from_secs(1)),
        )
        .await;

        assert!(waited.is_err());
    }

    /// Runs one status query against a mock RPC answering with `status`.
    async fn rpc_state(status: Value) -> SignatureState {
        let response = json!({
            "context": { "slot": 1 },
            "value": [status],
        });
        let client = RpcClient::new_mock_with_mocks(
            "succeeds".to_string(),
            [(RpcRequest::GetSignatureStatuses, response)].into_iter().collect(),
        );
        client.signature_state(&Signature::default()).await.unwrap()
    }

    fn status(confirmation_status: &str, confirmations: Value, err: Value) -> Value {
        let result = match &err {
            Value::Null => json!({ "Ok": null }),
            err => json!({ "Err": err }),
        };
        json!({
            "slot": 1,
            "confirmations": confirmations,
            "status": result,
            "err": err,
            "confirmationStatus": confirmation_status,
        })
    }

    #[tokio::test]
    async fn rpc_maps_commitment_levels() {
        assert_eq!(
            rpc_state(status("finalized", Value::Null, Value::Null)).await,
            SignatureState::Confirmed { err: None }
        );
        assert_eq!(
            rpc_state(status("confirmed", json!(1), Value::Null)).await,
            SignatureState::Confirmed { err: None }
        );
        assert_eq!(
            rpc_state(status("processed", json!(0), Value::Null)).await,
            SignatureState::Processing
        );
        assert_eq!(rpc_state(Value::Null).await, SignatureState::Unknown);
    }

    #[tokio::test]
    async fn rpc_reports_execution_error_of_confirmed_status() {
        let err = json!({ "InstructionError": [0, { "Custom": 1 }] });

        assert_eq!(
            rpc_state(status("confirmed", json!(2), err)).await,
            SignatureState::Confirmed {
                err: Some(TransactionError::InstructionError(
                    0,
                    InstructionError::Custom(1)
                )),
            }
        );
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_tick_is_logged_at_info() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = Scripted::new(
            vec![Ok(SignatureState::Unknown), Ok(SignatureState::Processing)],
            SignatureState::Confirmed { err: None },
        );
        wait_for_confirmation(&source, &Signature::default(), DEFAULT_POLL_INTERVAL).await;

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("waiting for tx confirmation").count(), 1);
        assert!(logs.contains("transaction status not yet available"));
        assert!(logs.contains("transaction is being processed"));
        assert!(logs.contains("transaction successfully confirmed"));
    }
}
