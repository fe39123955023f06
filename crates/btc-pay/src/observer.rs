//! Structured payment events and the sinks that receive them.

use std::sync::Arc;

/// A decision or fact reported while a payment is prepared.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    UtxosFound {
        count: usize,
    },
    UtxoSkipped {
        txid: String,
        vout: u32,
    },
    UtxoSelected {
        txid: String,
        vout: u32,
        value: u64,
        confirmations: u64,
    },
    FeeResolved {
        spec: String,
        /// Negative when carved out of the amount.
        satoshi: i64,
        size: u64,
    },
    TxPrepared {
        txid: String,
        inputs: usize,
        outputs: usize,
        amount: u64,
        unspent: u64,
        /// What the miner actually receives.
        fee_paid: u64,
        size: u64,
        target: String,
        change: String,
    },
    TxPushed {
        txid: String,
    },
}

pub trait PaymentObserver {
    fn on_event(&self, event: &PaymentEvent);
}

impl<O: PaymentObserver + ?Sized> PaymentObserver for Arc<O> {
    fn on_event(&self, event: &PaymentEvent) {
        (**self).on_event(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PaymentObserver for TracingObserver {
    fn on_event(&self, event: &PaymentEvent) {
        match event {
            PaymentEvent::UtxosFound { count } => {
                tracing::info!(count, "UTXOs found");
            }
            PaymentEvent::UtxoSkipped { txid, vout } => {
                tracing::debug!(%txid, vout, "UTXO skipped");
            }
            PaymentEvent::UtxoSelected {
                txid,
                vout,
                value,
                confirmations,
            } => {
                tracing::debug!(%txid, vout, value, confirmations, "UTXO selected");
            }
            PaymentEvent::FeeResolved { spec, satoshi, size } => {
                tracing::info!(%spec, satoshi, size, "Fee resolved");
            }
            PaymentEvent::TxPrepared {
                txid,
                inputs,
                outputs,
                amount,
                unspent,
                fee_paid,
                size,
                target,
                change,
            } => {
                tracing::info!(
                    %txid,
                    inputs,
                    outputs,
                    amount,
                    unspent,
                    fee_paid,
                    size,
                    %target,
                    %change,
                    "Transaction prepared"
                );
            }
            PaymentEvent::TxPushed { txid } => {
                tracing::info!(%txid, "Transaction pushed");
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PaymentObserver for NullObserver {
    fn on_event(&self, _event: &PaymentEvent) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<PaymentEvent>>);

    impl PaymentObserver for Recorder {
        fn on_event(&self, event: &PaymentEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn events() -> Vec<PaymentEvent> {
        vec![
            PaymentEvent::UtxosFound { count: 1 },
            PaymentEvent::UtxoSkipped { txid: "aa".into(), vout: 0 },
            PaymentEvent::UtxoSelected {
                txid: "bb".into(),
                vout: 1,
                value: 100_000,
                confirmations: 3,
            },
            PaymentEvent::FeeResolved { spec: "S".into(), satoshi: 3_360, size: 280 },
            PaymentEvent::TxPrepared {
                txid: "cc".into(),
                inputs: 1,
                outputs: 2,
                amount: 10_000,
                unspent: 100_000,
                fee_paid: 3_360,
                size: 280,
                target: "t".into(),
                change: "c".into(),
            },
            PaymentEvent::TxPushed { txid: "cc".into() },
        ]
    }

    #[test]
    fn every_event_reaches_tracing_and_null() {
        for event in events() {
            TracingObserver.on_event(&event);
            NullObserver.on_event(&event);
        }
    }

    #[test]
    fn shared_observer_receives_events() {
        let recorder = Arc::new(Recorder::default());
        let shared: Arc<Recorder> = recorder.clone();
        for event in events() {
            shared.on_event(&event);
        }
        assert_eq!(*recorder.0.lock().unwrap(), events());
    }
}
