use crate::error::BtcError;
use crate::key::KeyPair;
use crate::script::Script;
use crate::tx::{TxInput, TxOutput, UnsignedTx};

/// Accumulates inputs and outputs, then assembles an [`UnsignedTx`]
/// with an optional change output.
#[derive(Debug, Default)]
pub struct TxBuilder {
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spend `txid:vout`, whose output script is `prev_script`, signing with `key`.
    pub fn input(
        &mut self,
        txid: &str,
        vout: u32,
        prev_script: Script,
        key: KeyPair,
    ) -> Result<&mut Self, BtcError> {
        self.inputs.push(TxInput::new(txid, vout, prev_script, key)?);
        Ok(self)
    }

    /// Pay `value` satoshi to `address`.
    pub fn output(&mut self, value: u64, address: &str) -> Result<&mut Self, BtcError> {
        self.outputs.push(TxOutput::new(value, address)?);
        Ok(self)
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Sum of the explicit outputs.
    pub fn output_total(&self) -> Result<u64, BtcError> {
        crate::tx::sum_values(&self.outputs)
    }

    /// Assemble the transaction.
    ///
    /// With `leave_change`, `input_total - outputs - extra_fee` goes back to
    /// `change_address` when it is positive. Zero or negative change adds
    /// nothing, and the change address is then never parsed.
    pub fn build(
        &self,
        input_total: u64,
        leave_change: bool,
        extra_fee: u64,
        change_address: &str,
    ) -> Result<UnsignedTx, BtcError> {
        let mut outputs = self.outputs.clone();
        if leave_change {
            let change =
                i128::from(input_total) - i128::from(self.output_total()?) - i128::from(extra_fee);
            if change > 0 {
                let change = u64::try_from(change).map_err(|_| {
                    BtcError::TransactionBuildError(format!("change {change} overflows u64"))
                })?;
                outputs.push(TxOutput::new(change, change_address)?);
            }
        }
        Ok(UnsignedTx::new(self.inputs.clone(), outputs))
    }
}
