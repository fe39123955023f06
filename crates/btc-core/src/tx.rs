//! Legacy (non-witness) Bitcoin transactions: model, SIGHASH_ALL digest,
//! signing and raw serialization.

use crate::error::BtcError;
use crate::hashes::sha256d;
use crate::key::KeyPair;
use crate::script::Script;

pub const TX_VERSION: u32 = 1;
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;
pub const LOCK_TIME: u32 = 0;
pub const SIGHASH_ALL: u8 = 0x01;

const EMPTY_SCRIPT: &[u8] = &[];

/// An outpoint being spent together with the key that can sign for it.
#[derive(Debug, Clone)]
pub struct TxInput {
    /// Previous transaction hash in internal (little-endian) byte order.
    prev_txid: [u8; 32],
    prev_vout: u32,
    /// scriptPubKey of the output being spent.
    prev_script: Script,
    key: KeyPair,
}

impl TxInput {
    /// `txid` is the big-endian hex shown by block explorers.
    pub fn new(txid: &str, vout: u32, prev_script: Script, key: KeyPair) -> Result<Self, BtcError> {
        Ok(Self {
            prev_txid: parse_txid(txid)?,
            prev_vout: vout,
            prev_script,
            key,
        })
    }

    /// Big-endian hex of the previous transaction hash.
    pub fn txid(&self) -> String {
        let mut display = self.prev_txid;
        display.reverse();
        hex::encode(display)
    }

    pub fn vout(&self) -> u32 {
        self.prev_vout
    }

    pub fn prev_script(&self) -> &Script {
        &self.prev_script
    }

    pub fn key(&self) -> &KeyPair {
        &self.key
    }
}

/// A payment to an address. The script is derived at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    value: u64,
    address: String,
    script: Script,
}

impl TxOutput {
    pub fn new(value: u64, address: &str) -> Result<Self, BtcError> {
        Ok(Self {
            value,
            address: address.to_string(),
            script: Script::for_address(address)?,
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.to_le_bytes());
        write_compact_size(buf, self.script.len() as u64);
        buf.extend_from_slice(self.script.as_bytes());
    }
}

/// A transaction whose inputs carry no scriptSig yet.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl UnsignedTx {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Sum of all output values.
    pub fn output_total(&self) -> Result<u64, BtcError> {
        sum_values(&self.outputs)
    }

    /// SIGHASH_ALL digest for input `index`.
    ///
    /// Every scriptSig in the signing copy is empty except the one at
    /// `index`, which carries the previous output's script. The copy is
    /// followed by the 4-byte little-endian hash type before hashing.
    pub fn sighash(&self, index: usize) -> Result<[u8; 32], BtcError> {
        if index >= self.inputs.len() {
            return Err(BtcError::SigningError(format!(
                "input index {index} out of bounds ({} inputs)",
                self.inputs.len()
            )));
        }
        let scripts: Vec<&[u8]> = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                if i == index {
                    input.prev_script.as_bytes()
                } else {
                    EMPTY_SCRIPT
                }
            })
            .collect();

        let mut buf = self.serialize(&scripts);
        buf.extend_from_slice(&u32::from(SIGHASH_ALL).to_le_bytes());
        Ok(sha256d(&buf))
    }

    /// Sign every input with its own key and serialize the result.
    pub fn sign(&self) -> Result<SignedTx, BtcError> {
        let mut script_sigs: Vec<Vec<u8>> = Vec::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            let digest = self.sighash(index)?;
            let mut sig = input.key.sign(&digest)?;
            sig.push(SIGHASH_ALL);
            let pubkey = input.key.pub_bytes();

            // <len> <sig || hashtype> <len> <pubkey>
            let mut script_sig = Vec::with_capacity(sig.len() + pubkey.len() + 2);
            write_compact_size(&mut script_sig, sig.len() as u64);
            script_sig.extend_from_slice(&sig);
            write_compact_size(&mut script_sig, pubkey.len() as u64);
            script_sig.extend_from_slice(&pubkey);
            script_sigs.push(script_sig);
        }

        let scripts: Vec<&[u8]> = script_sigs.iter().map(Vec::as_slice).collect();
        let payload = self.serialize(&scripts);
        let txid = txid_of(&payload);
        Ok(SignedTx { payload, txid })
    }

    fn serialize(&self, script_sigs: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.inputs.len() * 150 + self.outputs.len() * 34);
        buf.extend_from_slice(&TX_VERSION.to_le_bytes());

        write_compact_size(&mut buf, self.inputs.len() as u64);
        for (input, script_sig) in self.inputs.iter().zip(script_sigs) {
            buf.extend_from_slice(&input.prev_txid);
            buf.extend_from_slice(&input.prev_vout.to_le_bytes());
            write_compact_size(&mut buf, script_sig.len() as u64);
            buf.extend_from_slice(script_sig);
            buf.extend_from_slice(&SEQUENCE_FINAL.to_le_bytes());
        }

        write_compact_size(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.write(&mut buf);
        }

        buf.extend_from_slice(&LOCK_TIME.to_le_bytes());
        buf
    }
}

/// A fully signed, serialized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    payload: Vec<u8>,
    txid: String,
}

impl SignedTx {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Lowercase hex of the payload, ready for broadcast.
    pub fn hex(&self) -> String {
        hex::encode(&self.payload)
    }

    pub fn txid(&self) -> &str {
        &self.txid
    }

    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Checked sum of output values.
pub(crate) fn sum_values(outputs: &[TxOutput]) -> Result<u64, BtcError> {
    outputs
        .iter()
        .map(TxOutput::value)
        .try_fold(0u64, u64::checked_add)
        .ok_or_else(|| BtcError::TransactionBuildError("output values overflow u64".into()))
}

/// Big-endian hex of SHA256d(payload).
pub fn txid_of(payload: &[u8]) -> String {
    let mut hash = sha256d(payload);
    hash.reverse();
    hex::encode(hash)
}

/// Parse a displayed (big-endian) txid into internal byte order.
pub fn parse_txid(txid_hex: &str) -> Result<[u8; 32], BtcError> {
    let bytes = hex::decode(txid_hex)?;
    let mut result: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        BtcError::TransactionBuildError(format!("txid must be 32 bytes, got {}", bytes.len()))
    })?;
    result.reverse();
    Ok(result)
}

/// Write a CompactSize (varint) length prefix.
pub fn write_compact_size(buf: &mut Vec<u8>, val: u64) {
    if val < 0xfd {
        buf.push(val as u8);
    } else if val <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(val as u16).to_le_bytes());
    } else if val <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(val as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&val.to_le_bytes());
    }
}
