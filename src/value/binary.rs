use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, NumberValue, TextValue};

const BASE64_PREFIX: &str = "base64:";
const HEX_PREFIX: &str = "hex:";

/// Raw bytes.
///
/// Seeds prefixed with `base64:` or `hex:` are decoded; any other seed is
/// taken as its UTF-8 bytes. Bytes that are valid UTF-8 print as text,
/// everything else prints as `base64:...`, which parses back to the same
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryValue {
    bytes: Vec<u8>,
}

impl BinaryValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        BinaryValue { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl DataType for BinaryValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        let trimmed = text.trim();
        let bytes = if let Some(encoded) = trimmed.strip_prefix(BASE64_PREFIX) {
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| format!("Invalid base64: {}", e))?
        } else if let Some(encoded) = trimmed.strip_prefix(HEX_PREFIX) {
            hex::decode(encoded.trim()).map_err(|e| format!("Invalid hex: {}", e))?
        } else {
            text.as_bytes().to_vec()
        };
        Ok(BinaryValue::new(bytes))
    }

    fn stringify(&self) -> Option<String> {
        Some(match std::str::from_utf8(&self.bytes) {
            Ok(text) => text.to_string(),
            Err(_) => format!("{}{}", BASE64_PREFIX, STANDARD.encode(&self.bytes)),
        })
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Binary
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Binary(self)
    }
}

static REGISTRY: LazyLock<Registry<BinaryValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Binary, OPERATIONS));

const OPERATIONS: &[OpSpec<BinaryValue>] = &[
    OpSpec::fixed("base64", 0, to_base64),
    OpSpec::fixed("hex", 0, to_hex),
    OpSpec::fixed("size", 0, size),
    OpSpec::fixed("utf8", 0, utf8),
];

fn to_base64(binary: BinaryValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(TextValue::new(STANDARD.encode(&binary.bytes)).into_data()))
}

fn to_hex(binary: BinaryValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(TextValue::new(hex::encode(&binary.bytes)).into_data()))
}

fn size(binary: BinaryValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(binary.bytes.len() as i64).into_data()))
}

/// Lossy UTF-8 decoding.
fn utf8(binary: BinaryValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let text = String::from_utf8_lossy(&binary.bytes).into_owned();
    Ok(Some(TextValue::new(text).into_data()))
}
