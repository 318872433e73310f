//! Column encodings shared by reads and writes

use crate::StoreError;
use corpora_domain::{MetaKind, Scalar, StoredValue};
use rusqlite::types::Value;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Encode an embedding as a little-endian `f32` blob
pub(crate) fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * F32_BYTES);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a blob written by [`encode_embedding`]
pub(crate) fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
    if bytes.len() % F32_BYTES != 0 {
        return Err(StoreError::InvalidData(format!(
            "Embedding blob length {} is not a multiple of {}",
            bytes.len(),
            F32_BYTES
        )));
    }
    Ok(bytes
        .chunks_exact(F32_BYTES)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

pub(crate) fn kind_to_str(kind: MetaKind) -> &'static str {
    kind.as_str()
}

pub(crate) fn str_to_kind(s: &str) -> Result<MetaKind, StoreError> {
    MetaKind::parse(s).ok_or_else(|| StoreError::InvalidData(format!("Unknown meta kind: {}", s)))
}

/// Map a raw column value to what inference sees
pub(crate) fn to_stored_value(value: Value) -> StoredValue {
    match value {
        Value::Text(s) => StoredValue::Text(s),
        Value::Integer(i) => StoredValue::Integer(i),
        Value::Real(x) => StoredValue::Real(x),
        Value::Null => StoredValue::Null,
        Value::Blob(b) => StoredValue::Blob(b),
    }
}

/// Map a raw column value back to a reference value; NULL and BLOB have none
pub(crate) fn to_scalar(value: Value) -> Option<Scalar> {
    match value {
        Value::Text(s) => Some(Scalar::Str(s)),
        Value::Integer(i) => Some(Scalar::Int(i)),
        Value::Real(x) => Some(Scalar::Float(x)),
        Value::Null | Value::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_blob_is_little_endian() {
        let bytes = encode_embedding(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(decode_embedding(&bytes).unwrap(), vec![1.0, -0.5]);
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let result = decode_embedding(&[0, 0, 128]);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(str_to_kind("ordinal").is_err());
        assert_eq!(str_to_kind(kind_to_str(MetaKind::Quantitative)).unwrap(), MetaKind::Quantitative);
    }
}
