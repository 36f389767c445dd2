//! Codec Module
//!
//! JSON serialization boundary between typed values and stored payloads.
//! The encoding carries no header or version tag, so payloads written by an
//! incompatible build will simply fail to decode and read as absent.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Encodes a value into an opaque payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decodes a payload produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn test_decode_list() {
        let bytes = encode(&vec![1, 2, 3]).unwrap();
        let list: Vec<i32> = decode(&bytes).unwrap();
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let result: Result<Vec<i32>> = decode(b"\x00not json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_decode_wrong_shape_is_error() {
        let bytes = encode("text").unwrap();
        let result: Result<u32> = decode(&bytes);
        assert!(result.is_err());
    }
}
