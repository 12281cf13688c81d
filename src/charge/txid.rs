use std::fmt;

use crate::random::ByteSource;

/// Number of raw bytes in a transaction id.
pub const TRANSACTION_ID_LEN: usize = 7;

/// Opaque confirmation token returned for a completed charge.
///
/// The bytes are random and need not form valid UTF-8. The text form decodes
/// them leniently: invalid sequences become U+FFFD replacement characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId([u8; TRANSACTION_ID_LEN]);

impl TransactionId {
    pub fn from_bytes(bytes: [u8; TRANSACTION_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSACTION_ID_LEN] {
        &self.0
    }

    /// Lenient text decoding of the raw bytes.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Lowercase hex of the raw bytes, always 14 characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Produces transaction ids from its own byte stream.
pub struct TransactionIdGenerator {
    bytes: Box<dyn ByteSource>,
}

impl TransactionIdGenerator {
    pub fn new(bytes: Box<dyn ByteSource>) -> Self {
        Self { bytes }
    }

    pub fn generate(&self) -> TransactionId {
        let mut buf = [0u8; TRANSACTION_ID_LEN];
        self.bytes.fill(&mut buf);
        TransactionId(buf)
    }
}

impl fmt::Debug for TransactionIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionIdGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RngSource;

    #[test]
    fn generated_ids_have_seven_bytes() {
        let generator = TransactionIdGenerator::new(Box::new(RngSource::seeded(9)));
        for _ in 0..50 {
            let id = generator.generate();
            assert_eq!(id.as_bytes().len(), TRANSACTION_ID_LEN);
            assert_eq!(id.to_hex().len(), 2 * TRANSACTION_ID_LEN);
        }
    }

    #[test]
    fn ascii_bytes_decode_verbatim() {
        let id = TransactionId::from_bytes(*b"abc1234");
        assert_eq!(id.to_text(), "abc1234");
        assert_eq!(id.to_string(), "abc1234");
    }

    #[test]
    fn invalid_utf8_decodes_with_replacement() {
        let id = TransactionId::from_bytes([0xff, b'a', 0xfe, b'b', 0x80, b'c', b'd']);
        let text = id.to_text();
        assert!(text.contains('\u{FFFD}'));
        assert!(text.contains("a"));
        assert_eq!(id.to_hex(), "ff61fe62806364");
    }

    #[test]
    fn seeded_generators_repeat() {
        let a = TransactionIdGenerator::new(Box::new(RngSource::seeded(5)));
        let b = TransactionIdGenerator::new(Box::new(RngSource::seeded(5)));
        assert_eq!(a.generate(), b.generate());
    }
}
