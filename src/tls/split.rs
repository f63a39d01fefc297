//! TLS record splitting.
//!
//! A TLS handshake normally leaves the client as one large record whose
//! plaintext SNI is visible to middleboxes inspecting the first packet.
//! [`split_record`] rewrites such a buffer into many small records with
//! randomized boundaries; concatenated fragment payloads are byte-identical
//! to the original payload, so the receiving TLS stack reassembles the
//! handshake unchanged.

use rand::Rng;

/// Length of the TLS record prefix: type, version, payload length.
pub const RECORD_HEADER_LEN: usize = 5;

/// Content type of handshake records, and of every synthetic fragment.
pub const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

/// Major version byte shared by all TLS versions on the wire.
pub const VERSION_MAJOR: u8 = 0x03;

/// Version bytes stamped on every synthetic fragment, regardless of the
/// version declared by the input record.
const FRAGMENT_VERSION: [u8; 2] = [0x03, 0x04];

/// The 5-byte prefix of a TLS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub content_type: u8,
    pub version_major: u8,
    pub version_minor: u8,
    /// Payload length following the header, big-endian on the wire.
    pub length: u16,
}

impl RecordHeader {
    /// Parse the record prefix. Returns `None` for buffers shorter than
    /// [`RECORD_HEADER_LEN`].
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < RECORD_HEADER_LEN {
            return None;
        }
        Some(Self {
            content_type: data[0],
            version_major: data[1],
            version_minor: data[2],
            length: u16::from_be_bytes([data[3], data[4]]),
        })
    }

    /// Whether this looks like the start of a TLS handshake record.
    pub fn is_handshake(&self) -> bool {
        self.content_type == CONTENT_TYPE_HANDSHAKE && self.version_major == VERSION_MAJOR
    }
}

/// Result of splitting one buffer.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    /// Serialized records in transmission order.
    pub fragments: Vec<Vec<u8>>,
    /// Total serialized length across all fragments.
    pub total_len: usize,
}

impl SplitOutput {
    fn passthrough(data: &[u8]) -> Self {
        Self {
            fragments: vec![data.to_vec()],
            total_len: data.len(),
        }
    }

    /// Whether the input was rewritten at all.
    pub fn was_split(&self) -> bool {
        self.fragments.len() > 1
    }
}

/// Rewrite one complete TLS handshake record into fragments.
///
/// Each fragment carries a payload of `min_split..=max_split` bytes (the
/// final fragment may be shorter when the remainder runs out) behind a
/// synthetic `16 03 04` header. Boundaries are drawn fresh from the thread
/// RNG on every call so no two connections fragment identically.
///
/// Buffers that are not recognizable as a single complete handshake record
/// pass through untouched as one fragment:
/// - shorter than the 5-byte header, or not starting `16 03`;
/// - declared payload length disagreeing with the buffer length (already
///   coalesced or fragmented by the transport).
pub fn split_record(data: &[u8], min_split: usize, max_split: usize) -> SplitOutput {
    let header = match RecordHeader::parse(data) {
        Some(header) if header.is_handshake() => header,
        _ => {
            tracing::debug!(prefix = %hex_prefix(data), "Not a TLS handshake record, forwarding as-is");
            return SplitOutput::passthrough(data);
        }
    };

    tracing::debug!(
        prefix = %hex_prefix(data),
        declared = header.length,
        buffer = data.len(),
        "TLS handshake record header"
    );

    let declared = header.length as usize;
    if declared + RECORD_HEADER_LEN != data.len() {
        tracing::warn!(
            declared,
            actual = data.len().saturating_sub(RECORD_HEADER_LEN),
            "TLS record length mismatch, forwarding as-is"
        );
        return SplitOutput::passthrough(data);
    }

    let payload = &data[RECORD_HEADER_LEN..];
    let mut rng = rand::thread_rng();
    let mut fragments = Vec::new();
    let mut total_len = 0;
    let mut pos = 0;

    while pos < payload.len() {
        let remaining = payload.len() - pos;
        let lo = remaining.min(min_split);
        let hi = remaining.min(max_split);
        let take = rng.gen_range(lo..=hi);

        let mut record = Vec::with_capacity(RECORD_HEADER_LEN + take);
        record.push(CONTENT_TYPE_HANDSHAKE);
        record.extend_from_slice(&FRAGMENT_VERSION);
        record.extend_from_slice(&(take as u16).to_be_bytes());
        record.extend_from_slice(&payload[pos..pos + take]);

        total_len += record.len();
        fragments.push(record);
        pos += take;
    }

    SplitOutput { fragments, total_len }
}

fn hex_prefix(data: &[u8]) -> String {
    data.iter().take(16).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Valid handshake record: `length + 5 == data.len()`.
    fn handshake_record(payload_len: usize) -> Vec<u8> {
        let mut data = vec![0x16, 0x03, 0x03];
        data.extend_from_slice(&(payload_len as u16).to_be_bytes());
        data.extend((0..payload_len).map(|i| (i % 251) as u8));
        data
    }

    fn reassemble(fragments: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = Vec::new();
        for fragment in fragments {
            assert_eq!(fragment[0], CONTENT_TYPE_HANDSHAKE);
            assert_eq!(&fragment[1..3], &[0x03, 0x04]);
            let len = u16::from_be_bytes([fragment[3], fragment[4]]) as usize;
            assert_eq!(fragment.len(), RECORD_HEADER_LEN + len);
            payload.extend_from_slice(&fragment[RECORD_HEADER_LEN..]);
        }
        payload
    }

    #[test]
    fn short_buffer_passes_through() {
        let data = [0x16, 0x03, 0x01];
        let out = split_record(&data, 32, 64);
        assert_eq!(out.fragments, vec![data.to_vec()]);
        assert_eq!(out.total_len, data.len());
        assert!(!out.was_split());
    }

    #[test]
    fn non_handshake_passes_through() {
        // Application data record, valid framing.
        let mut data = vec![0x17, 0x03, 0x03, 0x00, 0x04];
        data.extend_from_slice(b"abcd");
        let out = split_record(&data, 1, 2);
        assert_eq!(out.fragments, vec![data.clone()]);

        // Wrong major version.
        let data = [0x16, 0x02, 0x03, 0x00, 0x00];
        let out = split_record(&data, 1, 2);
        assert_eq!(out.fragments, vec![data.to_vec()]);
    }

    #[test]
    fn length_mismatch_passes_through() {
        // Declares 100 bytes of payload but carries 50.
        let mut data = vec![0x16, 0x03, 0x03, 0x00, 100];
        data.extend(std::iter::repeat(0xaa).take(50));
        let out = split_record(&data, 8, 16);
        assert_eq!(out.fragments, vec![data.clone()]);
        assert_eq!(out.total_len, data.len());
    }

    #[test]
    fn split_is_lossless() {
        let data = handshake_record(1000);
        let out = split_record(&data, 32, 64);

        assert!(out.was_split());
        assert_eq!(reassemble(&out.fragments), data[RECORD_HEADER_LEN..]);
        assert_eq!(
            out.total_len,
            1000 + RECORD_HEADER_LEN * out.fragments.len()
        );
    }

    #[test]
    fn fragment_payloads_respect_bounds() {
        let data = handshake_record(777);
        let out = split_record(&data, 32, 64);

        let last = out.fragments.len() - 1;
        for (i, fragment) in out.fragments.iter().enumerate() {
            let len = fragment.len() - RECORD_HEADER_LEN;
            if i < last {
                assert!((32..=64).contains(&len), "fragment {i} has payload {len}");
            } else {
                assert!(len <= 64, "final fragment has payload {len}");
            }
        }
    }

    #[test]
    fn equal_bounds_produce_fixed_fragments() {
        let data = handshake_record(100);
        let out = split_record(&data, 20, 20);

        assert_eq!(out.fragments.len(), 5);
        for fragment in &out.fragments {
            assert_eq!(fragment.len(), RECORD_HEADER_LEN + 20);
        }
    }

    #[test]
    fn scenario_200_byte_record() {
        // Header 16 03 03 00 C3, 195-byte payload.
        let data = handshake_record(195);
        assert_eq!(data.len(), 200);
        assert_eq!(&data[..5], &[0x16, 0x03, 0x03, 0x00, 0xC3]);

        let out = split_record(&data, 32, 64);

        assert!(out.fragments.len() > 1);
        let last = out.fragments.len() - 1;
        for (i, fragment) in out.fragments.iter().enumerate() {
            assert_eq!(fragment[0], 0x16);
            assert_eq!(&fragment[1..3], &[0x03, 0x04]);
            let len = fragment.len() - RECORD_HEADER_LEN;
            if i < last {
                assert!((32..=64).contains(&len));
            }
        }
        assert_eq!(reassemble(&out.fragments), data[RECORD_HEADER_LEN..]);
    }

    #[test]
    fn header_parse_round_trip() {
        let data = handshake_record(42);
        let header = RecordHeader::parse(&data).unwrap();
        assert_eq!(header.content_type, 0x16);
        assert_eq!(header.version_major, 0x03);
        assert_eq!(header.version_minor, 0x03);
        assert_eq!(header.length, 42);
        assert!(header.is_handshake());

        assert!(RecordHeader::parse(&data[..4]).is_none());
    }
}
