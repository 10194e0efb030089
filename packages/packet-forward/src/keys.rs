use std::fmt;
use std::str::FromStr;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::storage_keys::to_length_prefixed_nested;
use cosmwasm_std::{StdError, StdResult};

use crate::errors::{ForwardError, ForwardResult};

/// Longest channel or port identifier accepted as part of a key.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Identifies one outbound packet: the source channel and port it was sent
/// on and the sequence the transport assigned to it.
#[cw_serde]
#[derive(Eq, PartialOrd, Ord, Hash)]
pub struct PacketKey {
    pub channel_id: String,
    pub port_id: String,
    pub sequence: u64,
}

impl PacketKey {
    pub fn new(channel_id: impl Into<String>, port_id: impl Into<String>, sequence: u64) -> Self {
        PacketKey {
            channel_id: channel_id.into(),
            port_id: port_id.into(),
            sequence,
        }
    }

    pub fn validate(&self) -> ForwardResult<()> {
        validate_identifier("channel", &self.channel_id)?;
        validate_identifier("port", &self.port_id)
    }

    /// Encodes the key as `len(channel) | channel | len(port) | port | sequence`
    /// with 2 byte big endian lengths and a big endian sequence.
    ///
    /// The encoding only depends on the key itself, so every replica ranges over
    /// the namespace in the same order: channel (shorter first), then port, then
    /// ascending sequence.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_length_prefixed_nested(&[
            self.channel_id.as_bytes(),
            self.port_id.as_bytes(),
        ]);
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out
    }

    pub fn from_bytes(raw: &[u8]) -> StdResult<Self> {
        let (channel_id, rest) = split_component(raw)?;
        let (port_id, rest) = split_component(rest)?;
        let sequence: [u8; 8] = rest
            .try_into()
            .map_err(|_| StdError::parse_err("PacketKey", "sequence must be 8 bytes"))?;
        Ok(PacketKey {
            channel_id,
            port_id,
            sequence: u64::from_be_bytes(sequence),
        })
    }
}

pub(crate) fn validate_identifier(kind: &'static str, value: &str) -> ForwardResult<()> {
    if value.is_empty() || value.len() > MAX_IDENTIFIER_LENGTH || value.contains('/') {
        return Err(ForwardError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn split_component(raw: &[u8]) -> StdResult<(String, &[u8])> {
    if raw.len() < 2 {
        return Err(StdError::parse_err("PacketKey", "missing length prefix"));
    }
    let len = u16::from_be_bytes([raw[0], raw[1]]) as usize;
    let rest = &raw[2..];
    if rest.len() < len {
        return Err(StdError::parse_err("PacketKey", "component exceeds key"));
    }
    let value = String::from_utf8(rest[..len].to_vec())
        .map_err(|e| StdError::parse_err("PacketKey", e))?;
    Ok((value, &rest[len..]))
}

impl fmt::Display for PacketKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}/{}", self.channel_id, self.port_id, self.sequence)
    }
}

impl FromStr for PacketKey {
    type Err = StdError;

    /// Parses the `channel/port/sequence` form produced by `Display`.
    fn from_str(s: &str) -> StdResult<Self> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(channel), Some(port), Some(sequence), None)
                if !channel.is_empty() && !port.is_empty() =>
            {
                let sequence = sequence
                    .parse::<u64>()
                    .map_err(|e| StdError::parse_err("PacketKey", e))?;
                Ok(PacketKey::new(channel, port, sequence))
            }
            _ => Err(StdError::parse_err(
                "PacketKey",
                format!("expected channel/port/sequence, got {s:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_bytes_works() {
        let key = PacketKey::new("channel-1", "transfer", 5);
        assert_eq!(
            key.to_bytes(),
            b"\x00\x09channel-1\x00\x08transfer\x00\x00\x00\x00\x00\x00\x00\x05"
        );
    }

    #[test]
    fn from_bytes_inverts_to_bytes() {
        let key = PacketKey::new("channel-12", "transfer", u64::MAX);
        assert_eq!(PacketKey::from_bytes(&key.to_bytes()).unwrap(), key);
    }

    #[test]
    fn from_bytes_rejects_truncated_keys() {
        let raw = PacketKey::new("channel-1", "transfer", 5).to_bytes();
        let err = PacketKey::from_bytes(&raw[..raw.len() - 1]).unwrap_err();
        assert!(matches!(err, StdError::ParseErr { .. }));

        let err = PacketKey::from_bytes(b"\x00\x09chan").unwrap_err();
        assert!(matches!(err, StdError::ParseErr { .. }));
    }

    #[test]
    fn byte_order_follows_fields_for_equal_lengths() {
        let mut keys = vec![
            PacketKey::new("channel-2", "transfer", 1),
            PacketKey::new("channel-1", "transfer", 256),
            PacketKey::new("channel-1", "transfer", 2),
            PacketKey::new("channel-1", "ics20", 9),
        ];
        let mut encoded: Vec<Vec<u8>> = keys.iter().map(PacketKey::to_bytes).collect();
        keys.sort();
        encoded.sort();
        let decoded: Vec<PacketKey> = encoded
            .iter()
            .map(|raw| PacketKey::from_bytes(raw).unwrap())
            .collect();
        assert_eq!(decoded, keys);
    }

    #[test]
    fn shorter_channels_sort_first() {
        let nine = PacketKey::new("channel-9", "transfer", 1).to_bytes();
        let ten = PacketKey::new("channel-10", "transfer", 1).to_bytes();
        assert!(nine < ten);
    }

    #[test]
    fn display_and_parse() {
        let key = PacketKey::new("channel-0", "transfer", 42);
        assert_eq!(key.to_string(), "channel-0/transfer/42");
        assert_eq!("channel-0/transfer/42".parse::<PacketKey>().unwrap(), key);

        "channel-0/transfer".parse::<PacketKey>().unwrap_err();
        "channel-0/transfer/x".parse::<PacketKey>().unwrap_err();
        "channel-0/transfer/1/2".parse::<PacketKey>().unwrap_err();
        "/transfer/1".parse::<PacketKey>().unwrap_err();
    }

    #[test]
    fn validate_rejects_bad_identifiers() {
        PacketKey::new("channel-0", "transfer", 1).validate().unwrap();

        let err = PacketKey::new("", "transfer", 1).validate().unwrap_err();
        assert!(matches!(
            err,
            ForwardError::InvalidIdentifier { kind: "channel", .. }
        ));

        let err = PacketKey::new("channel-0", "a/b", 1).validate().unwrap_err();
        assert!(matches!(err, ForwardError::InvalidIdentifier { kind: "port", .. }));

        let long = "c".repeat(MAX_IDENTIFIER_LENGTH + 1);
        PacketKey::new(long, "transfer", 1).validate().unwrap_err();
    }
}
