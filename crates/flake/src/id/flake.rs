use core::{fmt, str::FromStr};

use crate::{FLAKE_EPOCH, ParseFlakeIdError, id::layout::FieldLayout};

/// Width of the timestamp field, in bits.
pub const TIMESTAMP_BITS: u8 = 41;

/// Width of the host ID field, in bits.
pub const HOST_ID_BITS: u8 = 10;

/// Width of the sequence field, in bits.
pub const SEQUENCE_BITS: u8 = 13;

/// Largest host ID that fits the layout (`2^10 - 1`).
pub const MAX_HOST_ID: u64 = (1 << HOST_ID_BITS) - 1;

/// Largest sequence value that fits the layout (`2^13 - 1`).
///
/// A generator can hand out `MAX_SEQUENCE + 1` IDs per millisecond.
pub const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// A 64-bit, k-sortable flake ID.
///
/// - 41 bits timestamp (ms since [`FLAKE_EPOCH`])
/// - 10 bits host ID
/// - 13 bits sequence
///
/// ```text
///  Bit Index:  63             23 22            13 12             0
///              +----------------+----------------+---------------+
///  Field:      | timestamp (41) |  host ID (10)  | sequence (13) |
///              +----------------+----------------+---------------+
///              |<----- MSB ---------- 64 bits --------- LSB ----->|
/// ```
///
/// Comparing two IDs compares their raw integers, so IDs minted later by the
/// same generator never sort before earlier ones.
///
/// # Example
///
/// ```
/// use flake::FlakeId;
///
/// let id = FlakeId::from(1000, 5, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.host_id(), 5);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_string(), "1f400a001");
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlakeId {
    id: u64,
}

impl FlakeId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 23
    /// through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 10-bit host ID field. Occupies bits 13
    /// through 22.
    pub const HOST_ID_MASK: u64 = MAX_HOST_ID;

    /// Bitmask for extracting the 13-bit sequence field. Occupies bits 0
    /// through 12.
    pub const SEQUENCE_MASK: u64 = MAX_SEQUENCE;

    /// Number of bits to shift the timestamp to its correct position (bit 23).
    pub const TIMESTAMP_SHIFT: u64 = (HOST_ID_BITS + SEQUENCE_BITS) as u64;

    /// Number of bits to shift the host ID to its correct position (bit 13).
    pub const HOST_ID_SHIFT: u64 = SEQUENCE_BITS as u64;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Packs the three components into an ID. Each component is truncated to
    /// the width of its field.
    pub const fn from(timestamp: u64, host_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let host_id = (host_id & Self::HOST_ID_MASK) << Self::HOST_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | host_id | sequence,
        }
    }

    /// Wraps a raw integer. Every `u64` is a valid layout.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the ID as an unsigned integer; same as [`Self::to_raw`].
    pub const fn to_u64(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp (ms since [`FLAKE_EPOCH`]) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the host ID from the packed ID.
    pub const fn host_id(&self) -> u64 {
        (self.id >> Self::HOST_ID_SHIFT) & Self::HOST_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the creation time as milliseconds since the Unix epoch.
    pub const fn unix_millis(&self) -> u64 {
        self.timestamp() + FLAKE_EPOCH.as_millis() as u64
    }

    /// Largest value the 41-bit timestamp field can hold.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Largest value the 10-bit host ID field can hold.
    pub const fn max_host_id() -> u64 {
        Self::HOST_ID_MASK
    }

    /// Largest value the 13-bit sequence field can hold.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns the ID as 16 lowercase hex digits, zero padded.
    ///
    /// Unlike the [`Display`](fmt::Display) form, padded strings sort
    /// lexicographically in the same order as the IDs.
    pub fn to_padded_hex(&self) -> String {
        format!("{:016x}", self.id)
    }

    fn fields(&self) -> [FieldLayout; 3] {
        [
            FieldLayout {
                name: "timestamp",
                bits: TIMESTAMP_BITS,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "host id",
                bits: HOST_ID_BITS,
                value: self.host_id(),
            },
            FieldLayout {
                name: "sequence",
                bits: SEQUENCE_BITS,
                value: self.sequence(),
            },
        ]
    }
}

impl From<u64> for FlakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<FlakeId> for u64 {
    fn from(id: FlakeId) -> Self {
        id.to_raw()
    }
}

/// Lowercase hex, no padding.
impl fmt::Display for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.id)
    }
}

impl fmt::LowerHex for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.id, f)
    }
}

impl fmt::UpperHex for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.id, f)
    }
}

impl fmt::Debug for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return super::layout::write_bit_layout(f, "FlakeId", self.id, &self.fields());
        }
        f.debug_struct("FlakeId")
            .field("id", &format_args!("{:#x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("host_id", &self.host_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

/// Parses the hex form produced by [`Display`](fmt::Display). Either case is
/// accepted, as is a leading `0x`.
impl FromStr for FlakeId {
    type Err = ParseFlakeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(ParseFlakeIdError::Empty);
        }
        let offset = s.len() - digits.len();
        if let Some((index, ch)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(ParseFlakeIdError::InvalidDigit {
                ch,
                index: offset + index,
            });
        }
        u64::from_str_radix(digits, 16)
            .map(Self::from_raw)
            .map_err(|_| ParseFlakeIdError::Overflow)
    }
}
