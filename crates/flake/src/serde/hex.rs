use serde::{Deserialize, Deserializer, Serializer};

/// Serde adapter that writes a [`FlakeId`] as its lowercase hex string instead
/// of the default integer.
///
/// ```
/// use flake::FlakeId;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Event {
///     #[serde(with = "flake::as_hex")]
///     id: FlakeId,
/// }
///
/// let event = Event { id: FlakeId::from_raw(0xabc) };
/// assert_eq!(serde_json::to_string(&event).unwrap(), r#"{"id":"abc"}"#);
/// ```
///
/// [`FlakeId`]: crate::FlakeId
pub mod as_hex {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::FlakeId;

    /// Serialize a flake ID as a lowercase hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &FlakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize a flake ID from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not valid hex or does not fit in 64 bits
    pub fn deserialize<'de, D>(d: D) -> Result<FlakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
