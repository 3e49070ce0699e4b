use crate::HostResolutionError;

/// Supplies the host ID a generator stamps into every ID it mints.
///
/// A resolver is consulted once, when the generator is built. Two generators
/// running concurrently must be given different host IDs, or their IDs may
/// collide; nothing in this crate detects that.
///
/// # Example
///
/// ```
/// use flake::{HostResolutionError, HostResolver};
///
/// struct FromEnvironment;
/// impl HostResolver for FromEnvironment {
///     fn resolve_host_id(&self) -> Result<u64, HostResolutionError> {
///         Ok(7)
///     }
/// }
///
/// assert_eq!(FromEnvironment.resolve_host_id().unwrap(), 7);
/// ```
pub trait HostResolver {
    /// Returns this host's ID, which should be in `0..=MAX_HOST_ID`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host's identity cannot be determined.
    fn resolve_host_id(&self) -> Result<u64, HostResolutionError>;
}
