use crate::{HostResolutionError, HostResolver};

/// A resolver that always answers with the wrapped host ID.
///
/// Useful in tests and in deployments that hand out host IDs explicitly
/// instead of deriving them from the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixedHostId(pub u64);

impl HostResolver for FixedHostId {
    fn resolve_host_id(&self) -> Result<u64, HostResolutionError> {
        Ok(self.0)
    }
}
