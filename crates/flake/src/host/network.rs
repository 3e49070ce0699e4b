use std::net::{IpAddr, ToSocketAddrs};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{HostResolutionError, HostResolver, MAX_HOST_ID};

/// Derives the host ID from the machine's network address.
///
/// The local hostname is resolved, the last four bytes of the first address
/// returned are read as a big-endian integer, and that integer is reduced
/// modulo `2^10`. Hosts whose addresses agree in the low ten bits get the same
/// ID, so deployments should check their address plan or assign IDs with
/// [`FixedHostId`](crate::FixedHostId).
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkHostResolver;

impl HostResolver for NetworkHostResolver {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), err))]
    fn resolve_host_id(&self) -> Result<u64, HostResolutionError> {
        let hostname = local_hostname()?;
        let addr = (hostname.as_str(), 0)
            .to_socket_addrs()
            .map_err(|source| HostResolutionError::Lookup {
                hostname: hostname.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| HostResolutionError::NoAddress {
                hostname: hostname.clone(),
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%hostname, ip = %addr.ip(), "resolved local address");

        Ok(host_id_from_ip(addr.ip()))
    }
}

/// Maps an address to a host ID: the last four bytes, big-endian, modulo
/// `2^10`.
///
/// An IPv4-mapped IPv6 address yields the same ID as the IPv4 address it
/// wraps.
///
/// ```
/// use std::net::IpAddr;
/// use flake::host_id_from_ip;
///
/// let ip: IpAddr = "10.0.4.7".parse().unwrap();
/// assert_eq!(host_id_from_ip(ip), 7);
/// ```
pub fn host_id_from_ip(ip: IpAddr) -> u64 {
    let last4 = match ip {
        IpAddr::V4(v4) => v4.octets(),
        IpAddr::V6(v6) => {
            let octets = v6.octets();
            [octets[12], octets[13], octets[14], octets[15]]
        }
    };
    u64::from(u32::from_be_bytes(last4)) % (MAX_HOST_ID + 1)
}

#[cfg(unix)]
fn local_hostname() -> Result<String, HostResolutionError> {
    let hostname = nix::unistd::gethostname()
        .map_err(|errno| HostResolutionError::Hostname(errno.into()))?;
    hostname
        .into_string()
        .map_err(|hostname| HostResolutionError::InvalidHostname { hostname })
}

#[cfg(not(unix))]
fn local_hostname() -> Result<String, HostResolutionError> {
    std::env::var("COMPUTERNAME").map_err(|err| match err {
        std::env::VarError::NotPresent => HostResolutionError::Hostname(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "COMPUTERNAME is not set",
        )),
        std::env::VarError::NotUnicode(hostname) => {
            HostResolutionError::InvalidHostname { hostname }
        }
    })
}
