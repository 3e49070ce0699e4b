/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that constructing a generator can produce.
///
/// Generating IDs is infallible once a [`FlakeGenerator`] exists; the only
/// failure point is working out which host the generator runs on.
///
/// [`FlakeGenerator`]: crate::FlakeGenerator
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The host ID could not be determined.
    #[error(transparent)]
    HostResolution(#[from] HostResolutionError),
}

/// The reasons a [`HostResolver`] may fail to produce a host ID.
///
/// [`HostResolver`]: crate::HostResolver
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HostResolutionError {
    /// The operating system refused to report the local hostname.
    #[error("failed to read the local hostname: {0}")]
    Hostname(#[source] std::io::Error),

    /// The local hostname is not valid UTF-8 and cannot be looked up.
    #[error("local hostname {hostname:?} is not valid UTF-8")]
    InvalidHostname { hostname: std::ffi::OsString },

    /// Resolving the hostname to an address failed.
    #[error("failed to resolve hostname `{hostname}`: {source}")]
    Lookup {
        hostname: String,
        #[source]
        source: std::io::Error,
    },

    /// The hostname resolved, but to no addresses.
    #[error("hostname `{hostname}` did not resolve to any address")]
    NoAddress { hostname: String },

    /// The resolver produced an ID that does not fit the host ID field.
    #[error("host id {host_id} exceeds the maximum of {max}")]
    HostIdOutOfRange { host_id: u64, max: u64 },
}

/// Errors from parsing a [`FlakeId`] out of its hexadecimal text form.
///
/// [`FlakeId`]: crate::FlakeId
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseFlakeIdError {
    /// The input held no hex digits.
    #[error("flake id is empty")]
    Empty,

    /// A character that is not a hex digit was found at `index`.
    #[error("invalid hex digit {ch:?} at index {index}")]
    InvalidDigit { ch: char, index: usize },

    /// The value does not fit in 64 bits.
    #[error("flake id does not fit in 64 bits")]
    Overflow,
}
