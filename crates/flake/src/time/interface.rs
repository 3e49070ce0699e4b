use core::time::Duration;

/// Flake epoch: Wednesday, January 1, 2014 00:00:00 UTC
///
/// 41 bits of milliseconds measured from here run out in 2083.
pub const FLAKE_EPOCH: Duration = Duration::from_millis(1_388_534_400_000);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests. The unit is **milliseconds** relative to the origin the
/// implementation was configured with, normally [`FLAKE_EPOCH`].
///
/// Implementations need not be monotonic: the generator clamps readings that
/// go backwards.
///
/// # Example
///
/// ```
/// use flake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}
