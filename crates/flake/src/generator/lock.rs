use core::cmp::Ordering;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, FlakeId, HostResolutionError, HostResolver, MAX_HOST_ID, MAX_SEQUENCE,
    NetworkHostResolver, Result, SystemClock, TimeSource,
};

/// Mutable generator state, only touched while the lock is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct State {
    /// Last timestamp handed out (ms since the clock's epoch).
    timestamp: u64,
    /// Sequence the next ID minted in `timestamp` will carry. Reaching
    /// `MAX_SEQUENCE + 1` means the millisecond is exhausted.
    sequence: u64,
    /// Last raw clock reading. `timestamp` may run ahead of it after the
    /// sequence is exhausted, so only a reading below this one is a regression.
    clock: u64,
    /// Number of readings seen below `clock`.
    regressions: u64,
}

/// A lock-based flake ID generator suitable for multi-threaded environments.
///
/// All mutable state sits behind a single [`parking_lot::Mutex`] held for the
/// whole of [`next_id`](Self::next_id), clock read included. Calls are
/// therefore totally ordered and IDs never decrease, across all callers. Share
/// the generator with an [`Arc`](std::sync::Arc) or a `static`.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Infallible after construction
/// - ✅ Never sleeps: an exhausted millisecond borrows the next one
///
/// ## Clock behaviour
/// - A clock that steps backwards is clamped to the last timestamp used; the
///   sequence keeps IDs distinct until the clock catches up.
/// - After `MAX_SEQUENCE + 1` IDs in one millisecond the generator moves its
///   own timestamp one millisecond ahead of the clock and resets the sequence.
///
/// # Example
///
/// ```
/// use flake::{FixedHostId, FlakeGenerator, SystemClock};
///
/// let generator = FlakeGenerator::with_resolver(&FixedHostId(5), SystemClock::default())?;
///
/// let a = generator.next_id();
/// let b = generator.next_id();
/// assert!(a < b);
/// assert_eq!(b.host_id(), 5);
/// # Ok::<(), flake::Error>(())
/// ```
pub struct FlakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    host_id: u64,
    time: T,
}

impl FlakeGenerator<SystemClock> {
    /// Creates a generator for this machine.
    ///
    /// The host ID is derived from the local network address with
    /// [`NetworkHostResolver`] and time is read from a [`SystemClock`] aligned
    /// to [`FLAKE_EPOCH`](crate::FLAKE_EPOCH).
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostResolution`] if the hostname or its address cannot
    /// be looked up.
    pub fn new() -> Result<Self> {
        Self::with_resolver(&NetworkHostResolver, SystemClock::default())
    }
}

impl<T> FlakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator whose host ID comes from `resolver` and whose
    /// timestamps come from `time`.
    ///
    /// The resolver is consulted exactly once. The generator starts with the
    /// current clock reading as its last timestamp and a sequence of zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostResolution`] if the resolver fails or produces an
    /// ID above [`MAX_HOST_ID`].
    pub fn with_resolver<R>(resolver: &R, time: T) -> Result<Self>
    where
        R: HostResolver + ?Sized,
    {
        let host_id = resolver.resolve_host_id()?;
        if host_id > MAX_HOST_ID {
            return Err(Error::HostResolution(
                HostResolutionError::HostIdOutOfRange {
                    host_id,
                    max: MAX_HOST_ID,
                },
            ));
        }

        let timestamp = time.current_millis();

        #[cfg(feature = "tracing")]
        tracing::debug!(host_id, timestamp, "flake generator ready");

        Ok(Self::from_components(timestamp, host_id, 0, time))
    }

    /// Creates a generator from explicit state.
    ///
    /// This constructor is primarily useful for tests and for resuming from a
    /// recorded position. `sequence` is the value the next ID minted in
    /// `timestamp` will carry; anything above [`MAX_SEQUENCE`] marks that
    /// millisecond as exhausted. `host_id` is truncated to its field width.
    ///
    /// # ⚠️ Note
    /// In typical use cases, you should prefer [`Self::with_resolver`] or
    /// [`FlakeGenerator::new`].
    pub fn from_components(timestamp: u64, host_id: u64, sequence: u64, time: T) -> Self {
        let state = Mutex::new(State {
            timestamp,
            sequence: sequence.min(MAX_SEQUENCE + 1),
            clock: timestamp,
            regressions: 0,
        });
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            host_id: host_id & FlakeId::HOST_ID_MASK,
            time,
        }
    }

    /// The host ID stamped into every ID from this generator.
    pub fn host_id(&self) -> u64 {
        self.host_id
    }

    /// The time source this generator reads.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// How many times the clock has been seen stepping backwards.
    ///
    /// Catching up after the generator borrowed a future millisecond is not
    /// counted.
    pub fn clock_regressions(&self) -> u64 {
        self.state.lock().regressions
    }

    /// Generates the next ID.
    ///
    /// Never blocks beyond the lock, never sleeps and never fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(host_id = self.host_id)))]
    pub fn next_id(&self) -> FlakeId {
        let mut state = self.state.lock();
        let now = self.time.current_millis();

        if now < state.clock {
            state.regressions += 1;
            Self::cold_clock_behind(now, state.clock);
        }
        state.clock = now;

        match now.cmp(&state.timestamp) {
            Ordering::Greater => {
                state.timestamp = now;
                state.sequence = 0;
            }
            // Behind the last timestamp: either a regression, already
            // reported above, or the clock catching up after a borrowed tick.
            Ordering::Equal | Ordering::Less => {}
        }

        if state.sequence > MAX_SEQUENCE {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                timestamp = state.timestamp,
                "sequence exhausted, advancing to next millisecond"
            );
            state.timestamp += 1;
            state.sequence = 0;
        }

        let id = FlakeId::from(state.timestamp, self.host_id, state.sequence);
        state.sequence += 1;
        id
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(_now: u64, _last: u64) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            now = _now,
            last = _last,
            behind_ms = _last - _now,
            "clock moved backwards, reusing last timestamp"
        );
    }
}

impl<T> core::fmt::Debug for FlakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("FlakeGenerator")
            .field("host_id", &self.host_id)
            .field("timestamp", &state.timestamp)
            .field("sequence", &state.sequence)
            .field("clock_regressions", &state.regressions)
            .finish_non_exhaustive()
    }
}
