//! crates/diag/src/identity.rs
//! Cached process identity rendered into log prefixes.

/// Hostname, pid, and distributed rank/peer-count display strings.
///
/// Rank and peer count arrive from the launcher after startup via
/// [`set_distributor_params`](crate::set_distributor_params); until then both
/// render as `?`. Distributed-training log collectors sort lines textually,
/// so the rank is zero-padded to the digit width of the peer count
/// (`008/128`, not `8/128`).
#[derive(Clone, Debug)]
pub struct ProcessIdentity {
    rank: String,
    peer_count: String,
    hostname: String,
    pid: u32,
}

const UNKNOWN_FIELD: &str = "?";

impl ProcessIdentity {
    /// Captures the host side of the identity; rank and peer count stay `?`.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            rank: UNKNOWN_FIELD.to_owned(),
            peer_count: UNKNOWN_FIELD.to_owned(),
            hostname: diag_sink::host::hostname(),
            pid: diag_sink::host::pid(),
        }
    }

    /// Returns a copy with rank/peer-count display strings filled in.
    #[must_use]
    pub fn with_distributor_params(&self, rank: i32, peer_count: i32) -> Self {
        let width = num_digits(peer_count);
        Self {
            rank: format!("{rank:0width$}"),
            peer_count: format!("{peer_count:0width$}"),
            hostname: self.hostname.clone(),
            pid: self.pid,
        }
    }

    /// Zero-padded rank display string.
    #[must_use]
    pub fn rank(&self) -> &str {
        &self.rank
    }

    /// Zero-padded peer-count display string.
    #[must_use]
    pub fn peer_count(&self) -> &str {
        &self.peer_count
    }

    /// Short hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Process id.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }
}

/// Decimal digit count of `n`; 0 for any non-positive value, which yields
/// unpadded formatting downstream.
pub(crate) fn num_digits(n: i32) -> usize {
    let mut n = n;
    let mut digits = 0;
    while n > 0 {
        n /= 10;
        digits += 1;
    }
    digits
}
