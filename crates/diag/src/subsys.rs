//! crates/diag/src/subsys.rs
//! Subsystem bitmask selecting which functional areas may emit records.

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask over the runtime's functional subsystems.
///
/// A record carries one or more subsystem bits; it is eligible for emission
/// only when its bits intersect the configured mask. The default mask enables
/// `INIT` and `ENV`, matching what operators most often need to see first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subsys(u64);

impl Subsys {
    /// Empty mask; filters out every record.
    pub const NONE: Self = Self(0);
    /// Runtime and communicator initialization.
    pub const INIT: Self = Self(1 << 0);
    /// Collective operations.
    pub const COLL: Self = Self(1 << 1);
    /// Point-to-point operations.
    pub const P2P: Self = Self(1 << 2);
    /// Shared-memory transport.
    pub const SHM: Self = Self(1 << 3);
    /// Network transport.
    pub const NET: Self = Self(1 << 4);
    /// Topology graph search.
    pub const GRAPH: Self = Self(1 << 5);
    /// Algorithm and protocol tuning.
    pub const TUNING: Self = Self(1 << 6);
    /// Environment and parameter handling.
    pub const ENV: Self = Self(1 << 7);
    /// Buffer allocation and registration caches.
    pub const ALLOC: Self = Self(1 << 8);
    /// Public API call tracing.
    pub const CALL: Self = Self(1 << 9);
    /// Proxy progress threads.
    pub const PROXY: Self = Self(1 << 10);
    /// Switch-assisted collectives.
    pub const NVLS: Self = Self(1 << 11);
    /// Bootstrap rendezvous.
    pub const BOOTSTRAP: Self = Self(1 << 12);
    /// Memory registration.
    pub const REG: Self = Self(1 << 13);
    /// Union of every subsystem.
    pub const ALL: Self = Self(u64::MAX);
    /// Default mask applied before any override is parsed.
    pub const DEFAULT: Self = Self(Self::INIT.0 | Self::ENV.0);

    /// Raw bit representation, as stored in the process-wide atomic.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Reconstructs a mask from its raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Whether any bit is shared with `other`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Looks up a single subsystem token, case-insensitively.
    #[must_use]
    pub fn from_name(token: &str) -> Option<Self> {
        const NAMES: [(&str, Subsys); 15] = [
            ("INIT", Subsys::INIT),
            ("COLL", Subsys::COLL),
            ("P2P", Subsys::P2P),
            ("SHM", Subsys::SHM),
            ("NET", Subsys::NET),
            ("GRAPH", Subsys::GRAPH),
            ("TUNING", Subsys::TUNING),
            ("ENV", Subsys::ENV),
            ("ALLOC", Subsys::ALLOC),
            ("CALL", Subsys::CALL),
            ("PROXY", Subsys::PROXY),
            ("NVLS", Subsys::NVLS),
            ("BOOTSTRAP", Subsys::BOOTSTRAP),
            ("REG", Subsys::REG),
            ("ALL", Subsys::ALL),
        ];
        NAMES
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|&(_, mask)| mask)
    }

    /// Parses a `MESH_DEBUG_SUBSYS` value.
    ///
    /// The value is a comma-separated token list; a leading `^` inverts the
    /// selection, starting from [`ALL`](Self::ALL) and removing matched
    /// subsystems instead of starting empty and adding them. Unknown tokens
    /// have no effect. The result fully replaces whatever mask was in force.
    #[must_use]
    pub fn parse_list(spec: &str) -> Self {
        let (invert, tokens) = match spec.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        let mut mask = if invert { Self::ALL } else { Self::NONE };
        for token in tokens.split(',') {
            let Some(bit) = Self::from_name(token) else {
                continue;
            };
            if invert {
                mask.0 &= !bit.0;
            } else {
                mask.0 |= bit.0;
            }
        }
        mask
    }
}

impl BitOr for Subsys {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Subsys {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Subsys {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Default for Subsys {
    fn default() -> Self {
        Self::DEFAULT
    }
}
