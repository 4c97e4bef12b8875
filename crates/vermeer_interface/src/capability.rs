//! Target capability flags and quality tiers.

/// A capability flag on the target space.
///
/// Certain writes are gated on these: stage channels and explicit-filter
/// changes require [`Capability::Community`], announcement channels require
/// [`Capability::Announcements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    /// Community features: stage channels, explicit-filter management
    Community,
    /// Announcement channels
    Announcements,
}

/// Quality tier of the target space, gating resource ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PremiumTier {
    /// No boost tier
    #[default]
    None,
    /// First boost tier
    Tier1,
    /// Second boost tier
    Tier2,
    /// Third boost tier
    Tier3,
}

impl PremiumTier {
    /// Maximum voice bitrate for this tier, in bits per second.
    ///
    /// Captured bitrates above this ceiling are clamped at restore time.
    pub fn max_bitrate(&self) -> u32 {
        match self {
            PremiumTier::None => 64_000,
            PremiumTier::Tier1 => 128_000,
            PremiumTier::Tier2 => 256_000,
            PremiumTier::Tier3 => 384_000,
        }
    }

    /// Tier display name.
    pub fn name(&self) -> &str {
        match self {
            PremiumTier::None => "None",
            PremiumTier::Tier1 => "Tier 1",
            PremiumTier::Tier2 => "Tier 2",
            PremiumTier::Tier3 => "Tier 3",
        }
    }
}
