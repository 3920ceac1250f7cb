//! Capability bitmask
//!
//! A principal's permission level is a set of independent operation kinds.
//! Levels combine with `|`; a check passes when the level shares at least
//! one bit with the required capability.

use bitflags::bitflags;

bitflags! {
    /// Operation kinds a principal may perform on a resource type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        const READ   = 1;
        const CREATE = 2;
        const UPDATE = 4;
        const DELETE = 8;
    }
}

impl Permissions {
    /// Level given to newly registered accounts: READ | CREATE | UPDATE.
    pub const DEFAULT_ACCOUNT: Self = Self::READ.union(Self::CREATE).union(Self::UPDATE);

    /// Rebuild a level from its stored or transported integer form.
    ///
    /// Bits outside the four known flags are kept as-is so a level written
    /// by a newer service round-trips unchanged.
    pub fn from_level(level: u32) -> Self {
        Self::from_bits_retain(level)
    }

    pub fn level(self) -> u32 {
        self.bits()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::DEFAULT_ACCOUNT
    }
}

/// Does `level` grant `required`?
pub fn has_capability(level: Permissions, required: Permissions) -> bool {
    level.intersects(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert_eq!(Permissions::READ.level(), 1);
        assert_eq!(Permissions::CREATE.level(), 2);
        assert_eq!(Permissions::UPDATE.level(), 4);
        assert_eq!(Permissions::DELETE.level(), 8);
        assert_eq!(Permissions::DEFAULT_ACCOUNT.level(), 7);
    }

    #[test]
    fn test_has_capability() {
        let level = Permissions::from_level(7);
        assert!(has_capability(level, Permissions::READ));
        assert!(has_capability(level, Permissions::CREATE));
        assert!(has_capability(level, Permissions::UPDATE));
        assert!(!has_capability(level, Permissions::DELETE));
    }

    #[test]
    fn test_empty_level_grants_nothing() {
        let level = Permissions::from_level(0);
        assert!(!has_capability(level, Permissions::READ));
        assert!(!has_capability(level, Permissions::all()));
    }

    #[test]
    fn test_any_shared_bit_is_enough() {
        let level = Permissions::DELETE;
        assert!(has_capability(level, Permissions::READ | Permissions::DELETE));
        assert!(!has_capability(level, Permissions::READ | Permissions::UPDATE));
    }

    #[test]
    fn test_unknown_bits_are_retained() {
        let level = Permissions::from_level(0b1_0001);
        assert_eq!(level.level(), 17);
        assert!(has_capability(level, Permissions::READ));
    }
}
