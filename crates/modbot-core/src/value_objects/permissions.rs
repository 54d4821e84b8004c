//! Permissions bitflags mirroring the platform's permission bits
//!
//! Used twice: as the authority an invoking member carries (checked by the
//! command gate and the session engine) and as allow/deny sets in channel
//! permission overwrites.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Platform permission flags
    ///
    /// Bit positions match the platform so values can be forwarded verbatim.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const KICK_MEMBERS     = 1 << 1;
        const BAN_MEMBERS      = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR    = 1 << 3;
        const MANAGE_CHANNELS  = 1 << 4;
        const MANAGE_GUILD     = 1 << 5;
        const ADD_REACTIONS    = 1 << 6;
        const VIEW_CHANNEL     = 1 << 10;
        const SEND_MESSAGES    = 1 << 11;
        /// Moderation authority for sessions (end poll, close any ticket)
        const MANAGE_MESSAGES  = 1 << 13;
        const READ_HISTORY     = 1 << 16;
        const SPEAK            = 1 << 21;
        const MANAGE_ROLES     = 1 << 28;

        /// Everything a muted member loses in every channel
        const MUTED_DENY = Self::SEND_MESSAGES.bits()
            | Self::SPEAK.bits()
            | Self::ADD_REACTIONS.bits();

        /// Access granted to participants of a ticket channel
        const TICKET_ACCESS = Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::READ_HISTORY.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        self.contains(Permissions::ADMINISTRATOR) || self.contains(permission)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.trim().parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Names of the individual flags that are set, for error messages
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names()
            .filter(|(_, flag)| flag.bits().is_power_of_two())
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialized as a decimal string, as the platform does
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("permission bits must be non-negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}
