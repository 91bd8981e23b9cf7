use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A feature flag that some switch models do not have at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TriState {
    NotSupported,
    False,
    True,
}

impl TriState {
    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    pub fn is_supported(self) -> bool {
        self != TriState::NotSupported
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> TriState {
        if b {
            TriState::True
        } else {
            TriState::False
        }
    }
}

/// An enumeration with a fixed textual token per variant, as it
/// appears in a configuration export, and a human readable name.
pub trait TokenEnum: Sized + Copy + 'static {
    /// Type name used in error messages.
    const NAME: &'static str;

    fn table() -> &'static [(Self, &'static str, &'static str)];

    fn from_token(token: &str) -> Option<Self> {
        Self::table().iter().find(|e| e.1 == token).map(|e| e.0)
    }
}

/// Map a token to its variant, failing with a token error otherwise.
pub fn parse_token<T: TokenEnum>(token: &str, line: u32) -> Result<T> {
    T::from_token(token)
        .ok_or_else(|| Error::token(format!("Unknown {} value: {}", T::NAME, token), line))
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => ($token:expr, $desc:expr) ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize)]
        pub enum $name {
            $( $variant ),*
        }

        impl $name {
            /// Token as written in a configuration export.
            pub fn token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token ),*
                }
            }

            /// Human readable name.
            pub fn description(self) -> &'static str {
                match self {
                    $( $name::$variant => $desc ),*
                }
            }
        }

        impl $crate::token::TokenEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn table() -> &'static [(Self, &'static str, &'static str)] {
                &[ $( ($name::$variant, $token, $desc) ),* ]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.description())
            }
        }
    };
}

token_enum! {
    /// Where the switch takes its time from.
    pub enum ClockSource {
        Local => ("local", "Local"),
        Sntp => ("SNTP", "SNTP"),
    }
}

token_enum! {
    pub enum SntpClientMode {
        Broadcast => ("broadcast", "Broadcast"),
        Unicast => ("unicast", "Unicast"),
    }
}

token_enum! {
    pub enum SpanningTreeVersion {
        Stp => ("802.1d", "STP"),
        Rstp => ("802.1w", "RSTP"),
        Mstp => ("802.1s", "MSTP"),
    }
}

token_enum! {
    /// How the management interface obtains its IPv4 address.
    pub enum AddressingProtocol {
        Bootp => ("bootp", "BOOTP"),
        Dhcp => ("dhcp", "DHCP"),
        Static => ("none", "None"),
    }
}

token_enum! {
    /// Which frames an interface accepts on ingress.
    pub enum AcceptFrame {
        All => ("all", "Admit all"),
        VlanOnly => ("vlanonly", "VLAN only"),
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            TriState::NotSupported => "n/a",
            TriState::False => "no",
            TriState::True => "yes",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn token_lookup() {
        assert_eq!(SpanningTreeVersion::from_token("802.1w"), Some(SpanningTreeVersion::Rstp));
        assert_eq!(SpanningTreeVersion::Mstp.token(), "802.1s");
        assert_eq!(AcceptFrame::VlanOnly.to_string(), "VLAN only");
        assert_eq!(ClockSource::from_token("sntp"), None);
    }

    #[test]
    fn unknown_token() {
        let e = parse_token::<SntpClientMode>("multicast", 7).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Token);
        assert_eq!(e.line, 7);
        assert_eq!(e.msg, "Unknown SntpClientMode value: multicast");
    }

    #[test]
    fn tristate() {
        assert_eq!(TriState::from(true), TriState::True);
        assert!(!TriState::NotSupported.is_supported());
        assert!(TriState::False.is_supported());
        assert_ne!(TriState::False, TriState::NotSupported);
    }
}
