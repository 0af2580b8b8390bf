//! String identifiers for field names, type descriptors, and external resources.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

macro_rules! string_ident {
    ($(#[$meta:meta])* $ident:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $ident(Arc<str>);

        impl $ident {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(s: impl Into<Arc<str>>) -> Self {
                Self(s.into())
            }

            /// Returns the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $ident {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($ident), &*self.0)
            }
        }

        impl fmt::Display for $ident {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $ident {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $ident {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ident {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl From<String> for $ident {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }
    };
}

string_ident! {
    /// Name of a field or member.
    Name
}

string_ident! {
    /// Name of a registered entity or behavior type.
    TypeName
}

string_ident! {
    /// Path of a standalone resource that lives outside any payload.
    ResourcePath
}
