//! Declarative helpers for wire enumerations

/// Declare a DIS enumeration backed by a fixed-width integer.
///
/// Every generated enum is total over its raw type: values without a named
/// variant decode to `Unknown(raw)` and encode back to the same raw value, so
/// a decode/encode cycle never alters the wire bytes.
#[macro_export]
macro_rules! dis_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// Value with no named variant
            Unknown($repr),
        }

        impl $name {
            /// Parse from the raw wire value
            pub fn from_raw(value: $repr) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }

            /// Convert to the raw wire value
            #[inline]
            pub fn to_raw(self) -> $repr {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unknown(other) => other,
                }
            }

            /// Whether the raw value has a named variant
            #[inline]
            pub fn is_known(self) -> bool {
                !matches!(Self::from_raw(self.to_raw()), $name::Unknown(_))
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                $name::from_raw(value)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.to_raw()
            }
        }
    };
}
