//! Plumbing shared by the record families

/// Declare a record family enum: one tuple variant per concrete record.
///
/// Generates the enum, `From` conversions, `variant_name`, and a `Record`
/// impl whose size and encoding delegate to the active variant. Decoding
/// goes through `Self::decode_family`, which each family defines.
macro_rules! record_family {
    (
        $(#[$meta:meta])*
        $vis:vis enum $family:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($ty:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        $vis enum $family {
            $(
                $(#[$vmeta])*
                $variant($ty),
            )+
        }

        impl $family {
            /// Name of the concrete variant
            pub fn variant_name(&self) -> &'static str {
                match self {
                    $( $family::$variant(_) => stringify!($variant), )+
                }
            }
        }

        $(
            impl From<$ty> for $family {
                fn from(value: $ty) -> Self {
                    $family::$variant(value)
                }
            }
        )+

        impl $crate::Record for $family {
            fn wire_size(&self) -> usize {
                match self {
                    $( $family::$variant(v) => $crate::Record::wire_size(v), )+
                }
            }

            fn encode(&self, dst: &mut impl ::bytes::BufMut) {
                match self {
                    $( $family::$variant(v) => $crate::Record::encode(v, dst), )+
                }
            }

            fn decode(src: &mut $crate::DisReader<'_>) -> ::dis_core::DisResult<Self> {
                $family::decode_family(src)
            }
        }
    };
}

/// Implement `FamilyVariant` for a concrete record.
///
/// `claims` is a `&'static [u32]` expression; an empty slice marks the
/// family default. An optional `decode = path` replaces the plain
/// `Record::decode` wrapper.
macro_rules! family_variant {
    ($family:ident :: $variant:ident ($ty:ty) claims $discs:expr) => {
        family_variant!(@impl $family, $variant, $ty, $discs, |src| {
            Ok($family::$variant(<$ty as $crate::Record>::decode(src)?))
        });
    };
    ($family:ident :: $variant:ident ($ty:ty) claims $discs:expr, decode = $decode:path) => {
        family_variant!(@impl $family, $variant, $ty, $discs, |src| $decode(src));
    };
    (@impl $family:ident, $variant:ident, $ty:ty, $discs:expr, |$src:ident| $body:expr) => {
        impl $crate::FamilyVariant<$family> for $ty {
            const DISCRIMINATORS: &'static [u32] = $discs;

            fn decode_variant($src: &mut $crate::DisReader<'_>) -> ::dis_core::DisResult<$family> {
                $body
            }

            fn as_variant(record: &$family) -> Option<&Self> {
                match record {
                    $family::$variant(v) => Some(v),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn as_variant_mut(record: &mut $family) -> Option<&mut Self> {
                match record {
                    $family::$variant(v) => Some(v),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

/// Back a `RecordFamily::registry` with a per-family `OnceLock`
macro_rules! builtin_registry {
    ($family:ty) => {
        fn registry() -> &'static $crate::Registry<$family> {
            static REGISTRY: ::std::sync::OnceLock<$crate::Registry<$family>> =
                ::std::sync::OnceLock::new();
            REGISTRY.get_or_init($crate::Registry::builtin)
        }
    };
}
