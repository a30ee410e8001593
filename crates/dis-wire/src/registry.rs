//! Discriminator-driven record registries
//!
//! Four record families (descriptors, variable parameters, fixed datums and
//! variable datums) pick their concrete shape from a small integer found in
//! the stream or in the enclosing PDU. Each family owns a `Registry` that maps
//! discriminators to decode functions, plus one default decoder for values no
//! variant claims. The default variants keep the whole raw record, so
//! unregistered discriminators never lose bytes.
//!
//! Built-in registries are assembled once from an explicit variant table and
//! are read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use dis_core::{DisError, DisResult};

use crate::{DisReader, Record};

/// Decode function producing a family record from the reader position
pub type DecodeFn<F> = fn(&mut DisReader<'_>) -> DisResult<F>;

/// A record family with a statically known set of variants
pub trait RecordFamily: Record + Sized + 'static {
    /// Family name used in logs and initialization errors
    const NAME: &'static str;

    /// Every built-in variant of the family
    fn variants() -> Vec<Variant<Self>>;

    /// The lazily built, shared registry for the family
    fn registry() -> &'static Registry<Self>;
}

/// A family whose discriminator is the first field of each record
pub trait StreamDiscriminated: RecordFamily {
    /// Read the discriminator at the reader position without consuming it
    fn peek_discriminator(src: &DisReader<'_>) -> DisResult<u32>;
}

/// A concrete variant of a record family
pub trait FamilyVariant<F: RecordFamily>: Record {
    /// Discriminators this variant claims; empty for the family default
    const DISCRIMINATORS: &'static [u32];

    /// Decode this variant and wrap it in the family type
    fn decode_variant(src: &mut DisReader<'_>) -> DisResult<F>;

    fn as_variant(record: &F) -> Option<&Self>;

    fn as_variant_mut(record: &mut F) -> Option<&mut Self>;
}

/// Registration entry: claimed discriminators plus decoder
pub struct Variant<F: 'static> {
    pub name: &'static str,
    pub discriminators: &'static [u32],
    pub decode: DecodeFn<F>,
}

impl<F: RecordFamily> Variant<F> {
    /// Entry for a built-in variant type
    pub fn of<V: FamilyVariant<F>>() -> Self {
        Variant {
            name: short_type_name::<V>(),
            discriminators: V::DISCRIMINATORS,
            decode: V::decode_variant,
        }
    }
}

impl<F> fmt::Debug for Variant<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("discriminators", &self.discriminators)
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Discriminator to decoder map with a default fallback
pub struct Registry<F: 'static> {
    family: &'static str,
    decoders: HashMap<u32, (&'static str, DecodeFn<F>)>,
    default: (&'static str, DecodeFn<F>),
}

impl<F: 'static> Registry<F> {
    pub fn builder(family: &'static str) -> RegistryBuilder<F> {
        RegistryBuilder {
            family,
            decoders: HashMap::new(),
            default: None,
        }
    }

    #[inline]
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Name of the variant that would decode `discriminator`
    pub fn resolve(&self, discriminator: u32) -> &'static str {
        self.lookup(discriminator).0
    }

    /// Whether a variant claims `discriminator` explicitly
    pub fn is_registered(&self, discriminator: u32) -> bool {
        self.decoders.contains_key(&discriminator)
    }

    #[inline]
    fn lookup(&self, discriminator: u32) -> (&'static str, DecodeFn<F>) {
        self.decoders
            .get(&discriminator)
            .copied()
            .unwrap_or(self.default)
    }

    /// Decode with a discriminator supplied by the caller
    pub fn decode_with(&self, discriminator: u32, src: &mut DisReader<'_>) -> DisResult<F> {
        let (_, decode) = self.lookup(discriminator);
        decode(src)
    }
}

impl<F: StreamDiscriminated> Registry<F> {
    /// Peek the discriminator, then decode the record starting at the same position
    pub fn decode(&self, src: &mut DisReader<'_>) -> DisResult<F> {
        let discriminator = F::peek_discriminator(src)?;
        self.decode_with(discriminator, src)
    }
}

impl<F: RecordFamily> Registry<F> {
    /// Builder seeded with every built-in variant of the family
    pub fn builtin_builder() -> RegistryBuilder<F> {
        let mut builder = Registry::builder(F::NAME);
        for variant in F::variants() {
            builder = builder.register(variant);
        }
        builder
    }

    /// Build the family's registry from its built-in table.
    ///
    /// Panics if the family table has no default variant: that is a
    /// programming error in the table, not a property of the input.
    pub fn builtin() -> Self {
        match Self::builtin_builder().build() {
            Ok(registry) => registry,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<F> fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut claimed: Vec<_> = self.decoders.iter().map(|(k, (n, _))| (*k, *n)).collect();
        claimed.sort_unstable();
        f.debug_struct("Registry")
            .field("family", &self.family)
            .field("default", &self.default.0)
            .field("claimed", &claimed)
            .finish()
    }
}

/// Assembles a `Registry`; a later claim for the same discriminator wins
pub struct RegistryBuilder<F: 'static> {
    family: &'static str,
    decoders: HashMap<u32, (&'static str, DecodeFn<F>)>,
    default: Option<(&'static str, DecodeFn<F>)>,
}

impl<F: 'static> RegistryBuilder<F> {
    /// Register a variant. A variant claiming no discriminators becomes the default.
    pub fn register(mut self, variant: Variant<F>) -> Self {
        if variant.discriminators.is_empty() {
            if let Some((previous, _)) = self.default {
                tracing::warn!(
                    family = self.family,
                    previous,
                    replacement = variant.name,
                    "replacing default decoder"
                );
            }
            self.default = Some((variant.name, variant.decode));
            return self;
        }
        for &discriminator in variant.discriminators {
            self.insert(discriminator, variant.name, variant.decode);
        }
        self
    }

    /// Claim a single discriminator with an ad-hoc decoder
    pub fn claim(mut self, name: &'static str, discriminator: u32, decode: DecodeFn<F>) -> Self {
        self.insert(discriminator, name, decode);
        self
    }

    fn insert(&mut self, discriminator: u32, name: &'static str, decode: DecodeFn<F>) {
        if let Some((previous, _)) = self.decoders.insert(discriminator, (name, decode)) {
            tracing::warn!(
                family = self.family,
                discriminator,
                previous,
                replacement = name,
                "replacing record decoder"
            );
        }
    }

    pub fn build(self) -> DisResult<Registry<F>> {
        let default = self
            .default
            .ok_or(DisError::MissingDefaultDecoder(self.family))?;
        Ok(Registry {
            family: self.family,
            decoders: self.decoders,
            default,
        })
    }
}
