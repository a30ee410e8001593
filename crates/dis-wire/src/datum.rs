//! Fixed and variable datum records
//!
//! Datums are the id/value pairs carried by the simulation management PDUs.
//! A fixed datum is an id plus one 32-bit word; a variable datum is an id,
//! a length in bits, and a payload padded to the next 64-bit boundary.
//! Both families are discriminated by the leading datum id.

use bytes::BufMut;

use dis_core::{DisError, DisResult, EntityKind, ForceId};

use crate::{put_padding, DisReader, EntityType, Record, RecordFamily, StreamDiscriminated, Variant};

pub const FIXED_DATUM_SIZE: usize = 8;

/// Id and bit length preceding a variable datum payload
pub const VARIABLE_DATUM_HEADER_SIZE: usize = 8;

/// Well-known datum ids
pub mod datum_id {
    pub const ENTITY_TYPE: u32 = 11000;
    pub const ENTITY_KIND: u32 = 11110;
    pub const DOMAIN: u32 = 11120;
    pub const COUNTRY: u32 = 11130;
    pub const CATEGORY: u32 = 11140;
    pub const SUBCATEGORY: u32 = 11150;
    pub const SPECIFIC: u32 = 11160;
    pub const EXTRA: u32 = 11170;
    pub const FORCE_ID: u32 = 11200;
    pub const DESCRIPTION: u32 = 11300;

    /// Ids of the individual entity type components
    pub const ENTITY_TYPE_FIELDS: &[u32] = &[
        ENTITY_KIND,
        DOMAIN,
        COUNTRY,
        CATEGORY,
        SUBCATEGORY,
        SPECIFIC,
        EXTRA,
    ];
}

/// Bytes occupied by a payload of `bit_length` bits once padded to 64 bits
#[inline]
pub fn padded_length(bit_length: u32) -> usize {
    (bit_length as usize).div_ceil(64) * 8
}

// ---------------------------------------------------------------------------
// Fixed datums
// ---------------------------------------------------------------------------

/// How the 32-bit value of a generic fixed datum was last set.
///
/// Local bookkeeping only; it never reaches the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FixedValueKind {
    #[default]
    Unsigned,
    Signed,
    Float,
}

/// Fixed datum with no built-in interpretation
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericFixedDatum {
    pub datum_id: u32,
    value: [u8; 4],
    kind: FixedValueKind,
}

impl GenericFixedDatum {
    pub fn from_u32(datum_id: u32, value: u32) -> Self {
        let mut datum = GenericFixedDatum {
            datum_id,
            ..Default::default()
        };
        datum.set_u32(value);
        datum
    }

    pub fn from_i32(datum_id: u32, value: i32) -> Self {
        let mut datum = GenericFixedDatum {
            datum_id,
            ..Default::default()
        };
        datum.set_i32(value);
        datum
    }

    pub fn from_f32(datum_id: u32, value: f32) -> Self {
        let mut datum = GenericFixedDatum {
            datum_id,
            ..Default::default()
        };
        datum.set_f32(value);
        datum
    }

    #[inline]
    pub fn kind(&self) -> FixedValueKind {
        self.kind
    }

    #[inline]
    pub fn raw_value(&self) -> [u8; 4] {
        self.value
    }

    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.value)
    }

    pub fn as_i32(&self) -> i32 {
        i32::from_be_bytes(self.value)
    }

    pub fn as_f32(&self) -> f32 {
        f32::from_be_bytes(self.value)
    }

    pub fn set_u32(&mut self, value: u32) {
        self.value = value.to_be_bytes();
        self.kind = FixedValueKind::Unsigned;
    }

    pub fn set_i32(&mut self, value: i32) {
        self.value = value.to_be_bytes();
        self.kind = FixedValueKind::Signed;
    }

    pub fn set_f32(&mut self, value: f32) {
        self.value = value.to_be_bytes();
        self.kind = FixedValueKind::Float;
    }
}

impl PartialEq for GenericFixedDatum {
    fn eq(&self, other: &Self) -> bool {
        self.datum_id == other.datum_id && self.value == other.value
    }
}

impl Eq for GenericFixedDatum {}

impl Record for GenericFixedDatum {
    fn wire_size(&self) -> usize {
        FIXED_DATUM_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.datum_id);
        dst.put_slice(&self.value);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<FIXED_DATUM_SIZE>()?;
        let mut f = DisReader::new(&bytes);
        Ok(GenericFixedDatum {
            datum_id: f.read_u32()?,
            value: f.read_array::<4>()?,
            kind: FixedValueKind::Unsigned,
        })
    }
}

/// Component of an entity type addressed by a fixed datum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityTypeField {
    Kind,
    Domain,
    Country,
    Category,
    Subcategory,
    Specific,
    Extra,
}

impl EntityTypeField {
    pub fn datum_id(self) -> u32 {
        match self {
            EntityTypeField::Kind => datum_id::ENTITY_KIND,
            EntityTypeField::Domain => datum_id::DOMAIN,
            EntityTypeField::Country => datum_id::COUNTRY,
            EntityTypeField::Category => datum_id::CATEGORY,
            EntityTypeField::Subcategory => datum_id::SUBCATEGORY,
            EntityTypeField::Specific => datum_id::SPECIFIC,
            EntityTypeField::Extra => datum_id::EXTRA,
        }
    }

    pub fn from_datum_id(id: u32) -> Option<Self> {
        Some(match id {
            datum_id::ENTITY_KIND => EntityTypeField::Kind,
            datum_id::DOMAIN => EntityTypeField::Domain,
            datum_id::COUNTRY => EntityTypeField::Country,
            datum_id::CATEGORY => EntityTypeField::Category,
            datum_id::SUBCATEGORY => EntityTypeField::Subcategory,
            datum_id::SPECIFIC => EntityTypeField::Specific,
            datum_id::EXTRA => EntityTypeField::Extra,
            _ => return None,
        })
    }
}

/// One component of an entity type, sent as its own fixed datum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityTypeFieldDatum {
    pub field: EntityTypeField,
    pub value: u32,
}

impl EntityTypeFieldDatum {
    pub fn new(field: EntityTypeField, value: u32) -> Self {
        EntityTypeFieldDatum { field, value }
    }

    /// Datums for all seven components of `entity_type`
    pub fn split(entity_type: &EntityType) -> [EntityTypeFieldDatum; 7] {
        [
            Self::new(EntityTypeField::Kind, entity_type.kind.to_raw() as u32),
            Self::new(EntityTypeField::Domain, entity_type.domain as u32),
            Self::new(EntityTypeField::Country, entity_type.country as u32),
            Self::new(EntityTypeField::Category, entity_type.category as u32),
            Self::new(EntityTypeField::Subcategory, entity_type.subcategory as u32),
            Self::new(EntityTypeField::Specific, entity_type.specific as u32),
            Self::new(EntityTypeField::Extra, entity_type.extra as u32),
        ]
    }

    /// Write this component into `entity_type`; the value is truncated to the field width
    pub fn apply(&self, entity_type: &mut EntityType) {
        let v = self.value;
        match self.field {
            EntityTypeField::Kind => entity_type.kind = EntityKind::from_raw(v as u8),
            EntityTypeField::Domain => entity_type.domain = v as u8,
            EntityTypeField::Country => entity_type.country = v as u16,
            EntityTypeField::Category => entity_type.category = v as u8,
            EntityTypeField::Subcategory => entity_type.subcategory = v as u8,
            EntityTypeField::Specific => entity_type.specific = v as u8,
            EntityTypeField::Extra => entity_type.extra = v as u8,
        }
    }
}

impl Record for EntityTypeFieldDatum {
    fn wire_size(&self) -> usize {
        FIXED_DATUM_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.field.datum_id());
        dst.put_u32(self.value);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let id = src.peek_u32()?;
        let field = EntityTypeField::from_datum_id(id).ok_or_else(|| {
            DisError::InvalidWireFormat(format!("datum id {id} is not an entity type field"))
        })?;
        let bytes = src.read_array::<FIXED_DATUM_SIZE>()?;
        Ok(EntityTypeFieldDatum {
            field,
            value: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// Force affiliation as a fixed datum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForceIdDatum {
    pub value: u32,
}

impl ForceIdDatum {
    pub fn new(force: ForceId) -> Self {
        ForceIdDatum {
            value: force.to_raw() as u32,
        }
    }

    /// Values beyond the force id range map to `ForceId::Unknown`
    pub fn force(&self) -> ForceId {
        u8::try_from(self.value)
            .map(ForceId::from_raw)
            .unwrap_or(ForceId::Unknown(u8::MAX))
    }
}

impl Record for ForceIdDatum {
    fn wire_size(&self) -> usize {
        FIXED_DATUM_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(datum_id::FORCE_ID);
        dst.put_u32(self.value);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<FIXED_DATUM_SIZE>()?;
        Ok(ForceIdDatum {
            value: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

record_family! {
    /// Any fixed datum record
    pub enum FixedDatum {
        EntityTypeField(EntityTypeFieldDatum),
        ForceId(ForceIdDatum),
        Other(GenericFixedDatum),
    }
}

family_variant!(FixedDatum::EntityTypeField(EntityTypeFieldDatum) claims datum_id::ENTITY_TYPE_FIELDS);
family_variant!(FixedDatum::ForceId(ForceIdDatum) claims &[datum_id::FORCE_ID]);
family_variant!(FixedDatum::Other(GenericFixedDatum) claims &[]);

impl FixedDatum {
    fn decode_family(src: &mut DisReader<'_>) -> DisResult<Self> {
        Self::registry().decode(src)
    }

    pub fn datum_id(&self) -> u32 {
        match self {
            FixedDatum::EntityTypeField(d) => d.field.datum_id(),
            FixedDatum::ForceId(_) => datum_id::FORCE_ID,
            FixedDatum::Other(d) => d.datum_id,
        }
    }

    /// The 32-bit value as transmitted
    pub fn raw_value(&self) -> u32 {
        match self {
            FixedDatum::EntityTypeField(d) => d.value,
            FixedDatum::ForceId(d) => d.value,
            FixedDatum::Other(d) => d.as_u32(),
        }
    }
}

impl RecordFamily for FixedDatum {
    const NAME: &'static str = "fixed datum";

    fn variants() -> Vec<Variant<Self>> {
        vec![
            Variant::of::<EntityTypeFieldDatum>(),
            Variant::of::<ForceIdDatum>(),
            Variant::of::<GenericFixedDatum>(),
        ]
    }

    builtin_registry!(FixedDatum);
}

impl StreamDiscriminated for FixedDatum {
    fn peek_discriminator(src: &DisReader<'_>) -> DisResult<u32> {
        src.peek_u32()
    }
}

// ---------------------------------------------------------------------------
// Variable datums
// ---------------------------------------------------------------------------

/// Variable datum with no built-in interpretation.
///
/// The payload is stored already padded to a multiple of 8 bytes; padding
/// bytes received on the wire are kept as they were.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenericVariableDatum {
    pub datum_id: u32,
    bit_length: u32,
    data: Vec<u8>,
}

macro_rules! word_view {
    ($get:ident, $set:ident, $ty:ty) => {
        /// Payload as whole 64-bit words; a trailing partial word is ignored
        pub fn $get(&self) -> Vec<$ty> {
            let count = self.bit_length as usize / 64;
            self.data
                .chunks_exact(8)
                .take(count)
                .map(|chunk| {
                    let mut word = [0u8; 8];
                    word.copy_from_slice(chunk);
                    <$ty>::from_be_bytes(word)
                })
                .collect()
        }

        pub fn $set(&mut self, values: &[$ty]) {
            let mut data = Vec::with_capacity(values.len() * 8);
            for value in values {
                data.extend_from_slice(&value.to_be_bytes());
            }
            self.bit_length = (data.len() * 8) as u32;
            self.data = data;
        }
    };
}

impl GenericVariableDatum {
    pub fn new(datum_id: u32) -> Self {
        GenericVariableDatum {
            datum_id,
            ..Default::default()
        }
    }

    /// Datum holding `bytes` in full, `bytes.len() * 8` bits long
    pub fn from_slice(datum_id: u32, bytes: &[u8]) -> Self {
        let mut datum = Self::new(datum_id);
        datum.set_bytes(bytes, (bytes.len() * 8) as u32);
        datum
    }

    #[inline]
    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    /// Payload including padding
    #[inline]
    pub fn padded_data(&self) -> &[u8] {
        &self.data
    }

    /// Payload bytes covering `bit_length`, without trailing padding
    pub fn data(&self) -> &[u8] {
        let used = (self.bit_length as usize).div_ceil(8);
        &self.data[..used.min(self.data.len())]
    }

    /// Replace the payload with `bytes` declared as `bit_length` bits.
    ///
    /// Bytes past the declared length are dropped; short input is zero filled.
    pub fn set_bytes(&mut self, bytes: &[u8], bit_length: u32) {
        let padded = padded_length(bit_length);
        let mut data = vec![0u8; padded];
        let copied = bytes.len().min(padded);
        data[..copied].copy_from_slice(&bytes[..copied]);
        self.bit_length = bit_length;
        self.data = data;
    }

    word_view!(as_i64s, set_i64s, i64);
    word_view!(as_u64s, set_u64s, u64);
    word_view!(as_f64s, set_f64s, f64);

    /// Payload as ASCII text, `None` if it holds anything else
    pub fn as_ascii(&self) -> Option<&str> {
        let count = (self.bit_length as usize / 8).min(self.data.len());
        let text = &self.data[..count];
        if text.is_ascii() {
            std::str::from_utf8(text).ok()
        } else {
            None
        }
    }

    pub fn set_ascii(&mut self, text: &str) -> DisResult<()> {
        if !text.is_ascii() {
            return Err(DisError::InvalidWireFormat(format!(
                "variable datum text is not ASCII: {text:?}"
            )));
        }
        self.set_bytes(text.as_bytes(), (text.len() * 8) as u32);
        Ok(())
    }

    /// Whether every byte after the declared length is zero
    fn has_clean_padding(&self) -> bool {
        let used = (self.bit_length as usize).div_ceil(8);
        self.bit_length % 8 == 0 && self.data.iter().skip(used).all(|b| *b == 0)
    }
}

impl Record for GenericVariableDatum {
    fn wire_size(&self) -> usize {
        VARIABLE_DATUM_HEADER_SIZE + self.data.len()
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.datum_id);
        dst.put_u32(self.bit_length);
        dst.put_slice(&self.data);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let start = src.position();
        let datum_id = src.read_u32()?;
        let bit_length = src.read_u32()?;
        let data = match src.read_bytes(padded_length(bit_length)) {
            Ok(data) => data.to_vec(),
            Err(e) => {
                src.set_position(start);
                return Err(e);
            }
        };
        Ok(GenericVariableDatum {
            datum_id,
            bit_length,
            data,
        })
    }
}

/// Complete entity type packed into one 64-bit word
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityTypeDatum {
    pub entity_type: EntityType,
}

impl EntityTypeDatum {
    /// Re-interpret a generic datum; only a 64-bit payload qualifies
    fn decode_or_generic(src: &mut DisReader<'_>) -> DisResult<VariableDatum> {
        let generic = GenericVariableDatum::decode(src)?;
        if generic.bit_length != 64 {
            return Ok(VariableDatum::Other(generic));
        }
        let entity_type = EntityType::decode(&mut DisReader::new(&generic.data))?;
        Ok(VariableDatum::EntityType(EntityTypeDatum { entity_type }))
    }
}

impl Record for EntityTypeDatum {
    fn wire_size(&self) -> usize {
        VARIABLE_DATUM_HEADER_SIZE + EntityType::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(datum_id::ENTITY_TYPE);
        dst.put_u32(64);
        self.entity_type.encode(dst);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        match Self::decode_or_generic(src)? {
            VariableDatum::EntityType(datum) => Ok(datum),
            other => Err(DisError::InvalidWireFormat(format!(
                "entity type datum must be 64 bits, got {}",
                other.bit_length()
            ))),
        }
    }
}

/// Free text description
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptionDatum {
    text: String,
}

impl DescriptionDatum {
    pub fn new(text: &str) -> DisResult<Self> {
        if !text.is_ascii() {
            return Err(DisError::InvalidWireFormat(format!(
                "description is not ASCII: {text:?}"
            )));
        }
        Ok(DescriptionDatum {
            text: text.to_owned(),
        })
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Re-interpret a generic datum when its payload is plain ASCII that re-encodes byte for byte
    fn decode_or_generic(src: &mut DisReader<'_>) -> DisResult<VariableDatum> {
        let generic = GenericVariableDatum::decode(src)?;
        if !generic.has_clean_padding() {
            return Ok(VariableDatum::Other(generic));
        }
        match generic.as_ascii() {
            Some(text) => Ok(VariableDatum::Description(DescriptionDatum {
                text: text.to_owned(),
            })),
            None => Ok(VariableDatum::Other(generic)),
        }
    }
}

impl Record for DescriptionDatum {
    fn wire_size(&self) -> usize {
        VARIABLE_DATUM_HEADER_SIZE + padded_length((self.text.len() * 8) as u32)
    }

    fn encode(&self, dst: &mut impl BufMut) {
        let bits = (self.text.len() * 8) as u32;
        dst.put_u32(datum_id::DESCRIPTION);
        dst.put_u32(bits);
        dst.put_slice(self.text.as_bytes());
        put_padding(dst, padded_length(bits) - self.text.len());
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        match Self::decode_or_generic(src)? {
            VariableDatum::Description(datum) => Ok(datum),
            _ => Err(DisError::InvalidWireFormat(
                "description datum is not ASCII text".into(),
            )),
        }
    }
}

record_family! {
    /// Any variable datum record
    pub enum VariableDatum {
        EntityType(EntityTypeDatum),
        Description(DescriptionDatum),
        Other(GenericVariableDatum),
    }
}

family_variant!(
    VariableDatum::EntityType(EntityTypeDatum) claims &[datum_id::ENTITY_TYPE],
    decode = EntityTypeDatum::decode_or_generic
);
family_variant!(
    VariableDatum::Description(DescriptionDatum) claims &[datum_id::DESCRIPTION],
    decode = DescriptionDatum::decode_or_generic
);
family_variant!(VariableDatum::Other(GenericVariableDatum) claims &[]);

impl VariableDatum {
    fn decode_family(src: &mut DisReader<'_>) -> DisResult<Self> {
        Self::registry().decode(src)
    }

    pub fn datum_id(&self) -> u32 {
        match self {
            VariableDatum::EntityType(_) => datum_id::ENTITY_TYPE,
            VariableDatum::Description(_) => datum_id::DESCRIPTION,
            VariableDatum::Other(d) => d.datum_id,
        }
    }

    pub fn bit_length(&self) -> u32 {
        match self {
            VariableDatum::EntityType(_) => 64,
            VariableDatum::Description(d) => (d.text.len() * 8) as u32,
            VariableDatum::Other(d) => d.bit_length,
        }
    }
}

impl RecordFamily for VariableDatum {
    const NAME: &'static str = "variable datum";

    fn variants() -> Vec<Variant<Self>> {
        vec![
            Variant::of::<EntityTypeDatum>(),
            Variant::of::<DescriptionDatum>(),
            Variant::of::<GenericVariableDatum>(),
        ]
    }

    builtin_registry!(VariableDatum);
}

impl StreamDiscriminated for VariableDatum {
    fn peek_discriminator(src: &DisReader<'_>) -> DisResult<u32> {
        src.peek_u32()
    }
}

// ---------------------------------------------------------------------------
// Datum ids
// ---------------------------------------------------------------------------

/// Read `count` datum ids
pub fn decode_datum_ids(src: &mut DisReader<'_>, count: usize) -> DisResult<Vec<u32>> {
    let bytes = src.read_bytes(count.saturating_mul(4))?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

pub fn encode_datum_ids(ids: &[u32], dst: &mut impl BufMut) {
    for id in ids {
        dst.put_u32(*id);
    }
}
