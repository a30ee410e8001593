//! Entity marking record (12 bytes)

use std::fmt;

use bytes::BufMut;

use dis_core::{dis_enum, DisError, DisResult};

use crate::{DisReader, Record};

/// Number of marking characters carried on the wire
pub const MARKING_LENGTH: usize = 11;

dis_enum! {
    #[derive(Default)]
    pub enum MarkingCharacterSet: u8 {
        Unused = 0,
        #[default]
        Ascii = 1,
        ArmyMarking = 2,
        DigitChevron = 3,
    }
}

/// Character set + 11 raw marking characters
///
/// The characters are kept as raw bytes so that anything following the first
/// NUL survives a decode/encode cycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityMarking {
    pub character_set: MarkingCharacterSet,
    characters: [u8; MARKING_LENGTH],
}

impl EntityMarking {
    pub const WIRE_SIZE: usize = 1 + MARKING_LENGTH;

    /// ASCII marking. Fails if `text` does not fit in 11 bytes.
    pub fn new(text: &str) -> DisResult<Self> {
        let mut marking = EntityMarking::default();
        marking.set_text(text)?;
        Ok(marking)
    }

    pub fn from_raw(character_set: MarkingCharacterSet, characters: [u8; MARKING_LENGTH]) -> Self {
        EntityMarking {
            character_set,
            characters,
        }
    }

    #[inline]
    pub fn characters(&self) -> &[u8; MARKING_LENGTH] {
        &self.characters
    }

    /// Marking text up to the first NUL
    pub fn text(&self) -> String {
        let end = self
            .characters
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(MARKING_LENGTH);
        String::from_utf8_lossy(&self.characters[..end]).into_owned()
    }

    /// Replace the text and zero-fill the remainder
    pub fn set_text(&mut self, text: &str) -> DisResult<()> {
        if !text.is_ascii() {
            return Err(DisError::InvalidWireFormat(format!(
                "marking {text:?} is not ASCII"
            )));
        }
        let bytes = text.as_bytes();
        if bytes.len() > MARKING_LENGTH {
            return Err(DisError::field_length("marking", MARKING_LENGTH, bytes.len()));
        }
        self.characters = [0u8; MARKING_LENGTH];
        self.characters[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl fmt::Debug for EntityMarking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marking({:?}, {:?})", self.character_set, self.text())
    }
}

impl Record for EntityMarking {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.character_set.to_raw());
        dst.put_slice(&self.characters);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EntityMarking {
            character_set: MarkingCharacterSet::from_raw(src.read_u8()?),
            characters: src.read_array()?,
        })
    }
}
