//! Dead reckoning parameters record (40 bytes)
//!
//! Only the parameters are carried; extrapolation is left to the consumer.

use bytes::BufMut;

use dis_core::{dis_enum, DisError, DisResult};

use crate::{DisReader, EulerAngles, Record, Vector3Float};

/// Size of the algorithm-specific parameter block
pub const DR_OTHER_PARAMETERS_LENGTH: usize = 15;

const DR_PARAMS_LOCAL_EULER: u8 = 1;

dis_enum! {
    #[derive(Default)]
    pub enum DeadReckoningAlgorithm: u8 {
        Other = 0,
        #[default]
        Static = 1,
        FixedPositionWorld = 2,
        RotatingPositionWorld = 3,
        RotatingVelocityWorld = 4,
        FixedVelocityWorld = 5,
        FixedPositionBody = 6,
        RotatingPositionBody = 7,
        RotatingVelocityBody = 8,
        FixedVelocityBody = 9,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DeadReckoningParameters {
    pub algorithm: DeadReckoningAlgorithm,
    other_parameters: [u8; DR_OTHER_PARAMETERS_LENGTH],
    pub linear_acceleration: Vector3Float,
    pub angular_velocity: Vector3Float,
}

impl DeadReckoningParameters {
    pub const WIRE_SIZE: usize = 1 + DR_OTHER_PARAMETERS_LENGTH + 2 * Vector3Float::WIRE_SIZE;

    pub fn new(algorithm: DeadReckoningAlgorithm) -> Self {
        DeadReckoningParameters {
            algorithm,
            ..Default::default()
        }
    }

    #[inline]
    pub fn other_parameters(&self) -> &[u8; DR_OTHER_PARAMETERS_LENGTH] {
        &self.other_parameters
    }

    /// Replace the parameter block. It must be exactly 15 bytes.
    pub fn set_other_parameters(&mut self, bytes: &[u8]) -> DisResult<()> {
        self.other_parameters = bytes.try_into().map_err(|_| {
            DisError::field_length(
                "dead reckoning other parameters",
                DR_OTHER_PARAMETERS_LENGTH,
                bytes.len(),
            )
        })?;
        Ok(())
    }

    /// Local orientation carried in the parameter block, if its type is
    /// "local Euler angles"
    pub fn local_euler_angles(&self) -> Option<EulerAngles> {
        if self.other_parameters[0] != DR_PARAMS_LOCAL_EULER {
            return None;
        }
        let mut src = DisReader::new(&self.other_parameters[3..]);
        EulerAngles::decode(&mut src).ok()
    }

    pub fn set_local_euler_angles(&mut self, angles: EulerAngles) {
        let mut block = Vec::with_capacity(DR_OTHER_PARAMETERS_LENGTH);
        block.put_u8(DR_PARAMS_LOCAL_EULER);
        block.put_u16(0);
        angles.encode(&mut block);
        self.other_parameters.copy_from_slice(&block);
    }
}

impl Record for DeadReckoningParameters {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.algorithm.to_raw());
        dst.put_slice(&self.other_parameters);
        self.linear_acceleration.encode(dst);
        self.angular_velocity.encode(dst);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(DeadReckoningParameters {
            algorithm: DeadReckoningAlgorithm::from_raw(src.read_u8()?),
            other_parameters: src.read_array()?,
            linear_acceleration: Vector3Float::decode(src)?,
            angular_velocity: Vector3Float::decode(src)?,
        })
    }
}
