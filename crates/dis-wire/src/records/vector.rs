//! Vector and orientation records

use bytes::BufMut;

use dis_core::DisResult;

use crate::{DisReader, Record};

/// Three single-precision components (velocity, acceleration, entity coordinates)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector3Float {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3Float {
    pub const WIRE_SIZE: usize = 12;
    pub const ZERO: Vector3Float = Vector3Float::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3Float { x, y, z }
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Record for Vector3Float {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_f32(self.x);
        dst.put_f32(self.y);
        dst.put_f32(self.z);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(Vector3Float {
            x: src.read_f32()?,
            y: src.read_f32()?,
            z: src.read_f32()?,
        })
    }
}

/// World coordinate: geocentric X/Y/Z in meters, double precision
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector3Double {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3Double {
    pub const WIRE_SIZE: usize = 24;
    pub const ZERO: Vector3Double = Vector3Double::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3Double { x, y, z }
    }

    #[inline]
    pub fn distance(&self, other: &Vector3Double) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Record for Vector3Double {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_f64(self.x);
        dst.put_f64(self.y);
        dst.put_f64(self.z);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(Vector3Double {
            x: src.read_f64()?,
            y: src.read_f64()?,
            z: src.read_f64()?,
        })
    }
}

/// Orientation as Tait-Bryan angles in radians
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EulerAngles {
    pub psi: f32,
    pub theta: f32,
    pub phi: f32,
}

impl EulerAngles {
    pub const WIRE_SIZE: usize = 12;

    #[inline]
    pub const fn new(psi: f32, theta: f32, phi: f32) -> Self {
        EulerAngles { psi, theta, phi }
    }
}

impl Record for EulerAngles {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_f32(self.psi);
        dst.put_f32(self.theta);
        dst.put_f32(self.phi);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EulerAngles {
            psi: src.read_f32()?,
            theta: src.read_f32()?,
            phi: src.read_f32()?,
        })
    }
}
