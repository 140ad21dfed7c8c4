//! Core type definitions used throughout the codebase

use rand_chacha::ChaCha8Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// Random generator injected into the movement model and driver
pub type SimRng = ChaCha8Rng;

/// Identifier for a walker, unique within one simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Point (or displacement) in D-dimensional space
///
/// The same type serves 2D and 3D runs; geometry and movement code is
/// written once against `Point<D>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize>(pub [f64; D]);

pub type Point2 = Point<2>;
pub type Point3 = Point<3>;

impl<const D: usize> Point<D> {
    pub const fn new(coords: [f64; D]) -> Self {
        Self(coords)
    }

    pub const fn origin() -> Self {
        Self([0.0; D])
    }

    /// Unit vector along `axis`, pointing in the negative direction if `positive` is false
    pub fn axis(axis: usize, positive: bool) -> Self {
        let mut coords = [0.0; D];
        coords[axis] = if positive { 1.0 } else { -1.0 };
        Self(coords)
    }

    pub fn coords(&self) -> &[f64; D] {
        &self.0
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Unit vector with the same heading, or `None` for a (near) zero vector
    pub fn normalize(&self) -> Option<Self> {
        let len = self.norm();
        if len > 1e-12 {
            Some(*self / len)
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    fn zip_with(self, rhs: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o = f(*o, r);
        }
        Self(out)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.map(f))
    }
}

impl Point<2> {
    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }
}

impl Point<3> {
    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> From<[f64; D]> for Point<D> {
    fn from(coords: [f64; D]) -> Self {
        Self(coords)
    }
}

impl<const D: usize> TryFrom<&[f64]> for Point<D> {
    type Error = usize;

    /// Fails with the offending length when the slice arity is not `D`
    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        <[f64; D]>::try_from(values)
            .map(Self)
            .map_err(|_| values.len())
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl<const D: usize> Add for Point<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<const D: usize> Sub for Point<D> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<const D: usize> Mul<f64> for Point<D> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.map(|c| c * rhs)
    }
}

impl<const D: usize> Div<f64> for Point<D> {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.map(|c| c / rhs)
    }
}

impl<const D: usize> Neg for Point<D> {
    type Output = Self;
    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

// serde only derives array impls for fixed lengths, so points go through a sequence
impl<const D: usize> Serialize for Point<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, const D: usize> Deserialize<'de> for Point<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        let expected = format!("{} coordinates", D);
        Point::try_from(values.as_slice())
            .map_err(|len| De::Error::invalid_length(len, &expected.as_str()))
    }
}
