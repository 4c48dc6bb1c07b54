use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Index, Mul, Sub};

/// Immutable point in the optimizer's coordinate space.
///
/// Accepted points lie in the unit hypercube `[0, 1]^n`; intermediate points
/// may leave it. Equality and hashing use the bit pattern of the coordinates
/// with `-0.0` folded into `0.0`, so a point can key a hash map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    pub fn new(coords: Vec<f64>) -> Self {
        let coords = coords
            .into_iter()
            .map(|c| if c == 0.0 { 0.0 } else { c })
            .collect();
        Self { coords }
    }

    pub fn filled(dim: usize, value: f64) -> Self {
        Self::new(vec![value; dim])
    }

    pub fn zeros(dim: usize) -> Self {
        Self::filled(dim, 0.0)
    }

    /// Unit vector along axis `i`.
    pub fn unit(dim: usize, i: usize) -> Self {
        let mut coords = vec![0.0; dim];
        coords[i] = 1.0;
        Self::new(coords)
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn get(&self, i: usize) -> f64 {
        self.coords[i]
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Copy with coordinate `i` replaced.
    pub fn with(&self, i: usize, value: f64) -> Self {
        let mut coords = self.coords.clone();
        coords[i] = value;
        Self::new(coords)
    }

    pub fn length2(&self) -> f64 {
        self.coords.iter().map(|c| c * c).sum()
    }

    pub fn length(&self) -> f64 {
        self.length2().sqrt()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self - other).length()
    }

    pub fn is_in_unit_cube(&self) -> bool {
        self.coords.iter().all(|c| (0.0..=1.0).contains(c))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.coords.len() == other.coords.len()
            && self
                .coords
                .iter()
                .zip(&other.coords)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coords.len().hash(state);
        for c in &self.coords {
            c.to_bits().hash(state);
        }
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.coords[i]
    }
}

impl Add for &Point {
    type Output = Point;

    fn add(self, other: &Point) -> Point {
        Point::new(self.coords.iter().zip(&other.coords).map(|(a, b)| a + b).collect())
    }
}

impl Sub for &Point {
    type Output = Point;

    fn sub(self, other: &Point) -> Point {
        Point::new(self.coords.iter().zip(&other.coords).map(|(a, b)| a - b).collect())
    }
}

impl Mul<f64> for &Point {
    type Output = Point;

    fn mul(self, factor: f64) -> Point {
        Point::new(self.coords.iter().map(|c| c * factor).collect())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", c)?;
        }
        write!(f, "]")
    }
}
