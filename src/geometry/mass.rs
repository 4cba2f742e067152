//! Mass properties computed from shapes.

use glam::Vec2;

/// Mass, centre of mass (local) and rotational inertia about the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassData {
    pub mass: f32,
    pub center: Vec2,
    pub inertia: f32,
}

impl MassData {
    /// Infinite mass and inertia (static and kinematic bodies).
    pub const INFINITE: Self = Self {
        mass: 0.0,
        center: Vec2::ZERO,
        inertia: 0.0,
    };

    pub fn new(mass: f32, center: Vec2, inertia: f32) -> Self {
        Self {
            mass,
            center,
            inertia,
        }
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    #[inline]
    pub fn inverse_inertia(&self) -> f32 {
        if self.inertia > 0.0 {
            1.0 / self.inertia
        } else {
            0.0
        }
    }

    /// Same mass distribution, moved by `offset` and rotated by `rotation`
    /// (given as `(cos, sin)`).
    pub fn placed(&self, offset: Vec2, rotation: Vec2) -> Self {
        Self {
            mass: self.mass,
            center: rotation.rotate(self.center) + offset,
            inertia: self.inertia,
        }
    }

    /// Combine several mass distributions into one about their common centre.
    pub fn combine(parts: &[MassData]) -> MassData {
        let total: f32 = parts.iter().map(|m| m.mass).sum();
        if total <= 0.0 {
            return MassData::INFINITE;
        }
        let center = parts.iter().map(|m| m.center * m.mass).sum::<Vec2>() / total;
        // Parallel axis theorem moves each part's inertia to the common centre.
        let inertia = parts
            .iter()
            .map(|m| m.inertia + m.mass * (m.center - center).length_squared())
            .sum();
        MassData {
            mass: total,
            center,
            inertia,
        }
    }
}

impl Default for MassData {
    fn default() -> Self {
        Self::INFINITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_two_point_masses() {
        let a = MassData::new(1.0, Vec2::new(-1.0, 0.0), 0.0);
        let b = MassData::new(1.0, Vec2::new(1.0, 0.0), 0.0);
        let m = MassData::combine(&[a, b]);
        assert_eq!(m.mass, 2.0);
        assert!(m.center.length() < 1e-6);
        assert!((m.inertia - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_infinite_mass_has_zero_inverse() {
        assert_eq!(MassData::INFINITE.inverse_mass(), 0.0);
        assert_eq!(MassData::INFINITE.inverse_inertia(), 0.0);
        assert_eq!(MassData::combine(&[]), MassData::INFINITE);
    }
}
