//! Boundary materials and the extrapolation modes they imply.

/// How grid values are continued outside the sampled region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extrapolation {
    /// Zero outside the data.
    Constant,
    /// Replicate the nearest boundary cell.
    Boundary,
    /// Wrap around to the opposite face.
    Periodic,
}

/// Physical classification of a domain face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Fluid cannot pass through the face.
    pub solid: bool,
    /// Tangential friction in `[0, 1]`; 0 is free-slip, 1 is no-slip.
    pub friction: f32,
    /// The face wraps around to the opposite face.
    pub periodic: bool,
}

impl Material {
    /// Open boundary: fluid flows freely in and out.
    pub const OPEN: Material = Material {
        solid: false,
        friction: 0.0,
        periodic: false,
    };

    /// Solid, frictionless wall.
    pub const SLIPPERY: Material = Material {
        solid: true,
        friction: 0.0,
        periodic: false,
    };

    /// Solid wall with full friction.
    pub const STICKY: Material = Material {
        solid: true,
        friction: 1.0,
        periodic: false,
    };

    /// Periodic wrap-around.
    pub const PERIODIC: Material = Material {
        solid: false,
        friction: 0.0,
        periodic: true,
    };

    /// Extrapolation a grid should use next to a face of this material.
    pub fn extrapolation(&self) -> Extrapolation {
        if self.periodic {
            Extrapolation::Periodic
        } else if self.solid {
            Extrapolation::Boundary
        } else {
            Extrapolation::Constant
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::OPEN
    }
}
