// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the orthogonal simulation box.

/// Dimensions of an orthogonal simulation box. All lengths are in nanometers.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SimBox {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for SimBox {
    /// Convert an array of box lengths to a `SimBox`.
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        SimBox {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl SimBox {
    /// Check whether all dimensions of the simulation box are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
