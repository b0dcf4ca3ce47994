//! Periodic simulation box: fractional/Cartesian transforms and image reduction.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A parallelepiped unit cell (or a replication of one).
///
/// Columns of `f_to_c` are the cell vectors **a**, **b**, **c** in Å.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBox {
    pub f_to_c: Matrix3<f64>,
    pub c_to_f: Matrix3<f64>,
    pub volume: f64,
}

impl SimulationBox {
    /// Build a box from lattice lengths (Å) and angles (degrees).
    ///
    /// **a** lies along x and **b** in the xy-plane.
    pub fn from_lattice_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Option<Self> {
        let (alpha, beta, gamma) = (alpha.to_radians(), beta.to_radians(), gamma.to_radians());
        let cos_a = alpha.cos();
        let cos_b = beta.cos();
        let cos_g = gamma.cos();
        let sin_g = gamma.sin();

        let cy = (cos_a - cos_b * cos_g) / sin_g;
        let cz2 = 1.0 - cos_b * cos_b - cy * cy;
        if cz2 <= 0.0 || sin_g.abs() < 1e-12 {
            return None;
        }

        let f_to_c = Matrix3::new(
            a,
            b * cos_g,
            c * cos_b,
            0.0,
            b * sin_g,
            c * cy,
            0.0,
            0.0,
            c * cz2.sqrt(),
        );
        Self::from_matrix(f_to_c)
    }

    /// Build a box from an explicit cell matrix whose columns are the cell vectors.
    pub fn from_matrix(f_to_c: Matrix3<f64>) -> Option<Self> {
        let volume = f_to_c.determinant();
        if volume <= 0.0 {
            return None;
        }
        let c_to_f = f_to_c.try_inverse()?;
        Some(Self {
            f_to_c,
            c_to_f,
            volume,
        })
    }

    /// Orthorhombic box with the given edge lengths.
    pub fn cuboid(lx: f64, ly: f64, lz: f64) -> Option<Self> {
        Self::from_matrix(Matrix3::from_diagonal(&Vector3::new(lx, ly, lz)))
    }

    #[inline]
    pub fn fractional_to_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        self.f_to_c * frac
    }

    #[inline]
    pub fn cartesian_to_fractional(&self, cart: &Vector3<f64>) -> Vector3<f64> {
        self.c_to_f * cart
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// The box obtained by stacking `factors` copies of this cell along each axis.
    pub fn replicate(&self, factors: [usize; 3]) -> Self {
        let mut f_to_c = self.f_to_c;
        for (k, &n) in factors.iter().enumerate() {
            f_to_c.column_mut(k).scale_mut(n as f64);
        }
        let scale = (factors[0] * factors[1] * factors[2]) as f64;
        let mut c_to_f = self.c_to_f;
        for (k, &n) in factors.iter().enumerate() {
            c_to_f.row_mut(k).unscale_mut(n as f64);
        }
        Self {
            f_to_c,
            c_to_f,
            volume: self.volume * scale,
        }
    }

    /// Distances between opposite faces of the cell.
    pub fn perpendicular_widths(&self) -> Vector3<f64> {
        let a = self.f_to_c.column(0).into_owned();
        let b = self.f_to_c.column(1).into_owned();
        let c = self.f_to_c.column(2).into_owned();
        Vector3::new(
            self.volume / b.cross(&c).norm(),
            self.volume / c.cross(&a).norm(),
            self.volume / a.cross(&b).norm(),
        )
    }

    /// Minimum-image Cartesian separation for a Cartesian displacement.
    #[inline]
    pub fn minimum_image(&self, dx: &Vector3<f64>) -> Vector3<f64> {
        let mut dxf = self.c_to_f * dx;
        for k in 0..3 {
            dxf[k] = nearest_image(dxf[k]);
        }
        self.f_to_c * dxf
    }
}

/// Single-period reduction of a fractional separation into [-0.5, 0.5].
///
/// Valid only while the box is at least twice the cutoff wide.
#[inline]
pub fn nearest_image(dxf: f64) -> f64 {
    if dxf > 0.5 {
        dxf - 1.0
    } else if dxf < -0.5 {
        dxf + 1.0
    } else {
        dxf
    }
}

/// Single-period wrap of a fractional coordinate into [0, 1).
#[inline]
pub fn wrap_fractional(x: f64) -> f64 {
    if x >= 1.0 {
        x - 1.0
    } else if x < 0.0 {
        x + 1.0
    } else {
        x
    }
}
