//! Nominal satellite attitude
use nalgebra::{Matrix3, Rotation3, Vector3};

/// Nominal (yaw steering) satellite attitude, from satellite and Sun
/// positions expressed in the same Earth fixed frame [m].
/// Body Z axis points to the Earth center, body Y axis is normal
/// to the Sun-satellite-Earth plane and body X axis completes
/// the right handed frame, on the Sun side.
/// The returned rotation maps body frame vectors to the Earth fixed frame.
/// Returns None when satellite, Earth and Sun are aligned.
pub fn nominal_attitude(
    satellite_m: &Vector3<f64>,
    sun_m: &Vector3<f64>,
) -> Option<Rotation3<f64>> {
    const EPSILON: f64 = 1.0E-12;

    let e_z = -satellite_m.try_normalize(EPSILON)?;
    let e_sun = (sun_m - satellite_m).try_normalize(EPSILON)?;
    let e_y = e_z.cross(&e_sun).try_normalize(EPSILON)?;
    let e_x = e_y.cross(&e_z);

    Some(Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
        e_x, e_y, e_z,
    ])))
}

#[cfg(test)]
mod test {
    use super::nominal_attitude;
    use nalgebra::Vector3;

    #[test]
    fn yaw_steering_axes() {
        let satellite_m = Vector3::new(26_560.0E3, 0.0, 0.0);
        let sun_m = Vector3::new(0.0, 1.496E11, 0.0);

        let rot = nominal_attitude(&satellite_m, &sun_m).unwrap();

        let z = rot * Vector3::z();
        assert!((z - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1.0E-9);

        let x = rot * Vector3::x();
        assert!(x[1] > 0.99, "x axis should point to the sun: {}", x);

        let y = rot * Vector3::y();
        assert!((y - Vector3::new(0.0, 0.0, -1.0)).norm() < 1.0E-6);

        // orthonormal
        assert!((rot.matrix().determinant() - 1.0).abs() < 1.0E-9);
    }

    #[test]
    fn aligned_sun() {
        let satellite_m = Vector3::new(26_560.0E3, 0.0, 0.0);
        let sun_m = Vector3::new(1.496E11, 0.0, 0.0);
        assert!(nominal_attitude(&satellite_m, &sun_m).is_none());
        assert!(nominal_attitude(&Vector3::zeros(), &sun_m).is_none());
    }
}
