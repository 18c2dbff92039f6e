use glam::Vec3;
use rand::Rng;

/// Uniform point inside an axis-aligned box of size `extent` around `center`.
pub fn box_point<R: Rng>(center: Vec3, extent: Vec3, rng: &mut R) -> Vec3 {
    center
        + Vec3::new(
            rng.gen_range(-0.5..=0.5),
            rng.gen_range(-0.5..=0.5),
            rng.gen_range(-0.5..=0.5),
        ) * extent
}

/// Point on a spherical shell of the given radius and radial thickness.
pub fn shell_point<R: Rng>(center: Vec3, radius: f32, thickness: f32, rng: &mut R) -> Vec3 {
    // Uniform direction via z / azimuth sampling.
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let azimuth = rng.gen::<f32>() * std::f32::consts::TAU;
    let ring = (1.0 - z * z).max(0.0).sqrt();
    let dir = Vec3::new(ring * azimuth.cos(), z, ring * azimuth.sin());
    let r = radius + (rng.gen::<f32>() - 0.5) * thickness;
    center + dir * r
}

/// Radial-explosion look.
pub fn generate_shell<R: Rng>(
    count: usize,
    center: Vec3,
    radius: f32,
    thickness: f32,
    rng: &mut R,
) -> Vec<Vec3> {
    (0..count)
        .map(|_| shell_point(center, radius, thickness, rng))
        .collect()
}

/// Ambient box fill.
pub fn generate_box<R: Rng>(count: usize, center: Vec3, extent: Vec3, rng: &mut R) -> Vec<Vec3> {
    (0..count).map(|_| box_point(center, extent, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shell_within_thickness() {
        let mut rng = StdRng::seed_from_u64(5);
        for p in generate_shell(2000, Vec3::Y, 5.0, 1.0, &mut rng) {
            let r = (p - Vec3::Y).length();
            assert!((4.5 - 1e-4..=5.5 + 1e-4).contains(&r), "r = {}", r);
        }
    }

    #[test]
    fn test_box_within_extent() {
        let mut rng = StdRng::seed_from_u64(6);
        let extent = Vec3::new(2.0, 4.0, 6.0);
        for p in generate_box(2000, Vec3::ZERO, extent, &mut rng) {
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 2.0 && p.z.abs() <= 3.0);
        }
    }
}
