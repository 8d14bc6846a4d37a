//! Random initial placement of parts.

use crate::config::ScatterConfig;
use crate::part::Part;
use glam::{EulerRot, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build the RNG for a scatter pass: seeded when configured, random otherwise.
pub fn scatter_rng(config: &ScatterConfig) -> ChaCha8Rng {
    let seed = config.seed.unwrap_or_else(rand::random);
    log::debug!("Scatter seed {}", seed);
    ChaCha8Rng::seed_from_u64(seed)
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    rng.random_range(-range..=range)
}

fn up_to<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    rng.random_range(0.0..=range)
}

/// Orientation from Euler angles in degrees, applied Z then X then Y.
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// Jitter the position and replace the orientation of one part.
///
/// Returns false, leaving the part untouched, if it is locked.
pub fn scatter_part<R: Rng + ?Sized>(part: &mut Part, config: &ScatterConfig, rng: &mut R) -> bool {
    if part.is_locked() {
        return false;
    }
    let pos = config.position_range;
    let offset = Vec3::new(
        symmetric(rng, pos.x),
        symmetric(rng, pos.y),
        symmetric(rng, pos.z),
    );
    let rot = config.rotation_range;
    let angles = Vec3::new(up_to(rng, rot.x), up_to(rng, rot.y), up_to(rng, rot.z));

    part.set_position(part.position() + offset);
    part.set_rotation(euler_degrees(angles))
}

/// Scatter every unlocked part. Returns how many parts were moved.
pub fn scatter<'a, R, I>(parts: I, config: &ScatterConfig, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = &'a mut Part>,
{
    parts
        .into_iter()
        .map(|part| scatter_part(part, config, rng))
        .filter(|moved| *moved)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    fn parts() -> Vec<Part> {
        (0..8)
            .map(|i| Part::new(format!("bone-{i}"), Transform::from_translation(Vec3::splat(i as f32))))
            .collect()
    }

    #[test]
    fn test_offsets_stay_in_range() {
        let config = ScatterConfig {
            position_range: Vec3::new(1.0, 2.0, 0.5),
            rotation_range: Vec3::splat(90.0),
            seed: Some(42),
        };
        let mut parts = parts();
        let originals: Vec<Vec3> = parts.iter().map(|p| p.position()).collect();

        let mut rng = scatter_rng(&config);
        assert_eq!(scatter(parts.iter_mut(), &config, &mut rng), parts.len());

        for (part, original) in parts.iter().zip(originals) {
            let offset = (part.position() - original).abs();
            assert!(offset.x <= 1.0 + 1e-5);
            assert!(offset.y <= 2.0 + 1e-5);
            assert!(offset.z <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_seeded_scatter_is_reproducible() {
        let config = ScatterConfig {
            seed: Some(7),
            ..ScatterConfig::default()
        };
        let mut a = parts();
        let mut b = parts();
        scatter(a.iter_mut(), &config, &mut scatter_rng(&config));
        scatter(b.iter_mut(), &config, &mut scatter_rng(&config));

        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.position(), pb.position());
            assert_eq!(pa.rotation(), pb.rotation());
        }
    }

    #[test]
    fn test_locked_parts_are_skipped() {
        let config = ScatterConfig {
            seed: Some(1),
            ..ScatterConfig::default()
        };
        let mut parts = parts();
        parts[0].lock();
        let before = *parts[0].transform();

        let moved = scatter(parts.iter_mut(), &config, &mut scatter_rng(&config));
        assert_eq!(moved, parts.len() - 1);
        assert_eq!(*parts[0].transform(), before);
    }

    #[test]
    fn test_zero_ranges_keep_position_and_reset_rotation() {
        let config = ScatterConfig {
            position_range: Vec3::ZERO,
            rotation_range: Vec3::ZERO,
            seed: Some(3),
        };
        let mut parts = parts();
        scatter(parts.iter_mut(), &config, &mut scatter_rng(&config));
        assert_eq!(parts[3].position(), Vec3::splat(3.0));
        assert!(parts[3].rotation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_euler_order() {
        let q = euler_degrees(Vec3::new(90.0, 90.0, 0.0));
        let expected = Quat::from_rotation_y(90f32.to_radians()) * Quat::from_rotation_x(90f32.to_radians());
        assert!(q.abs_diff_eq(expected, 1e-5));
    }
}
