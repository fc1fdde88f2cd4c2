//! Staggered reveal schedule.

use glam::Vec2;
use sandfx_core::prng::Xorshift64;

/// Which glyph points appear first.
///
/// Points are revealed by index; the order decides how indices are assigned
/// when the mask is sampled. Ties keep raster order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevealOrder {
    /// Row-major scan of the mask, top line first.
    #[default]
    Raster,
    /// Column sweep from the left edge.
    LeftToRight,
    /// Seeded shuffle.
    Random,
}

impl RevealOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "raster" => Some(Self::Raster),
            "left_to_right" => Some(Self::LeftToRight),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::LeftToRight => "left_to_right",
            Self::Random => "random",
        }
    }

    /// Reorders raster-ordered `origins` in place.
    pub fn arrange(self, origins: &mut [Vec2], rng: &mut Xorshift64) {
        match self {
            Self::Raster => {}
            Self::LeftToRight => origins.sort_by(|a, b| a.x.total_cmp(&b.x)),
            Self::Random => rng.shuffle(origins),
        }
    }
}

/// Fraction of the reveal completed after `elapsed_ms`, in [0, 1].
pub fn reveal_progress(elapsed_ms: f64, reveal_ms: f64) -> f64 {
    if reveal_ms.is_nan() || reveal_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms.max(0.0) / reveal_ms).min(1.0)
}

/// How many of `total` points are active after `elapsed_ms`.
pub fn active_count(total: usize, elapsed_ms: f64, reveal_ms: f64) -> usize {
    let progress = reveal_progress(elapsed_ms, reveal_ms);
    ((progress * total as f64).floor() as usize).min(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_active_at_mount() {
        assert_eq!(active_count(400, 0.0, 2500.0), 0);
    }

    #[test]
    fn halfway_reveals_half() {
        assert_eq!(active_count(400, 1250.0, 2500.0), 200);
        assert_eq!(active_count(5, 1250.0, 2500.0), 2);
    }

    #[test]
    fn everything_is_active_at_and_after_duration() {
        assert_eq!(active_count(400, 2500.0, 2500.0), 400);
        assert_eq!(active_count(400, 90_000.0, 2500.0), 400);
    }

    #[test]
    fn zero_points_is_a_no_op() {
        assert_eq!(active_count(0, 2500.0, 2500.0), 0);
    }

    #[test]
    fn degenerate_duration_reveals_at_once() {
        assert_eq!(active_count(10, 0.0, 0.0), 10);
        assert_eq!(active_count(10, 0.0, f64::NAN), 10);
    }

    #[test]
    fn order_names_round_trip() {
        for order in [RevealOrder::Raster, RevealOrder::LeftToRight, RevealOrder::Random] {
            assert_eq!(RevealOrder::from_name(order.name()), Some(order));
        }
        assert_eq!(RevealOrder::from_name("spiral"), None);
    }

    #[test]
    fn left_to_right_is_stable_on_ties() {
        let mut origins = vec![
            Vec2::new(8.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(8.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        RevealOrder::LeftToRight.arrange(&mut origins, &mut Xorshift64::new(1));
        assert_eq!(
            origins,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 4.0),
                Vec2::new(8.0, 0.0),
                Vec2::new(8.0, 4.0),
            ]
        );
    }

    #[test]
    fn raster_keeps_order() {
        let mut origins = vec![Vec2::new(3.0, 0.0), Vec2::new(1.0, 0.0)];
        RevealOrder::Raster.arrange(&mut origins, &mut Xorshift64::new(1));
        assert_eq!(origins, vec![Vec2::new(3.0, 0.0), Vec2::new(1.0, 0.0)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn active_count_is_monotonic(
                total in 0_usize..5_000,
                mut times in proptest::collection::vec(0.0_f64..6_000.0, 1..50),
            ) {
                times.sort_by(f64::total_cmp);
                let mut last = 0;
                for t in times {
                    let active = active_count(total, t, 2500.0);
                    prop_assert!(active >= last, "active fell from {last} to {active} at {t}");
                    prop_assert!(active <= total);
                    if t >= 2500.0 {
                        prop_assert_eq!(active, total);
                    }
                    last = active;
                }
            }
        }
    }
}
