//! Seeded synthetic earthquake catalogue
//!
//! | Field     | Distribution          |
//! |-----------|-----------------------|
//! | magnitude | Normal(4.5, 1.5)      |
//! | depth     | Exponential(mean 20)  |
//! | latitude  | Uniform(-90, 90)      |
//! | longitude | Uniform(-180, 180)    |
//!
//! The same seed always yields the same catalogue.

use crate::SeismicEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

const MAGNITUDE_MEAN: f64 = 4.500000000;
const MAGNITUDE_STD: f64 = 1.500000000;
const DEPTH_MEAN_KM: f64 = 20.000000000;

/// Generate `n` synthetic events from `seed`
pub fn synthetic_catalogue(n: usize, seed: u64) -> Vec<SeismicEvent> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|_| SeismicEvent {
            magnitude: MAGNITUDE_MEAN + MAGNITUDE_STD * rng.sample::<f64, _>(StandardNormal),
            depth_km: DEPTH_MEAN_KM * rng.sample::<f64, _>(Exp1),
            latitude: rng.gen_range(-90.000000000..=90.000000000),
            longitude: rng.gen_range(-180.000000000..=180.000000000),
            time_ms: 0,
            place: None,
        })
        .collect()
}
