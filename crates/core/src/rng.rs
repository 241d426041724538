use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::collections::VecDeque;

/// Source of randomness for the engines. Object-safe so game actions can take
/// `&mut dyn RandomSource` and tests can script exact die faces and shuffles.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for RngState {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// Uniform die face in 1..=6.
pub fn roll_face(rng: &mut dyn RandomSource) -> u8 {
    (rng.next_u64() % 6) as u8 + 1
}

/// Fisher-Yates over `next_u64`, so scripted sources shuffle deterministically.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

/// Replays a fixed sequence of values, then zeroes. Meant for tests, but
/// exported so downstream crates can drive fully deterministic games.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    values: VecDeque<u64>,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Queue die faces directly; each face f is stored as f - 1 so
    /// `roll_face` reproduces it.
    pub fn with_faces(faces: impl IntoIterator<Item = u8>) -> Self {
        Self::new(faces.into_iter().map(|f| u64::from(f.saturating_sub(1))))
    }
}

impl RandomSource for ScriptedSource {
    fn next_u64(&mut self) -> u64 {
        self.values.pop_front().unwrap_or(0)
    }
}
