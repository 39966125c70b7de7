//! Random source implementations.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::RandomSource;
use crate::error::DiceError;

/// A random source backed by an RNG.
#[derive(Debug, Clone)]
pub struct DiceRoller<R: Rng = StdRng> {
    rng: R,
}

impl DiceRoller<StdRng> {
    /// Create a roller with a fixed seed for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Create a roller seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> DiceRoller<R> {
    /// Wrap an existing RNG.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for DiceRoller<R> {
    fn draw(&mut self, faces: u32) -> Result<u32, DiceError> {
        if faces == 0 {
            return Err(DiceError::DieFaces(0));
        }
        Ok(self.rng.random_range(1..=faces))
    }
}

/// A random source that replays a fixed sequence of faces.
///
/// Each die drawn consumes the next face. Running out of faces, or a face
/// larger than the die being rolled, is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
}

impl ScriptedDice {
    /// Create a source that yields `faces` in order.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Queue more faces at the end of the script.
    pub fn push(&mut self, face: u32) {
        self.faces.push_back(face);
    }

    /// Faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomSource for ScriptedDice {
    fn draw(&mut self, faces: u32) -> Result<u32, DiceError> {
        let face = self.faces.pop_front().ok_or(DiceError::Exhausted)?;
        if face == 0 || face > faces {
            return Err(DiceError::ScriptedFace { face, faces });
        }
        Ok(face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rolls_repeat() {
        let mut a = DiceRoller::seeded(99);
        let mut b = DiceRoller::seeded(99);
        for _ in 0..20 {
            assert_eq!(
                a.roll("3d6+1", 100).unwrap(),
                b.roll("3d6+1", 100).unwrap()
            );
        }
    }

    #[test]
    fn rolls_stay_in_range() {
        let mut dice = DiceRoller::seeded(7);
        for _ in 0..200 {
            let roll = dice.roll("1d10", 10).unwrap();
            assert!((1..=10).contains(&roll.total));
        }
    }

    #[test]
    fn scripted_faces_in_order() {
        let mut dice = ScriptedDice::new([8, 3]);
        assert_eq!(dice.roll("1d10", 10).unwrap().total, 8);
        assert_eq!(dice.roll("1d10", 10).unwrap().total, 3);
        assert_eq!(dice.roll("1d10", 10), Err(DiceError::Exhausted));
    }

    #[test]
    fn scripted_face_must_fit_die() {
        let mut dice = ScriptedDice::new([7]);
        assert_eq!(
            dice.roll("1d6", 100),
            Err(DiceError::ScriptedFace { face: 7, faces: 6 })
        );
    }

    #[test]
    fn push_extends_script() {
        let mut dice = ScriptedDice::default();
        dice.push(5);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll("d", 6).unwrap().total, 5);
    }
}
