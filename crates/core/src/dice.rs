use serde::{Deserialize, Serialize};

/// Which scoring catalog is active. Selectable only before a game starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleSet {
    /// Base catalog: flat four/five/six-of-a-kind values.
    Standard,
    /// Doubling n-of-a-kind values, five-die runs, and the junk-six
    /// consolation.
    Extended,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::Standard
    }
}

impl RuleSet {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(RuleSet::Standard),
            2 => Some(RuleSet::Extended),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            RuleSet::Standard => 1,
            RuleSet::Extended => 2,
        }
    }
}

/// Multiset of die faces. Index 0 is unused so faces index directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceCounts([u8; 7]);

impl FaceCounts {
    pub fn from_faces(faces: &[u8]) -> Self {
        let mut counts = Self::default();
        for &face in faces {
            if (1..=6).contains(&face) {
                counts.0[face as usize] += 1;
            }
        }
        counts
    }

    pub fn get(&self, face: u8) -> u8 {
        self.0[face as usize]
    }

    pub fn add(&mut self, face: u8, n: u8) {
        self.0[face as usize] += n;
    }

    pub fn remove(&mut self, face: u8, n: u8) {
        self.0[face as usize] = self.0[face as usize].saturating_sub(n);
    }

    pub fn total(&self) -> usize {
        self.0[1..].iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// True if `other` fits inside this multiset.
    pub fn contains(&self, other: &FaceCounts) -> bool {
        (1..=6).all(|face| other.get(face) <= self.get(face))
    }

    /// Sorted expansion back to individual faces.
    pub fn faces(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total());
        for face in 1..=6u8 {
            for _ in 0..self.get(face) {
                out.push(face);
            }
        }
        out
    }

    pub fn pair_count(&self) -> usize {
        (1..=6).filter(|&face| self.get(face) == 2).count()
    }

    /// At least one die of every face in `lo..=hi`.
    pub fn has_run(&self, lo: u8, hi: u8) -> bool {
        (lo..=hi).all(|face| self.get(face) >= 1)
    }

    /// Exactly one die of every face in `lo..=hi` and nothing else.
    pub fn is_exact_run(&self, lo: u8, hi: u8) -> bool {
        (1..=6).all(|face| {
            let want = if (lo..=hi).contains(&face) { 1 } else { 0 };
            self.get(face) == want
        })
    }
}
