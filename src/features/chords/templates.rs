//! Chord templates
//!
//! Unit-length pitch-class profiles for 24 triads (12 roots x {major, minor}).

use crate::analysis::result::Chord;
use crate::features::chroma::normalization::normalize_l2;
use crate::features::chroma::{Chromagram, PITCH_CLASSES};

/// Template for one chord: unit-length membership vector
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplate {
    /// Chord this template matches
    pub chord: Chord,
    /// Unit-length weights, non-zero on chord tones
    pub weights: [f32; PITCH_CLASSES],
}

impl ChordTemplate {
    /// Binary triad template normalized to unit length
    pub fn new(chord: Chord) -> Self {
        let mut weights = [0.0f32; PITCH_CLASSES];
        for pc in chord.pitch_classes() {
            weights[pc] = 1.0;
        }
        normalize_l2(&mut weights);
        Self { chord, weights }
    }

    /// Dot product of the chromagram with this template
    pub fn score(&self, chroma: &Chromagram) -> f32 {
        chroma.dot(&self.weights)
    }
}

/// All 24 chord templates, in C, Cm, C#, C#m, ..., B, Bm order
///
/// Built once and shared read-only across recognizer calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplates {
    templates: Vec<ChordTemplate>,
}

impl ChordTemplates {
    /// Create the 24 major/minor triad templates
    pub fn new() -> Self {
        let templates = (0..PITCH_CLASSES as u8)
            .flat_map(|root| [Chord::major(root), Chord::minor(root)])
            .map(ChordTemplate::new)
            .collect();
        Self { templates }
    }

    /// Templates in scoring order
    pub fn iter(&self) -> impl Iterator<Item = &ChordTemplate> {
        self.templates.iter()
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if there are no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Highest-scoring chord and its score
    ///
    /// Ties resolve to the earlier template. `None` only if there are no
    /// templates.
    pub fn best_match(&self, chroma: &Chromagram) -> Option<(Chord, f32)> {
        let mut best: Option<(Chord, f32)> = None;
        for template in &self.templates {
            let score = template.score(chroma);
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((template.chord, score)),
            }
        }
        best
    }
}

impl Default for ChordTemplates {
    fn default() -> Self {
        Self::new()
    }
}
