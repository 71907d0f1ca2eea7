//! Analysis result types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::features::chroma::NOTE_NAMES;

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Major triad (root, major third, fifth)
    Major,
    /// Minor triad (root, minor third, fifth)
    Minor,
}

impl ChordQuality {
    /// Semitone offsets of the triad members above the root
    pub fn intervals(&self) -> [usize; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }
}

/// A triad chord: root pitch class plus quality
///
/// Serialized as its name (e.g. `"F#m"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Chord {
    /// Root pitch class (0 = C, 1 = C#, ..., 11 = B)
    pub root: u8,
    /// Major or minor
    pub quality: ChordQuality,
}

impl Chord {
    /// Major chord rooted at `root` (taken modulo 12)
    pub fn major(root: u8) -> Self {
        Self {
            root: root % 12,
            quality: ChordQuality::Major,
        }
    }

    /// Minor chord rooted at `root` (taken modulo 12)
    pub fn minor(root: u8) -> Self {
        Self {
            root: root % 12,
            quality: ChordQuality::Minor,
        }
    }

    /// Chord name in lead-sheet notation
    ///
    /// # Example
    ///
    /// ```
    /// use harmonic_dsp::analysis::result::Chord;
    ///
    /// assert_eq!(Chord::major(0).name(), "C");
    /// assert_eq!(Chord::major(6).name(), "F#");
    /// assert_eq!(Chord::minor(9).name(), "Am");
    /// assert_eq!(Chord::minor(1).name(), "C#m");
    /// ```
    pub fn name(&self) -> String {
        let note = NOTE_NAMES[self.root as usize % 12];
        match self.quality {
            ChordQuality::Major => note.to_string(),
            ChordQuality::Minor => format!("{}m", note),
        }
    }

    /// Pitch classes of the three chord tones
    pub fn pitch_classes(&self) -> [usize; 3] {
        self.quality
            .intervals()
            .map(|interval| (self.root as usize + interval) % 12)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Chord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (note, quality) = match s.strip_suffix('m') {
            Some(note) => (note, ChordQuality::Minor),
            None => (s, ChordQuality::Major),
        };

        let root = NOTE_NAMES
            .iter()
            .position(|&name| name == note)
            .ok_or_else(|| format!("Unknown chord name: {:?}", s))?;

        Ok(Self {
            root: root as u8,
            quality,
        })
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.name()
    }
}

impl TryFrom<String> for Chord {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Heuristic instrument-family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentTag {
    /// Plucked/percussive string family
    Guitar,
    /// Sustained, harmonic-rich family
    Piano,
}

impl InstrumentTag {
    /// Lowercase tag name
    pub fn name(&self) -> &'static str {
        match self {
            InstrumentTag::Guitar => "guitar",
            InstrumentTag::Piano => "piano",
        }
    }
}

impl fmt::Display for InstrumentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One labeled span of the chord timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSegment {
    /// Recognized chord (serialized as its name)
    #[serde(rename = "chord")]
    pub label: Chord,

    /// Segment start in seconds
    pub start: f32,

    /// Segment end in seconds
    pub end: f32,

    /// Instrument annotated on this segment
    pub instrument: InstrumentTag,
}

impl ChordSegment {
    /// Segment length in seconds
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}

/// Complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAnalysis {
    /// Signal duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count of the analyzed buffer
    pub channels: usize,

    /// Heuristic tempo estimate in BPM
    pub tempo_bpm: f32,

    /// Detected instrument families (never empty)
    pub instruments: Vec<InstrumentTag>,

    /// Chord timeline, ordered by start time
    pub chords: Vec<ChordSegment>,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_names() {
        assert_eq!(Chord::major(0).name(), "C");
        assert_eq!(Chord::major(10).name(), "A#");
        assert_eq!(Chord::minor(9).name(), "Am");
        assert_eq!(Chord::minor(4).to_string(), "Em");
        assert_eq!(Chord::major(14), Chord::major(2));
    }

    #[test]
    fn test_chord_parse() {
        assert_eq!("C".parse::<Chord>(), Ok(Chord::major(0)));
        assert_eq!("F#m".parse::<Chord>(), Ok(Chord::minor(6)));
        assert!("H".parse::<Chord>().is_err());
        assert!("".parse::<Chord>().is_err());
        for root in 0..12 {
            assert_eq!(Chord::minor(root).name().parse::<Chord>(), Ok(Chord::minor(root)));
        }
    }

    #[test]
    fn test_pitch_classes() {
        assert_eq!(Chord::major(0).pitch_classes(), [0, 4, 7]);
        assert_eq!(Chord::minor(9).pitch_classes(), [9, 0, 4]);
        assert_eq!(Chord::major(11).pitch_classes(), [11, 3, 6]);
    }

    #[test]
    fn test_segment_serializes_chord_name() {
        let segment = ChordSegment {
            label: Chord::minor(9),
            start: 0.0,
            end: 4.0,
            instrument: InstrumentTag::Piano,
        };
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["chord"], "Am");
        assert_eq!(json["instrument"], "piano");

        let back: ChordSegment = serde_json::from_value(json).unwrap();
        assert_eq!(back, segment);
    }
}
