//! Color buckets and glyph-selection queries for renderers.

use crate::organism::FACE_VARIANTS;
use serde::{Deserialize, Serialize};
use std::fmt;
use teoc_genome::DisplayGene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    Red,
    Green,
    Blue,
    /// No channel strictly dominates
    White,
}

impl ColorBucket {
    /// A channel wins only by strictly exceeding both others
    pub fn from_display(gene: &DisplayGene) -> Self {
        let DisplayGene { red, green, blue } = *gene;
        if red > green && red > blue {
            ColorBucket::Red
        } else if green > red && green > blue {
            ColorBucket::Green
        } else if blue > red && blue > green {
            ColorBucket::Blue
        } else {
            ColorBucket::White
        }
    }
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorBucket::Red => "red",
            ColorBucket::Green => "green",
            ColorBucket::Blue => "blue",
            ColorBucket::White => "white",
        };
        f.write_str(name)
    }
}

/// How the population looks to a renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
    pub white: usize,
    /// Organisms per face variant
    pub faces: [usize; FACE_VARIANTS as usize],
}

impl Census {
    pub fn record(&mut self, bucket: ColorBucket, face: u8) {
        match bucket {
            ColorBucket::Red => self.red += 1,
            ColorBucket::Green => self.green += 1,
            ColorBucket::Blue => self.blue += 1,
            ColorBucket::White => self.white += 1,
        }
        if let Some(count) = self.faces.get_mut(face as usize) {
            *count += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.red + self.green + self.blue + self.white
    }

    /// The bucket with the most organisms, ties going to the earlier bucket
    pub fn dominant(&self) -> Option<ColorBucket> {
        let counts = [
            (ColorBucket::Red, self.red),
            (ColorBucket::Green, self.green),
            (ColorBucket::Blue, self.blue),
            (ColorBucket::White, self.white),
        ];
        counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .fold(None, |best: Option<(ColorBucket, usize)>, &(bucket, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((bucket, count)),
            })
            .map(|(bucket, _)| bucket)
    }
}
