//! Closed set of motion styles and the tag table that maps onto it.

use crate::params::MotionTimeScales;

/// Coarse motion bucket driving the deformer's noise time scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionStyle {
    Slow,
    #[default]
    Default,
    Intense,
}

/// Every recognized tag word, already lowercase
const TAG_TABLE: &[(&str, MotionStyle)] = &[
    ("slow", MotionStyle::Slow),
    ("calm", MotionStyle::Slow),
    ("gentle", MotionStyle::Slow),
    ("flowing", MotionStyle::Slow),
    ("floating", MotionStyle::Slow),
    ("drifting", MotionStyle::Slow),
    ("ambient", MotionStyle::Slow),
    ("smooth", MotionStyle::Slow),
    ("default", MotionStyle::Default),
    ("steady", MotionStyle::Default),
    ("intense", MotionStyle::Intense),
    ("wild", MotionStyle::Intense),
    ("aggressive", MotionStyle::Intense),
    ("chaotic", MotionStyle::Intense),
    ("energetic", MotionStyle::Intense),
    ("fast", MotionStyle::Intense),
    ("explosive", MotionStyle::Intense),
];

impl MotionStyle {
    /// Resolve a free-text tag
    ///
    /// The tag is lowercased (Unicode-aware) and split into words on any
    /// non-alphanumeric character; the first word found in the table wins.
    /// Turkish dotted and dotless i fold to `i` and combining marks are
    /// dropped, so locale-cased variants share a bucket. Anything
    /// unrecognized is `Default`.
    pub fn from_tag(tag: &str) -> MotionStyle {
        let normalized: String = tag
            .trim()
            .chars()
            .map(|c| match c {
                '\u{130}' | '\u{131}' => 'i',
                _ => c,
            })
            .flat_map(char::to_lowercase)
            .filter(|&c| !is_combining_mark(c))
            .collect();
        normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(lookup)
            .unwrap_or_default()
    }

    /// Noise time scale for this bucket
    pub fn time_scale(self, scales: &MotionTimeScales) -> f32 {
        match self {
            MotionStyle::Slow => scales.slow,
            MotionStyle::Default => scales.default,
            MotionStyle::Intense => scales.intense,
        }
    }
}

/// Combining diacritical marks (U+0300..U+036F)
fn is_combining_mark(c: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&c)
}

fn lookup(word: &str) -> Option<MotionStyle> {
    TAG_TABLE
        .iter()
        .find(|(tag, _)| *tag == word)
        .map(|&(_, style)| style)
}
