use std::fmt;

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const RED: Rgb = Rgb([0xff, 0x44, 0x44]);
    pub const ORANGE: Rgb = Rgb([0xff, 0xbb, 0x33]);
    pub const GREEN: Rgb = Rgb([0x00, 0xc8, 0x51]);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    WithMask,
    Incorrect,
    NoMask,
}

impl Classification {
    pub const ALL: &[Classification] = &[
        Classification::WithMask,
        Classification::Incorrect,
        Classification::NoMask,
    ];

    pub fn color(self) -> Rgb {
        match self {
            Classification::WithMask => Rgb::GREEN,
            Classification::Incorrect => Rgb::ORANGE,
            Classification::NoMask => Rgb::RED,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::WithMask => write!(f, "With Mask"),
            Classification::Incorrect => write!(f, "Incorrect"),
            Classification::NoMask => write!(f, "No Mask"),
        }
    }
}

/// Matches when the lowercased label contains any keyword.
#[derive(Clone, Copy, Debug)]
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub classification: Classification,
}

impl ClassificationRule {
    fn matches(&self, lowered_label: &str) -> bool {
        self.keywords.iter().any(|k| lowered_label.contains(k))
    }
}

/// Evaluated top to bottom; the first matching rule wins.
///
/// "no" is a plain substring, so labels such as `no_mask`, `none` and
/// `unknown` all land in NoMask. Negative keywords must stay first: a label
/// like `no_mask_incorrect` is NoMask, and `without_mask` must not fall
/// through to the "with" keyword.
pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: &["no", "without", "unmasked", "none"],
        classification: Classification::NoMask,
    },
    ClassificationRule {
        keywords: &["incorrect", "improper", "partial", "wrong"],
        classification: Classification::Incorrect,
    },
    ClassificationRule {
        keywords: &["mask", "with", "wearing"],
        classification: Classification::WithMask,
    },
];

/// Classifies labels from their text alone.
#[derive(Clone, Debug)]
pub struct LabelClassifier {
    rules: &'static [ClassificationRule],
    fallback: Classification,
}

impl LabelClassifier {
    pub fn new(rules: &'static [ClassificationRule], fallback: Classification) -> Self {
        Self { rules, fallback }
    }

    pub fn classify(&self, label: &str) -> Classification {
        let lowered = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.classification)
            .unwrap_or(self.fallback)
    }
}

impl Default for LabelClassifier {
    /// Unmatched labels count as WithMask.
    fn default() -> Self {
        Self::new(DEFAULT_RULES, Classification::WithMask)
    }
}
