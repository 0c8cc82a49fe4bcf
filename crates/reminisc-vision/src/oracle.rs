//! The labeling oracle seam and label post-processing.
//!
//! Image classification is opaque to the app: a [`LabelingOracle`] takes a
//! frame and returns ranked `(label, confidence)` pairs, or an error. Raw
//! labels are taxonomy identifiers such as `n03063599_coffee_mug`; they are
//! reduced to a single display word with [`clean_label`] and decorated with
//! [`emoji_for_label`].

use reminisc_types::ReminiscError;

use crate::camera::CameraFrame;

/// One ranked classifier result.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// An image classifier.
pub trait LabelingOracle: Send {
    /// Classify `frame`. Results are ranked best-first.
    fn classify(&mut self, frame: &CameraFrame) -> Result<Vec<Classification>, ReminiscError>;
}

/// Keep results with confidence strictly above `threshold`, at most
/// `max_results` of them, preserving rank order.
pub fn confident(
    results: Vec<Classification>,
    threshold: f32,
    max_results: usize,
) -> Vec<Classification> {
    results
        .into_iter()
        .filter(|c| c.confidence > threshold)
        .take(max_results)
        .collect()
}

/// Reduce a raw classifier label to one capitalised word.
///
/// Strips a leading synset id (`n` followed by digits), turns underscores
/// into spaces, keeps the part before the first comma and then its last
/// word.
pub fn clean_label(raw: &str) -> String {
    let without_id = strip_synset_id(raw);
    let spaced = without_id.replace('_', " ");
    let first = spaced.split(',').next().unwrap_or("").trim();
    let word = first.split_whitespace().last().unwrap_or(first);
    capitalize(word)
}

fn strip_synset_id(raw: &str) -> &str {
    match raw.strip_prefix('n') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
            rest.trim_start_matches(|c: char| c.is_ascii_digit())
        }
        _ => raw,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Emoji shown next to a cleaned label; `📦` when unknown.
pub fn emoji_for_label(label: &str) -> &'static str {
    match label.to_lowercase().as_str() {
        "cup" | "mug" => "☕️",
        "bottle" => "🍾",
        "glass" => "🥤",
        "book" => "📚",
        "notebook" => "📓",
        "chair" | "table" => "🪑",
        "couch" => "🛋",
        "laptop" => "💻",
        "phone" => "📱",
        "camera" => "📷",
        "clock" => "⏰",
        "watch" => "⌚️",
        "vase" => "🏺",
        "plant" => "🪴",
        "picture" | "frame" => "🖼",
        "lamp" => "💡",
        "keyboard" => "⌨️",
        "mouse" => "🖱",
        "bag" => "👜",
        "backpack" => "🎒",
        "shoe" => "👟",
        "hat" => "🎩",
        "glasses" => "👓",
        "pen" => "🖊",
        "pencil" => "✏️",
        _ => "📦",
    }
}
