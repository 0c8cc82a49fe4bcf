use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A journal entry bound to a physical object.
///
/// Every field added after the first release is optional (or defaulted) so
/// that blobs written by older builds keep decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub title: String,
    /// e.g. "Coffee Mug", "Photo Album"
    pub object_name: String,
    pub object_emoji: String,
    /// Speech-to-text transcript of the recording, or typed text.
    pub transcript: String,
    #[serde(default)]
    pub audio_file_name: Option<String>,
    /// Recording length in seconds.
    pub audio_duration: f64,
    pub creator: String,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub responses: Vec<MemoryResponse>,
    #[serde(default)]
    pub photo_file_name: Option<String>,
    /// Id of the spatial anchor this memory is pinned to, if any.
    #[serde(default)]
    pub anchor_identifier: Option<Uuid>,
    #[serde(default)]
    pub scan_image_name: Option<String>,
}

impl Memory {
    /// Construct a new [`Memory`] with a fresh UUID, the current UTC
    /// timestamp and no attachments.
    pub fn new(
        title: impl Into<String>,
        object_name: impl Into<String>,
        object_emoji: impl Into<String>,
        transcript: impl Into<String>,
        audio_duration: f64,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            object_name: object_name.into(),
            object_emoji: object_emoji.into(),
            transcript: transcript.into(),
            audio_file_name: None,
            audio_duration,
            creator: creator.into(),
            created_date: Utc::now(),
            responses: Vec::new(),
            photo_file_name: None,
            anchor_identifier: None,
            scan_image_name: None,
        }
    }

    /// The three entries shown on first launch, before the user has
    /// recorded anything.
    pub fn examples() -> Vec<Memory> {
        let mut mug = Memory::new(
            "Grandma's Paris Mug",
            "Coffee Mug",
            "☕️",
            "This mug was a gift from my daughter when she visited Paris. Every morning \
             when I use it, I remember that wonderful trip we took together to the Eiffel \
             Tower. The coffee tastes better in this mug, I swear!",
            45.0,
            "Grandma",
        );
        mug.responses.push(MemoryResponse::text(
            "Sarah (Daughter)",
            "I remember that day too, Mom! You were so happy. Love you ❤️",
        ));

        let album = Memory::new(
            "Old Photo Album",
            "Photo Album",
            "📷",
            "These photos are from our honeymoon in Hawaii. It was the summer of 1965, we \
             had just gotten married. The beaches were beautiful, and we were so young and \
             full of dreams...",
            83.0,
            "Grandpa",
        );

        let chair = Memory::new(
            "Rocking Chair",
            "Rocking Chair",
            "🪑",
            "I used to rock your mother to sleep in this chair. Now when I see it, I \
             remember those warm evenings, singing lullabies and watching her peaceful \
             face...",
            135.0,
            "Grandma",
        );

        vec![mug, album, chair]
    }
}

/// A reply left on someone else's memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub id: Uuid,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub is_voice_note: bool,
    #[serde(default)]
    pub audio_file_name: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl MemoryResponse {
    /// A typed reply.
    pub fn text(author_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_name: author_name.into(),
            content: content.into(),
            is_voice_note: false,
            audio_file_name: None,
            created_date: Utc::now(),
        }
    }

    /// A recorded reply; `content` carries its transcript.
    pub fn voice(
        author_name: impl Into<String>,
        content: impl Into<String>,
        audio_file_name: impl Into<String>,
    ) -> Self {
        Self {
            is_voice_note: true,
            audio_file_name: Some(audio_file_name.into()),
            ..Self::text(author_name, content)
        }
    }
}

/// Device capabilities that need a user grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Camera,
    Microphone,
}

/// Error type shared by the capture, classification and scanning seams.
///
/// None of these reach the user as a structured error; callers log them and
/// degrade the affected feature.
#[derive(Error, Debug)]
pub enum ReminiscError {
    #[error("Permission denied: {0:?}")]
    PermissionDenied(Permission),

    #[error("Capture failed on {device}: {details}")]
    Capture { device: String, details: String },

    #[error("Labeling oracle failed: {0}")]
    Oracle(String),

    #[error("Object scan failed: {0}")]
    Scan(String),
}
