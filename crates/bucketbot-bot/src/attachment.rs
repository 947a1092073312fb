//! Uniform view over the Telegram attachment kinds.

use crate::telegram::types::{
    Animation, Audio, Document, Message, PhotoSize, Video, VideoNote, Voice,
};

/// A file attached to a message.
pub trait Attachment: Send + Sync {
    fn file_id(&self) -> &str;

    /// Declared size in bytes, when Telegram reports one.
    fn size(&self) -> Option<u64>;

    /// Original file name. Photos, voice notes and video notes have none.
    fn file_name(&self) -> Option<&str>;

    /// Declared MIME type.
    fn mime_type(&self) -> Option<&str>;
}

impl Attachment for PhotoSize {
    fn file_id(&self) -> &str {
        &self.file_id
    }
    fn size(&self) -> Option<u64> {
        self.file_size
    }
    fn file_name(&self) -> Option<&str> {
        None
    }
    fn mime_type(&self) -> Option<&str> {
        None
    }
}

macro_rules! named_attachment {
    ($($kind:ty),+) => {
        $(
            impl Attachment for $kind {
                fn file_id(&self) -> &str {
                    &self.file_id
                }
                fn size(&self) -> Option<u64> {
                    self.file_size
                }
                fn file_name(&self) -> Option<&str> {
                    self.file_name.as_deref()
                }
                fn mime_type(&self) -> Option<&str> {
                    self.mime_type.as_deref()
                }
            }
        )+
    };
}

named_attachment!(Document, Audio, Video, Animation);

impl Attachment for Voice {
    fn file_id(&self) -> &str {
        &self.file_id
    }
    fn size(&self) -> Option<u64> {
        self.file_size
    }
    fn file_name(&self) -> Option<&str> {
        None
    }
    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

impl Attachment for VideoNote {
    fn file_id(&self) -> &str {
        &self.file_id
    }
    fn size(&self) -> Option<u64> {
        self.file_size
    }
    fn file_name(&self) -> Option<&str> {
        None
    }
    fn mime_type(&self) -> Option<&str> {
        None
    }
}

/// The message's attachment, if any. For photos the largest size is used.
pub fn message_attachment(message: &Message) -> Option<&dyn Attachment> {
    if let Some(largest) = message.photo.as_ref().and_then(|sizes| sizes.last()) {
        return Some(largest);
    }
    if let Some(document) = &message.document {
        return Some(document);
    }
    if let Some(audio) = &message.audio {
        return Some(audio);
    }
    if let Some(video) = &message.video {
        return Some(video);
    }
    if let Some(animation) = &message.animation {
        return Some(animation);
    }
    if let Some(voice) = &message.voice {
        return Some(voice);
    }
    message
        .video_note
        .as_ref()
        .map(|note| note as &dyn Attachment)
}
