//! Data models.

pub mod resource;

pub use resource::{
    EmbedPlacement, Resource, ResourceAttachment, ResourceEmbed, ResourceRow, VideoProvider,
    normalize_attachments, normalize_embed, normalize_tags,
};
