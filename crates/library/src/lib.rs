//! Resource library core.
//!
//! Read side of the public resource library: strict [`Resource`] values
//! normalized from loosely-typed rows, filtered and paged listings, and an
//! allowlist sanitizer for staff-authored embed markup. Persistence,
//! authentication and rendering belong to the embedding application.

pub mod config;
pub mod db;
pub mod error;
pub mod hosts;
pub mod kinds;
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod slug;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{LibraryError, LibraryResult, StoreError};
pub use hosts::{
    ALLOWED_EMBED_HOSTS, allowed_embed_hosts, assert_allowed_embed_url, is_allowed_embed_url,
};
pub use models::{
    EmbedPlacement, Resource, ResourceAttachment, ResourceEmbed, ResourceRow, VideoProvider,
};
pub use repository::{
    GetOptions, ListOptions, NormalizedResourceFilters, ResourceFilters, ResourceListResult,
    ResourceRepository, format_resource_date, get_resource_tags, get_resource_years,
    normalize_filters,
};
pub use sanitize::sanitize_embed_html;
pub use slug::normalize_resource_slug;
pub use state::LibraryState;
pub use store::{MemoryResourceStore, PgResourceStore, ResourceStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a `tracing` subscriber honouring `RUST_LOG`.
///
/// For embedding binaries and ad-hoc tools; libraries that already install a
/// subscriber should skip this. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,resource_library=debug,sqlx=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Load `.env` (if present) and configuration from the environment.
pub fn load_config() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    Config::from_env()
}
