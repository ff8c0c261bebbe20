//! Domain types

mod activity;
mod catalog;
mod ids;
mod song;
mod time;

pub use activity::{Activity, ActivityKind};
pub use catalog::Catalog;
pub use ids::{LikedSongIds, SongId};
pub use song::Song;
pub use time::format_millis;
