//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a client is alive.
//!
//! # Tasks
//! - Reaper: Removes expired cache entries at a fixed interval

mod reaper;

pub use reaper::{spawn_reaper_task, ReaperHandle};
