//! Changelog model, loading and rendering.
//!
//! - [`ChangelogLoader`] reads the JSON changelog file into a [`ChangelogDocument`]
//! - [`render`] turns the latest entry of a document into a [`RenderedUpdate`]
//! - [`ChangelogError`] covers every failure of both steps
//!
//! ```ignore
//! let document = ChangelogLoader::new("changelog.json").load().await?;
//! let update = render(&document)?;
//! println!("{}\n\n{}", update.title, update.body);
//! ```

mod document;
mod error;
mod loader;
mod render;

pub use crate::changelog::{
    error::ChangelogError,
    loader::ChangelogLoader,
    render::{RenderedUpdate, render},
};
