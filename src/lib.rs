#![doc(html_root_url = "https://docs.rs/fact-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Applies relational fact diffs to a live document and its canvases, and translates native events back into facts.
//!
//! Start with [`Engine`] for direct control, or [`web::mount`] to run in a browser page.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod attributes;
pub mod canvas;
pub mod console;
pub mod diff;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod instances;
pub mod order;
pub mod runtime;
pub mod scheduler;
pub mod styles;
pub mod value;
pub mod web;

mod rc_hash_map;
mod temp_set;

pub use diff::{Diff, Notice, Outbound};
pub use engine::{Engine, EngineOptions, Relation};
pub use error::{HostError, ProtocolError};
pub use runtime::{Inbound, Runtime};
pub use value::{Eav, Tuple, Value};
