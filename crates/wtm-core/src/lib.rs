//! Shot model, page parsing, content filters and solution decoding
//! for the whatthemovie client. No I/O happens in this crate.

pub mod decoder;
pub mod error;
pub mod filter;
pub mod markup;
pub mod types;

pub use decoder::{decode_solution, unescape_js_unicode};
pub use error::{WtmError, WtmResult};
pub use filter::{RejectReason, ShotFilter, Verdict};
pub use markup::ShotPage;
pub use types::*;
