//! Async whatthemovie session: login, random shot options and filtered
//! random shots with their solutions.

pub mod config;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, Credentials};
pub use session::Session;
pub use transport::{HttpClient, HttpResponse, Transport};
pub use wtm_core::{
    decode_solution, Difficulty, RejectReason, Shot, ShotFilter, Verdict, WtmError, WtmResult,
    DEFAULT_EXCLUDED_TAGS,
};
