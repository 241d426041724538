//! Chat-command surface over the game engines: verb parsing, the per-room
//! load/dispatch/save cycle, reply rendering, and lifetime statistics.

pub mod command;
pub mod farkle_text;
pub mod gems_text;
pub mod session;
pub mod store;

pub use command::{FarkleCommand, GemsCommand, ParseError};
pub use session::{Caller, Reply, Session, SessionConfig, DEFAULT_IDLE_TIMEOUT_SECS};
pub use store::{BlobStore, MemoryStore};
