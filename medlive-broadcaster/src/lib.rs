//! Real-time transcript broadcaster for MedLive clients
//!
//! This crate owns the set of connected sessions and fans transcript events
//! out to all of them. A session whose queue is closed or full is evicted
//! without affecting delivery to the others.
//!
//! # Features
//!
//! - JSON wire messages tagged by `"type"`
//! - Serialize-once fan-out with per-session failure isolation
//! - Single serving-context loop owning the registry (no shared locks)
//! - Non-blocking submission handle usable from a blocking worker thread
//!
//! # Wire messages
//!
//! - `partial` - in-progress transcript
//! - `final` - finalized transcript segment
//! - `info` - acknowledgement for a single client
//! - `set_prompt` - client request to change the engine prompt
//!
//! # Example Usage
//!
//! ```no_run
//! use medlive_broadcaster::{Broadcaster, ServerMessage, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (broadcaster, handle) = Broadcaster::new();
//!     tokio::spawn(broadcaster.run());
//!
//!     let (session, endpoint) = Session::open("127.0.0.1:50000".parse()?, 64);
//!     handle.register(session)?;
//!
//!     handle.broadcast(ServerMessage::partial("Patient zeigt"))?;
//!
//!     let (_replies, mut frames) = endpoint.split();
//!     println!("{:?}", frames.recv().await);
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod error;
pub mod events;
pub mod registry;
pub mod session;

// Re-exports
pub use broadcaster::{Broadcaster, BroadcasterHandle};
pub use error::{BroadcasterError, Result};
pub use events::{ClientMessage, ServerMessage, PROMPT_UPDATED};
pub use registry::{BroadcastReport, SessionRegistry};
pub use session::{DeliveryError, Session, SessionEndpoint, SessionId, SessionReplies};
