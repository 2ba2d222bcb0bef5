//! WebSocket and HTTP gateway for the Samvad translation pipeline.
//!
//! The gateway hosts the streaming protocol (live audio chunks in, gloss and
//! avatar results out), the small HTTP API (health, language catalog,
//! text-to-ISL), and the per-connection session bookkeeping.

pub mod connection;
pub mod events;
pub mod methods;
pub mod server;
pub mod session;
pub mod state;

pub use server::start_gateway;
pub use session::StreamSession;
pub use state::{ConnectionState, GatewayState};
