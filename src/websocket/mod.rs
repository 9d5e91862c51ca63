//! WebSocket State Feed
//!
//! Pushes the complete state to presentation clients whenever it changes.
//!
//! ## Protocol
//!
//! On connect the server sends `connected`, then a `snapshot` holding the
//! current state. A new `snapshot` follows every change made through the
//! store. Clients may send `ping` (answered with `pong`) and `resync`
//! (answered with a fresh `snapshot`).
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8093/api/v1/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'snapshot') render(msg.state);
//! };
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};
