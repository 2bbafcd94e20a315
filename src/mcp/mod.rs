//! Model Context Protocol (MCP) JSON-RPC envelope handling and the initialize handshake
//!
//! `codec` maps wire bytes to envelopes, `server` owns the session state machine and routes
//! calls to the application handler.

pub mod audit;
pub mod codec;
pub mod server;
