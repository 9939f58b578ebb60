//! Matching Engine Service
//!
//! Single-venue order matching engine implementing strict price-time
//! priority over per-symbol limit order books.
//!
//! Requests flow through a bounded SPSC ring into the matching thread and
//! results flow out through a second ring, so submitters never contend
//! with matching. Order records live in a bounded pool for predictable
//! allocation cost on the hot path.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs)
//! - Books are never crossed at rest
//! - Conservation of quantity across fills

pub mod book;
pub mod engine;
pub mod matching;
pub mod messages;
pub mod pool;
pub mod spsc;
pub mod time;

pub use engine::{EngineConfig, MatchingEngine, OrderSender, ResultReceiver};
pub use messages::{MatchResult, MatchStatus, OrderRequest};
