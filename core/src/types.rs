//! Shared primitive types used across the whole scheduler.

/// Minutes since midnight.
pub type Minutes = u32;

/// A stable, unique identifier for an agent on the roster.
pub type AgentId = String;

/// A time slot label such as `"10:00 - 11:00"`.
pub type SlotLabel = String;

/// The canonical session identifier (one scheduling day).
pub type SessionId = String;
