//! Structured JSONL activity logging on a background thread.

pub mod activity;
pub mod jsonl;
