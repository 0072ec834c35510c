//! # pantry-net
//!
//! The network edge: a reqwest-based client for the grocery REST contract
//! and the connectivity monitor that derives the online/offline signal.

pub mod client;
pub mod monitor;

pub use client::ApiClient;
pub use monitor::{ConnectivityHandle, ConnectivityMonitor};
