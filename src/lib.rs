//! Simulation of a single-draw lottery round: a roster of players buys
//! numbered tickets from a shared pool and three ranked prize tiers are
//! drawn against the pooled revenue, with payouts tracked in decimal
//! currency.

pub mod config;
pub mod models;
pub mod players;
pub mod prizes;
pub mod rng;
pub mod tickets;
pub mod ui;
pub mod utils;
