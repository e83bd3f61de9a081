//! Client library for a merkle distributor airdrop dashboard.
//!
//! The hosted distribution API owns recipient lists, merkle roots and token
//! metadata; the distributor program on Solana owns the funds. This crate
//! covers both sides and the glue between them: typed REST access, account
//! reads and transaction building, claim eligibility, and the assembled
//! views the dashboard renders.

pub mod api;
pub mod balances;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod distributor;
pub mod eligibility;
pub mod error;
pub mod math;
pub mod recipients;
pub mod state;
pub mod types;

pub use crate::{
    config::{ClientConfig, Cluster},
    dashboard::Dashboard,
    error::{Error, Result},
};
