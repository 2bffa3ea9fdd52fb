//! Lead Qualifier - Conversational lead qualification funnel
//!
//! This crate walks a lead through a scripted messaging conversation
//! (name, birth date, weight-loss motivation) and classifies the motivation
//! as health-related (qualified) or appearance-related (rejected).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
