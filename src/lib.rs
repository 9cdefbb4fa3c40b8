//! Stream Endpoint Manager
//!
//! Maintains the catalog of CDN video stream delivery endpoints. Endpoints are
//! derived from providers, lines, domains, streams and stream paths, kept
//! consistent on every catalog change, and classified by resolution either from
//! their path or by probing the live FLV stream.

pub mod codec;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod web;
