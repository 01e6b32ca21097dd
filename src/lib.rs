//! Translation backend for the low-resource language platform: a validated
//! translation cache, pivot-aware routing across two remote inference
//! deployments, and speech synthesis/transcription, served over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod inference;
pub mod languages;
pub mod router;
pub mod speech;
pub mod store;
pub mod translation;
