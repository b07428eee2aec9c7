//! Core library for ParkDesk, the parking administration client.
//!
//! This crate provides:
//! - `auth`: the session lifecycle (credential store, session manager)
//! - `routing`: the router guard that maps session state to a route partition
//! - `api`: the REST client for authentication and admin resources
//! - `models`: data types exchanged with the remote API
//! - `config`: persisted user configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routing;
