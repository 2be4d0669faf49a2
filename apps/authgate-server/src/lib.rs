//! Authgate server assembly: configuration loading and the HTTP surface.

pub mod config;
pub mod rest;
