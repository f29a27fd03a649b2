//! HTTP inbound adapter exposing the clinic REST API.

pub mod access;
pub mod analytics;
pub mod auth;
pub mod cache_control;
pub mod clinics;
pub mod envelope;
pub mod error;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod permissions;
pub mod reservations;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod staff;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod visits;

pub use crate::domain::ApiResult;
