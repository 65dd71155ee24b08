//! HTTP handlers for the Ieum API.

pub mod action;
pub mod analyze;
pub mod dashboard;
