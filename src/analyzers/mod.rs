//! Feedback aggregation, labeling and dashboard assembly.
//!
//! This module turns extracted records into per-lesson yes/no totals,
//! collapses and orders them per course for display, and joins the
//! students' comments onto the ordered lessons.

pub mod aggregate;
pub mod analyzer;
pub mod comments;
pub mod label;
pub mod types;
pub mod utility;
