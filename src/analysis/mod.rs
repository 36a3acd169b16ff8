//! Computations over a (filtered) customer table: group means and summary
//! figures, rule-based risk segments, and the what-if segment calculator.

pub mod aggregate;
pub mod calculator;
pub mod segment;
