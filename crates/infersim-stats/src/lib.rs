//! Statistical summary utilities for the infersim project.
//!
//! This crate provides the dependency-free building blocks the resampling
//! engine reduces its distributions with:
//!
//! - **Descriptive statistics**: mean, median, sample variance, standard deviation,
//!   and the least-squares slope of two paired series
//! - **Percentiles**: nearest-rank percentiles, with both floor and ceiling rank rules
//! - **Histogram generation**: equal-width frequency tables of a distribution
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Floor and ceiling rank percentiles
//! - [`histogram`]: Histogram construction for external renderers
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use infersim_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use infersim_stats::percentiles;
//!
//! let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
//! assert_eq!(percentiles::lower_rank(sorted.len(), 50.0), Some(2));
//! assert_eq!(percentiles::compute_upper_percentile(&sorted, 10.0), 2.0);
//! ```

pub mod descriptive;
pub mod histogram;
pub mod percentiles;
