//! Compares a month of Japanese public-pension contributions against investing the
//! same amount and drawing it down as an annuity after retirement.

pub mod api;
pub mod core;
