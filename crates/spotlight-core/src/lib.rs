#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod activity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identifier;
pub mod traits;
pub mod types;
