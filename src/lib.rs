// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod generator;
pub mod progress;
pub mod render;
pub mod schema;

pub use error::ErdError;
pub use generator::{ErdGenerator, ErdStats, GeneratorConfig};
pub use render::{OutputFormat, RenderOptions};
pub use schema::{Column, ForeignKey, Index, Schema, Table};
