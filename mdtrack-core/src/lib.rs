//! mdtrack-core: Core types for drift-tube track reconstruction.
//!
//! This crate provides the foundational data model: detector hits and
//! their arena-indexed store, the chamber geometry table, track output
//! types, the RT relation, and the configuration tree shared by the
//! reconstruction pipeline.
//!

pub mod config;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod rt;
pub mod track;

pub use config::{
    ChannelPosition, GeometryConfig, ModuleOffset, ReconstructionConfig, SignConvention,
};
pub use error::{Error, Result};
pub use geometry::{GeometryTable, Position};
pub use hit::{Hit, HitStore, TopKey};
pub use rt::RtRelation;
pub use track::{Line, TrackBundle, TrackHit};
