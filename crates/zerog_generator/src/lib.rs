//! Gravityless plant overrides for Starbound mods.
//!
//! Starbound only lets farmable plants grow upright on soil. This crate scans a mod
//! for farmable objects and generates an override mod that adds three more
//! orientations to each plant: hanging from a ceiling and growing out of either
//! wall. For every plant it produces:
//!
//! - **Rotated sprite sheets**: the plant's image rotated 180° and ±90°
//! - **Rotated frame descriptors**: the `.frames` grid with its frame names moved
//!   along with the pixels
//! - **An object override**: the new orientations, merged onto the original
//!   definition with a `__merge` directive, a JSON patch, or (deprecated) a full
//!   replacement
//!
//! Files are registered in a [`ContentStore`] keyed by path, so a sprite sheet used
//! by several plants is rotated and written only once, and a file that already has
//! content is never overwritten.
//!
//! # Example
//!
//! ```no_run
//! use zerog_generator::Generator;
//! use zerog_modinfo::GeneratorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut generator = Generator::new(GeneratorConfig::default(), "out");
//! let report = generator.run(&["mods/soy", "mods/rice"])?;
//!
//! for container in &report.containers {
//!     println!("{}: {} plants", container.name, container.plants);
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod document;
pub mod error;
pub mod geometry;
pub mod paths;
pub mod rotate;
pub mod scanner;
pub mod sink;
pub mod store;
pub mod synth;
pub mod transform;

// Re-export main types
pub use assembler::{ContainerReport, GenerationReport, Generator};
pub use document::Document;
pub use error::{Error, Result};
pub use geometry::{Direction, Footprint, FrameGrid, Rotated, Rotation};
pub use rotate::{ImageRotator, RasterRotator};
pub use scanner::SourceMod;
pub use sink::{write_outputs, OutputSet};
pub use store::{BinaryId, ContentStore, FileId, StructuredId};
pub use zerog_modinfo::{GeneratorConfig, MergeMode};
