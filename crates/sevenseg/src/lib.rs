//! Seven-segment thermostat display recognition.
//!
//! The engine reads a two-digit temperature from photographs of a
//! thermostat panel. It locates printed panel artwork (calibration
//! features), derives the display's crop rectangle from the best feature,
//! extracts digit glyphs from the binarized crop, and decodes each glyph
//! by sampling its seven segment windows.
//!
//! ```no_run
//! use sevenseg::{DebugSink, DisplayReader};
//!
//! let reader = DisplayReader::default();
//! let reading = reader.read_path("frame.jpg", &DebugSink::disabled())?;
//! match reading {
//!     Some(value) => println!("{value}"),
//!     None => println!("display not recognized"),
//! }
//! # Ok::<(), sevenseg::ReadError>(())
//! ```

mod debug_dump;
mod decode;
mod error;
mod features;
mod glyphs;
mod params;
mod preprocess;
mod reader;
mod region;

pub use debug_dump::DebugSink;
pub use error::ReadError;
pub use features::{
    detect_reference_features, CalibrationFeature, FeatureMap, ReferenceCategory,
};
pub use params::EngineParams;
pub use reader::DisplayReader;
pub use region::DisplayRegion;
