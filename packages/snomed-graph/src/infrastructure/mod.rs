//! Infrastructure adapters
//!
//! - `rf2`: RF2 snapshot release reader (construction from files)
//! - `gml`: GML snapshot writer/reader (persistence)
//!
//! Both adapters only produce builder rows; graph construction always goes
//! through [`crate::graph::GraphBuilder`].

pub mod gml;
pub mod rf2;

pub use gml::GmlSnapshot;
pub use rf2::Rf2Release;
