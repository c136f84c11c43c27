//! Document Model - the structure the merge pipeline substitutes into
//!
//! A [`Document`] is a body [`Story`] (paragraphs and tables), a list of
//! [`Section`]s, and the header/footer parts those sections reference.
//! Every paragraph is an ordered list of [`Run`]s. Walks over the document
//! are region-aware: see [`Region`] and [`RegionSet`].

mod document;
mod error;
mod node_id;
mod paragraph;
mod region;
mod run;
mod section;
mod story;
pub mod table;

pub use document::*;
pub use error::*;
pub use node_id::*;
pub use paragraph::*;
pub use region::*;
pub use run::*;
pub use section::*;
pub use story::*;
pub use table::*;
