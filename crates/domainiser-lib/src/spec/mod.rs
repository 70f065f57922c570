//! Inclusion graphs: which relations a walk follows, and how deep.

mod builder;
mod dump;
mod graph_map;
mod graph_spec;
mod traced;


pub use builder::GraphSpecBuilder;
pub use dump::SpecPrinter;
pub use graph_map::GraphMap;
pub use graph_spec::GraphSpec;
pub use traced::TracedSpec;
