//! Interactive 3D knowledge-graph view.

mod adapter;
mod camera;
mod canvas;
mod component;
mod filter;
mod interaction;
mod panels;
mod render;
mod scene;
mod shell;
mod style;
mod types;
mod view;

pub use types::{DomainInfo, GraphDataset, TimeSliceInfo};
pub use view::KnowledgeGraphView;
