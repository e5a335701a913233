pub mod assembler;
pub mod spec;

pub use assembler::{assemble_chart, ChartRequest};
pub use spec::{ChartSpec, Panel, PanelKind, Trace};
