// Telemetry is a submodule of query
pub mod telemetry;

// Submodules for separation of concerns
mod eval;
mod exec;
mod parse;
mod types;

// Public API re-exports
pub use eval::{compare_values, eval_all, eval_predicate, exact_i64, in_range, values_equal};
pub(crate) use eval::to_f64;
pub(crate) use exec::total_order;
pub use exec::{
    filter_by_field, filter_by_range, filter_combined, paginate, project, sort_by, sort_by_specs,
    top_n,
};
pub use parse::{UpdateDocSerde, parse_filter_json, parse_update_json};
pub use types::{CmpOp, Patch, Predicate, SortSpec};
