//! Report computations over entry snapshots
//!
//! Every function here is pure: it takes a snapshot slice and an explicit
//! "now", so callers decide the timezone (`Local` in the application, fixed
//! offsets in tests).

pub mod aggregate;
pub mod export;
pub mod summary;
pub mod window;

pub use aggregate::{ProjectTotal, aggregate_by_project, aggregate_window, sort_for_display};
pub use export::{CSV_HEADER, CSV_MIME_TYPE, CsvExport, export_window, quote_field, to_csv};
pub use summary::{Summary, is_same_week, summarize, week_start};
pub use window::Window;

/// Sum hour values independently of their input order.
///
/// Values are sorted before summing so that the same multiset of hours
/// always produces the same floating-point total. An empty input sums to
/// positive zero.
pub(crate) fn sum_hours(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |total, hours| total + hours)
}
