/// Analysis layer: pure functions from a loaded `Table` to report content.
///
/// ```text
///            Table
///     ┌────────┼─────────────┐
///     ▼        ▼             ▼
///  profile  distribution  correlation
///     └────────┼─────────────┘
///              ▼
///           report   ordered sections + figure descriptions
/// ```

pub mod correlation;
pub mod distribution;
pub mod profile;
pub mod report;
