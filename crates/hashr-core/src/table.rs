//! The four catalog tables.

use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// A table of the catalog schema.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  Samples,
  Payloads,
  Sources,
  SamplesSources,
}

impl Table {
  /// Creation order: referenced tables precede `samples_sources`.
  pub const ALL: [Table; 4] = [
    Table::Samples,
    Table::Payloads,
    Table::Sources,
    Table::SamplesSources,
  ];

  /// The SQL table name.
  pub fn name(self) -> &'static str { self.into() }
}
