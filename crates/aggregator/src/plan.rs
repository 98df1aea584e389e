//! Which sources a query runs against.

use common::SourceMode;

/// Sources to invoke for one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub regional: bool,
    pub global: bool,
}

impl FetchPlan {
    pub fn for_mode(mode: SourceMode) -> Self {
        match mode {
            SourceMode::Kandilli => Self {
                regional: true,
                global: false,
            },
            SourceMode::Usgs => Self {
                regional: false,
                global: true,
            },
            SourceMode::Hybrid => Self {
                regional: true,
                global: true,
            },
        }
    }

    pub fn source_count(&self) -> usize {
        usize::from(self.regional) + usize::from(self.global)
    }
}

impl From<SourceMode> for FetchPlan {
    fn from(mode: SourceMode) -> Self {
        Self::for_mode(mode)
    }
}
