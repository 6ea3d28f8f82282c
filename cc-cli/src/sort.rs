//! Closet sort orders

use clap::ValueEnum;

/// Sort order for the closet listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClosetSort {
    /// Newest first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Name A-Z
    Name,
    /// Name Z-A
    NameDesc,
    MostWorn,
    LeastWorn,
}

impl ClosetSort {
    /// Backend sort expression
    pub fn as_sort(&self) -> &'static str {
        match self {
            ClosetSort::Newest => "-created",
            ClosetSort::Oldest => "created",
            ClosetSort::Name => "name",
            ClosetSort::NameDesc => "-name",
            ClosetSort::MostWorn => "-wear_count",
            ClosetSort::LeastWorn => "wear_count",
        }
    }
}
