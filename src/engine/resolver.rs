use crate::{common::types::QualityLevel, settings::QualityTable};

/// What a persisted quality preference means for this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Let the widget choose.
    Auto,
    /// The stored value is not in the `PlayerQuality` table. Behaves like
    /// `Auto`, but points at a broken settings object.
    Unmapped(i32),
    /// Pin the widget to this level.
    Target(QualityLevel),
}

impl Resolution {
    pub fn target(&self) -> Option<&QualityLevel> {
        match self {
            Self::Target(level) => Some(level),
            Self::Auto | Self::Unmapped(_) => None,
        }
    }
}

/// Map a stored preference to the widget's vocabulary.
pub fn resolve_preference(table: &QualityTable, preferred: i32) -> Resolution {
    match table.native_of(preferred) {
        None => Resolution::Unmapped(preferred),
        Some(level) if level.is_auto() => Resolution::Auto,
        Some(level) => Resolution::Target(level),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub level: QualityLevel,
    /// The target was missing and the widget's first offer was taken instead.
    pub fell_back: bool,
}

/// Pick a selectable level for `target` out of what the widget offers.
///
/// A missing target falls back to `available[0]`. The widget lists its
/// levels best first, so that is the next best it can actually do; no
/// ranking is computed here. `None` only for an empty offer.
pub fn select_available(target: &QualityLevel, available: &[QualityLevel]) -> Option<Selection> {
    if available.contains(target) {
        return Some(Selection {
            level: target.clone(),
            fell_back: false,
        });
    }

    available.first().map(|first| Selection {
        level: first.clone(),
        fell_back: true,
    })
}

/// Resolve a stored preference against the widget's current offer.
///
/// `None` means no level should be pinned and the widget should pick.
pub fn resolve(
    table: &QualityTable,
    preferred: i32,
    available: &[QualityLevel],
) -> Option<QualityLevel> {
    let target = resolve_preference(table, preferred);
    let selection = select_available(target.target()?, available)?;
    (!selection.level.is_auto()).then_some(selection.level)
}
