//! Enumerated setting values used by the builtin catalog.

use xcsettings_core::MacroEnum;

/// Tri-state warning switch: off, on, or on and promoted to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanWarningLevel {
    YesError,
    Yes,
    No,
}

impl MacroEnum for BooleanWarningLevel {
    const VARIANTS: &'static [Self] = &[
        BooleanWarningLevel::YesError,
        BooleanWarningLevel::Yes,
        BooleanWarningLevel::No,
    ];

    fn spelling(&self) -> &'static str {
        match self {
            BooleanWarningLevel::YesError => "YES_ERROR",
            BooleanWarningLevel::Yes => "YES",
            BooleanWarningLevel::No => "NO",
        }
    }

    fn default_value() -> Self {
        BooleanWarningLevel::No
    }
}

impl BooleanWarningLevel {
    /// Whether the warning is enabled at all.
    pub fn is_enabled(self) -> bool {
        self != BooleanWarningLevel::No
    }
}

/// Which symbols `strip` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripStyle {
    All,
    NonGlobal,
    Debugging,
}

impl MacroEnum for StripStyle {
    const VARIANTS: &'static [Self] = &[StripStyle::All, StripStyle::NonGlobal, StripStyle::Debugging];

    fn spelling(&self) -> &'static str {
        match self {
            StripStyle::All => "all",
            StripStyle::NonGlobal => "non-global",
            StripStyle::Debugging => "debugging",
        }
    }

    fn default_value() -> Self {
        StripStyle::All
    }
}

/// Link-time optimization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkTimeOptimization {
    Monolithic,
    Incremental,
    Off,
}

impl MacroEnum for LinkTimeOptimization {
    const VARIANTS: &'static [Self] = &[
        LinkTimeOptimization::Monolithic,
        LinkTimeOptimization::Incremental,
        LinkTimeOptimization::Off,
    ];

    fn spelling(&self) -> &'static str {
        match self {
            LinkTimeOptimization::Monolithic => "YES",
            LinkTimeOptimization::Incremental => "YES_THIN",
            LinkTimeOptimization::Off => "NO",
        }
    }

    fn default_value() -> Self {
        LinkTimeOptimization::Off
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugInformationFormat {
    Dwarf,
    DwarfWithDsym,
}

impl MacroEnum for DebugInformationFormat {
    const VARIANTS: &'static [Self] = &[
        DebugInformationFormat::Dwarf,
        DebugInformationFormat::DwarfWithDsym,
    ];

    fn spelling(&self) -> &'static str {
        match self {
            DebugInformationFormat::Dwarf => "dwarf",
            DebugInformationFormat::DwarfWithDsym => "dwarf-with-dsym",
        }
    }

    fn default_value() -> Self {
        DebugInformationFormat::Dwarf
    }
}
