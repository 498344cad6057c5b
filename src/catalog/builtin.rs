//! Builtin catalog rows.

use xcsettings_core::{MacroEnum, MacroKind};

use super::enums::{BooleanWarningLevel, DebugInformationFormat, LinkTimeOptimization, StripStyle};
use super::{Catalog, CatalogEntry};

const CONDITIONS: &[&str] = &[
    "arch",
    "compiler",
    "sdk",
    "variant",
    "config",
    "__platform_filter",
    "_sdk_build_version",
];

const STRINGS: &[(&str, Option<&str>)] = &[
    ("PROJECT_NAME", None),
    ("TARGET_NAME", None),
    ("PRODUCT_NAME", None),
    ("PRODUCT_BUNDLE_IDENTIFIER", None),
    ("EXECUTABLE_NAME", None),
    ("CONFIGURATION", None),
    ("SDKROOT", None),
    ("PLATFORM_NAME", None),
    ("EFFECTIVE_PLATFORM_NAME", None),
    ("CURRENT_ARCH", None),
    ("NATIVE_ARCH", Some("arm64")),
    ("SWIFT_VERSION", None),
    ("MACOSX_DEPLOYMENT_TARGET", None),
    ("IPHONEOS_DEPLOYMENT_TARGET", None),
    ("GCC_OPTIMIZATION_LEVEL", Some("s")),
    ("SWIFT_OPTIMIZATION_LEVEL", Some("-O")),
    ("CODE_SIGN_IDENTITY", None),
    ("DEVELOPMENT_TEAM", None),
];

const STRING_LISTS: &[&str] = &[
    "ARCHS",
    "SUPPORTED_PLATFORMS",
    "OTHER_CFLAGS",
    "OTHER_CPLUSPLUSFLAGS",
    "OTHER_LDFLAGS",
    "OTHER_SWIFT_FLAGS",
    "WARNING_CFLAGS",
    "GCC_PREPROCESSOR_DEFINITIONS",
    "SWIFT_ACTIVE_COMPILATION_CONDITIONS",
];

const PATHS: &[(&str, Option<&str>)] = &[
    ("SRCROOT", None),
    ("PROJECT_DIR", None),
    ("OBJROOT", None),
    ("SYMROOT", None),
    ("DSTROOT", Some("/tmp")),
    ("BUILD_DIR", None),
    ("CONFIGURATION_BUILD_DIR", None),
    ("BUILT_PRODUCTS_DIR", None),
    ("TARGET_TEMP_DIR", None),
    ("INFOPLIST_FILE", None),
    ("INSTALL_PATH", None),
];

const PATH_LISTS: &[&str] = &[
    "HEADER_SEARCH_PATHS",
    "USER_HEADER_SEARCH_PATHS",
    "LIBRARY_SEARCH_PATHS",
    "FRAMEWORK_SEARCH_PATHS",
    "LD_RUNPATH_SEARCH_PATHS",
];

const BOOLEANS: &[(&str, bool)] = &[
    ("ONLY_ACTIVE_ARCH", false),
    ("ENABLE_TESTABILITY", false),
    ("ENABLE_BITCODE", false),
    ("COPY_PHASE_STRIP", true),
    ("DEAD_CODE_STRIPPING", false),
    ("SKIP_INSTALL", false),
    ("GCC_TREAT_WARNINGS_AS_ERRORS", false),
    ("SWIFT_TREAT_WARNINGS_AS_ERRORS", false),
    ("CLANG_ENABLE_MODULES", false),
    ("CLANG_ENABLE_OBJC_ARC", false),
    ("CODE_SIGNING_ALLOWED", true),
    ("DEPLOYMENT_POSTPROCESSING", false),
];

const WARNINGS: &[&str] = &[
    "CLANG_WARN_BOOL_CONVERSION",
    "CLANG_WARN_CONSTANT_CONVERSION",
    "CLANG_WARN_EMPTY_BODY",
    "CLANG_WARN_ENUM_CONVERSION",
    "CLANG_WARN_INT_CONVERSION",
];

fn enumeration<T: MacroEnum>(name: &str) -> CatalogEntry {
    CatalogEntry::new(name, MacroKind::Enumeration)
        .with_values(T::VARIANTS.iter().map(|v| v.spelling()))
        .with_default(T::default_value().spelling())
}

fn scalar(name: &str, kind: MacroKind, default: Option<&str>) -> CatalogEntry {
    let entry = CatalogEntry::new(name, kind);
    match default {
        Some(default) => entry.with_default(default),
        None => entry,
    }
}

pub(super) fn catalog() -> Catalog {
    let mut settings = Vec::new();
    settings.extend(STRINGS.iter().map(|(n, d)| scalar(n, MacroKind::String, *d)));
    settings.extend(STRING_LISTS.iter().map(|n| CatalogEntry::new(n, MacroKind::StringList)));
    settings.extend(PATHS.iter().map(|(n, d)| scalar(n, MacroKind::Path, *d)));
    settings.extend(PATH_LISTS.iter().map(|n| CatalogEntry::new(n, MacroKind::PathList)));
    settings.extend(BOOLEANS.iter().map(|(n, d)| {
        CatalogEntry::new(n, MacroKind::Boolean).with_default(if *d { "YES" } else { "NO" })
    }));
    settings.extend(WARNINGS.iter().map(|n| enumeration::<BooleanWarningLevel>(n)));
    settings.push(enumeration::<StripStyle>("STRIP_STYLE"));
    settings.push(enumeration::<LinkTimeOptimization>("LLVM_LTO"));
    settings.push(enumeration::<DebugInformationFormat>("DEBUG_INFORMATION_FORMAT"));

    Catalog {
        conditions: CONDITIONS.iter().map(|c| c.to_string()).collect(),
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = catalog();
        catalog.validate().unwrap();
        assert_eq!(catalog.conditions.len(), CONDITIONS.len());
        assert_eq!(
            catalog.settings.len(),
            STRINGS.len()
                + STRING_LISTS.len()
                + PATHS.len()
                + PATH_LISTS.len()
                + BOOLEANS.len()
                + WARNINGS.len()
                + 3
        );
    }

    #[test]
    fn test_enumeration_rows_carry_spellings() {
        let catalog = catalog();
        let strip = catalog
            .settings
            .iter()
            .find(|s| s.name == "STRIP_STYLE")
            .unwrap();
        assert_eq!(strip.values, vec!["all", "non-global", "debugging"]);
        assert_eq!(strip.default.as_deref(), Some("all"));
    }
}
