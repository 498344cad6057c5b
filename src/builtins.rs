//! Typed handles for the builtin catalog.
//!
//! [`BuiltinSettings::resolve`] looks every builtin setting up by name once,
//! checking its kind, so callers can evaluate `builtins.other_cflags`
//! instead of repeating string lookups.

use xcsettings_core::{
    BooleanMacro, ConditionParameter, EnumMacro, LookupError, Namespace, PathListMacro, PathMacro,
    StringListMacro, StringMacro,
};

use crate::catalog::enums::{
    BooleanWarningLevel, DebugInformationFormat, LinkTimeOptimization, StripStyle,
};

/// Builtin condition parameters.
#[derive(Debug, Clone)]
pub struct BuiltinConditions {
    pub arch: ConditionParameter,
    pub compiler: ConditionParameter,
    pub sdk: ConditionParameter,
    pub variant: ConditionParameter,
    pub config: ConditionParameter,
    pub platform: ConditionParameter,
    pub sdk_build_version: ConditionParameter,
}

impl BuiltinConditions {
    pub fn resolve(ns: &Namespace) -> Result<Self, LookupError> {
        Ok(BuiltinConditions {
            arch: ns.condition("arch")?,
            compiler: ns.condition("compiler")?,
            sdk: ns.condition("sdk")?,
            variant: ns.condition("variant")?,
            config: ns.condition("config")?,
            platform: ns.condition("__platform_filter")?,
            sdk_build_version: ns.condition("_sdk_build_version")?,
        })
    }
}

/// Typed handles for every builtin setting.
#[derive(Debug, Clone)]
pub struct BuiltinSettings {
    pub conditions: BuiltinConditions,

    // Identity and platform
    pub project_name: StringMacro,
    pub target_name: StringMacro,
    pub product_name: StringMacro,
    pub product_bundle_identifier: StringMacro,
    pub executable_name: StringMacro,
    pub configuration: StringMacro,
    pub sdkroot: StringMacro,
    pub platform_name: StringMacro,
    pub effective_platform_name: StringMacro,
    pub current_arch: StringMacro,
    pub native_arch: StringMacro,
    pub archs: StringListMacro,
    pub supported_platforms: StringListMacro,
    pub only_active_arch: BooleanMacro,
    pub macosx_deployment_target: StringMacro,
    pub iphoneos_deployment_target: StringMacro,

    // Directories
    pub srcroot: PathMacro,
    pub project_dir: PathMacro,
    pub objroot: PathMacro,
    pub symroot: PathMacro,
    pub dstroot: PathMacro,
    pub build_dir: PathMacro,
    pub configuration_build_dir: PathMacro,
    pub built_products_dir: PathMacro,
    pub target_temp_dir: PathMacro,
    pub infoplist_file: PathMacro,
    pub install_path: PathMacro,
    pub skip_install: BooleanMacro,

    // Compiler
    pub gcc_optimization_level: StringMacro,
    pub gcc_preprocessor_definitions: StringListMacro,
    pub gcc_treat_warnings_as_errors: BooleanMacro,
    pub other_cflags: StringListMacro,
    pub other_cplusplusflags: StringListMacro,
    pub warning_cflags: StringListMacro,
    pub header_search_paths: PathListMacro,
    pub user_header_search_paths: PathListMacro,
    pub framework_search_paths: PathListMacro,
    pub clang_enable_modules: BooleanMacro,
    pub clang_enable_objc_arc: BooleanMacro,
    pub clang_warn_bool_conversion: EnumMacro<BooleanWarningLevel>,
    pub clang_warn_constant_conversion: EnumMacro<BooleanWarningLevel>,
    pub clang_warn_empty_body: EnumMacro<BooleanWarningLevel>,
    pub clang_warn_enum_conversion: EnumMacro<BooleanWarningLevel>,
    pub clang_warn_int_conversion: EnumMacro<BooleanWarningLevel>,
    pub debug_information_format: EnumMacro<DebugInformationFormat>,

    // Swift
    pub swift_version: StringMacro,
    pub swift_optimization_level: StringMacro,
    pub swift_active_compilation_conditions: StringListMacro,
    pub swift_treat_warnings_as_errors: BooleanMacro,
    pub other_swift_flags: StringListMacro,

    // Linker and post-processing
    pub other_ldflags: StringListMacro,
    pub library_search_paths: PathListMacro,
    pub ld_runpath_search_paths: PathListMacro,
    pub dead_code_stripping: BooleanMacro,
    pub llvm_lto: EnumMacro<LinkTimeOptimization>,
    pub enable_bitcode: BooleanMacro,
    pub enable_testability: BooleanMacro,
    pub copy_phase_strip: BooleanMacro,
    pub strip_style: EnumMacro<StripStyle>,
    pub deployment_postprocessing: BooleanMacro,

    // Signing
    pub code_sign_identity: StringMacro,
    pub development_team: StringMacro,
    pub code_signing_allowed: BooleanMacro,
}

impl BuiltinSettings {
    /// Look up every builtin handle in `ns`.
    pub fn resolve(ns: &Namespace) -> Result<Self, LookupError> {
        Ok(BuiltinSettings {
            conditions: BuiltinConditions::resolve(ns)?,

            project_name: ns.lookup("PROJECT_NAME")?,
            target_name: ns.lookup("TARGET_NAME")?,
            product_name: ns.lookup("PRODUCT_NAME")?,
            product_bundle_identifier: ns.lookup("PRODUCT_BUNDLE_IDENTIFIER")?,
            executable_name: ns.lookup("EXECUTABLE_NAME")?,
            configuration: ns.lookup("CONFIGURATION")?,
            sdkroot: ns.lookup("SDKROOT")?,
            platform_name: ns.lookup("PLATFORM_NAME")?,
            effective_platform_name: ns.lookup("EFFECTIVE_PLATFORM_NAME")?,
            current_arch: ns.lookup("CURRENT_ARCH")?,
            native_arch: ns.lookup("NATIVE_ARCH")?,
            archs: ns.lookup("ARCHS")?,
            supported_platforms: ns.lookup("SUPPORTED_PLATFORMS")?,
            only_active_arch: ns.lookup("ONLY_ACTIVE_ARCH")?,
            macosx_deployment_target: ns.lookup("MACOSX_DEPLOYMENT_TARGET")?,
            iphoneos_deployment_target: ns.lookup("IPHONEOS_DEPLOYMENT_TARGET")?,

            srcroot: ns.lookup("SRCROOT")?,
            project_dir: ns.lookup("PROJECT_DIR")?,
            objroot: ns.lookup("OBJROOT")?,
            symroot: ns.lookup("SYMROOT")?,
            dstroot: ns.lookup("DSTROOT")?,
            build_dir: ns.lookup("BUILD_DIR")?,
            configuration_build_dir: ns.lookup("CONFIGURATION_BUILD_DIR")?,
            built_products_dir: ns.lookup("BUILT_PRODUCTS_DIR")?,
            target_temp_dir: ns.lookup("TARGET_TEMP_DIR")?,
            infoplist_file: ns.lookup("INFOPLIST_FILE")?,
            install_path: ns.lookup("INSTALL_PATH")?,
            skip_install: ns.lookup("SKIP_INSTALL")?,

            gcc_optimization_level: ns.lookup("GCC_OPTIMIZATION_LEVEL")?,
            gcc_preprocessor_definitions: ns.lookup("GCC_PREPROCESSOR_DEFINITIONS")?,
            gcc_treat_warnings_as_errors: ns.lookup("GCC_TREAT_WARNINGS_AS_ERRORS")?,
            other_cflags: ns.lookup("OTHER_CFLAGS")?,
            other_cplusplusflags: ns.lookup("OTHER_CPLUSPLUSFLAGS")?,
            warning_cflags: ns.lookup("WARNING_CFLAGS")?,
            header_search_paths: ns.lookup("HEADER_SEARCH_PATHS")?,
            user_header_search_paths: ns.lookup("USER_HEADER_SEARCH_PATHS")?,
            framework_search_paths: ns.lookup("FRAMEWORK_SEARCH_PATHS")?,
            clang_enable_modules: ns.lookup("CLANG_ENABLE_MODULES")?,
            clang_enable_objc_arc: ns.lookup("CLANG_ENABLE_OBJC_ARC")?,
            clang_warn_bool_conversion: ns.lookup("CLANG_WARN_BOOL_CONVERSION")?,
            clang_warn_constant_conversion: ns.lookup("CLANG_WARN_CONSTANT_CONVERSION")?,
            clang_warn_empty_body: ns.lookup("CLANG_WARN_EMPTY_BODY")?,
            clang_warn_enum_conversion: ns.lookup("CLANG_WARN_ENUM_CONVERSION")?,
            clang_warn_int_conversion: ns.lookup("CLANG_WARN_INT_CONVERSION")?,
            debug_information_format: ns.lookup("DEBUG_INFORMATION_FORMAT")?,

            swift_version: ns.lookup("SWIFT_VERSION")?,
            swift_optimization_level: ns.lookup("SWIFT_OPTIMIZATION_LEVEL")?,
            swift_active_compilation_conditions: ns
                .lookup("SWIFT_ACTIVE_COMPILATION_CONDITIONS")?,
            swift_treat_warnings_as_errors: ns.lookup("SWIFT_TREAT_WARNINGS_AS_ERRORS")?,
            other_swift_flags: ns.lookup("OTHER_SWIFT_FLAGS")?,

            other_ldflags: ns.lookup("OTHER_LDFLAGS")?,
            library_search_paths: ns.lookup("LIBRARY_SEARCH_PATHS")?,
            ld_runpath_search_paths: ns.lookup("LD_RUNPATH_SEARCH_PATHS")?,
            dead_code_stripping: ns.lookup("DEAD_CODE_STRIPPING")?,
            llvm_lto: ns.lookup("LLVM_LTO")?,
            enable_bitcode: ns.lookup("ENABLE_BITCODE")?,
            enable_testability: ns.lookup("ENABLE_TESTABILITY")?,
            copy_phase_strip: ns.lookup("COPY_PHASE_STRIP")?,
            strip_style: ns.lookup("STRIP_STYLE")?,
            deployment_postprocessing: ns.lookup("DEPLOYMENT_POSTPROCESSING")?,

            code_sign_identity: ns.lookup("CODE_SIGN_IDENTITY")?,
            development_team: ns.lookup("DEVELOPMENT_TEAM")?,
            code_signing_allowed: ns.lookup("CODE_SIGNING_ALLOWED")?,
        })
    }
}
