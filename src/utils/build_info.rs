/// Release details shown by the `version` command.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub built_on: &'static str,
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("NITP_PORTAL_BUILD_HASH").unwrap_or("unknown"),
        built_on: option_env!("NITP_PORTAL_BUILD_DATE").unwrap_or("unknown"),
    }
}
