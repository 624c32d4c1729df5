const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

macro_rules! env_or {
    ($key:literal, $default:literal) => {
        option_env!($key).unwrap_or($default)
    };
}

/// Build facts stamped in by `build.rs`.
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub branch: &'static str,
    pub commit_short: &'static str,
    pub profile: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build_time: env_or!("BUILD_TIME", "unknown"),
            branch: env_or!("GIT_BRANCH", "unknown"),
            commit_short: env_or!("GIT_COMMIT_SHORT", "unknown"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

pub fn render_banner(info: &BuildInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{BOLD}{CYAN}  syncwatch{RESET}\n"));
    out.push_str(&format!("{DIM}========================================{RESET}\n"));
    for (label, value, color) in [
        ("Version", info.version, CYAN),
        ("Build time", info.build_time, RESET),
        ("Branch", info.branch, RESET),
        ("Commit", info.commit_short, RESET),
        ("Profile", info.profile, YELLOW),
    ] {
        out.push_str(&format!("  {BOLD}{label:<14}{RESET}{color}{value}{RESET}\n"));
    }
    out
}

pub fn print_banner(info: &BuildInfo) {
    crate::log_println!("{}", render_banner(info));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_lists_build_rows() {
        let banner = render_banner(&BuildInfo {
            version: "1.2.3",
            build_time: "0",
            branch: "main",
            commit_short: "abc1234",
            profile: "debug",
        });
        let plain = crate::common::logger::strip_ansi_escapes(&banner);
        assert!(plain.contains("Version       1.2.3"));
        assert!(plain.contains("Commit        abc1234"));
    }
}
