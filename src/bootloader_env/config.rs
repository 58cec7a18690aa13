use std::env;

static FW_PRINTENV_DEFAULT: &str = "fw_printenv";
static FW_SETENV_DEFAULT: &str = "fw_setenv";

/// Which tools are used to access the U-Boot environment and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub printenv: String,
    pub setenv: String,
    /// run the tools via `sudo <tool> ...`
    pub use_sudo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            printenv: FW_PRINTENV_DEFAULT.to_string(),
            setenv: FW_SETENV_DEFAULT.to_string(),
            use_sudo: false,
        }
    }
}

impl Config {
    /// Reads `FW_PRINTENV_PATH`, `FW_SETENV_PATH` and `BOOTENV_USE_SUDO` from the
    /// process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            printenv: lookup("FW_PRINTENV_PATH").unwrap_or(FW_PRINTENV_DEFAULT.to_string()),
            setenv: lookup("FW_SETENV_PATH").unwrap_or(FW_SETENV_DEFAULT.to_string()),
            use_sudo: lookup("BOOTENV_USE_SUDO") == Some("true".to_string()),
        }
    }

    /// Program and argument list to start `tool` with `params`.
    pub(crate) fn invocation(&self, tool: &str, params: &[&str]) -> (String, Vec<String>) {
        let params = params.iter().map(|p| p.to_string());

        if self.use_sudo {
            (
                "sudo".to_string(),
                std::iter::once(tool.to_string()).chain(params).collect(),
            )
        } else {
            (tool.to_string(), params.collect())
        }
    }
}
