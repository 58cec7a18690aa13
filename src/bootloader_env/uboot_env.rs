use super::{
    config::Config,
    error::{Error, Result},
    runner::{Child, ProcessRunner, Runner},
};
use log::{debug, error};
use std::{
    collections::BTreeMap,
    io::{self, BufRead, BufReader},
};

/// U-Boot environment variables by name.
pub type BootEnvVars = BTreeMap<String, String>;

/// Reads and writes the U-Boot environment through `fw_printenv`/`fw_setenv`.
pub struct UbootEnv<R = ProcessRunner> {
    config: Config,
    runner: R,
}

impl UbootEnv<ProcessRunner> {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: Runner> UbootEnv<R> {
    pub fn with_runner(config: Config, runner: R) -> Self {
        UbootEnv { config, runner }
    }

    /// Returns the variables named in `names`, or the whole environment if
    /// `names` is empty.
    pub fn read<S: AsRef<str>>(&self, names: &[S]) -> Result<BootEnvVars> {
        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();

        self.command(&self.config.printenv, &names)
    }

    /// Returns the value of `name` or `None` if the tool didn't print it.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read(&[name])?.remove(name))
    }

    pub fn write(&self, name: &str, value: &str) -> Result<()> {
        if let Err(e) = self.command(&self.config.setenv, &[name, value]) {
            error!("set_bootloader_env: setting {name} failed: {e}");
            return Err(e);
        }

        Ok(())
    }

    /// Deletes `name` from the environment.
    pub fn unset(&self, name: &str) -> Result<()> {
        if let Err(e) = self.command(&self.config.setenv, &[name]) {
            error!("unset_bootloader_env: unsetting {name} failed: {e}");
            return Err(e);
        }

        Ok(())
    }

    fn command(&self, tool: &str, params: &[&str]) -> Result<BootEnvVars> {
        let (program, args) = self.config.invocation(tool, params);
        let command = command_line(&program, &args);

        debug!("uboot_env: run \"{command}\"");

        let mut child = self
            .runner
            .spawn(&program, &args)
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        let vars = parse_output(child.as_mut(), &command)?;

        let status = child.wait().map_err(|source| Error::Io {
            command: command.clone(),
            source,
        })?;

        if !status.success() {
            return Err(Error::Exit { command, status });
        }

        if !vars.is_empty() {
            debug!("uboot_env: variables: {vars:?}");
        }

        Ok(vars)
    }
}

fn parse_output(child: &mut dyn Child, command: &str) -> Result<BootEnvVars> {
    let stdout = child.take_stdout().ok_or_else(|| Error::Spawn {
        command: command.to_string(),
        source: io::Error::other("stdout not captured"),
    })?;

    let mut reader = BufReader::new(stdout);
    let mut vars = BootEnvVars::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();

        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| Error::Io {
                command: command.to_string(),
                source,
            })?;

        if read == 0 {
            break;
        }

        let line = trim_line_end(&buf);
        let malformed = || Error::Parse {
            command: command.to_string(),
            line: String::from_utf8_lossy(line).into_owned(),
        };

        let line = std::str::from_utf8(line).map_err(|_| malformed())?;

        debug!("uboot_env: have variable: {line}");

        if line.is_empty() {
            continue;
        }

        let (key, value) = parse_line(line).ok_or_else(malformed)?;

        vars.insert(key.to_string(), value.to_string());
    }

    Ok(vars)
}

/// Splits `KEY=VALUE` on the first `=`. The value may contain further `=`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('=').filter(|(key, _)| !key.is_empty())
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
