use crate::bootloader_env::{Child, Runner};
use env_logger::{Builder, Env};
use lazy_static::lazy_static;
use std::{
    collections::BTreeMap,
    io::{self, Cursor, Read},
    os::unix::process::ExitStatusExt,
    process::ExitStatus,
    sync::{Mutex, MutexGuard},
};

lazy_static! {
    static ref LOG: () = if cfg!(debug_assertions) {
        let _ = Builder::from_env(Env::default().default_filter_or("debug"))
            .is_test(true)
            .try_init();
    } else {
        let _ = Builder::from_env(Env::default().default_filter_or("info"))
            .is_test(true)
            .try_init();
    };
    static ref PROCESS_LOCK: Mutex<()> = Mutex::new(());
}

pub fn init_log() {
    lazy_static::initialize(&LOG);
}

/// Serializes tests which fork real processes. Forking while another test
/// holds a freshly written script open for writing makes exec fail with
/// ETXTBSY.
pub fn process_lock() -> MutexGuard<'static, ()> {
    PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Exit status of a process that returned `code`.
pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

/// Child which prints canned output and exits with a canned status.
pub struct FakeChild {
    stdout: Option<Vec<u8>>,
    status: ExitStatus,
}

impl FakeChild {
    pub fn new(stdout: &str, code: i32) -> Self {
        FakeChild {
            stdout: Some(stdout.as_bytes().to_vec()),
            status: exit_status(code),
        }
    }
}

impl Child for FakeChild {
    fn take_stdout(&mut self) -> Option<Box<dyn Read>> {
        self.stdout
            .take()
            .map(|out| Box::new(Cursor::new(out)) as Box<dyn Read>)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Ok(self.status)
    }
}

/// Runner returning the same canned output for every invocation.
pub struct FakeRunner {
    stdout: String,
    code: i32,
}

impl FakeRunner {
    pub fn new(stdout: &str, code: i32) -> Self {
        FakeRunner {
            stdout: stdout.to_string(),
            code,
        }
    }
}

impl Runner for FakeRunner {
    fn spawn(&self, _program: &str, _args: &[String]) -> io::Result<Box<dyn Child>> {
        Ok(Box::new(FakeChild::new(&self.stdout, self.code)))
    }
}

/// Runner behaving like a well-behaved fw_printenv/fw_setenv pair backed by
/// an in-memory environment.
pub struct EchoRunner {
    env: Mutex<BTreeMap<String, String>>,
}

impl EchoRunner {
    pub fn new() -> Self {
        EchoRunner {
            env: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Runner for EchoRunner {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn Child>> {
        let mut env = self.env.lock().unwrap();

        let child = match (program, args) {
            ("fw_setenv", [name, value]) => {
                env.insert(name.clone(), value.clone());
                FakeChild::new("", 0)
            }
            ("fw_setenv", [name]) => {
                env.remove(name);
                FakeChild::new("", 0)
            }
            ("fw_printenv", []) => FakeChild::new(
                &env.iter().map(|(k, v)| format!("{k}={v}\n")).collect::<String>(),
                0,
            ),
            ("fw_printenv", names) => {
                let mut out = String::new();
                for name in names {
                    match env.get(name) {
                        Some(value) => out.push_str(&format!("{name}={value}\n")),
                        None => return Ok(Box::new(FakeChild::new(&out, 1))),
                    }
                }
                FakeChild::new(&out, 0)
            }
            _ => return Err(io::Error::from(io::ErrorKind::NotFound)),
        };

        Ok(Box::new(child))
    }
}
