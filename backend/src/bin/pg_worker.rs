//! Out-of-process PostgreSQL lifecycle runner for the embedded test cluster.
//!
//! When the Diesel suites run as root, `pg_embedded_setup_unpriv` drops
//! privileges by re-launching this binary as `pg_worker <setup|start|stop>
//! <payload.json>`. The payload carries the cluster settings and the
//! environment the worker must apply before touching PostgreSQL.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    run(env::args_os())
}

fn run(mut args: impl Iterator<Item = OsString>) -> Result<()> {
    let _program = args.next();
    let command = Command::parse(
        &args
            .next()
            .ok_or_else(|| eyre!("missing command; expected setup, start or stop"))?,
    )?;
    let payload_path = PathBuf::from(
        args.next()
            .ok_or_else(|| eyre!("missing payload path after '{command}'"))?,
    );
    if let Some(extra) = args.next() {
        return Err(eyre!(
            "unexpected argument '{}' after the payload path",
            extra.to_string_lossy()
        ));
    }

    let payload = read_payload(&payload_path)?;
    perform(command, payload)
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("reading payload {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("decoding payload {}", path.display()))
}

fn perform(command: Command, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("rebuilding cluster settings"))?;
    export_environment(payload.environment);

    // Single-threaded so the environment writes above cannot race.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building worker runtime")?;

    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match command {
                Command::Setup => postgres.setup().await,
                Command::Start => postgres.start().await,
                Command::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgres {command} failed"))
}

fn export_environment(variables: Vec<(String, Option<PlainSecret>)>) {
    for (key, value) in variables {
        // SAFETY: runs before the runtime exists, while the process has one thread.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Setup,
    Start,
    Stop,
}

impl Command {
    fn parse(raw: &OsStr) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown command '{other}'; expected setup, start or stop"
            )),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(values: &[&str]) -> impl Iterator<Item = OsString> {
        values
            .iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[rstest]
    #[case("setup", Command::Setup)]
    #[case("start", Command::Start)]
    #[case("stop", Command::Stop)]
    fn known_commands_parse(#[case] raw: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(OsStr::new(raw)).expect("known"), expected);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = Command::parse(OsStr::new("restart")).expect_err("unknown");
        assert!(err.to_string().contains("unknown command 'restart'"));
    }

    #[test]
    fn trailing_arguments_are_rejected() {
        let err = run(args(&["pg_worker", "start", "/tmp/payload.json", "again"]))
            .expect_err("extra argument");
        assert!(err.to_string().contains("unexpected argument 'again'"));
    }

    #[test]
    fn missing_payload_path_is_reported() {
        let err = run(args(&["pg_worker", "stop"])).expect_err("no payload");
        assert!(err.to_string().contains("missing payload path"));
    }
}
