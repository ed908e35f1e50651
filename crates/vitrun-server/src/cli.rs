//! Command line front end.
//!
//! Procedure subcommands and their flags are generated from registry
//! metadata: `vitrun <namespace> <name> [flags]`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use serde_json::Value;
use vitrun_core::ProcedurePath;

use crate::config::{ServerConfig, DEFAULT_ADDR};
use crate::registry::{ArgType, JsonObject, Procedure, ProcedureMeta, ProcedureRegistry};

/// Options shared by every subcommand. Given before the subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Program used to launch the runner [default: npx]
    #[arg(long)]
    pub runner_program: Option<String>,

    /// Argument placed before the vitest subcommand (repeatable) [default: vitest]
    #[arg(long = "runner-arg", allow_hyphen_values = true)]
    pub runner_args: Vec<String>,

    /// Kill `vitest run` calls that take longer than this many seconds
    #[arg(long)]
    pub run_timeout_secs: Option<u64>,
}

impl GlobalArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(program) = &self.runner_program {
            config.runner.program = program.clone();
        }
        if !self.runner_args.is_empty() {
            config.runner.base_args = self.runner_args.clone();
        }
        if let Some(secs) = self.run_timeout_secs {
            config.run_timeout = Some(Duration::from_secs(secs));
        }
        config
    }
}

/// Arguments of `vitrun serve`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// HTTP and MCP bind address
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: String,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Serve the registry over HTTP and MCP.
    Serve(ServeArgs),

    /// Call one procedure and print its output.
    Call { path: ProcedurePath, input: Value },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub global: GlobalArgs,
    pub invocation: Invocation,
}

impl Cli {
    /// Parse `args` (including the binary name) against `registry`.
    pub fn try_parse_from<I, T>(registry: &ProcedureRegistry, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = build_command(registry);
        let matches = command.try_get_matches_from_mut(args)?;
        let global = GlobalArgs::from_arg_matches(&matches)?;

        let invocation = match matches.subcommand() {
            Some(("serve", serve)) => Invocation::Serve(ServeArgs::from_arg_matches(serve)?),
            Some((namespace, procedures)) => {
                let Some((name, flags)) = procedures.subcommand() else {
                    return Err(command.error(ErrorKind::MissingSubcommand, "Missing procedure name"));
                };
                let procedure = ProcedurePath::new(namespace, name)
                    .ok()
                    .and_then(|path| registry.get(&path));
                let Some(procedure) = procedure else {
                    return Err(command.error(
                        ErrorKind::InvalidSubcommand,
                        format!("Unknown procedure: {namespace}.{name}"),
                    ));
                };
                Invocation::Call {
                    path: procedure.path().clone(),
                    input: input_from_matches(procedure.meta(), flags),
                }
            }
            None => {
                return Err(command.error(ErrorKind::MissingSubcommand, "Missing subcommand"));
            }
        };

        Ok(Self { global, invocation })
    }
}

/// Build the full command tree for `registry`.
pub fn build_command(registry: &ProcedureRegistry) -> Command {
    let mut namespaces: BTreeMap<&str, Vec<&Procedure>> = BTreeMap::new();
    for procedure in registry.procedures() {
        namespaces
            .entry(procedure.path().namespace())
            .or_default()
            .push(procedure);
    }

    let serve = ServeArgs::augment_args(
        Command::new("serve").about("Serve procedures over HTTP and MCP"),
    );

    let command = Command::new("vitrun")
        .about("Run vitest as structured, remote-callable procedures")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(serve);

    namespaces
        .into_iter()
        .fold(GlobalArgs::augment_args(command), |command, (namespace, procedures)| {
            command.subcommand(
                Command::new(namespace.to_string())
                    .about(format!("{namespace} procedures"))
                    .subcommand_required(true)
                    .subcommands(procedures.into_iter().map(procedure_command)),
            )
        })
}

fn procedure_command(procedure: &Procedure) -> Command {
    let meta = procedure.meta();
    let command = Command::new(procedure.path().name().to_string()).about(meta.description.clone());

    meta.args.iter().fold(command, |command, arg| {
        let mut flag = Arg::new(arg.name.clone())
            .long(arg.name.clone())
            .help(arg.description.clone());
        flag = match arg.kind {
            ArgType::Boolean => flag.action(ArgAction::SetTrue),
            ArgType::String => flag.action(ArgAction::Set),
            ArgType::Array => flag.action(ArgAction::Append),
        };
        if let Some(short) = meta.short_for(&arg.name) {
            flag = flag.short(short);
        }
        command.arg(flag)
    })
}

/// Turn parsed flags into a procedure input object.
///
/// Flags that were not given are left out, so the input validator applies
/// its own defaults.
pub fn input_from_matches(meta: &ProcedureMeta, matches: &ArgMatches) -> Value {
    let mut input = JsonObject::new();

    for arg in &meta.args {
        let name = arg.name.as_str();
        let value = match arg.kind {
            ArgType::Boolean => matches.get_flag(name).then_some(Value::Bool(true)),
            ArgType::String => matches
                .get_one::<String>(name)
                .map(|v| Value::String(v.clone())),
            ArgType::Array => matches
                .get_many::<String>(name)
                .map(|values| values.cloned().map(Value::String).collect()),
        };
        if let Some(value) = value {
            input.insert(arg.name.clone(), value);
        }
    }

    Value::Object(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::build_registry;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let registry = build_registry(&ServerConfig::default()).unwrap();
        Cli::try_parse_from(&registry, args)
    }

    fn call_input(args: &[&str]) -> Value {
        match parse(args).unwrap().invocation {
            Invocation::Call { input, .. } => input,
            other => panic!("Expected a call, got {other:?}"),
        }
    }

    #[test]
    fn test_command_is_well_formed() {
        let registry = build_registry(&ServerConfig::default()).unwrap();
        build_command(&registry).debug_assert();
    }

    #[test]
    fn test_run_flags_build_input() {
        let input = call_input(&[
            "vitrun", "vitest", "run", "-c", "--include", "a", "--include", "b",
            "--reporter", "verbose", "--passWithNoTests",
        ]);

        assert_eq!(
            input,
            json!({
                "include": ["a", "b"],
                "coverage": true,
                "reporter": "verbose",
                "passWithNoTests": true
            })
        );
    }

    #[test]
    fn test_no_flags_is_empty_input() {
        let cli = parse(&["vitrun", "vitest", "run"]).unwrap();
        assert_eq!(cli.global, GlobalArgs::default());
        assert_eq!(
            cli.invocation,
            Invocation::Call {
                path: ProcedurePath::new("vitest", "run").unwrap(),
                input: json!({}),
            }
        );
    }

    #[test]
    fn test_watch_flags() {
        let input = call_input(&[
            "vitrun", "vitest", "watch", "--cwd", "/repo", "--include", "tests/a.spec",
        ]);
        assert_eq!(input, json!({ "cwd": "/repo", "include": ["tests/a.spec"] }));
    }

    #[test]
    fn test_watch_rejects_run_only_flags() {
        assert!(parse(&["vitrun", "vitest", "watch", "--coverage"]).is_err());
    }

    #[test]
    fn test_unknown_procedure_rejected() {
        assert!(parse(&["vitrun", "vitest", "bench"]).is_err());
        assert!(parse(&["vitrun"]).is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = parse(&["vitrun", "serve"]).unwrap();
        assert_eq!(
            cli.invocation,
            Invocation::Serve(ServeArgs {
                addr: DEFAULT_ADDR.to_string()
            })
        );
    }

    #[test]
    fn test_global_args_override_config() {
        let cli = parse(&[
            "vitrun",
            "--runner-program",
            "pnpm",
            "--runner-arg",
            "exec",
            "--runner-arg",
            "vitest",
            "--run-timeout-secs",
            "30",
            "serve",
            "--addr",
            "0.0.0.0:8080",
        ])
        .unwrap();

        let config = cli.global.apply(ServerConfig::default());
        assert_eq!(config.runner.program, "pnpm");
        assert_eq!(config.runner.base_args, ["exec", "vitest"]);
        assert_eq!(config.run_timeout, Some(Duration::from_secs(30)));

        match cli.invocation {
            Invocation::Serve(serve) => assert_eq!(serve.addr, "0.0.0.0:8080"),
            other => panic!("Expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_without_flags_keeps_defaults() {
        let config = GlobalArgs::default().apply(ServerConfig::default());
        assert_eq!(config.runner, ServerConfig::default().runner);
        assert!(config.run_timeout.is_none());
    }
}
