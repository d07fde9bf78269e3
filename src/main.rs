//! Purpose: `litescope` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Errors on a non-interactive stderr are emitted as JSON.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All store access goes through `api` (scopes + transactions).
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use serde_json::{json, Value as JsonValue};

use litescope::api::{
    run as run_query, run_all, run_scoped, run_transaction, to_exit_code, with_connection, Error,
    ErrorKind, SqliteProvider, Statement, Value,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "litescope",
    version,
    about = "Transaction-safe queries against an embedded SQLite store",
    after_help = r#"EXAMPLES
  $ litescope --db users.db exec "CREATE TABLE users (id INTEGER, age INTEGER)"
  $ litescope --db users.db exec "INSERT INTO users VALUES (?, ?)" 1 30
  $ litescope --db users.db query "SELECT * FROM users WHERE age > ?" 25
  $ litescope --db users.db gather "SELECT * FROM users" "SELECT * FROM users WHERE age > 40"

  Parameters are JSON scalars; anything that does not parse as JSON is
  treated as text."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Path to the SQLite store", value_hint = ValueHint::FilePath)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run a write statement inside a transaction")]
    Exec {
        sql: String,
        #[arg(trailing_var_arg = true)]
        params: Vec<String>,
    },
    #[command(about = "Run a one-shot read and print its rows")]
    Query {
        sql: String,
        #[arg(trailing_var_arg = true)]
        params: Vec<String>,
    },
    #[command(about = "Run several reads concurrently, one connection each")]
    Gather {
        #[arg(required = true)]
        statements: Vec<String>,
    },
}

fn run() -> Result<RunOutcome, Error> {
    let cli = Cli::parse();
    let provider = SqliteProvider::new();

    match cli.command {
        Command::Exec { sql, params } => {
            let statement = Statement::new(sql).with_params(parse_params(&params)?);
            let rows = with_connection(&provider, &cli.db, |conn| {
                run_transaction(conn, |conn| run_query(conn, &statement))
            })?;
            emit_json(json!({ "rows": rows.to_json() }));
            Ok(RunOutcome::ok())
        }
        Command::Query { sql, params } => {
            let statement = Statement::new(sql).with_params(parse_params(&params)?);
            let rows = run_scoped(&provider, &cli.db, &statement)?;
            emit_json(json!({ "rows": rows.to_json() }));
            Ok(RunOutcome::ok())
        }
        Command::Gather { statements } => {
            let statements = statements.into_iter().map(Statement::new).collect();
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            let results = runtime.block_on(run_all(provider, &cli.db, statements))?;
            let results: Vec<JsonValue> = results.iter().map(|set| set.to_json()).collect();
            emit_json(json!({ "results": results }));
            Ok(RunOutcome::ok())
        }
    }
}

fn parse_params(raw: &[String]) -> Result<Vec<Value>, Error> {
    raw.iter()
        .map(|token| match serde_json::from_str::<JsonValue>(token) {
            Ok(parsed) => Value::from_json(&parsed),
            Err(_) => Ok(Value::Text(token.clone())),
        })
        .collect()
}

fn emit_json(value: JsonValue) {
    println!("{value}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }

    let value = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.to_string(),
            "hint": err.hint(),
        }
    });
    let text = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{text}");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
