//! autolink - autolink rule administration and message rewriting
//!
//! # Usage
//!
//! ```bash
//! # Rewrite a message (reads a JSON post from stdin, writes JSON to stdout)
//! echo '{"message":"Fixed MM-123","channel_id":"c1","user_id":"u1"}' | autolink
//!
//! # Administer the rule list in the config file
//! autolink add Jira
//! autolink set Jira pattern '(?P<key>MM-\d+)'
//! autolink test Jira 'sample MM-123 text'
//! autolink list
//! ```

use std::env;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use serde::Serialize;

use autolink_engine::{
    command, config::Config, engine::Autolinker, resolver::StaticResolver, rewriter::Post,
    store::FileStore,
};

/// Print version information
fn print_version() {
    println!("autolink {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"autolink - autolink rule administration and message rewriting

USAGE:
    autolink [OPTIONS]                rewrite a JSON post read from stdin
    autolink [OPTIONS] <COMMAND...>  run an admin command (list, add, delete,
                                     enable, disable, set, test, help)

OPTIONS:
    -h, --help           Print this help message
    -v, --version        Print version information
    -c, --config PATH    Path to config file
        --channel NAME   Channel name used for rule scoping
        --team NAME      Team name used for rule scoping
        --bot            Treat the message author as a bot account
        --update         Treat the message as an edit of an existing post
                         (only rewritten when enable_on_update is set)

INPUT:
    {{"message": "...", "channel_id": "...", "user_id": "..."}}

OUTPUT:
    {{"message": "...", "hashtags": "...", "changed": true}}
"#
    );
}

/// Parsed command line arguments
struct Args {
    help: bool,
    version: bool,
    config_path: Option<String>,
    channel: String,
    team: String,
    bot: bool,
    update: bool,
    command: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let argv: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            config_path: None,
            channel: String::new(),
            team: String::new(),
            bot: false,
            update: false,
            command: Vec::new(),
        };

        let mut i = 1;
        while i < argv.len() {
            match argv[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "--bot" => result.bot = true,
                "--update" => result.update = true,
                "-c" | "--config" => {
                    if i + 1 < argv.len() {
                        i += 1;
                        result.config_path = Some(argv[i].clone());
                    }
                }
                "--channel" => {
                    if i + 1 < argv.len() {
                        i += 1;
                        result.channel = argv[i].clone();
                    }
                }
                "--team" => {
                    if i + 1 < argv.len() {
                        i += 1;
                        result.team = argv[i].clone();
                    }
                }
                arg if arg.starts_with("--config=") => {
                    result.config_path = Some(arg.trim_start_matches("--config=").to_string());
                }
                _ => {
                    // First positional argument starts the admin command
                    result.command = argv[i..].to_vec();
                    break;
                }
            }
            i += 1;
        }

        result
    }
}

/// Re-quote an argument the shell already split, so the command tokenizer
/// sees one token per argument.
fn quote_arg(arg: &str) -> String {
    if arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"' || c == '\\') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}

#[derive(Serialize)]
struct RewriteOutput {
    message: String,
    hashtags: String,
    changed: bool,
}

fn config_path(args: &Args) -> PathBuf {
    match &args.config_path {
        Some(path) => Config::expand_path(path),
        // Same probe order as Config::load(), so admin commands edit the
        // file rewrite mode actually reads. Fall back to the user path
        // when no config exists yet.
        None => Config::find().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("autolink/config.toml")
        }),
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    if args.help {
        print_help();
        return;
    }
    if args.version {
        print_version();
        return;
    }

    let config = if let Some(ref path) = args.config_path {
        match Config::load_from(&Config::expand_path(path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Warning: {}", err);
                Config::default()
            }
        }
    } else {
        Config::load()
    };

    // Admin command mode
    if !args.command.is_empty() {
        let store = FileStore::new(config_path(&args));
        let line: Vec<String> = args.command.iter().map(|a| quote_arg(a)).collect();
        println!("{}", command::execute(&store, &config.boundary, &line.join(" ")));
        return;
    }

    // Rewrite mode: one JSON post on stdin, one JSON result on stdout
    let mut input_json = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut input_json) {
        eprintln!("Error: failed to read stdin: {}", err);
        std::process::exit(1);
    }

    if input_json.trim().is_empty() {
        println!("{{}}");
        return;
    }

    let post: Post = match serde_json::from_str(&input_json) {
        Ok(post) => post,
        Err(err) => {
            eprintln!("Error: failed to parse input post: {}", err);
            std::process::exit(1);
        }
    };

    let engine = Autolinker::from_config(&config);
    let resolver = StaticResolver {
        channel_name: args.channel.clone(),
        team_name: args.team.clone(),
        is_bot: args.bot,
    };

    let (out, changed) = if args.update {
        engine.process_update(&post, &resolver, &resolver)
    } else {
        engine.process_post(&post, &resolver, &resolver)
    };
    let output = RewriteOutput {
        message: out.message,
        hashtags: out.hashtags,
        changed,
    };

    let json = serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string());
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}
