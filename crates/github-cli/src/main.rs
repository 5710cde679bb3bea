use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use docweave_core::Item;
use github_cli::{
    config::{self, ConfigError, RecordKind, ServiceConfig},
    service::{GithubService, RequestError, RequestOptions},
};

const SERVICE_NAME: &str = "github";

#[derive(Debug, Parser)]
#[command(author, version, about = "GitHub search connector CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search issues, pull requests or commits and print docweave items.
    Search {
        /// Provider search query, passed through verbatim.
        #[arg(long)]
        query: String,
        /// Record kind; overrides the configured GITHUB_CONNECTOR_KIND.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Maximum number of results for this request.
        #[arg(long)]
        max_amount: Option<i64>,
        /// Content line cap for this request; zero or less means unbounded.
        #[arg(long)]
        max_content_lines: Option<i64>,
        /// Id prefix for this request.
        #[arg(long)]
        id_prefix: Option<String>,
        /// Item type label for this request.
        #[arg(long = "type")]
        item_type: Option<String>,
        /// Layout name for this request.
        #[arg(long)]
        layout: Option<String>,
        /// Extra key=value pair carried into every produced item.
        #[arg(long = "option")]
        options: Vec<String>,
        /// Output mode: plain item list JSON or service envelope JSON.
        #[arg(long, value_enum, default_value_t = OutputMode::Items)]
        mode: OutputMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum KindArg {
    Issue,
    PullRequest,
    Commit,
}

impl KindArg {
    fn into_record_kind(self) -> RecordKind {
        match self {
            Self::Issue => RecordKind::Issue,
            Self::PullRequest => RecordKind::PullRequest,
            Self::Commit => RecordKind::Commit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputMode {
    Items,
    ServiceJson,
}

impl Cli {
    fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Search { .. } => "search",
        }
    }

    fn output_mode(&self) -> OutputMode {
        match &self.command {
            Commands::Search { mode, .. } => *mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    User,
    Runtime,
}

#[derive(Debug, PartialEq, Eq)]
struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    fn user(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            message: message.into(),
        }
    }

    fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
        }
    }

    fn from_config(error: ConfigError) -> Self {
        AppError::user(error.to_string())
    }

    fn from_request(error: RequestError) -> Self {
        match error {
            RequestError::MissingQuery => AppError::user(error.to_string()),
            RequestError::Api(api_error) => AppError::runtime(api_error.to_string()),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Runtime => 1,
        }
    }

    fn code(&self) -> &'static str {
        match self.kind {
            ErrorKind::User => "github.user",
            ErrorKind::Runtime => "github.runtime",
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let command = cli.command_name();
    let mode = cli.output_mode();

    match run(cli) {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            match mode {
                OutputMode::ServiceJson => {
                    println!("{}", serialize_service_error(command, &error));
                }
                OutputMode::Items => {
                    eprintln!("error: {}", error.message);
                }
            }
            std::process::exit(error.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<String, AppError> {
    run_with(cli, load_runtime_config, |config, options| {
        GithubService::new(config.clone()).request(options)
    })
}

fn load_runtime_config(kind: Option<RecordKind>) -> Result<ServiceConfig, ConfigError> {
    let mut pairs: Vec<(String, String)> = std::env::vars().collect();
    if let Some(kind) = kind {
        // Pushed last so the flag wins over GITHUB_CONNECTOR_KIND.
        pairs.push((config::KIND_ENV.to_string(), kind.label().to_string()));
    }

    ServiceConfig::from_pairs(SERVICE_NAME, pairs)
}

fn run_with<LoadConfig, Fetch>(
    cli: Cli,
    load_config: LoadConfig,
    fetch: Fetch,
) -> Result<String, AppError>
where
    LoadConfig: Fn(Option<RecordKind>) -> Result<ServiceConfig, ConfigError>,
    Fetch: Fn(&ServiceConfig, &RequestOptions) -> Result<Vec<Item>, RequestError>,
{
    match cli.command {
        Commands::Search {
            query,
            kind,
            max_amount,
            max_content_lines,
            id_prefix,
            item_type,
            layout,
            options,
            mode,
        } => {
            let query = query.trim();
            if query.is_empty() {
                return Err(AppError::user("query must not be empty"));
            }

            let config = load_config(kind.map(KindArg::into_record_kind))
                .map_err(AppError::from_config)?;

            let mut request_options = RequestOptions::default().with("query", query);
            if let Some(value) = max_amount {
                request_options = request_options.with("max_amount", value);
            }
            if let Some(value) = max_content_lines {
                request_options = request_options.with("max_content_lines", value);
            }
            if let Some(value) = id_prefix {
                request_options = request_options.with("id_prefix", value);
            }
            if let Some(value) = item_type {
                request_options = request_options.with("type", value);
            }
            if let Some(value) = layout {
                request_options = request_options.with("layout", value);
            }
            for raw in &options {
                let (key, value) = parse_extra_option(raw)?;
                request_options = request_options.with(key, value);
            }

            let items = fetch(&config, &request_options).map_err(AppError::from_request)?;
            render_items(mode, "search", &items)
        }
    }
}

fn parse_extra_option(raw: &str) -> Result<(String, String), AppError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(AppError::user(format!(
            "invalid --option (expected key=value): {raw}"
        )));
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::user(format!(
            "invalid --option (empty key): {raw}"
        )));
    }

    Ok((key.to_string(), value.to_string()))
}

#[derive(Debug, Serialize)]
struct ServiceErrorEnvelope {
    code: &'static str,
    message: String,
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ServiceEnvelope {
    schema_version: &'static str,
    command: &'static str,
    ok: bool,
    result: Option<Value>,
    error: Option<ServiceErrorEnvelope>,
}

fn render_items(mode: OutputMode, command: &'static str, items: &[Item]) -> Result<String, AppError> {
    match mode {
        OutputMode::Items => serde_json::to_string(items)
            .map_err(|err| AppError::runtime(format!("failed to serialize items: {err}"))),
        OutputMode::ServiceJson => {
            let result = serde_json::to_value(items)
                .map_err(|err| AppError::runtime(format!("failed to serialize items: {err}")))?;
            serde_json::to_string(&ServiceEnvelope {
                schema_version: "v1",
                command,
                ok: true,
                result: Some(result),
                error: None,
            })
            .map_err(|err| {
                AppError::runtime(format!("failed to serialize service envelope: {err}"))
            })
        }
    }
}

fn serialize_service_error(command: &'static str, error: &AppError) -> String {
    let envelope = ServiceEnvelope {
        schema_version: "v1",
        command,
        ok: false,
        result: None,
        error: Some(ServiceErrorEnvelope {
            code: error.code(),
            message: error.message.clone(),
            details: None,
        }),
    };

    serde_json::to_string(&envelope).unwrap_or_else(|serialize_error| {
        serde_json::json!({
            "schema_version": "v1",
            "command": command,
            "ok": false,
            "result": Value::Null,
            "error": {
                "code": "internal.serialize",
                "message": format!("failed to serialize service error envelope: {serialize_error}"),
                "details": Value::Null,
            }
        })
        .to_string()
    })
}
