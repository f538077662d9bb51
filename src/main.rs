use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde_json::{Map, Value};
use std::path::PathBuf;

use weapp_api::client::memory::FixedCodeLogin;
use weapp_api::client::native::{native_host, CliLogin, StdinLogin};
use weapp_api::error::{ErrorKind, Result};
use weapp_api::{ApiClient, ApiConfig, Method, RequestOptions, Response};

#[derive(Parser, Debug)]
#[command(name = "weapp-api", about = "Talk to the mini-program API from a terminal")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Server base URL, overrides the configuration and `WEAPP_API_HOST`
    #[arg(long)]
    host: Option<String>,

    /// File the session is persisted in
    #[arg(long, default_value = "weapp_storage.json")]
    storage: PathBuf,

    /// Login code; prompted on stdin when a login is needed and this is absent
    #[arg(long)]
    code: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Path relative to the host, e.g. `topics`
    path: String,

    #[arg(long, short, default_value = "GET")]
    method: Method,

    /// JSON body (query string for GET)
    #[arg(long, short)]
    data: Option<String>,

    /// Extra header, `Name: value`
    #[arg(long = "header", short = 'H')]
    headers: Vec<String>,

    #[arg(long)]
    no_loading: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plain request
    Request(RequestArgs),
    /// Request carrying the cached bearer token
    AuthRequest(RequestArgs),
    /// Log in with a login code
    Login {
        /// Extra body field, `key=value`
        #[arg(long = "param", short)]
        params: Vec<String>,
    },
    /// Refresh the cached token
    Refresh,
    /// Print the current token, refreshing it if stale
    Token,
    /// Revoke the cached token and clear storage
    Logout,
}

impl RequestArgs {
    fn to_options(&self) -> Result<RequestOptions> {
        let mut options = RequestOptions::new(self.path.as_str()).method(self.method);
        if let Some(data) = &self.data {
            options = options.data(serde_json::from_str(data)?);
        }
        for raw in &self.headers {
            let (name, value) = raw.split_once(':').ok_or_else(|| {
                ErrorKind::ParseError(format!("Header must look like `Name: value`: {raw}"))
            })?;
            options = options.header(name.trim(), value.trim());
        }
        Ok(options)
    }
}

fn parse_params(raw: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for pair in raw {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ErrorKind::ParseError(format!("Parameter must look like `key=value`: {pair}"))
        })?;
        params.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(params)
}

fn print_response(response: &Response) -> Result<()> {
    println!("Status: {}", response.status_code);
    println!("{}", serde_json::to_string_pretty(&response.data)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ApiConfig::load(path)?,
        None => ApiConfig::default(),
    }
    .with_env_overrides();
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }

    let login = match &cli.code {
        Some(code) => CliLogin::Fixed(FixedCodeLogin::new(code.as_str())),
        None => CliLogin::Stdin(StdinLogin),
    };
    let host = native_host(&config, login, &cli.storage)?;
    let client = ApiClient::new(host, config);

    match cli.command {
        Command::Request(args) => {
            let response = client.request(args.to_options()?, !args.no_loading).await?;
            print_response(&response)?;
        }
        Command::AuthRequest(args) => {
            let response = client
                .auth_request(args.to_options()?, !args.no_loading)
                .await?;
            print_response(&response)?;
        }
        Command::Login { params } => {
            let response = client.login(parse_params(&params)?).await?;
            print_response(&response)?;
        }
        Command::Refresh => {
            let token = weapp_api::app::SessionStore::new(client.host())
                .access_token()
                .ok_or_else(|| ErrorKind::HostError("No cached token to refresh".to_string()))?;
            let response = client.refresh_token(&token).await?;
            print_response(&response)?;
        }
        Command::Token => match client.get_token().await? {
            Some(token) => println!("{token}"),
            None => println!("No token cached; run `login` first"),
        },
        Command::Logout => {
            let response = client.logout().await?;
            print_response(&response)?;
        }
    }

    Ok(())
}
