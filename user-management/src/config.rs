//! Command line configuration for `user-admin`

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Url;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::action::Action;
use crate::api::ClientConfig;
use crate::middleware::NotificationConfig;
use crate::model::{PageRequest, User};

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 2000;

/// User administration client
#[derive(Parser, Debug)]
#[command(name = "user-admin")]
#[command(about = "Manage users through the admin REST API")]
pub struct Args {
    /// Base URL of the backend
    #[arg(long, env = "USER_ADMIN_BASE_URL", default_value = "http://localhost:8080/")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "USER_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Translation catalog (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Translation prefix of entity field names
    #[arg(long, default_value = "jhtestApp")]
    pub app_prefix: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List users
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Sort order, e.g. `login,asc`; pagination is only sent with a sort
        #[arg(long)]
        sort: Option<String>,
        /// Use the public endpoint instead of the admin one
        #[arg(long)]
        public: bool,
    },
    /// List the available authorities
    Roles,
    /// Show one user
    Get { login: String },
    /// Create a user
    Create(UserFields),
    /// Update a user
    Update {
        /// Id of the user to update
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user
    Delete { login: String },
}

/// Editable user fields.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    #[arg(long)]
    pub login: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, default_value = "en")]
    pub lang_key: String,
    /// Granted authority; repeat for several
    #[arg(long = "authority")]
    pub authorities: Vec<String>,
    /// Create or leave the account deactivated
    #[arg(long)]
    pub deactivated: bool,
}

impl UserFields {
    pub fn into_user(self, id: Option<i64>) -> User {
        User {
            id,
            login: self.login,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            activated: !self.deactivated,
            lang_key: self.lang_key,
            authorities: self.authorities,
            ..User::default()
        }
    }
}

impl Command {
    /// The intent action this command dispatches.
    pub fn into_action(self) -> Action {
        match self {
            Command::List {
                page,
                size,
                sort,
                public,
            } => {
                let request = PageRequest { page, size, sort };
                if public {
                    Action::UsersFetch(request)
                } else {
                    Action::UsersAdminFetch(request)
                }
            }
            Command::Roles => Action::RolesFetch,
            Command::Get { login } => Action::UserFetch(login),
            Command::Create(fields) => Action::UserCreate(fields.into_user(None)),
            Command::Update { id, fields } => Action::UserUpdate(fields.into_user(Some(id))),
            Command::Delete { login } => Action::UserDelete(login),
        }
    }
}

/// Invalid command line settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    PageSize(u32),

    #[error("login must not be empty")]
    EmptyLogin,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client: ClientConfig,
    pub catalog: Option<PathBuf>,
    pub notification: NotificationConfig,
    pub verbose: bool,
    pub command: Command,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&args.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: args.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        if args.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        validate_command(&args.command)?;

        let mut client =
            ClientConfig::new(base_url).with_timeout(Duration::from_secs(args.timeout));
        if let Some(token) = args.token.filter(|t| !t.is_empty()) {
            client = client.with_token(token);
        }

        Ok(Self {
            client,
            catalog: args.catalog,
            notification: NotificationConfig::default().with_app_prefix(args.app_prefix),
            verbose: args.verbose,
            command: args.command,
        })
    }
}

fn validate_command(command: &Command) -> Result<(), ConfigError> {
    match command {
        Command::List { size, .. } if *size == 0 || *size > MAX_PAGE_SIZE => {
            Err(ConfigError::PageSize(*size))
        }
        Command::Get { login } | Command::Delete { login } if login.trim().is_empty() => {
            Err(ConfigError::EmptyLogin)
        }
        Command::Create(fields) | Command::Update { fields, .. }
            if fields.login.trim().is_empty() =>
        {
            Err(ConfigError::EmptyLogin)
        }
        _ => Ok(()),
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the `verbose` default.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Already installed (tests, embedding) is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["user-admin", "--base-url", "http://localhost:8080"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_list_command() {
        let config = Config::from_args(parse(&["list", "--sort", "login,asc", "--page", "2"]))
            .unwrap();

        assert_eq!(config.client.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(
            config.command.into_action(),
            Action::UsersAdminFetch(PageRequest::new(2, 20).sorted("login,asc"))
        );

        let public = parse(&["list", "--public"]).command.into_action();
        assert_eq!(public, Action::UsersFetch(PageRequest::default()));
    }

    #[test]
    fn test_create_and_update_commands() {
        let create = parse(&[
            "create",
            "--login",
            "alice",
            "--email",
            "alice@example.com",
            "--authority",
            "ROLE_USER",
            "--authority",
            "ROLE_ADMIN",
        ])
        .command
        .into_action();

        let Action::UserCreate(user) = create else {
            panic!("expected UserCreate, got {create:?}");
        };
        assert_eq!(user.id, None);
        assert_eq!(user.login, "alice");
        assert_eq!(user.authorities, vec!["ROLE_USER", "ROLE_ADMIN"]);
        assert!(user.activated);
        assert_eq!(user.lang_key, "en");

        let update = parse(&["update", "--id", "7", "--login", "bob", "--deactivated"])
            .command
            .into_action();
        let Action::UserUpdate(user) = update else {
            panic!("expected UserUpdate, got {update:?}");
        };
        assert_eq!(user.id, Some(7));
        assert!(!user.activated);
    }

    #[test]
    fn test_token_and_prefix() {
        let config = Config::from_args(parse(&[
            "--token",
            "secret",
            "--app-prefix",
            "myApp",
            "roles",
        ]))
        .unwrap();

        assert_eq!(config.client.token.as_deref(), Some("secret"));
        assert_eq!(config.notification.app_prefix, "myApp");
        assert_eq!(config.command.into_action(), Action::RolesFetch);
    }

    #[test]
    fn test_invalid_settings() {
        let mut args = parse(&["roles"]);
        args.base_url = "not a url".into();
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let mut args = parse(&["roles"]);
        args.base_url = "ftp://example.com".into();
        assert_eq!(
            Config::from_args(args).unwrap_err(),
            ConfigError::UnsupportedScheme("ftp".into())
        );

        let mut args = parse(&["roles"]);
        args.timeout = 0;
        assert_eq!(Config::from_args(args).unwrap_err(), ConfigError::ZeroTimeout);

        let args = parse(&["list", "--size", "0"]);
        assert_eq!(Config::from_args(args).unwrap_err(), ConfigError::PageSize(0));

        let args = parse(&["delete", " "]);
        assert_eq!(Config::from_args(args).unwrap_err(), ConfigError::EmptyLogin);
    }
}
