pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_DSN_PASSWORD: &str = "dsn-password";
pub const ARG_MAX_CONNECTIONS: &str = "max-connections";
pub const ARG_STORE_TIMEOUT: &str = "store-timeout";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!(
            "{} - {}",
            env!("CARGO_PKG_VERSION"),
            crate::warden::GIT_COMMIT_HASH
        )
        .into_boxed_str(),
    );

    let command = Command::new("warden")
        .about("Credential authentication and account registration")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("WARDEN_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("User store connection string")
                .long_help(
                    "User store connection string: postgres://user@host:5432/db, or memory:// for a process-local store.",
                )
                .env("WARDEN_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DSN_PASSWORD)
                .long("dsn-password")
                .help("Database password, injected into the DSN")
                .env("WARDEN_DSN_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MAX_CONNECTIONS)
                .long("max-connections")
                .help("Maximum number of database connections")
                .default_value("5")
                .env("WARDEN_MAX_CONNECTIONS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_STORE_TIMEOUT)
                .long("store-timeout")
                .help("Seconds to wait for a user store call before failing it")
                .default_value("5")
                .env("WARDEN_STORE_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        );

    logging::with_args(command)
}
