//! Create an account, or reset the password of an existing one.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead};

use backend::domain::ports::CredentialRepository;
use backend::domain::{PasswordHash, UserCredential, UserId, Username};
use backend::outbound::persistence::{
    DbPool, DieselCredentialRepository, PoolConfig, run_pending_migrations,
};
use clap::Parser;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

/// `provision-user` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "provision-user",
    about = "Create a login account or replace its password",
    version
)]
struct CliArgs {
    /// Login name to create or update.
    #[arg(long, value_name = "name")]
    username: String,
    /// Read the password from the first line of stdin instead of
    /// `PROVISION_PASSWORD`.
    #[arg(long = "password-stdin")]
    password_stdin: bool,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

const PASSWORD_ENV: &str = "PROVISION_PASSWORD";

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let username = Username::new(&args.username)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let password = if args.password_stdin {
        read_password(io::stdin().lock())?
    } else {
        password_from_env()?
    };
    let password_hash = PasswordHash::hash(&password)
        .map_err(|error| io::Error::other(format!("hash password: {error}")))?;

    let database_url = resolve_database_url(args.database_url)?;
    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(error.to_string()))?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let stored = DieselCredentialRepository::new(pool)
        .upsert(&UserCredential {
            id: UserId::random(),
            username,
            password_hash,
        })
        .await
        .map_err(|error| io::Error::other(format!("store credential: {error}")))?;

    println!("user_id={}", stored.id);
    println!("username={}", stored.username);
    Ok(())
}

fn read_password(mut reader: impl BufRead) -> io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    reader.read_line(&mut line)?;
    validate_password(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned()))
}

fn password_from_env() -> io::Result<Zeroizing<String>> {
    let value = env::var(PASSWORD_ENV).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "password missing: pass --password-stdin or set PROVISION_PASSWORD",
        )
    })?;
    validate_password(Zeroizing::new(value))
}

fn validate_password(password: Zeroizing<String>) -> io::Result<Zeroizing<String>> {
    if password.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "password must not be empty",
        ));
    }
    Ok(password)
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
