//! Command-line interface for operating the registry.

use std::time::Duration;

use chrono::Datelike;
use clap::{Parser, Subcommand};
use ihu_regnum::{classify, IdentifierClass};
use serde::Serialize;
use sqlx::PgPool;

use crate::allocation::{import_numbers, list_issued_numbers, preview_next_number};
use crate::audit::audit_numbers;
use crate::config::RegistryConfig;
use crate::db;
use crate::error::Result;
use crate::models::{NewRegistration, NewUser, RecordKind};
use crate::registrations::create_registration;
use crate::users::create_user;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL: Duration = Duration::from_secs(2);

/// IHU registry - issue and inspect registration numbers.
#[derive(Parser)]
#[command(name = "ihu-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending database migrations.
    Migrate,

    /// Show the number the next registration would receive.
    Next {
        /// Calendar year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Report current, legacy and foreign numbers in the ledger.
    Audit {
        /// Also list every issued number
        #[arg(long)]
        list: bool,
    },

    /// Record historical numbers so they are never issued again.
    Import {
        /// Record kind the numbers belong to (registration or user)
        #[arg(short, long, default_value = "registration")]
        kind: RecordKind,

        /// Numbers to import
        #[arg(required = true)]
        numbers: Vec<String>,
    },

    /// Register a student.
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        course: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Create a user on behalf of an administrator.
    AddUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Administrator creating the user
        #[arg(long, default_value = "admin")]
        created_by: String,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Check whether an identifier is a current-format registration number.
    Parse { identifier: String },
}

/// Run the CLI.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse { identifier } => {
            parse_command(&identifier);
            Ok(())
        }
        Commands::Migrate => {
            let (pool, _) = connect().await?;
            db::run_migrations(&pool).await?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Next { year } => {
            let (pool, _) = connect().await?;
            let number = preview_next_number(&pool, year.unwrap_or_else(current_year)).await?;
            println!("{number}");
            Ok(())
        }
        Commands::Audit { list } => {
            let (pool, _) = connect().await?;
            print_json(&audit_numbers(&pool).await?)?;
            if list {
                print_json(&list_issued_numbers(&pool).await?)?;
            }
            Ok(())
        }
        Commands::Import { kind, numbers } => {
            let (pool, _) = connect().await?;
            let imported = import_numbers(&pool, kind, &numbers).await?;
            println!("Imported {imported} new number(s)");
            Ok(())
        }
        Commands::Register {
            name,
            email,
            phone,
            course,
            year,
        } => {
            let (pool, config) = connect().await?;
            let mut req = NewRegistration::new(name, email);
            if let Some(phone) = phone {
                req = req.with_phone(phone);
            }
            if let Some(course) = course {
                req = req.with_course(course);
            }
            let registration =
                create_registration(&pool, &config.retry, year.unwrap_or_else(current_year), req)
                    .await?;
            print_json(&registration)
        }
        Commands::AddUser {
            name,
            email,
            created_by,
            year,
        } => {
            let (pool, config) = connect().await?;
            let req = NewUser::new(name, email).created_by(created_by);
            let user =
                create_user(&pool, &config.retry, year.unwrap_or_else(current_year), req).await?;
            print_json(&user)
        }
    }
}

fn parse_command(identifier: &str) {
    match classify(identifier) {
        IdentifierClass::Current(number) => println!(
            "{number}: current format, year suffix {:02}, sequence {}",
            number.year_suffix(),
            number.sequence()
        ),
        IdentifierClass::Legacy => {
            println!("{identifier}: legacy format, ignored when allocating")
        }
        IdentifierClass::Foreign => println!("{identifier}: not a registration number"),
    }
}

async fn connect() -> Result<(PgPool, RegistryConfig)> {
    let config = RegistryConfig::from_env()?;
    let pool = db::connect_with_retry(&config, CONNECT_ATTEMPTS, CONNECT_INTERVAL).await?;
    Ok((pool, config))
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
