use std::{error::Error, io::Write};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Currency, Engine, EngineError, MoneyCents, NewTrip};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "tripboard_admin")]
#[command(about = "Admin utilities for Tripboard (bootstrap users/trips)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tripboard.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Trip(Trip),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Trip {
    #[command(subcommand)]
    command: TripCommand,
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    Create(TripCreateArgs),
}

#[derive(Args, Debug)]
struct TripCreateArgs {
    /// E-mail of the organizer.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    destination: String,
    /// YYYY-MM-DD
    #[arg(long)]
    start: NaiveDate,
    /// YYYY-MM-DD
    #[arg(long)]
    end: NaiveDate,
    /// Budget, e.g. `1500.00`.
    #[arg(long)]
    budget: Option<MoneyCents>,
    #[arg(long, default_value = "USD")]
    currency: String,
    /// E-mails to invite, repeatable.
    #[arg(long = "invite")]
    invites: Vec<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn print_line(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < 8 {
            print_line("Password must be at least 8 characters.")?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        print_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            match engine
                .register_user(&args.name, &args.email, &password, Utc::now())
                .await
            {
                Ok(user) => println!("created user: {} ({})", user.email, user.id),
                Err(EngineError::ExistingKey(email)) => {
                    eprintln!("user already exists: {email}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Trip(Trip {
            command: TripCommand::Create(args),
        }) => {
            let owner = match engine.user_by_email(&args.owner).await {
                Ok(owner) => owner,
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!("user not found: {}", args.owner);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            let currency = match Currency::try_from(args.currency.as_str()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let trip = engine
                .create_trip(
                    owner.id,
                    NewTrip {
                        name: args.name,
                        description: None,
                        destination: args.destination,
                        start_date: args.start,
                        end_date: args.end,
                        budget: args.budget,
                        currency: Some(currency),
                        participant_emails: args.invites,
                    },
                    Utc::now(),
                )
                .await?;
            println!("created trip: {} ({})", trip.name, trip.id);
        }
    }

    Ok(())
}
