mod config;

use std::{
    io::{self, Write},
    str::FromStr,
};

use anyhow::Result;
use clap::Parser;
use client_core::{EntryKind, LedgerClient};
use rust_decimal::Decimal;
use shared::{domain::TransferDirection, protocol::Operation};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "console", about = "Terminal client for the remote ledger service")]
struct Args {
    /// Base URL of the ledger service; overrides console.toml and environment.
    #[arg(long)]
    server_url: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Users,
    Login(String),
    Logout,
    Balance,
    Refresh,
    Submit(Operation),
    Activity,
    Help,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);

    let client = LedgerClient::new(server_url);

    match client.fetch_users().await {
        Ok(users) => println!("Available identities: {}", users.join(", ")),
        Err(err) => eprintln!("Failed to load users: {err}"),
    }
    println!("Type 'help' for the command list.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&client).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&client, command).await,
            Err(message) => println!("✗ {message}"),
        }
        show_notification(&client).await;
    }

    Ok(())
}

async fn prompt(client: &LedgerClient) -> Result<()> {
    match client.identity().await {
        Some(identity) => print!("{identity}> "),
        None => print!("> "),
    }
    io::stdout().flush()?;
    Ok(())
}

async fn run_command(client: &LedgerClient, command: Command) {
    match command {
        Command::Users => match client.fetch_users().await {
            Ok(users) => println!("Available identities: {}", users.join(", ")),
            Err(err) => println!("Failed to load users: {err}"),
        },
        Command::Login(identity) => {
            // A failed initial refresh is already surfaced as a notification.
            let _ = client.login(&identity).await;
            render_balance(client).await;
        }
        Command::Logout => {
            client.logout().await;
            println!("Logged out");
        }
        Command::Balance => render_balance(client).await,
        Command::Refresh => {
            let _ = client.refresh_balance().await;
            render_balance(client).await;
        }
        Command::Submit(operation) => {
            // Outcomes land in the notification slot and the activity log.
            let _ = client.submit(operation).await;
        }
        Command::Activity => render_activity(client).await,
        Command::Help => print_help(),
        Command::Quit => {}
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Err("type 'help' for the command list".to_string());
    };

    match keyword {
        "users" => Ok(Command::Users),
        "login" => match parts.next() {
            Some(identity) => Ok(Command::Login(identity.to_string())),
            None => Err("usage: login <identity>".to_string()),
        },
        "logout" => Ok(Command::Logout),
        "balance" => Ok(Command::Balance),
        "refresh" => Ok(Command::Refresh),
        "deposit" => Ok(Command::Submit(Operation::Deposit {
            amount: parse_amount(parts.next())?,
        })),
        "withdraw" => Ok(Command::Submit(Operation::Withdraw {
            amount: parse_amount(parts.next())?,
        })),
        "send" => {
            let recipient = parts
                .next()
                .ok_or_else(|| "Please select a recipient".to_string())?;
            Ok(Command::Submit(Operation::Send {
                recipient: recipient.to_string(),
                amount: parse_amount(parts.next())?,
            }))
        }
        "transfer" => {
            // The keyword names the destination bucket.
            let direction = match parts.next() {
                Some("investment") => TransferDirection::SavingsToInvestment,
                Some("savings") => TransferDirection::InvestmentToSavings,
                _ => return Err("Please select a direction".to_string()),
            };
            Ok(Command::Submit(Operation::Transfer {
                direction,
                amount: parse_amount(parts.next())?,
            }))
        }
        "invest" => {
            // Fund names may contain spaces; the amount is the last token.
            let rest: Vec<&str> = parts.collect();
            let Some((amount_raw, fund_parts)) = rest.split_last() else {
                return Err("Please select a fund".to_string());
            };
            if fund_parts.is_empty() {
                return Err("Please select a fund".to_string());
            }
            Ok(Command::Submit(Operation::Invest {
                fund: fund_parts.join(" "),
                amount: parse_amount(Some(amount_raw))?,
            }))
        }
        "liquidate" => Ok(Command::Submit(Operation::LiquidateInvestments)),
        "activity" => Ok(Command::Activity),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

/// Unparsable input gets the same message a non-positive amount would: the
/// orchestrator only ever sees well-formed decimals.
fn parse_amount(raw: Option<&str>) -> Result<Decimal, String> {
    raw.and_then(|raw| Decimal::from_str(raw).ok())
        .ok_or_else(|| "Amount must be positive".to_string())
}

async fn render_balance(client: &LedgerClient) {
    let Some(snapshot) = client.snapshot().await else {
        println!("No balance loaded");
        return;
    };
    println!("  Cash:       {}", money(snapshot.cash));
    println!("  Savings:    {}", money(snapshot.savings_balance));
    println!("  Investment: {}", money(snapshot.investment_balance));
    if !snapshot.funds.is_empty() {
        println!("  Funds:");
        for (fund, amount) in &snapshot.funds {
            println!("    {fund:<20} {}", money(*amount));
        }
    }
}

async fn render_activity(client: &LedgerClient) {
    let activity = client.activity().await;
    if activity.is_empty() {
        println!("No activities yet");
        return;
    }
    for entry in activity {
        println!(
            "  {} [{}] {}",
            entry.timestamp.format("%H:%M:%S"),
            kind_tag(entry.kind),
            entry.message
        );
    }
}

async fn show_notification(client: &LedgerClient) {
    if let Some(notification) = client.current_notification().await {
        let marker = match notification.kind {
            EntryKind::Success => "✓",
            EntryKind::Error => "✗",
            EntryKind::Info => "•",
        };
        println!("{marker} {}", notification.message);
    }
}

fn kind_tag(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Info => "info",
        EntryKind::Success => "ok",
        EntryKind::Error => "err",
    }
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn print_help() {
    println!("Commands:");
    println!("  users                          list identities served by the ledger");
    println!("  login <identity>               start a session");
    println!("  logout                         end the session");
    println!("  balance                        show the last-fetched balance");
    println!("  refresh                        re-fetch the balance");
    println!("  deposit <amount>               deposit into savings");
    println!("  withdraw <amount>              withdraw from savings");
    println!("  send <recipient> <amount>      send money to another user");
    println!("  transfer <savings|investment> <amount>");
    println!("                                 move between savings and investment");
    println!("  invest <fund> <amount>         invest in a fund");
    println!("  liquidate                      withdraw all investments");
    println!("  activity                       show the activity history");
    println!("  quit                           exit");
}
