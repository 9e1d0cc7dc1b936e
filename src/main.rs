mod commands;
mod core;
#[cfg(feature = "mcp")]
mod mcp;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatscout")]
#[command(about = "Natural language search over chat message archives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search an archive with a natural language query
    Search {
        query: String,
        #[arg(long, default_value = ".", help = "Archive directory")]
        archive: PathBuf,
        #[arg(long, short, help = "Restrict the search to one channel")]
        channel: Option<String>,
        #[arg(long, short, default_value_t = 10, help = "Limit results")]
        limit: usize,
        #[arg(long, help = "Skip the summary line")]
        no_summary: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Find messages containing a text fragment (no interpretation)
    Find {
        query: String,
        #[arg(long, default_value = ".", help = "Archive directory")]
        archive: PathBuf,
        #[arg(long, short, help = "Restrict the search to one channel")]
        channel: Option<String>,
        #[arg(long, short, default_value_t = 20, help = "Limit results")]
        limit: usize,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show how a query would be interpreted
    Interpret {
        query: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List channels in an archive
    Channels {
        #[arg(long, default_value = ".", help = "Archive directory")]
        archive: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show recent messages from a channel
    Messages {
        channel: String,
        #[arg(long, default_value = ".", help = "Archive directory")]
        archive: PathBuf,
        #[arg(long, short, default_value_t = 20, help = "Limit messages")]
        limit: usize,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Start MCP server for AI assistant integration
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, default_value = ".", help = "Archive directory")]
        archive: PathBuf,
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            archive,
            channel,
            limit,
            no_summary,
            json,
        } => commands::search::run(&query, &archive, channel.as_deref(), limit, no_summary, json),
        Commands::Find {
            query,
            archive,
            channel,
            limit,
            json,
        } => commands::find::run(&query, &archive, channel.as_deref(), limit, json),
        Commands::Interpret { query, json } => commands::interpret::run(&query, json),
        Commands::Channels { archive, json } => commands::channels::run(&archive, json),
        Commands::Messages {
            channel,
            archive,
            limit,
            json,
        } => commands::messages::run(&channel, &archive, limit, json),

        #[cfg(feature = "mcp")]
        Commands::Mcp { archive, install } => {
            if install {
                print_mcp_install_instructions(&archive);
                Ok(())
            } else {
                run_mcp_server(archive)
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(archive: PathBuf) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(archive))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions(archive: &std::path::Path) {
    use colored::Colorize;

    let archive = archive.to_string_lossy();
    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "chatscout".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(
        r#"{{
  "mcpServers": {{
    "chatscout": {{
      "command": "{binary_path}",
      "args": ["mcp", "--archive", "{archive}"]
    }}
  }}
}}"#
    );
    println!();
    println!("{}", "Available tools:".bold());
    println!(
        "  • {} - Natural language search with filters and summary",
        "chat_smart_search".green()
    );
    println!(
        "  • {} - Plain text search (substring match)",
        "chat_search_messages".green()
    );
    println!("  • {} - List archive channels", "chat_list_channels".green());
    println!(
        "  • {} - Recent messages from a channel",
        "chat_get_channel_messages".green()
    );
    println!("  • {} - Resolve a user id", "chat_get_user_info".green());
}
