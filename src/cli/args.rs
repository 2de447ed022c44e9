//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};
use domain::RoleId;

/// Marketplace backend - roles, shop approval, stock and fulfillment
#[derive(Parser, Debug)]
#[command(name = "marketplace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create a privileged account directly in the database
    CreateAdmin(CreateAdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (defaults to SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (defaults to SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep all data in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the create-admin command
#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role id or name, e.g. `2` or `platform_admin`
    #[arg(short, long, default_value = "platform_admin")]
    pub role: RoleId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::parse_from(["marketplace", "serve", "--port", "5000", "--in-memory"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(5000));
                assert!(args.in_memory);
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn create_admin_defaults_to_platform_admin() {
        let cli = Cli::parse_from([
            "marketplace",
            "create-admin",
            "--username",
            "root",
            "--password",
            "correct-horse",
        ]);
        match cli.command {
            Commands::CreateAdmin(args) => assert_eq!(args.role, RoleId::PlatformAdmin),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn create_admin_accepts_numeric_role() {
        let cli = Cli::parse_from([
            "marketplace",
            "create-admin",
            "-u",
            "dev",
            "-p",
            "correct-horse",
            "--role",
            "1",
        ]);
        match cli.command {
            Commands::CreateAdmin(args) => assert_eq!(args.role, RoleId::Developer),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
