// cli.rs - CLI utility for database migrations and account provisioning
use std::env;
use std::io;
use std::io::Write;

use chrono::Utc;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app;
use crate::app::MigrationError;
use crate::auth;
use crate::core;
use crate::db::{self, PlanType, Role, StoreError, TenantStore, UserStore};

#[rustfmt::skip]
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Migration creation failed")]
    MigrationCreateFailed { #[source] source: MigrationError },

    #[error("Checking migration status failed")]
    MigrationStatusCheckFailed { #[source] source: MigrationError },

    #[error("Running migrations failed")]
    MigrationRunFailed { #[source] source: MigrationError },

    #[error("Reading input failed")]
    InputFailed { #[from] source: io::Error },

    #[error("Storage operation failed")]
    StoreOperationFailed { #[from] source: StoreError },

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(argon2::password_hash::Error),

    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Parser)]
#[command(name = "migrate")]
#[command(about = "Database migration and account utility", long_about = None)]
struct Cli {
    #[command(subcommand)]
    migrate_sub_command: MigrateSubCommands,
}

#[derive(Subcommand)]
enum MigrateSubCommands {
    /// Create a new migration file
    Create {
        /// Name of the migration
        name: String,
    },
    /// List all embedded migrations
    List,
    /// Check if there are pending migrations
    Status,
    /// Run all pending migrations
    Run,
    /// Create a system administrator in its own paid tenant
    CreateAdmin {
        /// Email for the admin user
        #[arg(short, long)]
        email: String,
        /// Full name for the admin user
        #[arg(short, long)]
        full_name: String,
        /// Name of the administration tenant
        #[arg(short, long, default_value = "Tunegate Administration")]
        tenant_name: String,
    },
    /// Move a tenant to another plan
    SetPlan {
        #[arg(short, long)]
        tenant_id: String,
        /// Trial or Paid
        #[arg(short, long)]
        plan: String,
    },
}

/// Runs a `migrate` subcommand when one was given; returns whether it did.
pub async fn run_cli(context: &core::Context) -> Result<bool, CliError> {
    let args: Vec<String> = env::args().collect();

    // Only run if this is explicitly called with the right arguments
    if args.len() < 2 || args[1] != "migrate" {
        return Ok(false);
    }

    // Rewrite args for clap to parse correctly (remove the "migrate" argument)
    let mut cli_args = vec![args[0].clone()];
    cli_args.extend(args.iter().skip(2).cloned());

    let cli = Cli::parse_from(cli_args);
    let db = &context.store.db;

    match cli.migrate_sub_command {
        MigrateSubCommands::Create { name } => {
            let filename = app::create_migration(&name).map_err(|e| CliError::MigrationCreateFailed { source: e })?;
            println!("Created new migration file: {filename}");
        }
        MigrateSubCommands::List => {
            let migrations = app::list_migrations();
            if migrations.is_empty() {
                println!("No migrations found.");
            } else {
                println!("Available migrations:");
                for (i, migration) in migrations.iter().enumerate() {
                    println!("{}. {}", i + 1, migration);
                }
            }
        }
        MigrateSubCommands::Status => match app::check_pending_migrations(db).await {
            Ok(true) => println!("There are pending migrations that need to be applied."),
            Ok(false) => println!("Database is up to date. No pending migrations."),
            Err(MigrationError::NoMigrationsApplied) => println!("No migrations have been applied yet."),
            Err(e) => return Err(CliError::MigrationStatusCheckFailed { source: e }),
        },
        MigrateSubCommands::Run => {
            app::run_migrations(db).await.map_err(|e| CliError::MigrationRunFailed { source: e })?;
            println!("Migrations applied successfully.");
        }
        MigrateSubCommands::CreateAdmin { email, full_name, tenant_name } => {
            app::run_migrations(db).await.map_err(|e| CliError::MigrationRunFailed { source: e })?;

            // Prompt for password securely
            print!("Enter password for admin user '{email}': ");
            io::stdout().flush()?;
            let password = rpassword::read_password()?;

            let tenant_id = create_admin_user(&context.store, &email, &full_name, &tenant_name, &password).await?;
            println!("Admin user '{email}' created in tenant {tenant_id}.");
        }
        MigrateSubCommands::SetPlan { tenant_id, plan } => {
            app::run_migrations(db).await.map_err(|e| CliError::MigrationRunFailed { source: e })?;
            let plan = plan.parse::<PlanType>().map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            set_tenant_plan(&context.store, &tenant_id, plan).await?;
            println!("Tenant {tenant_id} is now on the {plan} plan.");
        }
    }

    Ok(true)
}

/// Provisions a system administrator together with its own paid tenant.
pub async fn create_admin_user<S>(
    store: &S,
    email: &str,
    full_name: &str,
    tenant_name: &str,
    password: &str,
) -> Result<String, CliError>
where
    S: TenantStore + UserStore + ?Sized,
{
    if email.trim().is_empty() {
        return Err(CliError::InvalidArgument("Email cannot be empty".to_string()));
    }
    if password.trim().is_empty() {
        return Err(CliError::InvalidArgument("Password cannot be empty".to_string()));
    }
    if store.find_user_by_email(email).await?.is_some() {
        return Err(CliError::InvalidArgument(format!("User '{email}' already exists")));
    }

    let now = Utc::now();
    let mut tenant = db::Tenant::new_trial(tenant_name, "", now);
    tenant.change_plan(PlanType::Paid, now);

    let password_hash = auth::hash_password(password).map_err(CliError::PasswordHashingFailed)?;
    let admin = db::User::new(email, full_name, password_hash, &tenant.id, Role::SystemAdmin, None);
    store.add_tenant_with_owner(&tenant, &admin).await?;

    tracing::info!(tenant_id = %tenant.id, user_id = %admin.id, "System administrator created");
    Ok(tenant.id)
}

pub async fn set_tenant_plan<S>(store: &S, tenant_id: &str, plan: PlanType) -> Result<(), CliError>
where
    S: TenantStore + ?Sized,
{
    let mut tenant = store.get_tenant(tenant_id).await?;
    tenant.change_plan(plan, Utc::now());
    store.update_tenant(&tenant).await?;
    tracing::info!(tenant_id = %tenant.id, plan = %plan, "Tenant plan changed from the command line");
    Ok(())
}
