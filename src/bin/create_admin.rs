//! Interactive setup for the first admin account.
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use rac_backend::config::Config;
use rac_backend::error::AppError;
use rac_backend::models::dto::NewAdminRequest;
use rac_backend::services::{AuthService, EmailService};
use rac_backend::{db, logging};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config);

    match create_admin(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nFailed to create admin: {}", e);
            if let Some(AppError::Validation(fields)) = e.downcast_ref::<AppError>() {
                for field in fields {
                    eprintln!("  - {}: {}", field.field, field.message);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn create_admin(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Database
    println!("Connecting to database...");
    let db = db::establish_connection(&config.database).await?;
    db::run_migrations(&db).await?;
    println!("Database connection successful\n");

    // 2. Prompts
    println!("=== Create First Admin Account ===\n");
    let first_name = prompt("First Name: ")?;
    let last_name = prompt("Last Name: ")?;
    let email = prompt("Email: ")?;
    let password = prompt("Password (min 8 characters): ")?;

    // 3. Persist
    let email_service =
        EmailService::from_config(&config.app, &config.email, config.auth.reset_token_ttl_minutes)?;
    let auth = AuthService::new(db, &config.auth, email_service);
    let admin = auth
        .provision_admin(NewAdminRequest {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;

    println!("\nAdmin account created successfully!");
    println!("  ID:    {}", admin.id);
    println!("  Name:  {} {}", admin.first_name, admin.last_name);
    println!("  Email: {}", admin.email);
    println!("\nYou can now log in at POST /api/auth/login");
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
