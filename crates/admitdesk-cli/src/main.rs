use admitdesk_cli::seeder;
use admitdesk_core::hash_password;
use admitdesk_db::{Repositories, init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "admitdesk-cli")]
#[command(about = "Admit Desk CLI - Administrative tools for Admit Desk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Reset the student id counter so the next registration gets STU0001
    ResetCounter,
    /// Delete every student and reset the id counter
    ClearStudents {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Seed the database with fake registrants
    SeedStudents {
        /// Number of students to create
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,
    },
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => fail("Configuration error", "DATABASE_URL must be set"),
    };
    let pool = match init_db_pool(&database_url).await {
        Ok(pool) => pool,
        Err(e) => fail("Failed to connect to database", e),
    };
    if let Err(e) = run_migrations(&pool).await {
        fail("Failed to run migrations", e);
    }
    let repos = Repositories::postgres(pool);

    match cli.command {
        Commands::CreateAdmin { username, password } => {
            handle_create_admin(&repos, username, password).await
        }
        Commands::ResetCounter => handle_reset_counter(&repos).await,
        Commands::ClearStudents { yes } => handle_clear_students(&repos, yes).await,
        Commands::SeedStudents { count } => handle_seed_students(&repos, count).await,
    }
}

async fn handle_create_admin(
    repos: &Repositories,
    username: Option<String>,
    password: Option<String>,
) {
    let username = match username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .unwrap_or_else(|e| fail("Failed to read username", e)),
    };

    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e)),
    };

    let hashed = hash_password(&password)
        .unwrap_or_else(|e| fail("Failed to hash password", e.error));

    match repos.admins.create(username.trim(), &hashed).await {
        Ok(admin) => {
            println!("\n✅ Admin created successfully!");
            println!("   Username: {}", admin.username);
        }
        Err(e) => fail("Error creating admin", e),
    }
}

async fn handle_reset_counter(repos: &Repositories) {
    match repos.students.reset_counter().await {
        Ok(()) => println!("✅ Student ID counter has been reset to STU0001"),
        Err(e) => fail("Error resetting counter", e),
    }
}

async fn handle_clear_students(repos: &Repositories, yes: bool) {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL students and reset the id counter?")
            .default(false)
            .interact()
            .unwrap_or_else(|e| fail("Failed to read confirmation", e));
        if !confirmed {
            println!("Aborted.");
            return;
        }
    }

    match repos.students.delete_all().await {
        Ok(deleted) => println!("✅ Deleted {} students and reset the id counter", deleted),
        Err(e) => fail("Error clearing students", e),
    }
}

async fn handle_seed_students(repos: &Repositories, count: usize) {
    match seeder::seed_students(repos.students.as_ref(), count).await {
        Ok(ids) => {
            if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
                println!("✅ Created {} students ({} .. {})", ids.len(), first, last);
            } else {
                println!("✅ Nothing to seed");
            }
        }
        Err(e) => fail("Error seeding students", e),
    }
}
