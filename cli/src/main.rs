use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use coursehub::ConfigError;
use coursehub::model::entity::{AccountCreate, CourseCreate, CourseFilter, ModuleCreate, SlotCreate};
use coursehub::model::{DatabaseError, DbConnection, ModelManager, ResourceType};
use coursehub::web::UserRole;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the coursehub DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage course modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage consultation slots
    Slot {
        #[command(subcommand)]
        action: SlotCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// student, instructor or admin
        #[arg(long, default_value = "student")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "beginner")]
        difficulty: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Appended after the last module when omitted
        #[arg(long)]
        order: Option<i32>,
    },
}

/// Slot management
#[derive(Subcommand, Debug)]
pub enum SlotCommands {
    Add {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM:SS
        #[arg(long)]
        time: NaiveTime,
        #[arg(long, default_value_t = 60)]
        duration: i32,
    },
}

#[tokio::main]
async fn main() -> coursehub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        value: String::new(),
    })?;
    let mm = ModelManager::postgres(DbConnection::connect(&database_url)?);
    let store = mm.store();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                email,
                password,
                first_name,
                last_name,
                role,
            } => {
                let role = UserRole::parse(&role).ok_or(ConfigError::InvalidValue {
                    key: "role",
                    value: role.clone(),
                })?;
                let (account, profile) = store
                    .create_account(AccountCreate {
                        email: email.trim().to_lowercase(),
                        password_hash: coursehub::auth::hash_password(&password)?,
                        first_name,
                        last_name,
                        role,
                    })
                    .await?;
                println!("User created: {} ({}, {})", account.email, account.id, profile.role);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                title,
                description,
                difficulty,
                category,
                duration,
                price,
                published,
            } => {
                let course = store
                    .create_course(CourseCreate {
                        title,
                        description,
                        difficulty,
                        category,
                        duration,
                        price,
                        image_url: None,
                        is_published: published,
                        created_by: None,
                    })
                    .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_title,
                title,
                description,
                order,
            } => {
                let course = store
                    .list_courses(CourseFilter::default())
                    .await?
                    .into_iter()
                    .find(|c| c.title == course_title)
                    .ok_or(DatabaseError::NotFound(ResourceType::Course))?;

                let module = store
                    .create_module(ModuleCreate {
                        course_id: course.id,
                        title,
                        description,
                        content: None,
                        order_index: order,
                    })
                    .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Slot { action } => match action {
            SlotCommands::Add {
                date,
                time,
                duration,
            } => {
                let slot = store
                    .create_slot(SlotCreate {
                        date,
                        time,
                        duration_minutes: duration,
                    })
                    .await?;
                println!("Slot created: {:?}", slot);
            }
        },
    }

    Ok(())
}
