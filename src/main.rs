//! CLI entry point for youfirst-content

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use youfirst_content::commands::{self, posts::PostFields};
use youfirst_content::content::NewContact;

#[derive(Parser)]
#[command(name = "youfirst-content")]
#[command(author = "YouFirst Team")]
#[command(version)]
#[command(about = "Manage blog posts, site settings and contact submissions", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to _config.yml in the base directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage blog posts
    #[command(subcommand)]
    Posts(PostsCommand),

    /// Manage site settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Contact form submissions
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// Admin role checks
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show dashboard counters
    Stats,

    /// Start the JSON API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum PostsCommand {
    /// List posts (published only unless --all)
    List {
        #[arg(short, long)]
        all: bool,
    },
    /// Show a post by slug
    Show { slug: String },
    /// Create a post
    Create {
        #[command(flatten)]
        fields: PostFields,

        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },
    /// Update fields of a post
    Update {
        id: String,

        #[command(flatten)]
        fields: PostFields,
    },
    /// Publish a post
    Publish { id: String },
    /// Permanently delete a post
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// List all settings
    List,
    /// Print a setting value
    Get { key: String },
    /// Update a setting value
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum ContactsCommand {
    /// List submissions, newest first
    List,
    /// Submit a message
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// Inquiry type, prefixed to the message
        #[arg(long)]
        inquiry: Option<String>,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Check whether a user holds the admin role
    Check { user_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "youfirst_content=debug,info"
    } else {
        "youfirst_content=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Version = cli.command {
        println!("youfirst-content version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let app = youfirst_content::App::new(&base_dir, cli.config.as_deref())?;
    let store = app.open_store()?;
    tracing::debug!("Content store opened in {} mode", store.mode());

    match cli.command {
        Commands::Posts(command) => match command {
            PostsCommand::List { all } => commands::posts::list(&store, all).await?,
            PostsCommand::Show { slug } => commands::posts::show(&store, &slug).await?,
            PostsCommand::Create { fields, publish } => {
                commands::posts::create(&store, fields, publish).await?
            }
            PostsCommand::Update { id, fields } => {
                commands::posts::update(&store, &id, fields).await?
            }
            PostsCommand::Publish { id } => commands::posts::publish(&store, &id).await?,
            PostsCommand::Delete { id } => commands::posts::delete(&store, &id).await?,
        },

        Commands::Settings(command) => match command {
            SettingsCommand::List => commands::settings::list(&store).await?,
            SettingsCommand::Get { key } => commands::settings::get(&store, &key).await?,
            SettingsCommand::Set { key, value } => {
                commands::settings::set(&store, &key, &value).await?
            }
        },

        Commands::Contacts(command) => match command {
            ContactsCommand::List => commands::contacts::list(&store).await?,
            ContactsCommand::Submit {
                name,
                email,
                phone,
                inquiry,
                message,
            } => {
                let input = NewContact {
                    name,
                    email,
                    phone,
                    inquiry_type: inquiry,
                    message,
                };
                commands::contacts::submit(&store, input).await?
            }
        },

        Commands::Admin(AdminCommand::Check { user_id }) => {
            commands::admin::check(&store, &user_id).await?
        }

        Commands::Stats => commands::admin::stats(&store).await?,

        Commands::Serve { port, ip } => {
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());
            let port = port.unwrap_or(app.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            youfirst_content::server::start(store, &ip, port).await?;
        }

        Commands::Version => {}
    }

    Ok(())
}
