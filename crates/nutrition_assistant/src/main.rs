use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use gigachat_client::config::GigaChatConfig;
use gigachat_client::http_client::ReqwestGigaChatClient;
use gigachat_client::retry::RetryPolicy;
use gigachat_client::token::TokenCache;
use nutrition_assistant::calculator::{self, NutritionTargets};
use nutrition_assistant::delivery::{self, DocumentSink};
use nutrition_assistant::error::{AssistantError, AssistantResult};
use nutrition_assistant::pipeline::MenuPipeline;
use nutrition_assistant::profile::Profile;
use nutrition_assistant::shopping;
use nutrition_assistant::storage::ProfileStore;

#[derive(Parser)]
#[command(
    name = "nutrition-assistant",
    version,
    about = "Daily nutrition targets, menu generation and shopping lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute daily nutrition targets for a profile.
    Targets {
        #[command(flatten)]
        profile: ProfileSelector,
        /// Print targets as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Generate a one-day menu, falling back to a local template when the
    /// remote service is unavailable.
    Menu {
        #[command(flatten)]
        profile: ProfileSelector,
        /// Persist the profile under this user id before generating.
        #[arg(long)]
        save: Option<i64>,
        /// Also write the raw menu HTML to this path.
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Extract the shopping list from a saved menu document.
    Shopping {
        /// Menu HTML file; stdin when omitted.
        file: Option<PathBuf>,
        /// Print items as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Either a stored profile (`--user`) or a full set of profile flags.
#[derive(Args)]
struct ProfileSelector {
    /// Use the stored profile for this user id.
    #[arg(
        long,
        conflicts_with_all = ["gender", "age", "weight", "height", "activity", "goal"]
    )]
    user: Option<i64>,

    /// male or female.
    #[arg(long, required_unless_present = "user")]
    gender: Option<String>,
    /// Age in years.
    #[arg(long, required_unless_present = "user")]
    age: Option<u32>,
    /// Body weight in kilograms.
    #[arg(long, required_unless_present = "user")]
    weight: Option<f64>,
    /// Height in centimeters.
    #[arg(long, required_unless_present = "user")]
    height: Option<f64>,
    /// low, medium or high.
    #[arg(long, required_unless_present = "user")]
    activity: Option<String>,
    /// lose, maintain or gain.
    #[arg(long, required_unless_present = "user")]
    goal: Option<String>,
}

fn required<'a, T>(value: &'a Option<T>, flag: &str) -> AssistantResult<&'a T> {
    value.as_ref().ok_or_else(|| {
        AssistantError::Validation(format!("{} is required unless --user is given", flag))
    })
}

fn build_profile(sel: &ProfileSelector) -> AssistantResult<Profile> {
    Profile::new(
        required(&sel.gender, "--gender")?.parse()?,
        *required(&sel.age, "--age")?,
        *required(&sel.weight, "--weight")?,
        *required(&sel.height, "--height")?,
        required(&sel.activity, "--activity")?.parse()?,
        required(&sel.goal, "--goal")?.parse()?,
    )
}

async fn resolve_profile(sel: &ProfileSelector, db_url: &str) -> AssistantResult<Profile> {
    match sel.user {
        Some(user_id) => {
            let store = ProfileStore::connect(db_url).await?;
            store.load(user_id).await?.ok_or_else(|| {
                AssistantError::NotFound(format!(
                    "no stored profile for user {}; pass the profile flags instead",
                    user_id
                ))
            })
        }
        None => build_profile(sel),
    }
}

fn print_targets(targets: &NutritionTargets) {
    println!("BMR: {:.1} kcal", targets.bmr);
    println!("TDEE: {:.1} kcal", targets.tdee);
    println!("Daily calories: {:.1} kcal", targets.daily_calories);
    println!("Protein: {:.1} g", targets.protein_g);
    println!("Fat: {:.1} g", targets.fat_g);
    println!("Carbs: {:.1} g", targets.carbs_g);
}

/// Console delivery surface. Long menus are kept as a file in the current
/// directory because the transient one is removed right after the send.
struct ConsoleSink;

#[async_trait]
impl DocumentSink for ConsoleSink {
    async fn send_text(&self, _user_id: i64, text: &str) -> AssistantResult<()> {
        println!("{}", text);
        Ok(())
    }

    async fn send_document(
        &self,
        user_id: i64,
        path: &Path,
        caption: &str,
    ) -> AssistantResult<()> {
        let keep = std::env::current_dir()?.join(format!("menu_{}.html", user_id));
        tokio::fs::copy(path, &keep).await?;
        println!("{} Saved to {}", caption, keep.display());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging from env var `NUTRITION_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("NUTRITION_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    // Append a per-target override to keep sqlx statement logging quiet by default
    let combined_filter = format!("{},sqlx=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let db_url =
        std::env::var("NUTRITION_DB_PATH").unwrap_or_else(|_| "sqlite:users.db".to_string());

    match cli.command {
        Command::Targets { profile, json } => {
            let profile = resolve_profile(&profile, &db_url).await?;
            let targets = calculator::compute(&profile);
            if json {
                println!("{}", serde_json::to_string_pretty(&targets)?);
            } else {
                print_targets(&targets);
            }
        }
        Command::Menu {
            profile: selector,
            save,
            html,
        } => {
            let delivery_user = selector.user.or(save).unwrap_or(0);
            let profile = resolve_profile(&selector, &db_url).await?;
            if let Some(user_id) = save {
                let store = ProfileStore::connect(&db_url).await?;
                store.save(user_id, &profile).await?;
                tracing::info!("profile stored for user {}", user_id);
            }

            let config = GigaChatConfig::from_env()?;
            let client = Arc::new(ReqwestGigaChatClient::new(config));
            let tokens = TokenCache::new(client.clone(), RetryPolicy::default());
            let pipeline = MenuPipeline::new(client, tokens);

            let doc = pipeline.generate(&profile).await;
            if let Some(path) = html {
                tokio::fs::write(&path, &doc.html).await?;
                tracing::info!("raw menu HTML written to {}", path.display());
            }
            delivery::deliver_menu(&ConsoleSink, delivery_user, &doc).await?;
        }
        Command::Shopping { file, json } => {
            let html = match file {
                Some(path) => tokio::fs::read_to_string(&path).await?,
                None => {
                    use tokio::io::AsyncReadExt;
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };

            let items = shopping::extract(&html);
            if items.is_empty() {
                println!("no shopping list found");
            } else if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for (i, item) in items.iter().enumerate() {
                    println!("{}. {} - {}", i + 1, item.product, item.amount);
                }
            }
        }
    }

    Ok(())
}
