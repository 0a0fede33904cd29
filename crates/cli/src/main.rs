use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{ActionKind, ContentId, ContentType, DataIndex, PeerAction, UserId, YearRange};
use engine::{EngineConfig, Recommendation, RecommendationEngine, RecommendationOutcome, shuffle_for_presentation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use session::{JsonFileStore, Session, UserPreferences};
use sources::{IndexedCatalog, InMemoryPeerStore, PeerSignalStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// swipe-recs - Swipe-based movie and series recommendations
#[derive(Parser)]
#[command(name = "swipe-recs")]
#[command(about = "Swipe-based movie and series recommendations", long_about = None)]
struct Cli {
    /// Dataset directory holding catalog.json and peer_actions.json
    #[arg(short, long, default_value = "data/demo")]
    data_dir: PathBuf,

    /// Session file (created on first swipe)
    #[arg(short, long, default_value = "swipe-session.json")]
    session: PathBuf,

    /// Your user id in the shared peer store
    #[arg(short, long, default_value = "100")]
    user_id: UserId,

    /// Optional JSON engine config
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Movie,
    Series,
}

impl From<KindArg> for ContentType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => ContentType::Movie,
            KindArg::Series => ContentType::Series,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get the next batch of cards
    Recommend {
        /// Catalog page to start from
        #[arg(long, default_value = "1")]
        page: u32,

        /// Show why each card was picked
        #[arg(long)]
        explain: bool,

        /// Shuffle the batch with this seed before showing it
        #[arg(long)]
        shuffle_seed: Option<u64>,
    },

    /// Swipe on a card: like, pass or save
    Swipe {
        /// Content id to swipe on
        content_id: ContentId,

        /// like | pass | save
        action: ActionKind,
    },

    /// Undo the most recent swipe
    Undo,

    /// Show saved-for-later items
    Watchlist,

    /// Remove an item from the watchlist
    Unsave {
        content_id: ContentId,
    },

    /// Show swipe counters
    Stats,

    /// Show the learned taste profile and declared preferences
    Profile,

    /// Declare what you want to be shown
    Prefs {
        #[arg(long, value_enum)]
        content_type: Option<KindArg>,

        /// Comma-separated ISO 639-1 codes, e.g. en,ko
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,

        /// Comma-separated genres
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,

        #[arg(long)]
        from_year: Option<i32>,

        #[arg(long)]
        to_year: Option<i32>,
    },

    /// Forget everything about this session
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_dir(&cli.data_dir)
            .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?,
    );
    let (items, users, actions) = data_index.counts();
    println!(
        "{} Loaded {} titles, {} peers, {} peer swipes in {:?}",
        "✓".green(),
        items,
        users,
        actions,
        start.elapsed()
    );

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let mut session = Session::open(cli.user_id, Arc::new(JsonFileStore::new(&cli.session)));

    let peers = Arc::new(InMemoryPeerStore::from_index(&data_index));
    seed_own_history(&peers, &session).await;

    let engine = RecommendationEngine::new(Arc::new(IndexedCatalog::new(data_index.clone())), config)
        .with_peer_store(peers);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            page,
            explain,
            shuffle_seed,
        } => handle_recommend(&engine, &session, page, explain, shuffle_seed).await,
        Commands::Swipe { content_id, action } => {
            handle_swipe(&engine, &data_index, &mut session, content_id, action).await?
        }
        Commands::Undo => handle_undo(&engine, &mut session).await,
        Commands::Watchlist => handle_watchlist(&session),
        Commands::Unsave { content_id } => handle_unsave(&mut session, content_id),
        Commands::Stats => handle_stats(&session),
        Commands::Profile => handle_profile(&session),
        Commands::Prefs {
            content_type,
            languages,
            genres,
            from_year,
            to_year,
        } => {
            let year_range = (from_year.is_some() || to_year.is_some())
                .then(|| YearRange::new(from_year, to_year));
            session.set_preferences(UserPreferences {
                content_type: content_type.map(ContentType::from).unwrap_or_default(),
                languages,
                genres,
                year_range,
            });
            println!("{} Preferences saved", "✓".green());
            handle_profile(&session);
        }
        Commands::Reset => {
            engine.reset(&mut session).context("Failed to clear session file")?;
            println!("{} Session reset", "✓".green());
        }
    }

    Ok(())
}

/// The peer store is rebuilt from the dataset on every run, so put this
/// user's own logged swipes back into it.
async fn seed_own_history(peers: &InMemoryPeerStore, session: &Session) {
    for entry in session.history().iter() {
        let row = PeerAction {
            user_id: session.user_id(),
            content_id: entry.content_id,
            action: entry.action,
        };
        if let Err(e) = peers.record_action(row).await {
            warn!("Could not seed peer store with own history: {}", e);
            return;
        }
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(
    engine: &RecommendationEngine,
    session: &Session,
    page: u32,
    explain: bool,
    shuffle_seed: Option<u64>,
) {
    let cold_start = session.stats().total_swipes < engine.config().cold_start_threshold;
    match engine.recommend(session, page).await {
        RecommendationOutcome::Ready {
            mut recommendations,
            next_page,
        } => {
            if let Some(seed) = shuffle_seed {
                shuffle_for_presentation(&mut recommendations, &mut StdRng::seed_from_u64(seed));
            }
            if cold_start {
                let remaining = engine.config().cold_start_threshold - session.stats().total_swipes;
                println!(
                    "{}",
                    format!("Getting to know you: {remaining} more swipes until picks are personalized").yellow()
                );
            }
            if recommendations.is_empty() {
                println!("{}", "Nothing to show right now, try again shortly.".yellow());
                return;
            }
            print_recommendations(&recommendations, explain);
            println!("Next page: {}", next_page.to_string().cyan());
        }
        RecommendationOutcome::Exhausted => {
            println!("{}", "You've seen everything that matches. Try widening your preferences.".yellow());
        }
    }
}

/// Handle the 'swipe' command
async fn handle_swipe(
    engine: &RecommendationEngine,
    data_index: &DataIndex,
    session: &mut Session,
    content_id: ContentId,
    action: ActionKind,
) -> Result<()> {
    let item = data_index
        .get_item(content_id)
        .ok_or_else(|| anyhow!("Title {} not found in catalog", content_id))?;

    engine.record_swipe(session, item, action).await;

    let verb = match action {
        ActionKind::Like => "Liked".green(),
        ActionKind::Pass => "Passed on".red(),
        ActionKind::SaveForLater => "Saved".cyan(),
    };
    println!("{} {}", verb, item.title.bold());
    Ok(())
}

/// Handle the 'undo' command
async fn handle_undo(engine: &RecommendationEngine, session: &mut Session) {
    match engine.undo_last(session).await {
        Some(item) => println!("{} Undid swipe on {}", "↶".yellow(), item.title.bold()),
        None => println!("Nothing to undo"),
    }
}

/// Handle the 'watchlist' command
fn handle_watchlist(session: &Session) {
    let watchlist = session.watchlist();
    if watchlist.is_empty() {
        println!("Your watchlist is empty");
        return;
    }
    println!("{}", format!("Watchlist ({}):", watchlist.len()).bold().blue());
    for item in watchlist.list() {
        println!(
            "  {} {} ({}) [{}]",
            item.id.to_string().green(),
            item.title,
            format_year(item.release_year()),
            item.genres.join(", ")
        );
    }
}

/// Handle the 'unsave' command
fn handle_unsave(session: &mut Session, content_id: ContentId) {
    if session.remove_from_watchlist(content_id) {
        println!("{} Removed {} from watchlist", "✓".green(), content_id);
    } else {
        println!("{} wasn't on your watchlist", content_id);
    }
}

/// Handle the 'stats' command
fn handle_stats(session: &Session) {
    let stats = session.stats();
    println!("{}", "Session stats:".bold().blue());
    println!("{}Swipes: {}", "• ".green(), stats.total_swipes);
    println!("{}Likes: {}", "• ".green(), stats.likes_count);
    println!("{}Passes: {}", "• ".green(), stats.dislikes_count);
    println!("{}Saved: {}", "• ".green(), stats.saved_count);
    if let Some(updated) = session.last_updated() {
        println!("{}Last updated: {}", "• ".cyan(), updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Handle the 'profile' command
fn handle_profile(session: &Session) {
    let profile = session.profile();
    println!("{}", format!("Taste profile for user {}:", session.user_id()).bold().blue());
    println!("{}Liked genres: {}", "• ".green(), or_none(&profile.liked_genres.join(", ")));
    println!("{}Disliked genres: {}", "• ".red(), or_none(&profile.disliked_genres.join(", ")));
    let decades: Vec<String> = profile.preferred_decades.iter().map(|d| format!("{d}s")).collect();
    println!("{}Preferred decades: {}", "• ".green(), or_none(&decades.join(", ")));
    println!("{}Rating preference: {:.1}", "• ".green(), profile.average_rating_preference);

    let prefs = session.preferences();
    println!("{}", "Preferences:".bold().blue());
    println!("{}Type: {:?}", "• ".cyan(), prefs.content_type);
    println!("{}Languages: {}", "• ".cyan(), or_none(&prefs.languages.join(", ")));
    println!("{}Genres: {}", "• ".cyan(), or_none(&prefs.genres.join(", ")));
    if let Some(range) = prefs.year_range {
        println!(
            "{}Years: {} - {}",
            "• ".cyan(),
            format_year(range.from),
            format_year(range.to)
        );
    }
}

fn or_none(s: &str) -> &str {
    if s.is_empty() { "(none)" } else { s }
}

fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Recommendations:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let item = &rec.item;
        println!(
            "{}. {} {} ({}) [{}] {} - Score: {:.2}",
            (i + 1).to_string().green(),
            format!("#{}", item.id).dimmed(),
            item.title.bold(),
            format_year(item.release_year()),
            item.genres.join(", "),
            format!("★ {:.1}", item.rating).yellow(),
            rec.score
        );
        if explain {
            println!("   {:?}: {}", rec.source, rec.explanation.join("; "));
        }
    }
}
