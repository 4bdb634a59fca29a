//! `reelmood` — terminal front end for a recommendation session.
//!
//! ```text
//! reelmood mood "something cozy for a rainy evening"
//! reelmood explore --genre Drama --exclude Horror --min-rating 3.5 --personalized
//! reelmood genres
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use reelmood::{
    config::Config,
    models::{FeedbackSource, FilterState, SessionState},
    services::{
        DetailFeedback, FetchOutcome, HttpRecommendationProvider, RecommendationProvider,
        SessionController, SessionOptions, SwipeAction,
    },
};

#[derive(Parser, Debug)]
#[command(name = "reelmood", about = "Swipe through movie recommendations")]
struct Args {
    /// Recommendation service URL (overrides RECOMMENDER_URL)
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe a mood in free text
    Mood {
        text: String,
        /// Mark the text as dictated
        #[arg(long)]
        voice: bool,
    },
    /// Explore with structured filters
    Explore {
        /// Genre to include (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
        /// Genre to exclude (repeatable)
        #[arg(long = "exclude")]
        excluded: Vec<String>,
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
        #[arg(long, default_value_t = 0.0)]
        min_popularity: f64,
        /// Rank with collaborative filtering instead of popularity
        #[arg(long)]
        personalized: bool,
    },
    /// List the genre catalog
    Genres,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelmood=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = args.url {
        config.recommender_url = url;
    }

    let provider = HttpRecommendationProvider::from_config(&config)
        .context("building recommendation client")?;
    if let Err(e) = provider.health().await {
        tracing::warn!(url = %provider.api_url(), error = %e, "Recommendation service not healthy");
    }

    let controller = SessionController::new(Arc::new(provider), SessionOptions::from(&config));

    match args.command {
        Command::Genres => {
            for genre in controller.load_genres().await? {
                println!("{}", genre);
            }
            return Ok(());
        }
        Command::Mood { text, voice } => {
            controller.open_mood_input();
            let outcome = controller.submit_mood_query(&text, voice).await?;
            report(&outcome);
        }
        Command::Explore {
            genres,
            excluded,
            min_rating,
            min_popularity,
            personalized,
        } => {
            controller.open_explore_filters();
            let mut filters = FilterState {
                min_rating,
                min_popularity,
                personalized,
                ..Default::default()
            };
            for genre in &genres {
                filters.cycle_genre(genre);
            }
            for genre in &excluded {
                // two steps: none → included → excluded
                filters.cycle_genre(genre);
                filters.cycle_genre(genre);
            }
            let outcome = controller.submit_filters(filters).await;
            report(&outcome);
        }
    }

    run_results_loop(&controller).await
}

fn report(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Applied { count } => println!("{} new cards", count),
        FetchOutcome::Failed { message } => println!("error: {}", message),
        FetchOutcome::Superseded | FetchOutcome::Skipped => {}
    }
}

fn print_top(state: &SessionState) {
    match state.unseen().next() {
        Some(card) => {
            println!("\n[{}] {}", card.movie_id, card.headline());
            if let Some(reason) = &card.reason {
                println!("    {}", reason);
            }
            println!("    {} left · l like · d dislike · s skip · v save · i <id> details · q quit", state.remaining());
        }
        None => println!("\nNo more cards. b to go back, q to quit."),
    }
}

fn print_detail(state: &SessionState, movie_id: i64) {
    let Some(card) = state.candidate(movie_id) else {
        return;
    };
    println!("\n{}", card.headline());
    if let Some(rating) = card.rating {
        println!("rating: {:.1}", rating);
    }
    if let Some(runtime) = card.runtime {
        println!("runtime: {} min", runtime);
    }
    if let Some(description) = &card.description {
        println!("{}", description);
    }
    println!("h <id> helpful · n <id> not helpful · c close");
}

async fn run_results_loop(controller: &SessionController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_top(&controller.snapshot());

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let id_arg = parts.next().and_then(|s| s.parse::<i64>().ok());
        let state = controller.snapshot();
        let top = state.unseen().next().map(|c| c.movie_id);

        match (command, top) {
            ("q", _) => break,
            ("b", _) => {
                controller.back();
                break;
            }
            ("l" | "d" | "s", Some(movie_id)) => {
                let action = match command {
                    "l" => SwipeAction::Like,
                    "d" => SwipeAction::Dislike,
                    _ => SwipeAction::Skip,
                };
                if let Some(outcome) = controller.record_swipe(movie_id, action, true).await {
                    report(&outcome);
                }
            }
            ("v", Some(movie_id)) => {
                let saved = controller.toggle_save(movie_id, FeedbackSource::Swipe).await;
                println!("{}", if saved { "saved" } else { "unsaved" });
            }
            ("i", _) => {
                if let Some(movie_id) = id_arg {
                    match controller.select_candidate(movie_id) {
                        Ok(()) => print_detail(&controller.snapshot(), movie_id),
                        Err(e) => println!("{}", e),
                    }
                }
                continue;
            }
            ("h" | "n", _) => {
                if let Some(movie_id) = id_arg {
                    let feedback = if command == "h" {
                        DetailFeedback::Helpful
                    } else {
                        DetailFeedback::NotHelpful
                    };
                    controller.record_detail_feedback(movie_id, feedback).await;
                    println!("thanks for your feedback");
                }
                continue;
            }
            ("c", _) => controller.close_detail(),
            _ => {}
        }

        print_top(&controller.snapshot());
    }

    Ok(())
}
