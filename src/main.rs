use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use video_quiz::proxy::{self, ProxyConfig};
use video_quiz::{Quiz, QuizError, RowPolicy};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a quiz in the terminal
    Play(PlayArgs),
    /// Serve quiz items out of a Google spreadsheet
    Serve(ProxyConfig),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// JSON file holding an array of quiz items
    #[arg(
        short,
        long,
        conflicts_with_all = ["sheet", "url"],
        required_unless_present_any = ["sheet", "url"]
    )]
    questions: Option<PathBuf>,

    /// Saved spreadsheet `values` response
    #[arg(short, long, conflicts_with = "url")]
    sheet: Option<PathBuf>,

    /// Address of a running quiz proxy
    #[arg(short, long)]
    url: Option<String>,

    /// Title for the welcome screen
    #[arg(short, long)]
    title: Option<String>,

    /// Drop malformed sheet rows instead of refusing the file
    #[arg(long)]
    skip_invalid: bool,
}

async fn load(args: &PlayArgs) -> Result<Quiz, QuizError> {
    let quiz = if let Some(path) = &args.questions {
        Quiz::from_json(path)?
    } else if let Some(path) = &args.sheet {
        let policy = if args.skip_invalid {
            RowPolicy::Skip
        } else {
            RowPolicy::Abort
        };
        Quiz::from_sheet_file(path, policy)?
    } else if let Some(url) = &args.url {
        Quiz::from_url(url).await?
    } else {
        Quiz::new(Vec::new())
    };

    Ok(match &args.title {
        Some(title) => quiz.titled(title.as_str()),
        None => quiz,
    })
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => {
            let quiz = match load(&args).await {
                Ok(quiz) => quiz,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = quiz.run().await {
                eprintln!("Error running quiz: {}", e);
                std::process::exit(1);
            }
        }
        Command::Serve(config) => {
            if let Err(e) = proxy::run(config).await {
                eprintln!("Proxy error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
