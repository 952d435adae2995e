use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lingua_quiz::{run_result, run_take, Error, SessionConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the platform API
    #[arg(long, env = "LINGUA_API_URL", default_value = "http://localhost:8000/api")]
    api_url: String,

    /// Bearer token for an authenticated session; omit to attempt as guest
    #[arg(long, env = "LINGUA_API_TOKEN")]
    token: Option<String>,

    /// Directory for autosaved answers and logs
    #[arg(long, env = "LINGUA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a quiz
    Take { quiz_id: u64 },
    /// Show the latest result for a quiz
    Result { quiz_id: u64 },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let data_dir = resolve_data_dir(args.data_dir)?;
    init_logging(&data_dir);

    let config = |quiz_id| SessionConfig {
        api_url: args.api_url.clone(),
        token: args.token.clone(),
        data_dir: data_dir.clone(),
        quiz_id,
    };

    match args.command {
        Command::Take { quiz_id } => run_take(config(quiz_id)).await,
        Command::Result { quiz_id } => run_result(config(quiz_id)).await,
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, Error> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("lingua-quiz"))
        .ok_or(Error::NoDataDir)
}

/// Log to a file under the data directory; the TUI owns the terminal.
fn init_logging(data_dir: &Path) {
    let target = fs::create_dir_all(data_dir)
        .and_then(|()| fs::File::create(data_dir.join("lingua-quiz.log")));

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Ok(file) = target {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
}
