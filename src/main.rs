use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use banksync::bulk::score_upload;
use banksync::client::{
    validate_record, ClientOverrides, ClientRecord, Contact, Education, Job, Marital, Month,
    PreviousOutcome, YesNo,
};
use banksync::config::{Config, ConfigOverrides};
use banksync::hanoi::app::{parse_play_command, CommandFeedback};
use banksync::hanoi::scoreboard::{leaderboard, summarize_scores};
use banksync::hanoi::state::{DEFAULT_SCOREBOARD_DISKS, DISK_CHOICES};
use banksync::hanoi::{generate_moves, minimum_moves, DropOutcome, Event, HanoiApp, Screen};
use banksync::optimizer::minimal::find_minimal_change;
use banksync::optimizer::recommendations::recommend;
use banksync::optimizer::sensitivity::sensitivity_analysis;
use banksync::output::csv::{
    bulk_to_csv, history_to_csv, leaderboard_to_csv, moves_to_csv, sensitivity_to_csv,
};
use banksync::output::json::{bulk_rows_json, render_json};
use banksync::output::table::{
    render_bulk_table, render_history_table, render_issues_table, render_leaderboard_table,
    render_minimal_change, render_moves_table, render_prediction_table,
    render_recommendation_table, render_sensitivity_table, render_strategy_tables,
};
use banksync::scoring::{build_scorer, Prediction, Scorer};
use banksync::server::run_server;
use banksync::storage::{HistoryStore, ScoreStore};
use banksync::strategy::guide;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "banksync",
    about = "Term-deposit campaign predictor and Towers of Hanoi engine"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Local model coefficients (JSON).
    #[arg(short, long)]
    model: Option<String>,
    /// Remote model endpoint; takes precedence over --model.
    #[arg(long = "model-url")]
    model_url: Option<String>,
    #[arg(long)]
    scoreboard: Option<String>,
    #[arg(long = "history-file")]
    history_file: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct ClientArgs {
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    job: Option<Job>,
    #[arg(long)]
    marital: Option<Marital>,
    #[arg(long)]
    education: Option<Education>,
    #[arg(long = "default")]
    credit_default: Option<YesNo>,
    #[arg(long, allow_hyphen_values = true)]
    balance: Option<i64>,
    #[arg(long)]
    housing: Option<YesNo>,
    #[arg(long)]
    loan: Option<YesNo>,
    #[arg(long)]
    contact: Option<Contact>,
    #[arg(long)]
    day: Option<u32>,
    #[arg(long)]
    month: Option<Month>,
    #[arg(long)]
    duration: Option<u32>,
    #[arg(long)]
    campaign: Option<u32>,
    #[arg(long, allow_hyphen_values = true)]
    pdays: Option<i32>,
    #[arg(long)]
    previous: Option<u32>,
    #[arg(long)]
    poutcome: Option<PreviousOutcome>,
}

impl From<ClientArgs> for ClientOverrides {
    fn from(value: ClientArgs) -> Self {
        Self {
            age: value.age,
            job: value.job,
            marital: value.marital,
            education: value.education,
            credit_default: value.credit_default,
            balance: value.balance,
            housing: value.housing,
            loan: value.loan,
            contact: value.contact,
            day: value.day,
            month: value.month,
            duration: value.duration,
            campaign: value.campaign,
            pdays: value.pdays,
            previous: value.previous,
            poutcome: value.poutcome,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score one client.
    Predict(ClientArgs),
    /// Grid-search campaign settings for the best subscription odds.
    Recommend(ClientArgs),
    /// Smallest single change that reaches the success threshold.
    MinimalChange(ClientArgs),
    /// Probability across call durations and contact counts.
    Sensitivity(ClientArgs),
    /// Score every row of a CSV file.
    Bulk {
        file: PathBuf,
        /// Write the annotated CSV here instead of printing.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Campaign guidance tables.
    Strategy,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
    Hanoi {
        #[command(subcommand)]
        command: HanoiCommand,
    },
}

#[derive(Debug, Subcommand)]
enum HanoiCommand {
    /// Print the optimal move sequence.
    Solve {
        #[arg(default_value_t = 3)]
        disks: u32,
    },
    /// Play in the terminal, one move per line.
    Play {
        #[arg(default_value_t = 3)]
        disks: u32,
        #[arg(long, default_value = "Player")]
        name: String,
    },
    /// Watch the solver play a game; the result is recorded like any other win.
    Autoplay {
        #[arg(default_value_t = 3)]
        disks: u32,
        #[arg(long, default_value = "Solver")]
        name: String,
        /// Skip the per-step delay.
        #[arg(long)]
        fast: bool,
    },
    Scores {
        #[arg(long)]
        disks: Option<u32>,
    },
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(config_path.as_path()))?;
    config.apply_overrides(ConfigOverrides {
        model_path: cli.model.clone(),
        model_url: cli.model_url.clone(),
        scoreboard_path: cli.scoreboard.clone(),
        history_path: cli.history_file.clone(),
    });

    match cli.command {
        Commands::Config { init, show } => handle_config_command(init, show, &config, &config_path),
        Commands::Strategy => print_strategy(cli.output),
        Commands::Hanoi { command } => handle_hanoi_command(command, &config, cli.output).await,
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            let scorer = scorer_for(&config)?;
            run_server(config, scorer, addr).await
        }
        Commands::Predict(args) => predict(&config, args, cli.output).await,
        Commands::Recommend(args) => recommend_settings(&config, args, cli.output).await,
        Commands::MinimalChange(args) => minimal_change(&config, args, cli.output).await,
        Commands::Sensitivity(args) => sensitivity(&config, args, cli.output).await,
        Commands::Bulk { file, out } => bulk(&config, &file, out.as_deref(), cli.output).await,
    }
}

fn scorer_for(config: &Config) -> Result<Arc<dyn Scorer>> {
    let scorer = build_scorer(&config.model)?;
    info!(model = scorer.name(), "scorer ready");
    Ok(scorer)
}

async fn predict(config: &Config, args: ClientArgs, format: OutputFormat) -> Result<()> {
    let record = client_record(args)?;
    let scorer = scorer_for(config)?;
    let prediction = Prediction::from(scorer.predict_proba(&record).await?);
    match format {
        OutputFormat::Table => println!("{}", render_prediction_table(&prediction)),
        OutputFormat::Json => println!("{}", render_json(&prediction)?),
        OutputFormat::Csv => {
            warn!("CSV output for predict not implemented, using JSON");
            println!("{}", render_json(&prediction)?);
        }
    }
    Ok(())
}

async fn recommend_settings(config: &Config, args: ClientArgs, format: OutputFormat) -> Result<()> {
    let record = client_record(args)?;
    let scorer = scorer_for(config)?;
    let space = config.search.space();
    info!(candidates = space.size(), "grid search started");
    let report = recommend(
        scorer.as_ref(),
        &record,
        &space,
        config.search.on_scoring_error,
    )
    .await?;
    if report.outcome.failed > 0 {
        warn!(
            failed = report.outcome.failed,
            evaluated = report.outcome.evaluated,
            "candidates skipped after scoring errors"
        );
    }
    match format {
        OutputFormat::Table => println!("{}", render_recommendation_table(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Csv => {
            warn!("CSV output for recommend not implemented, using JSON");
            println!("{}", render_json(&report)?);
        }
    }
    Ok(())
}

async fn minimal_change(config: &Config, args: ClientArgs, format: OutputFormat) -> Result<()> {
    let record = client_record(args)?;
    let scorer = scorer_for(config)?;
    let threshold = config.prediction.success_threshold;
    let result = find_minimal_change(scorer.as_ref(), &record, threshold).await?;
    match format {
        OutputFormat::Table => println!("{}", render_minimal_change(&result, threshold)),
        OutputFormat::Json => println!("{}", render_json(&result)?),
        OutputFormat::Csv => {
            warn!("CSV output for minimal-change not implemented, using JSON");
            println!("{}", render_json(&result)?);
        }
    }
    Ok(())
}

async fn sensitivity(config: &Config, args: ClientArgs, format: OutputFormat) -> Result<()> {
    let record = client_record(args)?;
    let scorer = scorer_for(config)?;
    let points = sensitivity_analysis(scorer.as_ref(), &record).await?;
    match format {
        OutputFormat::Table => println!("{}", render_sensitivity_table(&points)),
        OutputFormat::Json => println!("{}", render_json(&points)?),
        OutputFormat::Csv => print!("{}", sensitivity_to_csv(&points)?),
    }
    Ok(())
}

async fn bulk(config: &Config, file: &Path, out: Option<&Path>, format: OutputFormat) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let scorer = scorer_for(config)?;
    let report = score_upload(
        scorer.as_ref(),
        &input,
        config.prediction.success_threshold,
    )
    .await?;
    info!(
        rows = report.rows.len(),
        prioritized = report.prioritized(),
        "bulk upload scored"
    );
    if let Some(out) = out {
        std::fs::write(out, bulk_to_csv(&report)?)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("Wrote {} scored rows to {}", report.rows.len(), out.display());
        return Ok(());
    }
    match format {
        OutputFormat::Table => println!("{}", render_bulk_table(&report, 6)),
        OutputFormat::Json => println!("{}", bulk_rows_json(&report)?),
        OutputFormat::Csv => print!("{}", bulk_to_csv(&report)?),
    }
    Ok(())
}

fn client_record(args: ClientArgs) -> Result<ClientRecord> {
    let record = ClientOverrides::from(args).into_record();
    let issues = validate_record(&record);
    if !issues.is_empty() {
        eprintln!("{}", render_issues_table(&issues));
        bail!("client record has {} invalid field(s)", issues.len());
    }
    Ok(record)
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_strategy(format: OutputFormat) -> Result<()> {
    let guide = guide();
    match format {
        OutputFormat::Table => println!("{}", render_strategy_tables(&guide)),
        OutputFormat::Json => println!("{}", render_json(&guide)?),
        OutputFormat::Csv => {
            warn!("CSV output for strategy not implemented, using JSON");
            println!("{}", render_json(&guide)?);
        }
    }
    Ok(())
}

async fn handle_hanoi_command(
    command: HanoiCommand,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    match command {
        HanoiCommand::Solve { disks } => {
            let disks = config.hanoi.clamp_disks(disks);
            let moves = generate_moves(disks, 0, 2, 1);
            match format {
                OutputFormat::Table => {
                    println!("{}", render_moves_table(&moves));
                    println!("{disks} disks: {} moves", minimum_moves(disks));
                }
                OutputFormat::Json => println!("{}", render_json(&moves)?),
                OutputFormat::Csv => print!("{}", moves_to_csv(&moves)?),
            }
        }
        HanoiCommand::Play { disks, name } => {
            let mut app = HanoiApp::from_config(config);
            start_game(&mut app, config.hanoi.clamp_disks(disks), &name)?;
            run_play_loop(&mut app)?;
        }
        HanoiCommand::Autoplay { disks, name, fast } => {
            let mut app = HanoiApp::from_config(config);
            start_game(&mut app, config.hanoi.clamp_disks(disks), &name)?;
            run_autoplay(&mut app, config.hanoi.step_secs(), fast).await?;
        }
        HanoiCommand::Scores { disks } => {
            let disks = config
                .hanoi
                .clamp_disks(disks.unwrap_or(DEFAULT_SCOREBOARD_DISKS));
            let store = ScoreStore::open(&config.storage.resolved_scoreboard_path());
            let board = leaderboard(store.entries(), disks);
            match format {
                OutputFormat::Table => {
                    println!("{}", render_leaderboard_table(&board, disks));
                    println!("{}", summarize_scores(store.entries(), Some(disks)));
                }
                OutputFormat::Json => println!("{}", render_json(&board)?),
                OutputFormat::Csv => print!("{}", leaderboard_to_csv(&board)?),
            }
        }
        HanoiCommand::History { limit } => {
            let store = HistoryStore::open(&config.storage.resolved_history_path());
            let entries = store.entries();
            let start = entries.len().saturating_sub(limit.unwrap_or(entries.len()));
            let entries = &entries[start..];
            match format {
                OutputFormat::Table => println!("{}", render_history_table(entries)),
                OutputFormat::Json => println!("{}", render_json(entries)?),
                OutputFormat::Csv => print!("{}", history_to_csv(entries)?),
            }
        }
    }
    Ok(())
}

fn start_game(app: &mut HanoiApp, disks: u32, name: &str) -> Result<()> {
    if !app.dispatch(Event::ChooseDisks(disks))? {
        bail!(
            "{disks} disks is not offered; choose between {} and {}",
            DISK_CHOICES.start(),
            DISK_CHOICES.end()
        );
    }
    if !app.dispatch(Event::SubmitName(name.to_string()))? {
        bail!("player name must not be blank");
    }
    Ok(())
}

fn print_board(app: &HanoiApp) {
    if let Some(session) = app.session() {
        print!("{}", session.towers());
        println!(
            "Moves: {}  Minimum: {}",
            session.moves(),
            session.minimum_moves()
        );
    }
}

fn print_win(app: &HanoiApp) {
    let Some(result) = app.last_result() else {
        return;
    };
    let message = if result.is_perfect() { "Perfect!" } else { "Well done!" };
    println!(
        "{message} {} solved {} disks in {} moves ({:.2}s).",
        app.player_name(),
        result.disks,
        result.moves,
        result.time
    );
    let board = leaderboard(app.scores(), result.disks);
    println!("{}", render_leaderboard_table(&board, result.disks));
}

const PLAY_HELP: &str =
    "Enter moves as `from to` (towers 1-3), `solve` to step through the solution, `quit` to leave.";

const SOLUTION_HELP: &str = "Press Enter for the next solution move, `stop` to cancel it.";

fn run_play_loop(app: &mut HanoiApp) -> Result<()> {
    println!("{PLAY_HELP}");
    print_board(app);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            app.dispatch(Event::BackToMenu)?;
            break;
        };
        match app.apply_command(parse_play_command(&line?))? {
            CommandFeedback::Moved(DropOutcome::Rejected(err)) => println!("Illegal move: {err}"),
            CommandFeedback::Moved(_) | CommandFeedback::SolutionStepped => {}
            CommandFeedback::EmptyTower(tower) => println!("Tower {} is empty.", tower + 1),
            CommandFeedback::SolutionStarted => println!("{SOLUTION_HELP}"),
            CommandFeedback::SolutionStopped => println!("Solution stopped, board restored."),
            CommandFeedback::NothingToStop => println!("No solution is playing."),
            CommandFeedback::CannotSolve => println!("The solution cannot start now."),
            CommandFeedback::Left => break,
            CommandFeedback::Help => println!("{PLAY_HELP}"),
            CommandFeedback::Unrecognised => println!("Unrecognised input. {PLAY_HELP}"),
        }
        print_board(app);
        if matches!(app.screen(), Screen::Won { .. }) {
            print_win(app);
            break;
        }
    }
    Ok(())
}

async fn run_autoplay(app: &mut HanoiApp, step_secs: f64, fast: bool) -> Result<()> {
    if !app.start_solution() {
        bail!("solution playback could not start");
    }
    print_board(app);
    while app.session().is_some_and(|s| s.is_playing_back()) {
        if !fast {
            tokio::time::sleep(Duration::from_secs_f64(step_secs)).await;
        }
        app.tick(step_secs)?;
        print_board(app);
    }
    print_win(app);
    Ok(())
}
