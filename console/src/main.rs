use chrono::Utc;
use clap::{Parser, Subcommand};
use console::{
    fill_case_form, fill_report_form, CaseInput, Dashboard, DashboardRecord, FormDefaults,
    InternalCaseForm, Prompter, QaReportForm, ReportInput, SubmitOutcome,
    DEFAULT_APPLICATION_VERSION,
};
use std::io;
use std::path::{Path, PathBuf};
use store::prelude::*;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "qa")]
#[command(about = "Record QA test reports and browse what has been submitted")]
struct Cli {
    /// Supabase project URL (defaults to SUPABASE_URL or NEXT_PUBLIC_SUPABASE_URL)
    #[arg(long, global = true)]
    supabase_url: Option<String>,
    /// Supabase anon key (defaults to SUPABASE_ANON_KEY or NEXT_PUBLIC_SUPABASE_ANON_KEY)
    #[arg(long, global = true)]
    anon_key: Option<String>,
    /// Application version a fresh report starts with
    #[arg(long, global = true, default_value = DEFAULT_APPLICATION_VERSION)]
    default_version: String,
    /// Use an in-process store instead of Supabase
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-app QA test reports
    Report {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Internal testing cases with screenshots
    Case {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Check the database connection
    Health,
}

#[derive(Subcommand)]
enum RecordAction {
    /// Fill in the form interactively
    Fill,
    /// Submit a form described in a TOML file
    Submit {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List stored submissions, newest first
    List {
        /// Case-insensitive filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one submission in detail
    Show { id: String },
    /// Write the (filtered) list to a CSV file
    Export {
        #[arg(short, long)]
        search: Option<String>,
        /// Directory the file is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let defaults = FormDefaults::default().with_application_version(cli.default_version.clone());
    defaults.validate()?;
    let backend = connect(&cli)?;
    let backend = backend.as_ref();

    match cli.command {
        Commands::Report { action } => match action {
            RecordAction::Fill => {
                let mut form = QaReportForm::with_defaults(defaults);
                let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
                fill_report_form(&mut prompter, &mut form)?;
                finish(form.submit(backend).await)?;
            }
            RecordAction::Submit { file } => {
                let mut form = QaReportForm::with_defaults(defaults);
                form.tutorial_mut().dismiss();
                ReportInput::from_path(&file)?.apply_to(&mut form)?;
                finish(form.submit(backend).await)?;
            }
            RecordAction::List { search } => list::<QaTestReport>(backend, search).await?,
            RecordAction::Show { id } => show::<QaTestReport>(backend, &id).await?,
            RecordAction::Export { search, out } => {
                export::<QaTestReport>(backend, search, &out).await?
            }
        },
        Commands::Case { action } => match action {
            RecordAction::Fill => {
                let mut form = InternalCaseForm::new();
                let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
                fill_case_form(&mut prompter, &mut form, Path::new("."))?;
                finish(form.submit(backend).await)?;
            }
            RecordAction::Submit { file } => {
                let mut form = InternalCaseForm::new();
                let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
                CaseInput::from_path(&file)?.apply_to(&mut form, base_dir)?;
                finish(form.submit(backend).await)?;
            }
            RecordAction::List { search } => list::<InternalTestingCase>(backend, search).await?,
            RecordAction::Show { id } => show::<InternalTestingCase>(backend, &id).await?,
            RecordAction::Export { search, out } => {
                export::<InternalTestingCase>(backend, search, &out).await?
            }
        },
        Commands::Health => {
            health_check(backend).await?;
        }
    }

    Ok(())
}

fn connect(cli: &Cli) -> Result<Box<dyn Backend>, Box<dyn std::error::Error>> {
    if cli.offline {
        info!("Using in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }

    let mut config = SupabaseConfig::from_env();
    if let Some(url) = &cli.supabase_url {
        config = config.with_url(url.as_str());
    }
    if let Some(key) = &cli.anon_key {
        config = config.with_anon_key(key.as_str());
    }
    if config.is_placeholder() {
        error!("Supabase URL or anon key not set; requests will fail");
    }

    Ok(Box::new(SupabaseProvider::new(config)?))
}

fn finish<R: DashboardRecord>(
    outcome: SubmitOutcome<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", outcome.message());
    match outcome {
        SubmitOutcome::Submitted { record, .. } => {
            if let Some(id) = record.record_id() {
                println!("  ID: {}", id);
            }
            Ok(())
        }
        SubmitOutcome::Rejected(e) => Err(e.into()),
        SubmitOutcome::Failed { error, .. } => Err(error.into()),
    }
}

async fn load<R: DashboardRecord>(
    backend: &dyn Backend,
) -> Result<Dashboard<R>, Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::<R>::new();
    if let Err(e) = dashboard.refresh(backend).await {
        println!(
            "✗ {} (run the command again to retry)",
            dashboard.error().unwrap_or_default()
        );
        return Err(e.into());
    }
    Ok(dashboard)
}

async fn list<R: DashboardRecord>(
    backend: &dyn Backend,
    search: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = load::<R>(backend).await?;
    if let Some(term) = search {
        dashboard.set_search(term);
    }

    let stats = dashboard.stats(Utc::now());
    println!(
        "Total: {}  Filtered: {}  This week: {}  This month: {}\n",
        stats.total, stats.filtered, stats.this_week, stats.this_month
    );
    if dashboard.filtered_len() == 0 {
        println!("No reports found matching your criteria.");
    }
    for record in dashboard.filtered() {
        println!("{}", record.list_row());
    }

    Ok(())
}

async fn show<R: DashboardRecord>(
    backend: &dyn Backend,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = load::<R>(backend).await?;
    let record = dashboard
        .find(id)
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
    print!("{}", record.render_detail());
    Ok(())
}

async fn export<R: DashboardRecord>(
    backend: &dyn Backend,
    search: Option<String>,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = load::<R>(backend).await?;
    if let Some(term) = search {
        dashboard.set_search(term);
    }

    let path = dashboard
        .export_csv(Utc::now().date_naive())?
        .write_to(out)?;
    println!(
        "✓ Exported {} rows to {}",
        dashboard.filtered_len(),
        path.display()
    );
    Ok(())
}

async fn health_check(backend: &dyn Backend) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking {} connection...", backend.provider_name());

    match backend.health_check().await {
        Ok(()) => {
            println!("✓ Database: Connected");
            info!("Health check successful");
        }
        Err(e) => {
            println!("✗ Database: Disconnected ({})", e);
            error!("Health check failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
