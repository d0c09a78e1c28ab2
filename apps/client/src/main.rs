use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use jobdeck::models::{
    ApplicationFilters, ApplicationStatus, CoverLetterRequest, InterviewQuestionsRequest,
    JobSearchParams, NewApplication, QuestionKind,
};
use jobdeck::session::{FileTokenStore, HttpTokenRefresher, LoginPrompt};
use jobdeck::stores::AuthStore;
use jobdeck::{ApiClient, ClientError, Config, JobsApiClient, SessionManager};

#[derive(Parser, Debug)]
#[command(name = "jobdeck", version, about = "Job-search tracker client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store credentials
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "JOBDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "JOBDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    Resumes(ResumesCommand),
    Applications(ApplicationsCommand),
    Interviews(InterviewsCommand),
    Jobs(JobsCommand),
    Analytics(AnalyticsCommand),
    Ai(AiCommand),
}

#[derive(Args, Debug)]
struct ResumesCommand {
    #[command(subcommand)]
    command: ResumesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResumesSubcommand {
    List,
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: String,
    },
    Analyze {
        id: Uuid,
    },
    /// Mark a resume as the primary one
    Primary {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ApplicationsCommand {
    #[command(subcommand)]
    command: ApplicationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApplicationsSubcommand {
    List {
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an application to a new status
    Status {
        id: Uuid,
        status: ApplicationStatus,
    },
    Stats,
}

#[derive(Args, Debug)]
struct InterviewsCommand {
    #[command(subcommand)]
    command: InterviewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum InterviewsSubcommand {
    List,
    Upcoming,
}

#[derive(Args, Debug)]
struct JobsCommand {
    #[command(subcommand)]
    command: JobsSubcommand,
}

#[derive(Subcommand, Debug)]
enum JobsSubcommand {
    /// Search the job-listings backend
    Search {
        query: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        remote: bool,
        #[arg(long)]
        job_type: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Show {
        id: String,
    },
    /// Jobs ranked against a resume (the primary one by default)
    Matches {
        #[arg(long)]
        resume_id: Option<Uuid>,
    },
    Bookmark {
        id: String,
        #[arg(long)]
        remove: bool,
    },
    Scraper {
        #[arg(value_enum, default_value_t = ScraperAction::Status)]
        action: ScraperAction,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScraperAction {
    Status,
    Run,
    Health,
}

#[derive(Args, Debug)]
struct AnalyticsCommand {
    #[command(subcommand)]
    command: AnalyticsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AnalyticsSubcommand {
    Overview,
    Insights,
}

#[derive(Args, Debug)]
struct AiCommand {
    #[command(subcommand)]
    command: AiSubcommand,
}

#[derive(Subcommand, Debug)]
enum AiSubcommand {
    CoverLetter {
        #[arg(long)]
        resume_id: Uuid,
        #[arg(long)]
        job_id: Option<Uuid>,
        #[arg(long)]
        tone: Option<String>,
    },
    Questions {
        #[arg(long)]
        job_id: Uuid,
        #[arg(long, value_enum, default_value_t = QuestionArg::Technical)]
        kind: QuestionArg,
    },
    Chat {
        message: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuestionArg {
    Technical,
    Behavioral,
    SystemDesign,
}

impl From<QuestionArg> for QuestionKind {
    fn from(arg: QuestionArg) -> Self {
        match arg {
            QuestionArg::Technical => QuestionKind::Technical,
            QuestionArg::Behavioral => QuestionKind::Behavioral,
            QuestionArg::SystemDesign => QuestionKind::SystemDesign,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    debug!("jobdeck v{} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    let store = Arc::new(FileTokenStore::new(config.credentials_path.clone()));
    let refresher = Arc::new(HttpTokenRefresher::new(&config.api_url, config.request_timeout)?);
    let session = SessionManager::load(store, refresher, Arc::new(LoginPrompt::default())).await;
    let api = ApiClient::from_config(&config, Arc::new(session))?;
    let jobs = JobsApiClient::from_config(&config)?;

    match run(cli.command, api, jobs).await {
        Err(e) if is_session_expired(&e) => {
            bail!("Your session has expired. Run `jobdeck login` to sign in again.")
        }
        other => other,
    }
}

fn is_session_expired(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ClientError>()
        .is_some_and(ClientError::is_session_expired)
}

async fn run(command: Command, api: ApiClient, jobs: JobsApiClient) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let mut auth = AuthStore::new(api);
            auth.login(&email, &password).await?;
            print_json(&auth.user)
        }
        Command::Register {
            email,
            full_name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let mut auth = AuthStore::new(api);
            auth.register(&email, &password, &full_name).await?;
            info!("Account created for {email}");
            print_json(&auth.user)
        }
        Command::Logout => {
            AuthStore::new(api).logout().await?;
            info!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            if !api.session().is_authenticated() {
                bail!("Not signed in. Run `jobdeck login`.");
            }
            print_json(&api.auth().current_user().await?)
        }
        Command::Resumes(cmd) => resumes(cmd.command, &api).await,
        Command::Applications(cmd) => applications(cmd.command, &api).await,
        Command::Interviews(cmd) => match cmd.command {
            InterviewsSubcommand::List => print_json(&api.interviews().list().await?),
            InterviewsSubcommand::Upcoming => print_json(&api.interviews().upcoming().await?),
        },
        Command::Jobs(cmd) => jobs_command(cmd.command, &api, &jobs).await,
        Command::Analytics(cmd) => match cmd.command {
            AnalyticsSubcommand::Overview => print_json(&api.analytics().overview().await?),
            AnalyticsSubcommand::Insights => print_json(&api.analytics().insights().await?),
        },
        Command::Ai(cmd) => ai(cmd.command, &api).await,
    }
}

async fn resumes(command: ResumesSubcommand, api: &ApiClient) -> Result<()> {
    let resumes = api.resumes();
    match command {
        ResumesSubcommand::List => print_json(&resumes.list().await?),
        ResumesSubcommand::Upload { file, title } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("Resume path has no file name")?;
            print_json(&resumes.upload(file_name, bytes, &title).await?)
        }
        ResumesSubcommand::Analyze { id } => print_json(&resumes.analyze(id).await?),
        ResumesSubcommand::Primary { id } => print_json(&resumes.set_primary(id).await?),
        ResumesSubcommand::Delete { id } => {
            resumes.delete(id).await?;
            info!("Deleted resume {id}");
            Ok(())
        }
    }
}

async fn applications(command: ApplicationsSubcommand, api: &ApiClient) -> Result<()> {
    let applications = api.applications();
    match command {
        ApplicationsSubcommand::List {
            status,
            search,
            limit,
        } => {
            let filters = ApplicationFilters {
                status,
                search,
                limit,
                ..Default::default()
            };
            print_json(&applications.list(&filters).await?)
        }
        ApplicationsSubcommand::Add {
            company,
            title,
            url,
            status,
            notes,
        } => {
            let mut application = NewApplication::new(company, title);
            application.job_url = url;
            application.status = status;
            application.notes = notes;
            print_json(&applications.create(&application).await?)
        }
        ApplicationsSubcommand::Status { id, status } => {
            print_json(&applications.update_status(id, status).await?)
        }
        ApplicationsSubcommand::Stats => print_json(&applications.stats().await?),
    }
}

async fn jobs_command(command: JobsSubcommand, api: &ApiClient, jobs: &JobsApiClient) -> Result<()> {
    match command {
        JobsSubcommand::Search {
            query,
            location,
            remote,
            job_type,
            page,
            limit,
        } => {
            let params = JobSearchParams {
                query,
                location,
                remote: remote.then_some(true),
                job_type,
                page,
                limit,
                ..Default::default()
            };
            print_json(&jobs.search(&params).await?)
        }
        JobsSubcommand::Show { id } => print_json(&jobs.get(&id).await?),
        JobsSubcommand::Matches { resume_id } => print_json(&api.jobs().matches(resume_id).await?),
        JobsSubcommand::Bookmark { id, remove } => {
            if remove {
                api.jobs().unbookmark(&id).await?;
                info!("Removed bookmark for {id}");
            } else {
                api.jobs().bookmark(&id).await?;
                info!("Bookmarked {id}");
            }
            Ok(())
        }
        JobsSubcommand::Scraper { action } => match action {
            ScraperAction::Status => print_json(&jobs.scraper_status().await?),
            ScraperAction::Run => {
                let token = api
                    .session()
                    .access_token()
                    .context("Not signed in. Run `jobdeck login`.")?;
                print_json(&jobs.trigger_scrape(&token).await?)
            }
            ScraperAction::Health => {
                let healthy = jobs.health_check().await;
                print_json(&serde_json::json!({ "url": jobs.base_url(), "healthy": healthy }))
            }
        },
    }
}

async fn ai(command: AiSubcommand, api: &ApiClient) -> Result<()> {
    match command {
        AiSubcommand::CoverLetter {
            resume_id,
            job_id,
            tone,
        } => {
            let request = CoverLetterRequest {
                resume_id,
                job_id,
                tone,
                length: None,
                custom_notes: None,
            };
            let letter = api.ai().cover_letter(&request).await?;
            println!("{}", letter.letter);
            Ok(())
        }
        AiSubcommand::Questions { job_id, kind } => {
            let request = InterviewQuestionsRequest {
                job_id,
                interview_type: kind.into(),
                seniority: None,
                focus_areas: None,
            };
            print_json(&api.ai().interview_questions(&request).await?)
        }
        AiSubcommand::Chat { message } => {
            let reply = api.ai().chat(&message, None).await?;
            println!("{}", reply.response);
            Ok(())
        }
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("A password is required");
    }
    Ok(password)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
