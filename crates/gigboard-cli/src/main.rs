//! `gigboard` — job board client and API server.
//!
//! Every invocation opens the local store, so the signed-in session carries
//! over between commands.
//!
//! # Usage
//!
//! ```text
//! gigboard register --email alice@x.com --name Alice --role employee
//! gigboard jobs
//! gigboard apply <JOB_ID>
//! gigboard serve
//! ```

mod prompt;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gigboard_api::{AppState, api_router};
use gigboard_core::{
  document::Stored,
  identity::Credentials,
  job::{Job, NewJob},
  profile::{NewProfile, Role},
};
use gigboard_session::{
  Dashboard, SessionManager,
  handshake::wait_for_session,
  view::{ApplicationAction, ApplicationEntry},
};
use gigboard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use prompt::{StdinConfirmation, password_or_stdin};
use settings::Settings;

type Session = SessionManager<SqliteStore, SqliteStore>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "gigboard", version, about = "A small job board")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "gigboard.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Create an account with a profile and sign in.
  Register {
    #[arg(long)]
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    name:     String,
    #[arg(long, default_value = "")]
    phone:    String,
    /// `employee` or `employer`.
    #[arg(long)]
    role:     Role,
  },
  /// Sign in to an existing account.
  Login {
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: Option<String>,
  },
  /// Sign out.
  Logout,
  /// Show the signed-in identity and profile.
  Whoami,
  /// Show the full dashboard for the signed-in role.
  Dashboard,
  /// List open jobs (employees) or your posted jobs (employers).
  Jobs,
  /// Post a job.
  PostJob {
    #[arg(long)]
    title:       String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    salary:      String,
    #[arg(long, default_value = "")]
    category:    String,
  },
  /// Apply for a job.
  Apply { job_id: Uuid },
  /// List your applications (employees) or those to your jobs (employers).
  Applications,
  /// Delete one of your jobs.
  DeleteJob {
    job_id: Uuid,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes:    bool,
  },
  /// Accept or reject a pending application.
  Review {
    application_id: Uuid,
    decision:       Decision,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Decision {
  Accept,
  Reject,
}

impl From<Decision> for ApplicationAction {
  fn from(d: Decision) -> Self {
    match d {
      Decision::Accept => ApplicationAction::Accept,
      Decision::Reject => ApplicationAction::Reject,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli      = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store_path = settings.store_path();
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );
  let session = SessionManager::new(store.clone(), store, settings.profile_lookup.clone());

  let result = run(cli.command, &settings, session).await;
  if let Err(e) = &result {
    tracing::debug!(error = ?e, "command failed");
  }
  result
}

/// A token cancelled by Ctrl-C.
fn interrupt_token() -> CancellationToken {
  let cancel = CancellationToken::new();
  let token  = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      token.cancel();
    }
  });
  cancel
}

async fn open_dashboard(
  session: &Session,
  settings: &Settings,
) -> Result<Dashboard<SqliteStore>> {
  if !session.is_session_active() {
    anyhow::bail!("not signed in; run `gigboard login` or `gigboard register` first");
  }
  Dashboard::open(session, &settings.retry_policy(), &interrupt_token())
    .await
    .context("could not load your profile")
}

async fn run(command: Command, settings: &Settings, session: Session) -> Result<()> {
  match command {
    Command::Serve => serve(settings, session).await,

    Command::Register { email, password, name, phone, role } => {
      let credentials = Credentials::new(email, password_or_stdin(password)?);
      let identity = session
        .register(&credentials, NewProfile::new(name, phone, role))
        .await?;
      println!("Registered and signed in as {} ({role}).", identity.email);
      Ok(())
    }

    Command::Login { email, password } => {
      let credentials = Credentials::new(email, password_or_stdin(password)?);
      let identity = session.login(&credentials).await?;
      println!("Signed in as {}.", identity.email);
      Ok(())
    }

    Command::Logout => {
      session.logout().await?;
      println!("Signed out.");
      Ok(())
    }

    Command::Whoami => {
      if !session.is_session_active() {
        println!("Not signed in.");
        return Ok(());
      }
      let resolved = wait_for_session(&session, &settings.retry_policy(), &interrupt_token())
        .await
        .context("could not load your profile")?;
      let profile = &resolved.profile;
      println!("{}", gigboard_session::view::welcome(profile));
      println!("  email: {}", resolved.identity.email);
      println!("  phone: {}", profile.phone);
      println!("  uid:   {}", resolved.identity.uid);
      Ok(())
    }

    Command::Dashboard => {
      let view = open_dashboard(&session, settings).await?.view().await?;
      println!("{}", serde_json::to_string_pretty(&view)?);
      Ok(())
    }

    Command::Jobs => {
      let dashboard = open_dashboard(&session, settings).await?;
      let jobs = match dashboard.role() {
        Role::Employee => dashboard.available_jobs().await?,
        Role::Employer => dashboard.posted_jobs().await?,
      };
      if jobs.is_empty() {
        println!("No jobs.");
      }
      for job in &jobs {
        print_job(job);
      }
      Ok(())
    }

    Command::PostJob { title, description, salary, category } => {
      let dashboard = open_dashboard(&session, settings).await?;
      let job = dashboard
        .post_job(NewJob { title, description, salary, category })
        .await?;
      println!("Job posted successfully! ({})", job.id);
      Ok(())
    }

    Command::Apply { job_id } => {
      let application = open_dashboard(&session, settings)
        .await?
        .apply_for_job(job_id)
        .await?;
      println!("Application submitted successfully! ({})", application.id);
      Ok(())
    }

    Command::Applications => {
      let dashboard = open_dashboard(&session, settings).await?;
      match dashboard.role() {
        Role::Employee => {
          for application in dashboard.my_applications().await? {
            println!(
              "{}  {:<30} {}",
              application.id, application.job_title, application.status
            );
          }
        }
        Role::Employer => {
          for entry in dashboard.job_applications().await? {
            print_entry(&entry);
          }
        }
      }
      Ok(())
    }

    Command::DeleteJob { job_id, yes } => {
      let dashboard = open_dashboard(&session, settings).await?;
      if yes {
        dashboard.delete_job(job_id, &true).await?;
      } else {
        dashboard.delete_job(job_id, &StdinConfirmation).await?;
      }
      println!("Job deleted successfully!");
      Ok(())
    }

    Command::Review { application_id, decision } => {
      let status = ApplicationAction::from(decision).target();
      open_dashboard(&session, settings)
        .await?
        .update_application_status(application_id, status)
        .await?;
      println!("Application {status} successfully!");
      Ok(())
    }
  }
}

async fn serve(settings: &Settings, session: Session) -> Result<()> {
  let session = Arc::new(session);
  let app     = api_router(AppState::new(session.clone(), settings.retry_policy()));
  let address = settings.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  let shutdown = interrupt_token();
  axum::serve(listener, app)
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .context("server error")?;

  session.shutdown();
  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_job(job: &Stored<Job>) {
  println!("{}  {}", job.id, job.title);
  println!("    {} | {} | posted by {}", job.category, job.salary, job.employer_name);
  if !job.description.is_empty() {
    println!("    {}", job.description);
  }
}

fn print_entry(entry: &ApplicationEntry) {
  let application = &entry.application;
  let actions: Vec<_> = entry
    .actions
    .iter()
    .map(|a| match a {
      ApplicationAction::Accept => "accept",
      ApplicationAction::Reject => "reject",
    })
    .collect();
  println!(
    "{}  {:<30} {} <{}>  {}{}",
    application.id,
    application.job_title,
    application.employee_name,
    application.employee_email,
    application.status,
    if actions.is_empty() { String::new() } else { format!("  [{}]", actions.join("/")) },
  );
}
