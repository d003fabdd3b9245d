//! The role dashboards: job postings and applications for a resolved session.
//!
//! A [`Dashboard`] is built from a [`ResolvedSession`] and keeps its own copy
//! of the identity and profile; it never writes session state. Every operation
//! checks the profile's role first and fails with
//! [`DashboardError::WrongRole`] for the other one.

use std::sync::Arc;

use chrono::Utc;
use gigboard_core::{
  application::{self, Application, ApplicationStatus},
  document::{Collection, Document, FieldFilter, Fields, Stored, encode},
  identity::Identity,
  job::{self, Job, NewJob},
  profile::{Profile, Role},
  store::{DocumentStore, IdentityProvider},
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
  error::{DashboardError, HandshakeError},
  handshake::{ResolvedSession, RetryPolicy, wait_for_session},
  manager::SessionManager,
  view::{ApplicationEntry, DashboardView, EmployeeView, EmployerView, welcome},
};

type Result<T, E = DashboardError> = std::result::Result<T, E>;

/// Asks the user to confirm a destructive action. Blocking.
pub trait Confirmation {
  fn confirm(&self, prompt: &str) -> bool;
}

/// A pre-answered confirmation.
impl Confirmation for bool {
  fn confirm(&self, _prompt: &str) -> bool { *self }
}

pub const DELETE_JOB_PROMPT: &str = "Are you sure you want to delete this job?";

fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<Stored<T>>> {
  docs
    .iter()
    .map(|doc| doc.decode::<T>().map_err(DashboardError::from))
    .collect()
}

pub struct Dashboard<D> {
  store:    Arc<D>,
  identity: Identity,
  profile:  Profile,
}

impl<D: DocumentStore> Dashboard<D> {
  /// Wait for `session` to resolve, then open the dashboard for it.
  pub async fn open<I>(
    session: &SessionManager<I, D>,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
  ) -> Result<Self, HandshakeError>
  where
    I: IdentityProvider + 'static,
    D: 'static,
  {
    let resolved = wait_for_session(session, policy, cancel).await?;
    tracing::debug!(
      uid = %resolved.identity.uid,
      attempts = resolved.profile_attempts,
      "dashboard opened"
    );
    Ok(Self::from_resolved(session.store().clone(), resolved))
  }

  pub fn from_resolved(store: Arc<D>, resolved: ResolvedSession) -> Self {
    Self { store, identity: resolved.identity, profile: resolved.profile }
  }

  pub fn identity(&self) -> &Identity { &self.identity }

  pub fn profile(&self) -> &Profile { &self.profile }

  pub fn role(&self) -> Role { self.profile.role }

  fn require(&self, expected: Role) -> Result<()> {
    if self.profile.role == expected {
      Ok(())
    } else {
      Err(DashboardError::WrongRole { expected })
    }
  }

  fn uid_filter(field: &str, uid: Uuid) -> FieldFilter {
    FieldFilter::eq(field, uid.to_string())
  }

  /// Everything the role's dashboard shows.
  pub async fn view(&self) -> Result<DashboardView> {
    let welcome = welcome(&self.profile);
    match self.profile.role {
      Role::Employee => Ok(DashboardView::Employee(EmployeeView {
        welcome,
        available_jobs: self.available_jobs().await?,
        my_applications: self.my_applications().await?,
      })),
      Role::Employer => Ok(DashboardView::Employer(EmployerView {
        welcome,
        posted_jobs: self.posted_jobs().await?,
        applications: self.job_applications().await?,
      })),
    }
  }

  // ─── Shared reads ────────────────────────────────────────────────────────

  async fn find_job(&self, job_id: Uuid) -> Result<Stored<Job>> {
    let doc = self
      .store
      .get(Collection::Jobs, job_id)
      .await
      .map_err(DashboardError::persistence)?
      .ok_or(DashboardError::JobNotFound(job_id))?;
    let job = doc.decode::<Job>()?;
    if job.deleted {
      return Err(DashboardError::JobNotFound(job_id));
    }
    Ok(job)
  }

  async fn query<T: DeserializeOwned>(
    &self,
    collection: Collection,
    filters: &[FieldFilter],
  ) -> Result<Vec<Stored<T>>> {
    let docs = self
      .store
      .query(collection, filters)
      .await
      .map_err(DashboardError::persistence)?;
    decode_all(docs)
  }

  // ─── Employee ────────────────────────────────────────────────────────────

  /// Jobs open for applications, oldest first.
  pub async fn available_jobs(&self) -> Result<Vec<Stored<Job>>> {
    self.require(Role::Employee)?;
    let mut jobs = self.query::<Job>(Collection::Jobs, &[]).await?;
    jobs.retain(|job| !job.deleted);
    Ok(jobs)
  }

  pub async fn my_applications(&self) -> Result<Vec<Stored<Application>>> {
    self.require(Role::Employee)?;
    self
      .query(
        Collection::Applications,
        &[Self::uid_filter(application::fields::EMPLOYEE_ID, self.identity.uid)],
      )
      .await
  }

  /// Apply to `job_id` as the signed-in employee. At most one application
  /// per job and employee is ever written.
  pub async fn apply_for_job(&self, job_id: Uuid) -> Result<Stored<Application>> {
    self.require(Role::Employee)?;
    let job = self.find_job(job_id).await?;

    let key = [
      Self::uid_filter(application::fields::JOB_ID, job_id),
      Self::uid_filter(application::fields::EMPLOYEE_ID, self.identity.uid),
    ];
    let existing = self
      .store
      .query(Collection::Applications, &key)
      .await
      .map_err(DashboardError::persistence)?;
    if !existing.is_empty() {
      return Err(DashboardError::DuplicateApplication(job_id));
    }

    let record = Application {
      job_id,
      job_title: job.title.clone(),
      employee_id: self.identity.uid,
      employee_name: self.profile.name.clone(),
      employee_email: self.identity.email.clone(),
      status: ApplicationStatus::Pending,
      applied_at: Utc::now(),
    };
    let fields = encode(Collection::Applications, &record)?;

    // The pre-check above can race with a concurrent apply; the conditional
    // write settles it.
    let id = self
      .store
      .insert_unique(
        Collection::Applications,
        fields,
        &[application::fields::JOB_ID, application::fields::EMPLOYEE_ID],
      )
      .await
      .map_err(DashboardError::persistence)?
      .ok_or(DashboardError::DuplicateApplication(job_id))?;

    tracing::info!(%job_id, application_id = %id, "application submitted");
    Ok(Stored { id, record })
  }

  // ─── Employer ────────────────────────────────────────────────────────────

  /// The employer's own jobs that have not been deleted, oldest first.
  pub async fn posted_jobs(&self) -> Result<Vec<Stored<Job>>> {
    self.require(Role::Employer)?;
    let mut jobs = self
      .query::<Job>(
        Collection::Jobs,
        &[Self::uid_filter(job::fields::EMPLOYER_ID, self.identity.uid)],
      )
      .await?;
    jobs.retain(|job| !job.deleted);
    Ok(jobs)
  }

  /// Applications to the employer's posted jobs, grouped by job in posting
  /// order. One read per job.
  pub async fn job_applications(&self) -> Result<Vec<ApplicationEntry>> {
    let jobs = self.posted_jobs().await?;

    let mut entries = Vec::new();
    for job in jobs {
      let applications = self
        .query::<Application>(
          Collection::Applications,
          &[Self::uid_filter(application::fields::JOB_ID, job.id)],
        )
        .await?;
      entries.extend(applications.into_iter().map(ApplicationEntry::from));
    }
    Ok(entries)
  }

  pub async fn post_job(&self, form: NewJob) -> Result<Stored<Job>> {
    self.require(Role::Employer)?;
    if form.title.trim().is_empty() {
      return Err(DashboardError::InvalidJob("title is required".into()));
    }

    let record = form.into_job(&self.profile, Utc::now());
    let fields = encode(Collection::Jobs, &record)?;
    let id = self
      .store
      .insert(Collection::Jobs, fields)
      .await
      .map_err(DashboardError::persistence)?;

    tracing::info!(job_id = %id, title = %record.title, "job posted");
    Ok(Stored { id, record })
  }

  /// Soft-delete one of the employer's jobs after asking `confirmation`.
  pub async fn delete_job(
    &self,
    job_id: Uuid,
    confirmation: &impl Confirmation,
  ) -> Result<()> {
    self.require(Role::Employer)?;
    let job = self.find_job(job_id).await?;
    if job.employer_id != self.identity.uid {
      return Err(DashboardError::NotOwner(job_id));
    }
    if !confirmation.confirm(DELETE_JOB_PROMPT) {
      return Err(DashboardError::NotConfirmed);
    }

    let mut patch = Fields::new();
    patch.insert(job::fields::DELETED.into(), true.into());
    self
      .store
      .update_fields(Collection::Jobs, job_id, patch)
      .await
      .map_err(DashboardError::persistence)?;

    tracing::info!(%job_id, "job deleted");
    Ok(())
  }

  /// Accept or reject a pending application to one of the employer's jobs.
  pub async fn update_application_status(
    &self,
    application_id: Uuid,
    status: ApplicationStatus,
  ) -> Result<Stored<Application>> {
    self.require(Role::Employer)?;

    let mut application = self
      .store
      .get(Collection::Applications, application_id)
      .await
      .map_err(DashboardError::persistence)?
      .ok_or(DashboardError::ApplicationNotFound(application_id))?
      .decode::<Application>()?;

    let job = self
      .store
      .get(Collection::Jobs, application.job_id)
      .await
      .map_err(DashboardError::persistence)?
      .ok_or(DashboardError::JobNotFound(application.job_id))?
      .decode::<Job>()?;
    if job.employer_id != self.identity.uid {
      return Err(DashboardError::NotOwner(application.job_id));
    }

    let from = application.status;
    if !from.can_transition_to(status) {
      return Err(DashboardError::InvalidTransition { from, to: status });
    }

    let mut patch = Fields::new();
    patch.insert(application::fields::STATUS.into(), status.to_string().into());
    self
      .store
      .update_fields(Collection::Applications, application_id, patch)
      .await
      .map_err(DashboardError::persistence)?;

    tracing::info!(%application_id, %status, "application status updated");
    application.record.status = status;
    Ok(application)
  }
}
