use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use schoolrec_core::auth::{AuthContext, CredentialStore, Session};
use schoolrec_core::config::Config;
use schoolrec_core::models::{
    CandidateEntry, ClassSubject, Employee, EnrolledSubject, Enrollment, Record, Resource,
    SchoolBuilding, SchoolClass, SchoolLevel, SchoolRoom, SchoolSection, SchoolSubject, SchoolYear,
    Student,
};
use schoolrec_core::staging::{
    BatchWriter, CatalogItem, ClassScheduleDraft, EditingSession, EnrollmentDraft, ParentContext,
    RowDraft, SelectionCatalog, ShrinkingCatalog, StagedRow, StaticCatalog,
};
use schoolrec_core::utils::{format_time_range, truncate};
use schoolrec_core::ApiClient;

/// Width of the summary column in listings
const SUMMARY_WIDTH: usize = 80;

/// One line of a `schedule` rows file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRowInput {
    pub subject_id: String,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub room_id: Option<String>,
    pub max_enrolled: Option<u32>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl ScheduleRowInput {
    /// Resolve ids against the loaded lookups. Unknown ids leave the field
    /// empty so the validator reports it.
    pub fn to_draft(
        &self,
        subjects: &StaticCatalog<SchoolSubject>,
        rooms: &StaticCatalog<SchoolRoom>,
    ) -> ClassScheduleDraft {
        ClassScheduleDraft {
            subject: subjects.find(&self.subject_id).map(CatalogItem::to_choice),
            time_from: self.time_from.clone(),
            time_to: self.time_to.clone(),
            room: self
                .room_id
                .as_deref()
                .and_then(|id| rooms.find(id))
                .map(CatalogItem::to_choice),
            max_enrolled: self.max_enrolled,
            remarks: self.remarks.clone(),
            ..Default::default()
        }
    }
}

pub struct App {
    config: Config,
    session: Session,
    api: ApiClient,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let mut session = Session::new(cache_dir);
        let load_result = session.load();
        debug!(?load_result, has_data = session.data.is_some(), "Session loaded");

        let api = ApiClient::new(config.api_base_url())?;
        debug!(base_url = api.base_url(), "API client configured");

        Ok(Self {
            config,
            session,
            api,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(name) if !name.trim().is_empty() => name,
            _ => Self::prompt_username()?,
        };
        if username.is_empty() {
            bail!("Username required");
        }

        let password = if CredentialStore::has_credentials(&username) {
            print!("Use stored password? [Y/n]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if input.trim().to_lowercase() != "n" {
                CredentialStore::get_password(&username)?
            } else {
                Self::prompt_password()?
            }
        } else {
            Self::prompt_password()?
        };

        println!("Authenticating...");
        let auth = self.api.authenticate(&username, &password).await?;

        if let Err(e) = CredentialStore::store(&username, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
        self.remember(auth)?;

        info!(username = %username, "Login successful");
        println!("Logged in as {}", username);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        let username = self
            .session
            .data
            .as_ref()
            .map(|d| d.username.clone())
            .or_else(|| self.config.last_username.clone());

        self.session.clear().context("Failed to clear session")?;
        if let Some(ref username) = username {
            if CredentialStore::has_credentials(username) {
                CredentialStore::delete(username)?;
            }
        }
        info!(username = ?username, "Logged out");
        println!("Logged out");
        Ok(())
    }

    /// A usable auth context. A stale session is renewed silently with the
    /// stored password when one exists.
    async fn auth(&mut self) -> Result<AuthContext> {
        if let Some(ref data) = self.session.data {
            if !data.needs_refresh() {
                return Ok(data.clone());
            }
            debug!(minutes_left = data.minutes_until_expiry(), "Session needs refresh");
        }

        let username = self
            .session
            .data
            .as_ref()
            .map(|d| d.username.clone())
            .or_else(|| self.config.last_username.clone())
            .filter(|u| CredentialStore::has_credentials(u))
            .ok_or_else(|| anyhow!("Not logged in. Run `schoolrec login` first."))?;

        let password = CredentialStore::get_password(&username)?;
        let auth = self
            .api
            .authenticate(&username, &password)
            .await
            .context("Silent re-login failed. Run `schoolrec login` again.")?;
        info!(username = %username, "Session renewed");
        self.remember(auth.clone())?;
        Ok(auth)
    }

    fn remember(&mut self, auth: AuthContext) -> Result<()> {
        self.config.last_username = Some(auth.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.session.update(auth);
        self.session.save().context("Failed to save session")
    }

    fn prompt_username() -> Result<String> {
        print!("Username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        Ok(username.trim().to_string())
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        Ok(password)
    }

    // =========================================================================
    // Records
    // =========================================================================

    pub async fn list(&mut self, resource: Resource, page: u32, search: &str) -> Result<()> {
        let auth = self.auth().await?;
        match resource {
            Resource::Employees => self.print_page::<Employee>(&auth, page, search).await,
            Resource::Students => self.print_page::<Student>(&auth, page, search).await,
            Resource::SchoolYear => self.print_page::<SchoolYear>(&auth, page, search).await,
            Resource::SchoolLevel => self.print_page::<SchoolLevel>(&auth, page, search).await,
            Resource::SchoolSection => self.print_page::<SchoolSection>(&auth, page, search).await,
            Resource::SchoolSubject => self.print_page::<SchoolSubject>(&auth, page, search).await,
            Resource::SchoolBuilding => {
                self.print_page::<SchoolBuilding>(&auth, page, search).await
            }
            Resource::SchoolRoom => self.print_page::<SchoolRoom>(&auth, page, search).await,
            Resource::SchoolClass => self.print_page::<SchoolClass>(&auth, page, search).await,
            Resource::ClassSubject => self.print_page::<ClassSubject>(&auth, page, search).await,
            Resource::Enrollment => self.print_page::<Enrollment>(&auth, page, search).await,
            Resource::EnrolledSubject => {
                self.print_page::<EnrolledSubject>(&auth, page, search).await
            }
        }
    }

    async fn print_page<T: Record>(&self, auth: &AuthContext, page: u32, search: &str) -> Result<()> {
        let page = self
            .api
            .list::<T>(auth, page, search)
            .await
            .with_context(|| format!("Failed to list {}", T::RESOURCE))?;

        if page.data.is_empty() {
            println!("No {} found", T::RESOURCE);
            return Ok(());
        }
        for record in &page.data {
            println!("{:<26} {}", record.id(), truncate(&record.summary(), SUMMARY_WIDTH));
        }
        println!("\nPage {} of {}", page.current_page, page.total_pages);
        if page.has_next() {
            println!("More: --page {}", page.current_page + 1);
        }
        Ok(())
    }

    pub async fn delete(&mut self, resource: Resource, id: &str) -> Result<()> {
        let auth = self.auth().await?;
        self.api
            .delete(&auth, resource, id)
            .await
            .with_context(|| format!("Failed to delete {} {}", resource, id))?;
        println!("Deleted {} {}", resource, id);
        Ok(())
    }

    pub async fn add(&mut self, resource: Resource, body_file: &Path) -> Result<()> {
        let body = read_body(body_file)?;
        let auth = self.auth().await?;
        let record = self
            .api
            .add(&auth, resource, &body)
            .await
            .with_context(|| format!("Failed to add {}", resource))?;
        let id = record.get("_id").and_then(|v| v.as_str()).unwrap_or("-");
        println!("Added {} {}", resource, id);
        Ok(())
    }

    pub async fn edit(&mut self, resource: Resource, id: &str, body_file: &Path) -> Result<()> {
        let body = read_body(body_file)?;
        let auth = self.auth().await?;
        self.api
            .edit(&auth, resource, id, &body)
            .await
            .with_context(|| format!("Failed to edit {} {}", resource, id))?;
        println!("Updated {} {}", resource, id);
        Ok(())
    }

    // =========================================================================
    // Staged forms
    // =========================================================================

    /// Stage every row from `rows_file` against the level's subjects and the
    /// room list, then save them as the class timetable.
    pub async fn schedule(&mut self, class_id: &str, level_id: &str, rows_file: &Path) -> Result<()> {
        let inputs = read_schedule_rows(rows_file)?;
        let auth = self.auth().await?;

        let (subjects, rooms) = futures::try_join!(
            self.api.level_subjects(&auth, level_id),
            self.api.rooms(&auth),
        )
        .context("Failed to load subjects and rooms")?;
        debug!(subjects = subjects.len(), rooms = rooms.len(), "Lookups loaded");

        let rooms = StaticCatalog::new(rooms);
        let mut session =
            EditingSession::open(ParentContext::class(class_id), StaticCatalog::new(subjects));

        let mut rejected = 0;
        for (i, input) in inputs.iter().enumerate() {
            let draft = RowDraft::ClassSchedule(input.to_draft(session.rows().catalog(), &rooms));
            if let Err(e) = session.rows_mut().stage(&draft) {
                rejected += 1;
                eprintln!("Row {} ({}): {}", i + 1, input.subject_id, e);
            }
        }
        if rejected > 0 {
            bail!("{} of {} rows rejected; nothing saved", rejected, inputs.len());
        }

        print_rows(session.rows().rows());
        save_staged(&self.api, &mut session, &auth).await
    }

    /// Enroll a student in the given class-subject slots.
    pub async fn enroll(
        &mut self,
        student_id: &str,
        class_id: &str,
        slot_ids: &[String],
        remarks: Option<&str>,
    ) -> Result<()> {
        let auth = self.auth().await?;

        let year = self
            .api
            .active_school_year(&auth)
            .await
            .context("Failed to load the active school year")?;
        let classes = self.api.open_classes(&auth, &year.id).await?;
        if !classes.iter().any(|c| c.id == class_id) {
            bail!(
                "Class {} is not open for enrollment in {}",
                class_id,
                year.school_year.as_deref().unwrap_or(&year.id)
            );
        }

        let mut session = EditingSession::open(
            ParentContext::new_enrollment(student_id, class_id),
            ShrinkingCatalog::<CandidateEntry>::default(),
        );

        let ticket = session.begin_catalog_load(class_id);
        let candidates = self.api.class_candidates(&auth, class_id).await;
        session.finish_catalog_load(ticket, candidates)?;

        enroll_slots(&self.api, &auth, &mut session, slot_ids, remarks).await
    }
}

/// Stage every requested slot and save them together. An unknown, repeated
/// or invalid slot aborts before anything is written.
async fn enroll_slots<W: BatchWriter>(
    writer: &W,
    auth: &AuthContext,
    session: &mut EditingSession<ShrinkingCatalog<CandidateEntry>>,
    slot_ids: &[String],
    remarks: Option<&str>,
) -> Result<()> {
    let mut rejected = 0;
    for slot_id in slot_ids {
        let Some(slot) = session.rows().catalog().find(slot_id).cloned() else {
            rejected += 1;
            eprintln!("{}: not offered for this class or already selected", slot_id);
            continue;
        };
        let draft = RowDraft::EnrollmentSelection(EnrollmentDraft {
            slot: Some(slot),
            remarks: remarks.map(str::to_string),
        });
        if let Err(e) = session.rows_mut().stage(&draft) {
            rejected += 1;
            eprintln!("{}: {}", slot_id, e);
        }
    }
    if rejected > 0 {
        bail!("{} of {} slots rejected; nothing saved", rejected, slot_ids.len());
    }

    print_rows(session.rows().rows());
    let remaining = session.rows().catalog().candidates().len();
    if remaining > 0 {
        println!("{} other slot(s) still open in this class", remaining);
    }
    save_staged(writer, session, auth).await
}

async fn save_staged<W: BatchWriter, C: SelectionCatalog>(
    writer: &W,
    session: &mut EditingSession<C>,
    auth: &AuthContext,
) -> Result<()> {
    let count = session.rows().len();
    let mut saved = false;
    let record = session
        .save(writer, auth, || saved = true)
        .await
        .context("Save failed")?;

    if saved {
        let id = record.get("_id").and_then(|v| v.as_str()).unwrap_or("-");
        println!("Saved {} row(s) (record {})", count, id);
    }
    Ok(())
}

/// Read a JSON object to send as a record body.
fn read_body(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_body(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_body(contents: &str) -> Result<Value> {
    let body: Value = serde_json::from_str(contents)?;
    if !body.is_object() {
        bail!("Record body must be a JSON object");
    }
    Ok(body)
}

fn read_schedule_rows(path: &Path) -> Result<Vec<ScheduleRowInput>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_schedule_rows(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_schedule_rows(contents: &str) -> Result<Vec<ScheduleRowInput>> {
    Ok(serde_json::from_str(contents)?)
}

fn print_rows(rows: &[StagedRow]) {
    for row in rows {
        println!(
            "  {:<24} {:<13}  {:<16} {}",
            truncate(row.display_subject(), 24),
            format_time_range(Some(row.time_from()), Some(row.time_to())),
            truncate(row.room_label(), 16),
            row.teacher_label().unwrap_or("-"),
        );
    }
}
