mod config;
mod db;
mod models;
mod slots;
mod stats;
mod status;
mod store;
mod tui;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::Config;
use db::{resolve_id, Database};
use models::{
    ApplicationDraft, ApplicationPatch, ContactDraft, DateEnd, ExperienceCategory,
    ExperienceDraft, Formatting, Interview, ResumeDraft, ResumePatch, RoleTypeDraft, SalaryRange,
    Task, WorkMode, YearMonth,
};
use stats::DashboardStats;
use status::{ApplicationStatus, StatusFilter};
use std::path::PathBuf;
use store::{Record, RecordStore};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hunt")]
#[command(about = "Job search tracker - applications, experience bank, resumes and role types")]
struct Cli {
    /// Data file (default: $HUNT_DATA or the user data directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage job applications
    App {
        #[command(subcommand)]
        command: AppCommands,
    },

    /// Manage the experience bank
    Experience {
        #[command(subcommand)]
        command: ExperienceCommands,
    },

    /// Manage resume versions
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },

    /// Manage target role types
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Manage networking contacts
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },

    /// Show dashboard statistics
    Stats,

    /// Browse applications interactively
    Browse {
        /// Initial tab
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
    },

    /// Export all data as one JSON document
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON document from `hunt export`, replacing the collections it contains
    Import {
        /// Path to the export document
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum AppCommands {
    /// Record a new application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// Location
        #[arg(short, long)]
        location: String,

        /// Work mode
        #[arg(short = 'm', long, value_enum, default_value_t = WorkMode::Onsite)]
        mode: WorkMode,

        /// Link to the job posting
        #[arg(long)]
        url: Option<String>,

        /// Date the job was found (YYYY-MM-DD, default today)
        #[arg(long)]
        identified: Option<NaiveDate>,

        /// Date applied (YYYY-MM-DD)
        #[arg(long)]
        applied: Option<NaiveDate>,

        /// Pipeline status
        #[arg(short, long, value_enum, default_value_t = ApplicationStatus::Interested)]
        status: ApplicationStatus,

        /// Resume used (id or id prefix)
        #[arg(long)]
        resume: Option<String>,

        /// Role type (id or id prefix)
        #[arg(long)]
        role: Option<String>,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List applications
    List {
        /// Only this exact status
        #[arg(short, long, value_enum)]
        status: Option<ApplicationStatus>,

        /// Status group (all, active, interviewing, offers, rejected)
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,

        /// Only applications for this role type (id or id prefix)
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show application details
    Show {
        /// Application id or id prefix
        id: String,
    },

    /// Change fields of an application
    Update {
        /// Application id or id prefix
        id: String,

        #[arg(short, long, value_enum)]
        status: Option<ApplicationStatus>,

        /// Date applied (YYYY-MM-DD)
        #[arg(long)]
        applied: Option<NaiveDate>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Resume used (id or id prefix)
        #[arg(long)]
        resume: Option<String>,

        /// Role type (id or id prefix)
        #[arg(long)]
        role: Option<String>,

        /// Replace the notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Outcome or interviewer feedback
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application id or id prefix
        id: String,
    },

    /// Log an interview round
    Interview {
        /// Application id or id prefix
        id: String,

        /// Kind of interview (phone, technical, onsite, ...)
        #[arg(short, long)]
        kind: String,

        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Add a follow-up task
    Task {
        /// Application id or id prefix
        id: String,

        /// What needs doing
        description: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
    },
}

#[derive(Subcommand)]
enum ExperienceCommands {
    /// Add an experience entry
    Add {
        /// Title or role
        title: String,

        #[arg(short, long)]
        company: Option<String>,

        /// First month (YYYY-MM)
        #[arg(long)]
        start: YearMonth,

        /// Last month (YYYY-MM) or "present"
        #[arg(long, default_value = "present")]
        end: DateEnd,

        #[arg(short = 'k', long, value_enum, default_value_t = ExperienceCategory::Work)]
        category: ExperienceCategory,

        /// Description bullet (repeatable)
        #[arg(short, long = "bullet")]
        bullets: Vec<String>,

        /// Skill tag (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,
    },

    /// List experience entries
    List {
        #[arg(short = 'k', long, value_enum)]
        category: Option<ExperienceCategory>,

        /// Only entries tagged with any of these skills (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,
    },

    /// Delete an experience entry
    Delete {
        /// Entry id or id prefix
        id: String,
    },
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// Create a resume version
    Add {
        /// Name for this version
        name: String,

        /// Role this version targets
        #[arg(short, long)]
        target_role: String,

        #[arg(short, long)]
        industry: Option<String>,

        /// Experience entry to include (id or prefix, repeatable)
        #[arg(short, long = "experience")]
        experiences: Vec<String>,

        /// Skill to list (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,

        /// Formatting template
        #[arg(long)]
        template: Option<String>,
    },

    /// List resume versions
    List {
        /// Only versions targeting this role
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show a resume version
    Show {
        /// Resume id or id prefix
        id: String,
    },

    /// Rename a resume version
    Rename {
        /// Resume id or id prefix
        id: String,

        /// New name
        name: String,
    },

    /// Delete a resume version
    Delete {
        /// Resume id or id prefix
        id: String,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// Define a role type
    Add {
        /// Role title
        title: String,

        #[arg(short, long)]
        industry: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Required skill (repeatable)
        #[arg(long = "require")]
        required: Vec<String>,

        /// Preferred skill (repeatable)
        #[arg(long = "prefer")]
        preferred: Vec<String>,

        #[arg(long)]
        salary_min: Option<f64>,

        #[arg(long)]
        salary_max: Option<f64>,

        #[arg(long, default_value = "USD")]
        currency: String,

        /// Target company (repeatable)
        #[arg(long = "company")]
        companies: Vec<String>,

        /// Search keyword (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },

    /// List role types
    List {
        #[arg(short, long)]
        industry: Option<String>,
    },

    /// Delete a role type (applications keep their reference)
    Delete {
        /// Role type id or id prefix
        id: String,
    },
}

#[derive(Subcommand)]
enum ContactCommands {
    /// Add a contact
    Add {
        name: String,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(short, long)]
        position: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// How you know them
        #[arg(short, long, default_value = "")]
        relationship: String,

        /// Where you met
        #[arg(long, default_value = "")]
        source: String,

        /// Application they referred you to (id or prefix, repeatable)
        #[arg(long = "referral")]
        referrals: Vec<String>,
    },

    /// List contacts
    List {
        #[arg(short, long)]
        company: Option<String>,
    },

    /// Delete a contact
    Delete {
        /// Contact id or id prefix
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.data {
        config.data_path = path;
    }
    config.ephemeral |= cli.ephemeral;
    if cli.verbose {
        config.log_filter = "debug".to_string();
    }
    init_logging(&config);

    let mut db = Database::open(&config)?;

    match cli.command {
        Commands::App { command } => run_app(&mut db, command)?,
        Commands::Experience { command } => run_experience(&mut db, command)?,
        Commands::Resume { command } => run_resume(&mut db, command)?,
        Commands::Role { command } => run_role(&mut db, command)?,
        Commands::Contact { command } => run_contact(&mut db, command)?,
        Commands::Stats => print_stats(&db),
        Commands::Browse { filter } => tui::run_browse(&mut db, filter)?,

        Commands::Export { output } => {
            let doc = db.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, doc)
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                    println!("Exported {} to {}", db.location(), path.display());
                }
                None => println!("{}", doc),
            }
        }

        Commands::Import { file } => {
            let doc = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if !db.import_json(&doc) {
                return Err(anyhow!(
                    "Nothing imported: {} is not a valid export document",
                    file.display()
                ));
            }
            println!("Imported {} into {}", file.display(), db.location());
            println!(
                "  {} applications, {} experiences, {} resumes, {} role types, {} contacts",
                db.applications.len(),
                db.experiences.len(),
                db.resumes.len(),
                db.role_types.len(),
                db.contacts.len()
            );
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve a soft reference typed on the command line. References are not
/// required to exist, so an unknown value is kept verbatim.
fn reference<R: Record>(store: &RecordStore<R>, what: &str, given: &str) -> String {
    match resolve_id(store, what, given) {
        Ok(id) => id,
        Err(e) => {
            warn!("{:#}; storing '{}' as given", e, given);
            given.to_string()
        }
    }
}

// --- Applications ---

fn run_app(db: &mut Database, command: AppCommands) -> Result<()> {
    match command {
        AppCommands::Add {
            company,
            position,
            location,
            mode,
            url,
            identified,
            applied,
            status,
            resume,
            role,
            notes,
        } => {
            let draft = ApplicationDraft {
                company,
                position,
                location,
                work_mode: mode,
                posting_url: url,
                date_identified: identified,
                date_applied: applied,
                status,
                resume_used: resume
                    .map(|r| reference(&db.resumes, "resume", &r))
                    .unwrap_or_default(),
                role_type: role
                    .map(|r| reference(&db.role_types, "role type", &r))
                    .unwrap_or_default(),
                notes: notes.unwrap_or_default(),
                ..Default::default()
            };
            let app = db.applications.create(draft)?;
            println!("Added application {} ({} at {})", short_id(&app.id), app.position, app.company);
        }

        AppCommands::List { status, filter, role } => {
            let role = role.map(|r| reference(&db.role_types, "role type", &r));
            let apps = match status {
                Some(status) => db.applications.by_status(status),
                None => db.applications.by_filter(filter),
            };
            let apps: Vec<_> = apps
                .into_iter()
                .filter(|a| filter.matches(a.status))
                .filter(|a| role.as_deref().is_none_or(|r| a.role_type == r))
                .collect();
            if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<10} {:<20} {:<22} {:<20} {:<10}",
                    "ID", "STATUS", "POSITION", "COMPANY", "IDENTIFIED"
                );
                println!("{}", "-".repeat(86));
                for app in apps {
                    println!(
                        "{:<10} {:<20} {:<22} {:<20} {:<10}",
                        short_id(&app.id),
                        app.status,
                        truncate(&app.position, 20),
                        truncate(&app.company, 18),
                        app.date_identified
                    );
                }
            }
        }

        AppCommands::Show { id } => {
            let id = resolve_id(&db.applications, "application", &id)?;
            let Some(app) = db.applications.get(&id) else {
                println!("Application {} not found.", id);
                return Ok(());
            };
            println!("Application {}", app.id);
            println!("Position: {}", app.position);
            println!("Company: {}", app.company);
            println!("Location: {} ({})", app.location, app.work_mode.as_str());
            println!("Status: {}", app.status);
            if let Some(url) = &app.posting_url {
                println!("URL: {}", url);
            }
            println!("Identified: {}", app.date_identified);
            if let Some(applied) = app.date_applied {
                println!("Applied: {}", applied);
            }
            println!("Role type: {}", describe_ref(db.role_types.get(&app.role_type).map(|r| r.title.as_str()), &app.role_type));
            println!("Resume: {}", describe_ref(db.resumes.get(&app.resume_used).map(|r| r.name.as_str()), &app.resume_used));

            let referrers = db.contacts.referring(&app.id);
            if !referrers.is_empty() {
                let names: Vec<&str> = referrers.iter().map(|c| c.name.as_str()).collect();
                println!("Referred by: {}", names.join(", "));
            }
            if !app.interviews.is_empty() {
                println!("\nInterviews:");
                for interview in &app.interviews {
                    println!("  #{} {} on {}", interview.round, interview.kind, interview.date);
                    if !interview.notes.is_empty() {
                        println!("     {}", interview.notes);
                    }
                }
            }
            if !app.tasks.is_empty() {
                println!("\nTasks:");
                for task in &app.tasks {
                    let mark = if task.completed { "x" } else { " " };
                    println!("  [{}] {} (due {})", mark, task.description, task.due_date);
                }
            }
            if let Some(feedback) = &app.feedback {
                println!("\n--- Feedback ---\n{}", feedback);
            }
            if !app.notes.is_empty() {
                println!("\n--- Notes ---\n{}", textwrap::fill(&app.notes, 78));
            }
        }

        AppCommands::Update {
            id,
            status,
            applied,
            location,
            url,
            resume,
            role,
            notes,
            feedback,
        } => {
            let id = resolve_id(&db.applications, "application", &id)?;
            let patch = ApplicationPatch {
                status,
                date_applied: applied.map(Some),
                location,
                posting_url: url.map(|u| Some(u).filter(|u| !u.is_empty())),
                resume_used: resume.map(|r| reference(&db.resumes, "resume", &r)),
                role_type: role.map(|r| reference(&db.role_types, "role type", &r)),
                notes,
                feedback: feedback.map(Some),
                ..Default::default()
            };
            match db.applications.update(&id, patch)? {
                Some(app) => println!("Updated application {} ({}).", short_id(&app.id), app.status),
                None => println!("Application {} no longer exists.", id),
            }
        }

        AppCommands::Delete { id } => {
            let id = resolve_id(&db.applications, "application", &id)?;
            if db.applications.delete(&id) {
                println!("Deleted application {}.", short_id(&id));
            } else {
                println!("Application {} not found.", id);
            }
        }

        AppCommands::Interview { id, kind, date, notes } => {
            let id = resolve_id(&db.applications, "application", &id)?;
            let Some(app) = db.applications.get(&id) else {
                println!("Application {} not found.", id);
                return Ok(());
            };
            let mut interviews = app.interviews.clone();
            let round = interviews.len() as u32 + 1;
            interviews.push(Interview {
                id: store::new_id(),
                round,
                kind,
                date,
                notes: notes.unwrap_or_default(),
                follow_up_sent: false,
            });
            let patch = ApplicationPatch {
                interviews: Some(interviews),
                ..Default::default()
            };
            if db.applications.update(&id, patch)?.is_some() {
                println!("Logged interview round {} for {}.", round, short_id(&id));
            }
        }

        AppCommands::Task { id, description, due } => {
            let id = resolve_id(&db.applications, "application", &id)?;
            let Some(app) = db.applications.get(&id) else {
                println!("Application {} not found.", id);
                return Ok(());
            };
            let mut tasks = app.tasks.clone();
            tasks.push(Task {
                id: store::new_id(),
                description,
                due_date: due,
                completed: false,
            });
            let patch = ApplicationPatch {
                tasks: Some(tasks),
                ..Default::default()
            };
            if db.applications.update(&id, patch)?.is_some() {
                println!("Added task to {}.", short_id(&id));
            }
        }
    }
    Ok(())
}

// --- Experience bank ---

fn run_experience(db: &mut Database, command: ExperienceCommands) -> Result<()> {
    match command {
        ExperienceCommands::Add {
            title,
            company,
            start,
            end,
            category,
            bullets,
            skills,
        } => {
            let mut draft = ExperienceDraft::new(title, start, end);
            draft.company = company;
            draft.category = category;
            draft.description = bullets;
            draft.skills = skills;
            let entry = db.experiences.create(draft)?;
            println!("Added experience {} ({})", short_id(&entry.id), entry.title);
        }

        ExperienceCommands::List { category, skills } => {
            let entries: Vec<_> = match (category, skills.is_empty()) {
                (Some(category), true) => db.experiences.by_category(category),
                (None, true) => db.experiences.find(|_| true),
                (_, false) => db
                    .experiences
                    .with_any_skill(&skills)
                    .into_iter()
                    .filter(|e| category.is_none_or(|c| e.category == c))
                    .collect(),
            };
            if entries.is_empty() {
                println!("No experience entries found.");
            } else {
                println!("{:<10} {:<10} {:<28} {:<20} {:<18}", "ID", "CATEGORY", "TITLE", "COMPANY", "DATES");
                println!("{}", "-".repeat(90));
                for entry in entries {
                    println!(
                        "{:<10} {:<10} {:<28} {:<20} {:<18}",
                        short_id(&entry.id),
                        entry.category.as_str(),
                        truncate(&entry.title, 26),
                        truncate(entry.company.as_deref().unwrap_or("-"), 18),
                        format!("{} - {}", entry.date_start, entry.date_end)
                    );
                }
            }
        }

        ExperienceCommands::Delete { id } => {
            let id = resolve_id(&db.experiences, "experience entry", &id)?;
            if db.experiences.delete(&id) {
                println!("Deleted experience {}.", short_id(&id));
            } else {
                println!("Experience {} not found.", id);
            }
        }
    }
    Ok(())
}

// --- Resume versions ---

fn run_resume(db: &mut Database, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::Add {
            name,
            target_role,
            industry,
            experiences,
            skills,
            template,
        } => {
            let selected = experiences
                .iter()
                .map(|e| reference(&db.experiences, "experience entry", e))
                .collect();
            let mut formatting = Formatting::default();
            if let Some(template) = template {
                formatting.template = template;
            }
            let resume = db.resumes.create(ResumeDraft {
                name,
                target_role,
                target_industry: industry,
                selected_experiences: selected,
                skills,
                formatting,
                ..Default::default()
            })?;
            println!("Added resume '{}' ({})", resume.name, short_id(&resume.id));
        }

        ResumeCommands::List { role } => {
            let resumes = match &role {
                Some(role) => db.resumes.by_target_role(role),
                None => db.resumes.find(|_| true),
            };
            if resumes.is_empty() {
                println!("No resumes found.");
            } else {
                println!("{:<10} {:<24} {:<24} {:<20}", "ID", "NAME", "TARGET ROLE", "UPDATED");
                println!("{}", "-".repeat(80));
                for resume in resumes {
                    println!(
                        "{:<10} {:<24} {:<24} {:<20}",
                        short_id(&resume.id),
                        truncate(&resume.name, 22),
                        truncate(&resume.target_role, 22),
                        resume.last_updated.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        ResumeCommands::Show { id } => {
            let id = resolve_id(&db.resumes, "resume", &id)?;
            let Some(resume) = db.resumes.get(&id) else {
                println!("Resume {} not found.", id);
                return Ok(());
            };
            println!("Resume '{}' ({})", resume.name, resume.id);
            println!("Target role: {}", resume.target_role);
            if let Some(industry) = &resume.target_industry {
                println!("Industry: {}", industry);
            }
            println!("Created: {}", resume.created_at.format("%Y-%m-%d %H:%M:%S"));
            println!("Updated: {}", resume.last_updated.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "Format: {} / {} {}pt / spacing {}",
                resume.formatting.template,
                resume.formatting.font_family,
                resume.formatting.font_size,
                resume.formatting.spacing
            );
            if !resume.skills.is_empty() {
                println!("Skills: {}", resume.skills.join(", "));
            }
            if !resume.selected_experiences.is_empty() {
                println!("\nExperience:");
                for exp_id in &resume.selected_experiences {
                    match db.experiences.get(exp_id) {
                        Some(entry) => println!("  - {} ({} - {})", entry.title, entry.date_start, entry.date_end),
                        None => println!("  - (unknown entry {})", short_id(exp_id)),
                    }
                }
            }
            let used_by = db.applications.by_resume(&resume.id);
            if !used_by.is_empty() {
                println!("\nUsed for {} application(s):", used_by.len());
                for app in used_by {
                    println!("  {} {} at {} ({})", short_id(&app.id), app.position, app.company, app.status);
                }
            }
        }

        ResumeCommands::Rename { id, name } => {
            let id = resolve_id(&db.resumes, "resume", &id)?;
            let patch = ResumePatch {
                name: Some(name),
                ..Default::default()
            };
            match db.resumes.update(&id, patch)? {
                Some(resume) => println!("Renamed resume {} to '{}'.", short_id(&resume.id), resume.name),
                None => println!("Resume {} no longer exists.", id),
            }
        }

        ResumeCommands::Delete { id } => {
            let id = resolve_id(&db.resumes, "resume", &id)?;
            let users = db.applications.by_resume(&id).len();
            if db.resumes.delete(&id) {
                println!("Deleted resume {}.", short_id(&id));
                if users > 0 {
                    println!("  {} application(s) still reference it.", users);
                }
            } else {
                println!("Resume {} not found.", id);
            }
        }
    }
    Ok(())
}

// --- Role types ---

fn run_role(db: &mut Database, command: RoleCommands) -> Result<()> {
    match command {
        RoleCommands::Add {
            title,
            industry,
            description,
            required,
            preferred,
            salary_min,
            salary_max,
            currency,
            companies,
            keywords,
        } => {
            let role = db.role_types.create(RoleTypeDraft {
                title,
                industry,
                description,
                required_skills: required,
                preferred_skills: preferred,
                salary_range: SalaryRange {
                    min: salary_min.unwrap_or(0.0),
                    max: salary_max.unwrap_or(0.0),
                    currency,
                },
                target_companies: companies,
                search_keywords: keywords,
                ..Default::default()
            })?;
            println!("Added role type {} ({})", short_id(&role.id), role.title);
        }

        RoleCommands::List { industry } => {
            let roles = match &industry {
                Some(industry) => db.role_types.by_industry(industry),
                None => db.role_types.find(|_| true),
            };
            if roles.is_empty() {
                println!("No role types found.");
            } else {
                println!("{:<10} {:<26} {:<18} {:>20} {:>6}", "ID", "TITLE", "INDUSTRY", "SALARY", "APPS");
                println!("{}", "-".repeat(84));
                for role in roles {
                    let range = &role.salary_range;
                    let salary = if range.max > 0.0 {
                        format!("{}-{}k {}", range.min / 1000.0, range.max / 1000.0, range.currency)
                    } else {
                        "-".to_string()
                    };
                    println!(
                        "{:<10} {:<26} {:<18} {:>20} {:>6}",
                        short_id(&role.id),
                        truncate(&role.title, 24),
                        truncate(&role.industry, 16),
                        salary,
                        db.applications.by_role_type(&role.id).len()
                    );
                }
            }
        }

        RoleCommands::Delete { id } => {
            let id = resolve_id(&db.role_types, "role type", &id)?;
            let users = db.applications.by_role_type(&id).len();
            if db.role_types.delete(&id) {
                println!("Deleted role type {}.", short_id(&id));
                if users > 0 {
                    println!("  {} application(s) still reference it.", users);
                }
            } else {
                println!("Role type {} not found.", id);
            }
        }
    }
    Ok(())
}

// --- Contacts ---

fn run_contact(db: &mut Database, command: ContactCommands) -> Result<()> {
    match command {
        ContactCommands::Add {
            name,
            company,
            position,
            email,
            relationship,
            source,
            referrals,
        } => {
            let job_referrals = referrals
                .iter()
                .map(|r| reference(&db.applications, "application", r))
                .collect();
            let contact = db.contacts.create(ContactDraft {
                name,
                company,
                position,
                email,
                relationship,
                source,
                job_referrals,
                ..Default::default()
            })?;
            println!("Added contact {} ({})", short_id(&contact.id), contact.name);
        }

        ContactCommands::List { company } => {
            let contacts = match &company {
                Some(company) => db.contacts.by_company(company),
                None => db.contacts.find(|_| true),
            };
            if contacts.is_empty() {
                println!("No contacts found.");
            } else {
                println!("{:<10} {:<22} {:<20} {:<24} {:<10}", "ID", "NAME", "COMPANY", "EMAIL", "LAST SEEN");
                println!("{}", "-".repeat(90));
                for contact in contacts {
                    println!(
                        "{:<10} {:<22} {:<20} {:<24} {:<10}",
                        short_id(&contact.id),
                        truncate(&contact.name, 20),
                        truncate(contact.company.as_deref().unwrap_or("-"), 18),
                        truncate(contact.email.as_deref().unwrap_or("-"), 22),
                        contact.last_contact_date
                    );
                }
            }
        }

        ContactCommands::Delete { id } => {
            let id = resolve_id(&db.contacts, "contact", &id)?;
            if db.contacts.delete(&id) {
                println!("Deleted contact {}.", short_id(&id));
            } else {
                println!("Contact {} not found.", id);
            }
        }
    }
    Ok(())
}

// --- Dashboard ---

fn print_stats(db: &Database) {
    let stats = DashboardStats::compute(db.applications.all(), db.today());
    println!("Total applications:  {:>5}  (+{} this week)", stats.total, stats.identified_this_week);
    println!("Interviewing:        {:>5}  (+{} this week)", stats.interviewing, stats.interviews_this_week);
    println!("Response rate:       {:>4}%", stats.response_rate);
    println!("Open applications:   {:>5}", stats.open);

    let per_role = stats::per_role_type(db.role_types.all(), db.applications.all());
    if !per_role.is_empty() {
        println!("\nBy role type:");
        for (role, count) in per_role {
            let title = role.map(|r| r.title.as_str()).unwrap_or("(no or unknown role type)");
            println!("  {:<36} {:>4}", truncate(title, 34), count);
        }
    }

    let recent = db.applications.recent(5);
    if !recent.is_empty() {
        println!("\nRecent applications:");
        for app in recent {
            println!(
                "  {} {:<24} {:<20} {}",
                app.date_identified,
                truncate(&app.position, 22),
                truncate(&app.company, 18),
                app.status
            );
        }
    }
}

fn describe_ref(name: Option<&str>, id: &str) -> String {
    match (name, id.is_empty()) {
        (Some(name), _) => format!("{} ({})", name, short_id(id)),
        (None, true) => "-".to_string(),
        (None, false) => format!("(unknown {})", short_id(id)),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
