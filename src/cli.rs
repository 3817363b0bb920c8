// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app::{App, ThemeStore, View};
use crate::core::{ConfigManager, ServiceClient};
use crate::presenter::{MatchQuality, SkillDisclosure, SortKey};
use crate::progress::ProcessingSteps;
use crate::upload::StagedFile;
use crate::utils::{format_percent, read_file_content};

#[derive(Parser)]
#[command(name = "talentalign")]
#[command(about = "Match resumes against stored job descriptions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the analysis service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to the YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match one resume against every stored job description
    Analyze {
        resume: PathBuf,
        /// Minimum match score to display (0.0 - 1.0)
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
        /// Email the matches to this address afterwards
        #[arg(long)]
        email: Option<String>,
    },
    /// Compare a resume's skills with a job description text file
    MissingSkills {
        resume: PathBuf,
        #[arg(long)]
        jd: PathBuf,
    },
    /// Rank many resumes against one job description
    Bulk {
        jd: PathBuf,
        #[arg(required = true)]
        resumes: Vec<PathBuf>,
        /// score, skills, experience or education
        #[arg(long, default_value = "score")]
        sort: SortKey,
        /// Only show resumes whose file name contains this text
        #[arg(long)]
        search: Option<String>,
        /// Export the displayed ranking as CSV into this directory
        /// (the configured export directory when no value is given)
        #[arg(long, num_args = 0..=1)]
        csv: Option<Option<PathBuf>>,
    },
    /// Manage stored job descriptions
    Jds {
        #[command(subcommand)]
        command: JdsCommand,
    },
    /// Show or toggle the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommand>,
    },
}

#[derive(Subcommand)]
pub enum JdsCommand {
    /// List stored job descriptions
    List {
        #[arg(long)]
        search: Option<String>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Upload PDF job descriptions, one request per file
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete a stored job description
    Delete { id: String },
    /// Print a job description's full text and document URL
    View { id: String },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

pub async fn handle_command(command: Command, config: ConfigManager) -> Result<()> {
    let client = ServiceClient::new(&config.service.api_url, config.service.timeout_seconds)?;
    let theme_store = ThemeStore::new(config.paths.preferences_file.clone());
    let theme = theme_store.load().await?;
    let mut app = App::new(config, theme);

    info!("Using analysis service at {}", client.base_url());

    match command {
        Command::Analyze {
            resume,
            threshold,
            email,
        } => {
            app.set_view(View::Candidate);
            analyze(&mut app, &client, &resume, threshold, email).await
        }
        Command::MissingSkills { resume, jd } => {
            app.set_view(View::Candidate);
            missing_skills(&mut app, &client, &resume, &jd).await
        }
        Command::Bulk {
            jd,
            resumes,
            sort,
            search,
            csv,
        } => {
            app.set_view(View::Bulk);
            bulk(&mut app, &client, &jd, &resumes, sort, search, csv).await
        }
        Command::Jds { command } => {
            app.set_view(View::Admin);
            jds(&mut app, &client, command).await
        }
        Command::Theme { command } => match command.unwrap_or(ThemeCommand::Show) {
            ThemeCommand::Show => {
                println!("{}", app.theme());
                Ok(())
            }
            ThemeCommand::Toggle => {
                let theme = theme_store.toggle().await?;
                app.set_theme(theme);
                println!("Theme set to {}", theme);
                Ok(())
            }
        },
    }
}

async fn stage(path: &Path) -> Result<StagedFile> {
    StagedFile::from_path(path)
        .await
        .with_context(|| format!("Cannot stage {}", path.display()))
}

fn fail_on(error: Option<&str>) -> Result<()> {
    match error {
        Some(message) => anyhow::bail!("{}", message),
        None => Ok(()),
    }
}

fn print_step(steps: &ProcessingSteps, last_shown: &mut usize) {
    if let Some(step) = steps.active() {
        if step.id != *last_shown {
            println!("[{}/{}] {}", step.id, steps.steps().len(), step.message);
            *last_shown = step.id;
        }
    }
}

async fn analyze(
    app: &mut App,
    client: &ServiceClient,
    resume: &Path,
    threshold: f64,
    email: Option<String>,
) -> Result<()> {
    let state = &mut app.candidate;
    state.select_resume(stage(resume).await?);
    fail_on(state.error())?;

    let mut last_shown = 0;
    state
        .analyze_with(client, |steps| print_step(steps, &mut last_shown))
        .await;
    fail_on(state.error())?;

    if let Some(profile) = state.profile() {
        println!("\nCandidate profile");
        println!("  Skills:     {}", profile.skills);
        println!("  Experience: {}", profile.experience);
        println!("  Education:  {}", profile.education);
    }

    state.set_threshold(threshold);
    let visible = state.visible_matches();
    println!(
        "\n{} of {} job matches at or above {}%",
        visible.len(),
        state.matches().len(),
        format_percent(state.threshold(), 0)
    );

    for (rank, job) in visible.iter().enumerate() {
        let breakdown = &job.scores_breakdown;
        println!(
            "{:>2}. {} - {}% ({})",
            rank + 1,
            job.payload.title,
            format_percent(job.score, 1),
            MatchQuality::for_score(job.score).label()
        );
        println!(
            "    skills {}% | experience {}% | education {}%",
            format_percent(breakdown.skills, 1),
            format_percent(breakdown.experience, 1),
            format_percent(breakdown.education, 1)
        );
        if SkillDisclosure::is_visible(job) {
            let missing: Vec<&str> = job
                .missing_skills()
                .iter()
                .map(|m| m.skill.as_str())
                .collect();
            println!("    missing: {}", missing.join(", "));
        }
    }

    if let Some(address) = email {
        state.set_user_email(address);
        state.send_results(client).await;
        fail_on(state.error())?;
        println!("\nResults sent to {}", state.user_email());
    }

    Ok(())
}

async fn missing_skills(
    app: &mut App,
    client: &ServiceClient,
    resume: &Path,
    jd: &Path,
) -> Result<()> {
    let job_description = read_file_content(jd).await?;
    let state = &mut app.candidate;
    state.select_resume(stage(resume).await?);
    fail_on(state.error())?;

    state.analyze_missing_skills(client, &job_description).await;
    fail_on(state.error())?;

    if let Some(report) = state.skill_gap() {
        println!(
            "Skill match: {:.1}% ({} of {} required skills)",
            report.skill_match_percentage,
            report.matched_skills_count,
            report.total_required_skills
        );
        for skill in &report.missing_skills {
            println!("  - {} [{}, {}]", skill.skill, skill.importance, skill.category);
        }
    }
    Ok(())
}

async fn bulk(
    app: &mut App,
    client: &ServiceClient,
    jd: &Path,
    resumes: &[PathBuf],
    sort: SortKey,
    search: Option<String>,
    csv: Option<Option<PathBuf>>,
) -> Result<()> {
    let export_dir = app.config().paths.export_dir.clone();
    let state = &mut app.bulk;
    state.select_jd(stage(jd).await?);
    fail_on(state.error())?;

    let mut staged = Vec::with_capacity(resumes.len());
    for path in resumes {
        staged.push(stage(path).await?);
    }
    let outcome = state.select_resumes(staged);
    if let Some(warning) = &outcome.warning {
        warn!("{} (skipped: {})", warning, outcome.rejected.join(", "));
    }
    state.dismiss_error();

    println!(
        "Comparing {} resumes against {}...",
        state.resumes().len(),
        jd.display()
    );
    state.analyze(client).await;
    fail_on(state.error())?;

    state.set_sort_key(sort);
    if let Some(query) = search {
        state.set_search_query(query);
    }

    println!("Ranked by {} score", state.sort_key().label().to_lowercase());
    for (rank, candidate) in state.displayed().iter().enumerate() {
        let breakdown = &candidate.scores_breakdown;
        println!(
            "{:>3}. {:<40} {:>6}%  skills {:>5}%  exp {:>5}%  edu {:>5}%",
            rank + 1,
            candidate.file_name(),
            format_percent(candidate.score, 1),
            format_percent(breakdown.skills, 1),
            format_percent(breakdown.experience, 1),
            format_percent(breakdown.education, 1)
        );
    }

    if let Some(dir) = csv {
        let dir = dir.unwrap_or(export_dir);
        let path = state.export_csv(&dir).await?;
        println!("CSV written to {}", path.display());
    }
    Ok(())
}

async fn jds(app: &mut App, client: &ServiceClient, command: JdsCommand) -> Result<()> {
    let state = &mut app.admin;

    match command {
        JdsCommand::List { search, page } => {
            state.load(client).await;
            fail_on(state.error())?;

            if let Some(query) = search {
                state.set_search(query);
            }
            state.go_to_page(page.saturating_sub(1));

            let current = state.current_page();
            if current.is_empty() {
                println!("No job descriptions found.");
                return Ok(());
            }

            println!("{:<38} {}", "ID", "File");
            println!("{}", "-".repeat(70));
            for jd in &current {
                println!("{:<38} {}", jd.id, jd.file_name());
            }
            println!(
                "\nPage {} of {} ({} matching)",
                state.page() + 1,
                state.total_pages(),
                state.filtered().len()
            );
        }

        JdsCommand::Upload { files } => {
            let mut staged = Vec::with_capacity(files.len());
            for path in &files {
                staged.push(stage(path).await?);
            }
            let outcome = state.select_files(staged);
            if let Some(warning) = &outcome.warning {
                warn!("{} (skipped: {})", warning, outcome.rejected.join(", "));
            }

            let Some(report) = state.upload(client).await else {
                return fail_on(state.error());
            };

            for jd in &report.uploaded {
                println!("✅ Uploaded {} ({})", jd.file_name(), jd.id);
            }
            println!(
                "Finished at {}",
                report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            if let Some(summary) = report.summary() {
                println!("\n{}", summary);
            }
        }

        JdsCommand::Delete { id } => {
            state.request_delete(&id);
            state.confirm_delete(client).await;
            fail_on(state.error())?;
            println!("✅ Deleted job description {}", id);
        }

        JdsCommand::View { id } => {
            state.load(client).await;
            fail_on(state.error())?;

            let url = state.view_url(client, &id);
            let record = state
                .view(&id)
                .ok_or_else(|| anyhow::anyhow!("Job description not found: {}", id))?;
            println!("{}\n{}\n", record.file_name(), url);
            println!("{}", record.payload.full_text);
        }
    }

    Ok(())
}
