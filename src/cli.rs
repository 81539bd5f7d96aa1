// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{read_claims, ChainedTokens, EnvToken, SessionFile, TokenProvider};
use crate::client::bookmarks::write_bookmarks_csv;
use crate::client::lookups::LookupKind;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::image::SelectedImage;
use crate::pitch::{
    Confirmation, PitchController, PitchView, PollOutcome, ReplacePolicy, SelectedVideo,
};
use crate::types::pitch::{Subject, SubjectKind};
use crate::validation::{load_form, CompanyForm, RecruiterForm, ResumeForm};

const TOKEN_ENV_VAR: &str = "JOBBOARD_TOKEN";

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Command-line client for the job board")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a session token for later commands
    Login {
        #[arg(long)]
        token: String,
    },
    /// Forget the stored session token
    Logout,
    /// Job listings
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Saved jobs
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommand,
    },
    /// Candidate resume
    Resume {
        #[command(subcommand)]
        command: ResumeCommand,
    },
    /// Company pages
    Company {
        #[command(subcommand)]
        command: CompanyCommand,
    },
    /// Recruiter profiles
    Recruiter {
        #[command(subcommand)]
        command: RecruiterCommand,
    },
    /// Followed companies and recruiters
    Follow {
        #[command(subcommand)]
        command: FollowCommand,
    },
    /// Reference data (countries, skills, ...)
    Lookup {
        #[command(subcommand)]
        command: LookupCommand,
    },
    /// Elevator pitch video
    Pitch {
        /// Whose pitch: candidate, recruiter or company
        #[arg(long = "as", value_enum, default_value_t = SubjectArg::Candidate, global = true)]
        subject: SubjectArg,
        /// Owner id; defaults to the user in the session token
        #[arg(long, global = true)]
        user: Option<String>,
        #[command(subcommand)]
        command: PitchCommand,
    },
}

#[derive(Subcommand)]
pub enum JobCommand {
    Show { job_id: String },
}

#[derive(Subcommand)]
pub enum BookmarkCommand {
    List {
        /// Print as CSV
        #[arg(long)]
        csv: bool,
    },
    Add { job_id: String },
    Remove { job_id: String },
}

#[derive(Subcommand)]
pub enum ResumeCommand {
    /// Show your resume, or a candidate's public resume
    Show { user_id: Option<String> },
    /// Validate and save a resume from a TOML file
    Submit { file: PathBuf },
    Photo { image: PathBuf },
}

#[derive(Subcommand)]
pub enum CompanyCommand {
    Show { company_id: String },
    Update { company_id: String, file: PathBuf },
    Logo { company_id: String, image: PathBuf },
    Banner { company_id: String, image: PathBuf },
}

#[derive(Subcommand)]
pub enum RecruiterCommand {
    Show { recruiter_id: String },
    Update { file: PathBuf },
    Photo { image: PathBuf },
}

#[derive(Subcommand)]
pub enum FollowCommand {
    List,
    Add { target_id: String },
    Remove { target_id: String },
}

#[derive(Subcommand)]
pub enum LookupCommand {
    Countries,
    Cities { country: String },
    Categories,
    Skills,
    Languages,
    Universities,
}

#[derive(Subcommand)]
pub enum PitchCommand {
    /// Show the current pitch state
    Status,
    /// Upload a video, replacing any existing pitch
    Upload {
        file: PathBuf,
        /// Do not delete the existing pitch first
        #[arg(long)]
        keep_existing: bool,
        /// Wait for processing to finish
        #[arg(long)]
        wait: bool,
    },
    /// Delete the pitch
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Wait until a processing pitch becomes playable
    Wait,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SubjectArg {
    Candidate,
    Recruiter,
    Company,
}

impl From<SubjectArg> for SubjectKind {
    fn from(value: SubjectArg) -> Self {
        match value {
            SubjectArg::Candidate => SubjectKind::Candidate,
            SubjectArg::Recruiter => SubjectKind::Recruiter,
            SubjectArg::Company => SubjectKind::Company,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render response")?
    );
    Ok(())
}

pub async fn handle_command(cli: Cli, mut config: ClientConfig) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    let session = SessionFile::new(config.session_file.clone());
    let tokens: Arc<dyn TokenProvider> = Arc::new(ChainedTokens(vec![
        Box::new(EnvToken {
            var: TOKEN_ENV_VAR.to_string(),
        }),
        Box::new(session.clone()),
    ]));
    let client = Arc::new(ApiClient::from_config(&config, tokens)?);
    info!("Using API at {}", client.base_url());

    match cli.command {
        Command::Login { token } => {
            session.save(&token).await?;
            match read_claims(&token).and_then(|c| c.subject().map(str::to_string)) {
                Some(user) => println!("✅ Logged in as {}", user),
                None => println!("✅ Session token saved"),
            }
        }

        Command::Logout => {
            if session.clear().await? {
                println!("✅ Logged out");
            } else {
                println!("No stored session");
            }
        }

        Command::Job { command } => match command {
            JobCommand::Show { job_id } => print_json(&client.job(&job_id).await?)?,
        },

        Command::Bookmark { command } => match command {
            BookmarkCommand::List { csv } => {
                let bookmarks = client.bookmarks().await?;
                if csv {
                    write_bookmarks_csv(&bookmarks, std::io::stdout().lock())?;
                } else if bookmarks.is_empty() {
                    println!("No bookmarked jobs.");
                } else {
                    println!("{:<26} {:<40} {:<20}", "Job", "Title", "Company");
                    println!("{}", "-".repeat(88));
                    for b in &bookmarks {
                        println!(
                            "{:<26} {:<40} {:<20}",
                            b.job.id,
                            b.job.title,
                            b.job.company.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
                        );
                    }
                }
            }
            BookmarkCommand::Add { job_id } => {
                client.add_bookmark(&job_id).await?;
                println!("✅ Bookmarked {}", job_id);
            }
            BookmarkCommand::Remove { job_id } => {
                client.remove_bookmark(&job_id).await?;
                println!("✅ Removed bookmark {}", job_id);
            }
        },

        Command::Resume { command } => match command {
            ResumeCommand::Show { user_id: Some(id) } => print_json(&client.candidate(&id).await?)?,
            ResumeCommand::Show { user_id: None } => match client.my_resume().await? {
                Some(resume) => print_json(&resume)?,
                None => println!("No resume yet. Create one with `jobboard resume submit <file>`."),
            },
            ResumeCommand::Submit { file } => {
                let form: ResumeForm = load_form(&file)?;
                let resume = client.save_resume(&form).await?;
                println!("✅ Resume saved ({})", resume.id);
            }
            ResumeCommand::Photo { image } => {
                let image = SelectedImage::from_path(&image).await?;
                client.upload_resume_photo(&image).await?;
                println!("✅ Photo uploaded");
            }
        },

        Command::Company { command } => match command {
            CompanyCommand::Show { company_id } => print_json(&client.company(&company_id).await?)?,
            CompanyCommand::Update { company_id, file } => {
                let form: CompanyForm = load_form(&file)?;
                client.update_company(&company_id, &form).await?;
                println!("✅ Company {} updated", company_id);
            }
            CompanyCommand::Logo { company_id, image } => {
                let image = SelectedImage::from_path(&image).await?;
                client.upload_company_logo(&company_id, &image).await?;
                println!("✅ Logo uploaded");
            }
            CompanyCommand::Banner { company_id, image } => {
                let image = SelectedImage::from_path(&image).await?;
                client.upload_company_banner(&company_id, &image).await?;
                println!("✅ Banner uploaded");
            }
        },

        Command::Recruiter { command } => match command {
            RecruiterCommand::Show { recruiter_id } => {
                print_json(&client.recruiter(&recruiter_id).await?)?
            }
            RecruiterCommand::Update { file } => {
                let form: RecruiterForm = load_form(&file)?;
                client.update_recruiter(&form).await?;
                println!("✅ Recruiter profile updated");
            }
            RecruiterCommand::Photo { image } => {
                let image = SelectedImage::from_path(&image).await?;
                client.upload_recruiter_photo(&image).await?;
                println!("✅ Photo uploaded");
            }
        },

        Command::Follow { command } => match command {
            FollowCommand::List => print_json(&client.following().await?)?,
            FollowCommand::Add { target_id } => {
                client.follow(&target_id).await?;
                println!("✅ Following {}", target_id);
            }
            FollowCommand::Remove { target_id } => {
                client.unfollow(&target_id).await?;
                println!("✅ Unfollowed {}", target_id);
            }
        },

        Command::Lookup { command } => match command {
            LookupCommand::Countries => print_json(&client.countries().await?)?,
            LookupCommand::Cities { country } => print_json(&client.cities(&country).await?)?,
            LookupCommand::Categories => print_json(&client.lookup(LookupKind::JobCategories).await?)?,
            LookupCommand::Skills => print_json(&client.lookup(LookupKind::Skills).await?)?,
            LookupCommand::Languages => print_json(&client.lookup(LookupKind::Languages).await?)?,
            LookupCommand::Universities => {
                print_json(&client.lookup(LookupKind::Universities).await?)?
            }
        },

        Command::Pitch {
            subject,
            user,
            command,
        } => {
            let user_id = match user {
                Some(user) => user,
                None => session_user(&client).await?,
            };
            let subject = Subject::new(subject.into(), user_id);
            handle_pitch(client, subject, command, &config).await?;
        }
    }

    Ok(())
}

async fn session_user(client: &ApiClient) -> Result<String> {
    let token = client
        .session_token()
        .await?
        .context("Not logged in: run `jobboard login --token <token>` or pass --user")?;
    read_claims(&token)
        .and_then(|claims| claims.subject().map(str::to_string))
        .context("Session token carries no user id, pass --user")
}

async fn handle_pitch(
    client: Arc<ApiClient>,
    subject: Subject,
    command: PitchCommand,
    config: &ClientConfig,
) -> Result<()> {
    let mut controller = PitchController::new(client, subject);

    match command {
        PitchCommand::Status => {
            controller.load().await?;
            print_view(controller.view());
        }

        PitchCommand::Upload {
            file,
            keep_existing,
            wait,
        } => {
            if keep_existing {
                controller = controller.with_replace_policy(ReplacePolicy::KeepExisting);
            }
            let video = SelectedVideo::from_path(&file).await?;
            controller.select_file(video)?;
            controller.upload().await?;
            print_view(controller.view());

            if wait {
                report_poll(controller.await_processing(&config.poll_policy()).await?);
                print_view(controller.view());
            }
        }

        PitchCommand::Delete { yes } => {
            controller.load().await?;
            if controller.state().pitch().is_none() {
                println!("No elevator pitch to delete.");
                return Ok(());
            }
            let confirmation = if yes { Confirmation::Yes } else { confirm()? };
            if controller.delete(confirmation).await? {
                println!("✅ Elevator pitch deleted");
            } else {
                println!("Cancelled");
            }
        }

        PitchCommand::Wait => {
            controller.load().await?;
            if controller.state().pitch().is_none() {
                println!("No elevator pitch uploaded.");
                return Ok(());
            }
            report_poll(controller.await_processing(&config.poll_policy()).await?);
            print_view(controller.view());
        }
    }

    if let Some(notice) = controller.take_notice() {
        info!("{}", notice.message);
    }
    Ok(())
}

fn confirm() -> Result<Confirmation> {
    print!("Delete your elevator pitch? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Confirmation::Yes,
        _ => Confirmation::No,
    })
}

fn report_poll(outcome: PollOutcome) {
    match outcome {
        PollOutcome::Playable(_) => println!("✅ Processing finished"),
        PollOutcome::Removed => println!("❌ The elevator pitch was removed while processing"),
        PollOutcome::Exhausted { attempts, .. } => {
            warn!("Pitch still processing after {} checks", attempts);
            println!("⏳ Still processing, run `jobboard pitch wait` later");
        }
    }
}

fn print_view(view: PitchView<'_>) {
    match view {
        PitchView::UploadPrompt => println!("No elevator pitch. Upload one with `jobboard pitch upload <video>`."),
        PitchView::Preview { file_name, url } => println!("Selected {} ({})", file_name, url),
        PitchView::Busy { action } => println!("Busy: {:?}", action),
        PitchView::ProcessingCard { started_at } => match started_at {
            Some(at) => println!("⏳ Processing since {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("⏳ Processing"),
        },
        PitchView::Player { pitch_id, hls_url } => {
            println!("▶ Pitch {} is playable", pitch_id);
            println!("  {}", hls_url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pitch_upload() {
        let cli = Cli::try_parse_from([
            "jobboard", "pitch", "--as", "company", "--user", "c1", "upload", "intro.mp4", "--wait",
        ])
        .unwrap();
        match cli.command {
            Command::Pitch {
                subject,
                user,
                command: PitchCommand::Upload { file, wait, keep_existing },
            } => {
                assert_eq!(SubjectKind::from(subject), SubjectKind::Company);
                assert_eq!(user.as_deref(), Some("c1"));
                assert_eq!(file, PathBuf::from("intro.mp4"));
                assert!(wait);
                assert!(!keep_existing);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_parse_lookup_and_global_url() {
        let cli = Cli::try_parse_from([
            "jobboard", "lookup", "cities", "Germany", "--api-url", "http://x/",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x/"));
        assert!(matches!(
            cli.command,
            Command::Lookup {
                command: LookupCommand::Cities { .. }
            }
        ));
    }
}
