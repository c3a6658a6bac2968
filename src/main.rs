use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use gradecast::backend::BackendClient;
use gradecast::dispatch::DispatchTracker;
use gradecast::model::{Channel, Student};
use gradecast::roster::Roster;
use gradecast::{analytics, config, report};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the example configuration and exit
    PrintConfig,
    /// List the loaded roster
    Roster,
    /// Print the generated report for one student
    Report {
        #[arg(long)]
        student: String,
    },
    /// Send reports to one or more students' parents
    Send {
        /// Student id; repeat to send several reports concurrently
        #[arg(long = "student", required = true)]
        students: Vec<String>,
        /// Delivery channel: sms, whatsapp or both
        #[arg(long, default_value = "both")]
        channel: String,
    },
    /// Send reports for the whole roster in a single batch call
    SendBulk,
    /// Show class-level analytics
    Analytics,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if matches!(args.command, Command::PrintConfig) {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    let roster = Roster::load(&cfg.app.roster_path)?;
    info!(students = roster.len(), "roster loaded");

    match args.command {
        Command::PrintConfig => unreachable!("handled above"),
        Command::Roster => {
            for student in roster.students() {
                println!(
                    "{}  {} ({}, roll {}) - {}% overall, rank #{}/{}",
                    student.id,
                    student.name,
                    student.class,
                    student.roll_number,
                    student.overall_performance.percentage,
                    student.overall_performance.rank,
                    student.overall_performance.total_students
                );
            }
        }
        Command::Report { student } => {
            let student = lookup(&roster, &student)?;
            println!("{}", report::generate_report(student));
        }
        Command::Send { students, channel } => {
            let channel = parse_channel(&channel)?;
            let selected: Vec<&Student> = students
                .iter()
                .map(|id| lookup(&roster, id))
                .collect::<Result<_>>()?;

            let client = BackendClient::from_config(&cfg)?;
            let tracker = DispatchTracker::new();
            let sends = selected
                .iter()
                .map(|student| tracker.send_single(&client, student, channel));
            let outcomes = futures::future::join_all(sends).await;

            for outcome in &outcomes {
                println!("{}", outcome.acknowledgment);
            }
            print_log(&tracker);
        }
        Command::SendBulk => {
            let client = BackendClient::from_config(&cfg)?;
            let tracker = DispatchTracker::new();
            let outcome = tracker.send_bulk(&client, roster.students()).await;
            println!("{}", outcome.acknowledgment);
            print_log(&tracker);
        }
        Command::Analytics => {
            let summary = analytics::summarize(roster.students());
            println!("Students: {}", summary.total_students);
            println!("Average performance: {:.1}%", summary.average_percentage);
            println!("Average attendance: {:.1}%", summary.average_attendance);
            println!("Class grade: {}", summary.class_grade);
            println!(
                "Distribution: {} excellent / {} good / {} average / {} poor",
                summary.distribution.excellent,
                summary.distribution.good,
                summary.distribution.average,
                summary.distribution.poor
            );

            println!("\nTop performers:");
            for (idx, student) in analytics::top_performers(roster.students(), 3)
                .iter()
                .enumerate()
            {
                println!(
                    "  #{} {} - {}% ({})",
                    idx + 1,
                    student.name,
                    student.overall_performance.percentage,
                    student.overall_performance.overall_grade
                );
            }

            let flagged = analytics::needs_attention(roster.students());
            if flagged.is_empty() {
                println!("\nAll students performing well.");
            } else {
                println!("\nNeeds attention:");
                for student in flagged {
                    println!(
                        "  {} - {}% overall, {}% attendance",
                        student.name,
                        student.overall_performance.percentage,
                        student.attendance.percentage
                    );
                }
            }
        }
    }

    Ok(())
}

fn lookup<'a>(roster: &'a Roster, id: &str) -> Result<&'a Student> {
    roster
        .find(id)
        .ok_or_else(|| anyhow!("no student with id '{}' in roster", id))
}

fn parse_channel(value: &str) -> Result<Channel> {
    match value {
        "sms" => Ok(Channel::Sms),
        "whatsapp" => Ok(Channel::Whatsapp),
        "both" => Ok(Channel::Both),
        other => Err(anyhow!(
            "unknown channel '{}'; expected sms, whatsapp or both",
            other
        )),
    }
}

/// Session delivery log, most recent first, plus the aggregate counts.
fn print_log(tracker: &DispatchTracker) {
    let counts = tracker.counts();
    println!(
        "Delivery log: {} sent, {} pending, {} failed",
        counts.sent, counts.pending, counts.failed
    );
    for attempt in tracker.attempts().iter().rev() {
        println!(
            "  [{}] student {} via {} to {}",
            attempt.status.as_str(),
            attempt.student_id,
            attempt.channel.as_str(),
            attempt.parent_contact
        );
    }
}
