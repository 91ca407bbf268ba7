pub mod commands;

use anyhow::Context;
use clap::Parser;

use crate::core::state::AppState;
use crate::core::time::format_offset;
use crate::services::drafts::{LocalFile, ResourceDraft};
use crate::services::form::SubmissionForm;
use crate::services::reconciliation::Confirmation;
use crate::services::submission_flow::{self, FlowResult, SubmissionView, TransitionReport};
use commands::{Commands, SubmitArgs};

#[derive(Parser, Debug)]
#[command(name = "coursework", version, about = "Submit coursework links and documents.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(self, state: &AppState) -> anyhow::Result<()> {
        match self.command {
            Commands::Status(args) => {
                let view = submission_flow::load(state, &args.assignment)
                    .await
                    .with_context(|| format!("failed to load assignment {}", args.assignment))?;
                print_view(&view);
                Ok(())
            }
            Commands::Submit(args) => {
                let form = build_form(&args).await?;
                finish(submission_flow::submit(state, form).await)
            }
            Commands::Resubmit(args) => {
                let form = if args.has_resources() {
                    build_form(&args).await?
                } else {
                    // Comment-only resubmission keeps the committed resources.
                    let view = submission_flow::load(state, &args.assignment).await?;
                    let mut form = view.form;
                    form.comment = args.comment.clone().or(form.comment);
                    form
                };
                finish(submission_flow::resubmit(state, form).await)
            }
            Commands::Withdraw(args) => {
                finish(submission_flow::withdraw(state, SubmissionForm::new(args.assignment)).await)
            }
        }
    }
}

async fn build_form(args: &SubmitArgs) -> anyhow::Result<SubmissionForm> {
    let mut drafts: Vec<ResourceDraft> =
        args.links.iter().map(|link| ResourceDraft::link(&link.title, &link.url)).collect();

    for path in &args.files {
        let file = LocalFile::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        drafts.push(ResourceDraft::file(file));
    }

    let mut form = SubmissionForm::new(&args.assignment);
    if !drafts.is_empty() {
        form = form.with_drafts(drafts);
    }
    form.comment = args.comment.clone();
    Ok(form)
}

fn finish(result: FlowResult) -> anyhow::Result<()> {
    let report = result.outcome?;
    print_report(&report);
    Ok(())
}

fn print_view(view: &SubmissionView) {
    println!("{} ({})", view.assignment.title, view.assignment.id);
    println!("due: {}", format_offset(view.assignment.due_date));
    println!("state: {}", view.state);
    if let Some(submission) = &view.submission {
        println!(
            "submitted: {} (late: {})",
            format_offset(submission.submitted_at),
            submission.is_late
        );
        if let Some(grade) = submission.grade {
            println!("grade: {grade}/{}", view.assignment.max_points);
        }
        for resource in &submission.resources {
            println!("  [{}] {} {}", resource.file_type, resource.title, resource.resource_link);
        }
    }
}

fn print_report(report: &TransitionReport) {
    println!("{}: {}", report.operation.as_str(), report.state);
    if let Some(submission) = &report.submission {
        println!("late: {}", report.is_late);
        for resource in &submission.resources {
            println!("  [{}] {} {}", resource.file_type, resource.title, resource.resource_link);
        }
    }
    if let Confirmation::Unconfirmed(warning) = &report.confirmation {
        eprintln!("warning: {warning}");
    }
}
