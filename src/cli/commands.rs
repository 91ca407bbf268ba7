use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the assignment and where the submission stands
    Status(AssignmentArgs),
    /// Hand in for the first time
    Submit(SubmitArgs),
    /// Replace the current submission's resources and comment
    Resubmit(SubmitArgs),
    /// Remove the submission before the due date
    Withdraw(AssignmentArgs),
}

#[derive(Args, Debug)]
pub struct AssignmentArgs {
    pub assignment: String,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    pub assignment: String,

    /// Link resource as TITLE=URL; repeatable
    #[arg(long = "link", value_name = "TITLE=URL", value_parser = parse_link)]
    pub links: Vec<LinkArg>,

    /// Document to upload; repeatable
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    #[arg(long)]
    pub comment: Option<String>,
}

impl SubmitArgs {
    pub fn has_resources(&self) -> bool {
        !self.links.is_empty() || !self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkArg {
    pub title: String,
    pub url: String,
}

fn parse_link(raw: &str) -> Result<LinkArg, String> {
    let (title, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TITLE=URL, got '{raw}'"))?;
    let (title, url) = (title.trim(), url.trim());
    if title.is_empty() || url.is_empty() {
        return Err(format!("expected TITLE=URL, got '{raw}'"));
    }
    Ok(LinkArg { title: title.to_string(), url: url.to_string() })
}
