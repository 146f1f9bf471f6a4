use clap::{Args, Parser, Subcommand};
use semaphore::types::{CheckPath, RunId};

/// Coordinates pipeline runs through the shared lock registry.
#[derive(Debug, Parser)]
#[command(name = "runner", version)]
pub struct Cli {
    #[command(flatten)]
    pub params: RunParams,
    #[command(subcommand)]
    pub command: Command,
}

/// Parameters every pipeline run is started with. Any of them may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct RunParams {
    /// Name of the file processed by the run.
    #[arg(long = "FILE_NAME", global = true)]
    pub file_name: Option<String>,
    /// Contract the run belongs to.
    #[arg(long = "CNTRT_ID", global = true)]
    pub cntrt_id: Option<String>,
    /// Identifier owning the lock rows of the run.
    #[arg(long = "RUN_ID", global = true)]
    pub run_id: Option<String>,
}

impl RunParams {
    /// Returns the run id, failing when it is missing or not an integer.
    pub fn require_run_id(&self) -> anyhow::Result<RunId> {
        let Some(run_id) = self.run_id.as_deref() else {
            anyhow::bail!("--RUN_ID is required to coordinate lock paths");
        };

        Ok(run_id.parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the lock registry schema and table. Run once, before pipeline runs start.
    Migrate,
    #[command(flatten)]
    Lock(LockCommand),
}

/// Semaphore operations performed on behalf of `--RUN_ID`.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum LockCommand {
    /// Queue for and wait on each path in turn, printing one confirmed check path per line.
    Acquire {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Register the run for all paths at once and print their check path.
    Queue {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Wait until no other run holds any of the paths.
    Check(PathSelection),
    /// Delete the rows of the run for the paths.
    Release(PathSelection),
}

/// Paths given either one by one or as a quoted list printed by an earlier command.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PathSelection {
    #[arg(required_unless_present = "literal", conflicts_with = "literal")]
    pub paths: Vec<String>,
    /// Pre-formatted list such as `'/tmp/lock1','/tmp/lock2'`.
    #[arg(long)]
    pub literal: Option<String>,
}

impl PathSelection {
    pub fn to_check_path(&self) -> semaphore::error::LockResult<CheckPath> {
        match &self.literal {
            Some(literal) => CheckPath::parse(literal),
            None => Ok(CheckPath::from_paths(self.paths.iter().map(String::as_str))),
        }
    }
}
