use config::shared::RunnerConfig;
use postgres::db::connect_to_reference_database;
use semaphore::registry::LockRegistry;
use semaphore::semaphore::RunSemaphore;
use semaphore::types::RunId;
use tracing::info;

use crate::cli::{Cli, Command, LockCommand};
use crate::migrations::migrate_lock_registry;

/// Runs `cli.command` against the reference database.
///
/// Only `migrate` creates the registry; lock commands expect it to exist.
pub async fn start_runner(config: RunnerConfig, cli: Cli) -> anyhow::Result<()> {
    // Postgres only resolves three-part names within the connected database.
    if config.semaphore.catalog != config.reference_db.name {
        anyhow::bail!(
            "lock registry catalog `{}` must match the reference database `{}`",
            config.semaphore.catalog,
            config.reference_db.name
        );
    }

    let command = match cli.command {
        Command::Migrate => {
            info!(environment = %config.environment, "migrating lock registry");
            migrate_lock_registry(&config.reference_db, &config.semaphore).await?;
            return Ok(());
        }
        Command::Lock(command) => command,
    };

    let run_id = cli.params.require_run_id()?;

    info!(
        %run_id,
        file_name = cli.params.file_name.as_deref().unwrap_or_default(),
        cntrt_id = cli.params.cntrt_id.as_deref().unwrap_or_default(),
        environment = %config.environment,
        "starting runner"
    );

    let pool = connect_to_reference_database(&config.reference_db, 1, config.max_connections).await?;
    let semaphore = RunSemaphore::postgres(pool, &config.semaphore)?;

    for line in execute(&semaphore, run_id, command).await? {
        println!("{line}");
    }

    Ok(())
}

/// Runs one command and returns the lines to print.
async fn execute<R>(
    semaphore: &RunSemaphore<R>,
    run_id: RunId,
    command: LockCommand,
) -> anyhow::Result<Vec<String>>
where
    R: LockRegistry,
{
    let lines: Vec<String> = match command {
        LockCommand::Acquire { paths } => semaphore
            .acquire(run_id, &paths)
            .await?
            .iter()
            .map(ToString::to_string)
            .collect(),
        LockCommand::Queue { paths } => vec![semaphore.queue(run_id, &paths).await?.to_string()],
        LockCommand::Check(selection) => {
            let check_path = selection.to_check_path()?;
            vec![semaphore.check(run_id, check_path).await?.to_string()]
        }
        LockCommand::Release(selection) => {
            let check_path = selection.to_check_path()?;
            semaphore.release(run_id, &check_path).await?;
            vec![]
        }
    };

    Ok(lines)
}
