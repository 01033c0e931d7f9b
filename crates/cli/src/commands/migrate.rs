use crate::commands::{build_runtime, load_config, open_migrated_pool, CommandResult};
use agentdir_db::migrations;

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        let applied = migrations::applied_count(&pool).await;
        pool.close().await;
        applied.map_err(|error| ("migration", error.to_string(), 5u8))
    });

    match result {
        Ok(applied) => CommandResult::success(
            "migrate",
            format!("applied pending migrations ({applied} recorded)"),
        ),
        Err(failure) => CommandResult::from_step("migrate", failure),
    }
}
