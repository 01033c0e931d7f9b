use crate::commands::{build_runtime, load_config, open_migrated_pool, CommandResult};
use agentdir_db::{seed_default_categories, SeedResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        let seeded = seed_default_categories(&pool).await;
        pool.close().await;
        seeded.map_err(|error| ("seed_execution", error.to_string(), 6u8))
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", seed_message(&seeded)),
        Err(failure) => CommandResult::from_step("seed", failure),
    }
}

fn seed_message(result: &SeedResult) -> String {
    format!(
        "default categories seeded: {} inserted, {} already present",
        result.inserted, result.already_present
    )
}
