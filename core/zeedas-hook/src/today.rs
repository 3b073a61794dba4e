//! One-shot summary query.

use std::io::{self, Write};
use zeedas_core::{build_transport, StorageConfig, ZeedasConfig};

pub fn run(storage: &StorageConfig, config: &ZeedasConfig) -> Result<(), String> {
    let transport =
        build_transport(config, storage).map_err(|e| format!("Failed to build transport: {}", e))?;
    let summary = transport
        .fetch_summary()
        .map_err(|e| format!("Failed to fetch today's coding activity: {}", e))?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &summary)
        .map_err(|e| format!("Failed to serialize summary: {}", e))?;
    writeln!(stdout).map_err(|e| format!("Failed to write stdout: {}", e))?;
    Ok(())
}
