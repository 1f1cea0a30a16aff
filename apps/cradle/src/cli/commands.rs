//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! CLI invocations act as the local admin: the binary's operator already has
//! filesystem access to the database, so there is no key check here.

use crate::api;
use cradle_core::{
    Actor, CradleError, Directory, IntakeForm, ListFilter, PortfolioStats, Stage, StartupId,
    Status, Timestamp,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for intake files (10 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INTAKE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CradleError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CradleError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CradleError::InvalidField(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path to resolve symlinks and "..", ensures it exists,
/// and ensures it is a regular file. This prevents path traversal via inputs
/// like "../../../etc/passwd".
fn validate_file_path(path: &Path) -> Result<PathBuf, CradleError> {
    let canonical = path.canonicalize().map_err(|e| {
        CradleError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CradleError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CradleError> {
    let parent = path.parent().unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CradleError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CradleError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CradleError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// HELPERS
// =============================================================================

/// Open the directory for the selected backend.
fn load_directory(db_path: &Path, backend: &str) -> Result<Directory, CradleError> {
    match backend {
        "redb" => Directory::with_redb(db_path),
        "memory" => Ok(Directory::new()),
        other => Err(CradleError::InvalidField(format!(
            "unknown backend '{other}' (expected 'redb' or 'memory')"
        ))),
    }
}

/// The CLI's acting identity.
fn cli_actor() -> Actor {
    Actor::admin("cli")
}

/// Current wall-clock time as unix seconds.
fn system_now() -> Timestamp {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Timestamp::from_unix(secs)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &Path,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), CradleError> {
    let directory = load_directory(db_path, backend)?;

    println!("Cradle Incubation Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET    /startups                    - List startups");
    println!("  POST   /startups                    - Intake a startup");
    println!("  GET    /startups/{{id}}               - Show one startup");
    println!("  POST   /startups/{{id}}/advance       - Advance pipeline stage");
    println!("  POST   /startups/{{id}}/one-on-one    - Move to mentorship");
    println!("  POST   /startups/{{id}}/sessions      - Record a session");
    println!("  POST   /startups/{{id}}/onboard       - Onboard");
    println!("  POST   /startups/{{id}}/reject        - Reject");
    println!("  POST   /startups/{{id}}/graduate      - Graduate");
    println!("  POST   /startups/{{id}}/achievements  - Record an achievement");
    println!("  GET    /stats                       - Portfolio statistics");
    println!("  GET    /health                      - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, directory).await
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List startups with optional filters.
pub fn cmd_list(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    stage: Option<Stage>,
    status: Option<Status>,
    search: Option<String>,
) -> Result<(), CradleError> {
    let directory = load_directory(db_path, backend)?;
    let filter = ListFilter {
        stage,
        status,
        search,
    };
    let startups = directory.search(&filter)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&startups).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Cradle Startup Directory");
    println!("========================");
    println!("Database: {:?}", db_path);
    println!();
    if startups.is_empty() {
        println!("No startups match.");
        return Ok(());
    }
    println!(
        "{:>5}  {:<28}  {:<12}  {:<10}  {}",
        "ID", "Name", "Stage", "Status", "Sector"
    );
    for s in &startups {
        println!(
            "{:>5}  {:<28}  {:<12}  {:<10}  {}",
            s.id,
            s.profile.name,
            s.stage.to_string(),
            s.status.to_string(),
            s.profile.sector
        );
    }
    println!();
    println!("{} startup(s)", startups.len());

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show a single startup with its full history as pretty JSON.
pub fn cmd_show(db_path: &Path, backend: &str, id: u64) -> Result<(), CradleError> {
    let directory = load_directory(db_path, backend)?;
    let startup = directory.get(StartupId(id))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&startup).unwrap_or_default()
    );
    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show portfolio statistics.
pub fn cmd_stats(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), CradleError> {
    let directory = load_directory(db_path, backend)?;
    let stats = PortfolioStats::from_directory(&directory)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Cradle Portfolio Statistics");
    println!("===========================");
    println!("Database: {:?}", db_path);
    println!();
    println!("Total:       {}", stats.total);
    println!("Active:      {}", stats.active);
    println!("Onboarded:   {}", stats.onboarded);
    println!("Graduated:   {}", stats.graduated);
    println!("Rejected:    {}", stats.rejected);
    println!();
    if !stats.by_stage.is_empty() {
        println!("Pipeline (active):");
        for (stage, count) in &stats.by_stage {
            println!("  {:<12} {}", stage, count);
        }
        println!();
    }
    if !stats.by_sector.is_empty() {
        println!("Sectors:");
        for (sector, count) in &stats.by_sector {
            println!("  {:<20} {}", sector, count);
        }
        println!();
    }
    println!("Revenue recorded:    {}", stats.total_revenue.value());
    println!("Sessions completed:  {}", stats.sessions_completed);

    Ok(())
}

// =============================================================================
// INTAKE COMMAND
// =============================================================================

/// Register startups from a JSON file containing one intake form or an
/// array of forms.
pub fn cmd_intake(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    file: &Path,
) -> Result<(), CradleError> {
    let input_path = validate_file_path(file)?;
    validate_file_size(&input_path, MAX_INTAKE_FILE_SIZE)?;

    let contents = std::fs::read_to_string(&input_path)
        .map_err(|e| CradleError::IoError(format!("Cannot read '{}': {}", file.display(), e)))?;

    let forms: Vec<IntakeForm> = match serde_json::from_str::<Vec<IntakeForm>>(&contents) {
        Ok(forms) => forms,
        Err(_) => {
            let single: IntakeForm = serde_json::from_str(&contents).map_err(|e| {
                CradleError::DeserializationError(format!(
                    "'{}' is neither an intake form nor an array of forms: {}",
                    file.display(),
                    e
                ))
            })?;
            vec![single]
        }
    };

    let mut directory = load_directory(db_path, backend)?;
    let created = directory.intake_batch(forms, &cli_actor(), system_now())?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&created).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Registered {} startup(s):", created.len());
    for s in &created {
        println!("  #{} {}", s.id, s.profile.name);
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the full directory as pretty JSON.
pub fn cmd_export(db_path: &Path, backend: &str, output: &Path) -> Result<(), CradleError> {
    let output_path = validate_output_path(output)?;
    let directory = load_directory(db_path, backend)?;
    let startups = directory.list()?;

    let json = serde_json::to_string_pretty(&startups)
        .map_err(|e| CradleError::SerializationError(e.to_string()))?;
    std::fs::write(&output_path, json)
        .map_err(|e| CradleError::IoError(format!("Cannot write '{}': {}", output.display(), e)))?;

    println!(
        "Exported {} startup(s) to {:?}",
        startups.len(),
        output_path
    );
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), CradleError> {
    if backend != "redb" {
        return Err(CradleError::InvalidField(
            "init requires the redb backend".to_string(),
        ));
    }

    if db_path.exists() {
        if !force {
            return Err(CradleError::IoError(format!(
                "Database {:?} already exists (use --force to overwrite)",
                db_path
            )));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| CradleError::IoError(format!("Cannot remove existing database: {}", e)))?;
    }

    let directory = Directory::with_redb(db_path)?;
    println!(
        "Initialized empty database at {:?} ({} startups)",
        db_path,
        directory.count()?
    );
    Ok(())
}
