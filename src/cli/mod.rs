//! Command line interface for the release packager.
//!
//! Parses arguments, resolves the version, runs the requested actions and
//! reports the produced artifacts.

mod args;
mod output;

pub use args::{Action, Args, RuntimeConfig};
pub use output::{OutputManager, append_github_outputs};

use crate::error::{CliError, Result};
use crate::packager::{
    Artifact, CommandExecutor, RecordingExecutor, Releaser, Settings, SystemExecutor,
    version::read_version,
};

/// Main CLI entry point for already parsed arguments.
///
/// Returns the process exit code.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let config = RuntimeConfig::from(&args);
    let output = config.output();

    let version = match &args.release_version {
        Some(version) => version.trim().to_string(),
        None => read_version(&args.version_header_path(), &args.version_prefix).await?,
    };
    let settings = args.settings(&version)?;

    print_arguments(output, &args, &settings)?;
    if args.dry_run {
        output.warn("dry run: git is not invoked, archives contain only the marker files")?;
    }

    let artifacts = if args.dry_run {
        release(settings.clone(), RecordingExecutor::dry_run(), &args.actions, output).await?
    } else {
        which::which("git").map_err(|e| CliError::ExecutionFailed {
            command: "git".to_string(),
            reason: format!("not found in PATH: {e}"),
        })?;
        let executor = SystemExecutor::new(settings.root());
        release(settings.clone(), executor, &args.actions, output).await?
    };

    print_summary(output, &artifacts)?;
    output.success(&format!(
        "Created {} artifact(s) in {}",
        artifacts.len(),
        settings.dist_path().display()
    ))?;

    if let Some(path) = config.github_output() {
        let mut outputs = vec![
            ("project".to_string(), settings.project().to_string()),
            ("version".to_string(), settings.version().to_string()),
        ];
        for artifact in &artifacts {
            let file_name = artifact
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            outputs.push((artifact.key.to_string(), file_name));
        }
        append_github_outputs(path, &outputs).await?;
        log::debug!("Wrote {} step output(s) to {}", outputs.len(), path.display());
    }

    Ok(0)
}

/// Runs every requested action once, in the order given.
async fn release<E: CommandExecutor>(
    settings: Settings,
    executor: E,
    actions: &[Action],
    output: &OutputManager,
) -> Result<Vec<Artifact>> {
    let releaser = Releaser::new(settings, executor).await?;
    let mut artifacts = Vec::new();
    let mut done = Vec::new();

    for action in actions {
        if done.contains(action) {
            continue;
        }
        done.push(*action);

        match action {
            Action::Source => {
                output.section("Creating source archives")?;
                let created = releaser.create_source_archives().await?;
                for artifact in &created {
                    output.indent(&artifact.path.display().to_string())?;
                }
                output.end_section()?;
                artifacts.extend(created);
            }
        }
    }

    Ok(artifacts)
}

fn print_arguments(output: &OutputManager, args: &Args, settings: &Settings) -> Result<()> {
    let actions: Vec<&str> = args
        .actions
        .iter()
        .map(|action| match action {
            Action::Source => "source",
        })
        .collect();
    let formats: Vec<String> = settings.formats().iter().map(|f| f.to_string()).collect();

    output.section("Arguments")?;
    output.indent(&format!("project = {}", settings.project()))?;
    output.indent(&format!("version = {}", settings.version()))?;
    output.indent(&format!("commit  = {}", settings.commit()))?;
    output.indent(&format!("root    = {}", settings.root().display()))?;
    output.indent(&format!("out     = {}", settings.dist_path().display()))?;
    output.indent(&format!("actions = [{}]", actions.join(", ")))?;
    output.indent(&format!("formats = [{}]", formats.join(", ")))?;
    output.indent(&format!("dry     = {}", args.dry_run))?;
    output.indent(&format!("force   = {}", settings.force()))?;
    output.end_section()?;
    Ok(())
}

fn print_summary(output: &OutputManager, artifacts: &[Artifact]) -> Result<()> {
    output.section("Summary")?;
    if artifacts.is_empty() {
        output.indent("no artifacts")?;
    }
    for artifact in artifacts {
        output.indent(&summary_line(artifact))?;
    }
    output.end_section()?;
    Ok(())
}

/// `key = path (size bytes, sha256)`
fn summary_line(artifact: &Artifact) -> String {
    format!(
        "{} = {} ({} bytes, {})",
        artifact.key,
        artifact.path.display(),
        artifact.size,
        artifact.checksum
    )
}
