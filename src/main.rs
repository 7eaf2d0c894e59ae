use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use multiloader_lib::core::config::ProjectSettings;
use multiloader_lib::core::intersection::StubOutcome;
use multiloader_lib::GraphResult;

/// Evaluate a multi-loader mod project and print its linked graph
#[derive(Parser)]
#[command(name = "multiloader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project settings file
    project: PathBuf,

    /// Where stub API jars are written (overrides `stubDir`)
    #[arg(long)]
    stub_dir: Option<PathBuf>,

    /// Generate stub API jars for commons shared across Minecraft versions
    #[arg(long)]
    stubs: bool,
}

fn run(cli: Cli) -> GraphResult<String> {
    let mut settings = ProjectSettings::load(&cli.project)?;
    if let Some(dir) = cli.stub_dir {
        settings.stub_dir = Some(dir);
    }

    let mut project = settings.into_project()?;
    project.evaluate()?;

    if cli.stubs {
        let provider = settings.minecraft_provider()?;
        let stub_dir = settings.stub_dir();
        for task in project.stub_api_tasks(&provider, &stub_dir)? {
            match task.run()? {
                StubOutcome::UpToDate => tracing::info!("{} is up to date", task.output.display()),
                StubOutcome::Generated { classes } => {
                    tracing::info!("Wrote {} ({} classes)", task.output.display(), classes)
                }
            }
        }
    }

    Ok(serde_json::to_string_pretty(&project.report())?)
}

fn main() -> ExitCode {
    multiloader_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
