//! wkld CLI
//!
//! Entry point for the `wkld` command-line tool.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::{self, Command};
use tracing_subscriber::EnvFilter;

use wkld::build::{derive, ImageRef};
use wkld::config::EffectiveSettings;
use wkld::manifest::{
    default_http_path, BackendServiceProps, ExistingService, LoadBalancedWebServiceProps,
    Manifest, ResolvedManifest, ServiceProps, WorkloadKind, WorkloadProps,
};
use wkld::{apply_env, fingerprint, Error, TemplateRenderer, Workspace, WriteOutcome};

/// Log filter variable; overrides `-v`.
const LOG_ENV: &str = "WKLD_LOG";

#[derive(Parser)]
#[command(name = "wkld")]
#[command(about = "Workload manifests with per-environment overrides", version)]
struct Cli {
    /// Workspace root holding one directory per workload
    #[arg(long, short = 'w', global = true, default_value = ".")]
    workspace: PathBuf,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a manifest for a new workload
    Init {
        /// Workload name
        #[arg(long, short = 'n')]
        name: String,

        /// Workload type ("Load Balanced Web Service", "Backend Service", lb-web, backend)
        #[arg(long = "type", short = 't')]
        kind: String,

        /// Dockerfile path relative to the workspace root
        #[arg(long, short = 'd', conflicts_with_all = ["builder", "buildpack"])]
        dockerfile: Option<String>,

        /// Buildpack builder image
        #[arg(long, conflicts_with = "buildpack")]
        builder: Option<String>,

        /// Build with the default buildpack builder
        #[arg(long)]
        buildpack: bool,

        /// Container port (load balanced services default to 80)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },

    /// Print the manifest resolved for an environment
    Resolve {
        #[arg(long, short = 'n')]
        name: String,

        /// Environment (default: settings default_env)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Output JSON with the manifest fingerprint
        #[arg(long)]
        json: bool,
    },

    /// Print, or run, the image build commands for an environment
    Build {
        #[arg(long, short = 'n')]
        name: String,

        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Image tag (default: settings image_tag)
        #[arg(long)]
        tag: Option<String>,

        /// Repository URI (default: <registry>/<name>)
        #[arg(long)]
        uri: Option<String>,

        /// Also push every tag
        #[arg(long)]
        push: bool,

        /// Run the commands instead of printing them
        #[arg(long)]
        exec: bool,

        /// Output the build arguments as JSON
        #[arg(long, conflicts_with = "exec")]
        json: bool,
    },

    /// List workload manifests in the workspace
    Ls {
        #[arg(long)]
        json: bool,
    },

    /// Show the effective workspace settings
    Settings,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            name,
            kind,
            dockerfile,
            builder,
            buildpack,
            port,
        } => run_init(&cli.workspace, &name, &kind, dockerfile, builder, buildpack, port),
        Commands::Resolve { name, env, json } => run_resolve(&cli.workspace, &name, env, json),
        Commands::Build {
            name,
            env,
            tag,
            uri,
            push,
            exec,
            json,
        } => run_build(
            &cli.workspace,
            &name,
            env,
            BuildFlags {
                tag,
                uri,
                push,
                exec,
                json,
            },
        ),
        Commands::Ls { json } => run_ls(&cli.workspace, json),
        Commands::Settings => run_settings(&cli.workspace),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_workspace(
    root: &Path,
    cli_overrides: Option<serde_json::Value>,
) -> Result<(Workspace, EffectiveSettings), Error> {
    let settings = EffectiveSettings::for_workspace(root, cli_overrides)?;
    let workspace = Workspace::new(root).with_manifest_file(settings.manifest_file());
    Ok((workspace, settings))
}

fn run_init(
    root: &Path,
    name: &str,
    kind: &str,
    dockerfile: Option<String>,
    builder: Option<String>,
    buildpack: bool,
    port: Option<u16>,
) -> Result<(), Error> {
    let (workspace, settings) = open_workspace(root, None)?;
    let kind: WorkloadKind = kind.parse()?;

    let builder = builder.or_else(|| buildpack.then(|| settings.default_builder().to_string()));
    let dockerfile = match (&dockerfile, &builder) {
        (None, None) => Some(format!("{}/{}", name, settings.dockerfile_name())),
        _ => dockerfile,
    };
    let workload = WorkloadProps {
        name: name.to_string(),
        dockerfile,
        builder,
    };

    let props = match kind {
        WorkloadKind::LoadBalancedWebService => {
            let existing: Vec<ExistingService> = workspace
                .discover()?
                .into_iter()
                .map(|entry| ExistingService {
                    name: entry.name,
                    kind: entry.kind,
                })
                .collect();
            ServiceProps::LoadBalanced(LoadBalancedWebServiceProps {
                workload,
                path: default_http_path(name, &existing),
                port: port.unwrap_or(80),
            })
        }
        WorkloadKind::BackendService => ServiceProps::Backend(BackendServiceProps {
            workload,
            port: port.unwrap_or(0),
            healthcheck: None,
        }),
    };

    let manifest = Manifest::new(props)?;
    let renderer = TemplateRenderer::new()?;
    let rendered = renderer.render_manifest(&ResolvedManifest::from_base(&manifest))?;

    let path = workspace.manifest_path(name);
    match workspace.write_manifest(name, &rendered)? {
        WriteOutcome::Created => {
            println!("Wrote manifest for {} \"{}\" at {}", kind, name, path.display())
        }
        WriteOutcome::Exists => println!(
            "Manifest for \"{}\" already exists at {}, skipping",
            name,
            path.display()
        ),
    }
    Ok(())
}

fn run_resolve(root: &Path, name: &str, env: Option<String>, json: bool) -> Result<(), Error> {
    let (workspace, settings) = open_workspace(root, None)?;
    let env = env.unwrap_or_else(|| settings.default_env().to_string());

    let manifest = workspace.load(name)?;
    let resolved = apply_env(&manifest, &env)?;

    if json {
        let output = serde_json::json!({
            "fingerprint": fingerprint(&resolved)?,
            "manifest": resolved,
        });
        println!("{}", to_pretty_json(&output)?);
    } else {
        let yaml = serde_yaml::to_string(&resolved).map_err(wkld::manifest::ManifestError::from)?;
        print!("{}", yaml);
    }
    Ok(())
}

struct BuildFlags {
    tag: Option<String>,
    uri: Option<String>,
    push: bool,
    exec: bool,
    json: bool,
}

fn run_build(root: &Path, name: &str, env: Option<String>, flags: BuildFlags) -> Result<(), Error> {
    let overrides = flags
        .tag
        .as_ref()
        .map(|tag| serde_json::json!({ "image_tag": tag }));
    let (workspace, settings) = open_workspace(root, overrides)?;
    let env = env.unwrap_or_else(|| settings.default_env().to_string());

    let manifest = workspace.load(name)?;
    let resolved = apply_env(&manifest, &env)?;

    let uri = flags
        .uri
        .or_else(|| settings.repository_uri(&manifest.name))
        .unwrap_or_default();
    let image = ImageRef::new(uri, settings.image_tag().unwrap_or_default())
        .with_additional_tags(settings.additional_tags());

    let args = derive(&resolved, workspace.root(), &image)?;

    if flags.json {
        println!("{}", to_pretty_json(&args)?);
        return Ok(());
    }

    let mut commands = args.build_commands();
    if flags.push {
        commands.extend(args.push_commands());
    }

    for cmd in &commands {
        println!("{}", cmd);
        if flags.exec {
            let status = Command::new(&cmd.program).args(&cmd.args).status()?;
            if !status.success() {
                eprintln!("Command failed: {}", cmd);
                process::exit(status.code().unwrap_or(1));
            }
        }
    }
    Ok(())
}

fn run_ls(root: &Path, json: bool) -> Result<(), Error> {
    let (workspace, _) = open_workspace(root, None)?;
    let entries = workspace.discover()?;

    if json {
        println!("{}", to_pretty_json(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No workloads found in {}.", workspace.root().display());
        return Ok(());
    }

    for entry in entries {
        let envs = if entry.environments.is_empty() {
            "-".to_string()
        } else {
            entry.environments.join(", ")
        };
        println!("  {:<24} {:<28} {}", entry.name, entry.kind.as_str(), envs);
    }
    Ok(())
}

fn run_settings(root: &Path) -> Result<(), Error> {
    let (_, settings) = open_workspace(root, None)?;
    println!("{}", to_pretty_json(&settings)?);
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("JSON serialization failed: {}", e),
        ))
    })
}
