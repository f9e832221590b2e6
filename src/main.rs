//! Launch configuration CLI
//!
//! Entry point for the `launch-config` command-line tool.

use clap::{Parser, Subcommand};
use launch_args::{parse_remap_token, RemapEntry};
use ros2_launch_helpers::config::{
    default_log_options_str, default_node_options_str, log_options_desc, node_options_desc,
    overrides_mapping, remappings_desc, select_node_parameters, BuildRequest, BuiltinDefaults,
    LayeredConfigBuilder, StrictOptions, ITEM_SEPARATOR, KEY_VALUE_SEPARATOR,
};
use ros2_launch_helpers::get_params;
use ros2_launch_helpers::names::{
    create_global_namespace, create_robot_namespace, create_robot_prefix, dottify_namespace,
    underscorify_namespace,
};
use ros2_launch_helpers::value::JsonMapping;
use ros2_launch_helpers::Source;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "launch-config")]
#[command(about = "Resolve layered ROS 2 launch configuration", version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full resolved configuration
    Resolve(ResolveArgs),

    /// Merge a base parameter file with overlays and print the result as YAML
    Params {
        /// Base parameter file (path, file:// or package:// URI)
        base: String,

        /// Comma-separated overlay files
        #[arg(long, short = 'o', default_value = "")]
        overlays: String,

        /// Print only the parameters that apply to this node
        #[arg(long)]
        node: Option<String>,

        /// Output JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Namespace helpers
    Namespace {
        #[command(subcommand)]
        action: NamespaceCommands,
    },

    /// Print default option strings and their descriptions
    Defaults {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct ResolveArgs {
    /// Launch profile (TOML or YAML); flags below override it
    #[arg(long, short = 'p')]
    profile: Option<PathBuf>,

    /// Base parameter file (required without --profile)
    #[arg(long, short = 'b')]
    base: Option<String>,

    /// Overlay parameter files, in precedence order
    #[arg(long, short = 'o', value_delimiter = ',')]
    overlay: Vec<String>,

    /// Parameter override as key.path=value (applied last)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Default remapping rule (from:=to), lowest precedence
    #[arg(long = "remap-default", value_name = "FROM:=TO")]
    remap_default: Vec<String>,

    /// YAML file with remapping rules
    #[arg(long)]
    remap_file: Option<String>,

    /// Comma-separated remappings from the command line
    #[arg(long, value_name = "RULES")]
    remaps: Option<String>,

    /// Comma-separated remappings from the launch argument (highest precedence)
    #[arg(long, value_name = "RULES")]
    launch_arg_remaps: Option<String>,

    /// Node option overrides
    #[arg(long)]
    node_options: Option<String>,

    /// Node option defaults (replaces the built-in defaults)
    #[arg(long)]
    node_options_defaults: Option<String>,

    /// ROS argument overrides
    #[arg(long, allow_hyphen_values = true)]
    ros_args: Option<String>,

    /// ROS argument defaults
    #[arg(long, allow_hyphen_values = true)]
    ros_args_defaults: Option<String>,

    /// Log option overrides
    #[arg(long)]
    log_options: Option<String>,

    /// Log option defaults (replaces the built-in defaults)
    #[arg(long)]
    log_options_defaults: Option<String>,

    /// Select parameters for this node
    #[arg(long)]
    node: Option<String>,

    /// Type-check overlays against the base
    #[arg(long)]
    strict: bool,

    /// With --strict, let integers and floats replace each other
    #[arg(long, requires = "strict")]
    numeric_compat: bool,

    /// Print only the configuration digest
    #[arg(long, conflicts_with = "human")]
    digest: bool,

    /// Output in human-readable format instead of JSON
    #[arg(long)]
    human: bool,
}

#[derive(Subcommand)]
enum NamespaceCommands {
    /// Normalize to a global namespace
    Global { namespace: String },

    /// Join a namespace and a robot name
    Robot { namespace: String, robot: String },

    /// Robot name with a trailing '_'
    Prefix { robot: String },

    /// Replace '/' separators with '.'
    Dottify { namespace: String },

    /// Replace '/' separators with '_'
    Underscorify { namespace: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve(args) => run_resolve(args),
        Commands::Params {
            base,
            overlays,
            node,
            json,
        } => run_params(&base, &overlays, node.as_deref(), json),
        Commands::Namespace { action } => run_namespace(action),
        Commands::Defaults { json } => run_defaults(json),
    }
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    process::exit(1);
}

fn build_request(args: &ResolveArgs) -> Result<BuildRequest, String> {
    let mut request = match (&args.profile, &args.base) {
        (Some(profile), _) => BuildRequest::from_profile(profile).map_err(|e| e.to_string())?,
        (None, Some(base)) => BuildRequest::new(base.as_str()),
        (None, None) => return Err("either --profile or --base is required".to_string()),
    };

    if let (Some(_), Some(base)) = (&args.profile, &args.base) {
        request.base = Source::path(base.as_str());
    }

    for overlay in &args.overlay {
        request = request.with_overlay(overlay.as_str());
    }
    if !args.set.is_empty() {
        let literal =
            overrides_mapping(args.set.iter().map(String::as_str)).map_err(|e| e.to_string())?;
        request = request.with_overlay(literal);
    }

    if !args.remap_default.is_empty() {
        request.remaps.defaults = args
            .remap_default
            .iter()
            .map(|rule| parse_remap_token(rule, "--remap-default"))
            .collect::<Result<Vec<RemapEntry>, _>>()
            .map_err(|e| e.to_string())?;
    }
    if let Some(file) = &args.remap_file {
        request.remaps.file = Some(file.clone());
    }
    if let Some(cli) = &args.remaps {
        request.remaps.cli = cli.clone();
    }
    if let Some(launch_arg) = &args.launch_arg_remaps {
        request.remaps.launch_arg = launch_arg.clone();
    }

    let options = &mut request.options;
    if let Some(v) = &args.node_options {
        options.node_options.overrides = v.clone();
    }
    if let Some(v) = &args.node_options_defaults {
        options.node_options.defaults = Some(v.clone());
    }
    if let Some(v) = &args.ros_args {
        options.ros_arguments.overrides = v.clone();
    }
    if let Some(v) = &args.ros_args_defaults {
        options.ros_arguments.defaults = Some(v.clone());
    }
    if let Some(v) = &args.log_options {
        options.log_options.overrides = v.clone();
    }
    if let Some(v) = &args.log_options_defaults {
        options.log_options.defaults = Some(v.clone());
    }

    if let Some(node) = &args.node {
        request.node_name = Some(node.clone());
    }
    if args.strict {
        request.strict = Some(StrictOptions {
            numeric_compat: args.numeric_compat,
            ..Default::default()
        });
    }

    Ok(request)
}

fn run_resolve(args: ResolveArgs) {
    let request = match build_request(&args) {
        Ok(r) => r,
        Err(e) => fail("Invalid arguments", e),
    };

    let config = match LayeredConfigBuilder::new().build(&request) {
        Ok(c) => c,
        Err(e) => fail("Error resolving configuration", e),
    };

    if args.digest {
        match config.digest() {
            Ok(digest) => println!("{}", digest),
            Err(e) => fail("Error computing digest", e),
        }
    } else if args.human {
        print!("{}", config.to_human());
    } else {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => fail("Error serializing output", e),
        }
    }
}

fn run_params(base: &str, overlays: &str, node: Option<&str>, json: bool) {
    let params = match get_params(base, overlays) {
        Ok(p) => p,
        Err(e) => fail("Error loading parameters", e),
    };
    let params = match node {
        Some(node) => select_node_parameters(&params, node),
        None => params,
    };

    let output = if json {
        serde_json::to_string_pretty(&JsonMapping(&params)).map_err(|e| e.to_string())
    } else {
        serde_yaml::to_string(&params).map_err(|e| e.to_string())
    };
    match output {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => fail("Error serializing output", e),
    }
}

fn run_namespace(action: NamespaceCommands) {
    let result = match action {
        NamespaceCommands::Global { namespace } => create_global_namespace(&namespace),
        NamespaceCommands::Robot { namespace, robot } => create_robot_namespace(&namespace, &robot),
        NamespaceCommands::Prefix { robot } => create_robot_prefix(&robot),
        NamespaceCommands::Dottify { namespace } => dottify_namespace(&namespace),
        NamespaceCommands::Underscorify { namespace } => underscorify_namespace(&namespace),
    };

    match result {
        Ok(value) => println!("{}", value),
        Err(e) => fail("Error", e),
    }
}

fn run_defaults(json: bool) {
    let node_options = default_node_options_str(ITEM_SEPARATOR, KEY_VALUE_SEPARATOR);
    let log_options = default_log_options_str(ITEM_SEPARATOR, KEY_VALUE_SEPARATOR);

    if json {
        let value = serde_json::json!({
            "defaults": BuiltinDefaults::default().to_value(),
            "node_options": node_options,
            "log_options": log_options,
            "descriptions": {
                "node_options": node_options_desc(),
                "log_options": log_options_desc(),
                "remappings": remappings_desc()
            }
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => fail("Error serializing output", e),
        }
        return;
    }

    println!("node options: {}", node_options);
    println!("  {}", node_options_desc());
    println!("log options:  {}", log_options);
    println!("  {}", log_options_desc());
    println!("remappings:");
    println!("  {}", remappings_desc());
}
