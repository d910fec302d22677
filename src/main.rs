//! pwassets - asset library toolkit for Prego Wars
//!
//! Command line front end for validating and editing a `pw-assets` folder.

mod commands;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use commands::{NewMaterial, StderrProgress, StdinPrompt};
use config::{EditorConfig, DEFAULT_CONFIG_PATH};
use pwassets_core::AssetType;
use pwassets_library::{AssetLibrary, AutoAnswer, Prompt, PromptAnswer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Asset library toolkit for Prego Wars maps, props and materials", long_about = None)]
struct Cli {
    /// Editor configuration file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// The pw-assets directory; overrides the config file
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// Author name; overrides the config file
    #[arg(long, global = true)]
    author: Option<String>,

    /// Allow changing assets of other authors
    #[arg(long, global = true)]
    allow_external_edits: bool,

    /// Answer yes to every question
    #[arg(long, global = true, conflicts_with = "no")]
    yes: bool,

    /// Answer no to every question
    #[arg(long, global = true)]
    no: bool,

    /// Print progress percentages on stderr
    #[arg(long, global = true)]
    progress: bool,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every asset and report parse and validation problems
    Validate,
    /// List identifiers, optionally of one kind only
    List {
        /// map, prop or material
        #[arg(long = "type", value_parser = parse_asset_type)]
        asset_type: Option<AssetType>,
    },
    /// Print an asset's JSON and the assets that use it
    Show { id: String },
    /// Rewrite every asset file in the canonical format
    Normalize,
    /// Delete files no asset references, then empty folders
    Cleanup,
    /// Delete an asset and the files only it uses
    Delete { id: String },
    /// Rename an identifier and every reference to it
    Refactor { from: String, to: String },
    /// Move every asset of one author to another
    RenameAuthor { old: String, new: String },
    /// List the authors of loaded assets
    Authors,
    /// Create a material from a color or a texture file
    NewMaterial {
        /// Identifier such as `me.material.stone`
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// `0.5` or `r,g,b` in 0..=1
        #[arg(long, conflicts_with = "texture", required_unless_present = "texture")]
        color: Option<String>,
        /// PNG or JPG; copied into the asset folder when outside it
        #[arg(long)]
        texture: Option<PathBuf>,
    },
    /// Print the effective configuration, optionally saving it
    Config {
        /// Write the effective configuration back to --config
        #[arg(long)]
        write: bool,
    },
}

fn parse_asset_type(input: &str) -> Result<AssetType, String> {
    AssetType::parse(input).ok_or_else(|| format!("unknown asset type '{input}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // WARN by default (INFO with --verbose); RUST_LOG overrides both.
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pwassets v{}", env!("CARGO_PKG_VERSION"));

    let mut config = EditorConfig::load_from_path(&cli.config);
    if let Some(dir) = &cli.assets_dir {
        config.assets_dir = Some(dir.clone());
    }
    if let Some(author) = &cli.author {
        config.author = author.clone();
    }
    if cli.allow_external_edits {
        config.allow_external_edits = true;
    }

    if let Command::Config { write } = &cli.command {
        print!("{}", toml::to_string_pretty(&config)?);
        if *write {
            config
                .save_to_path(&cli.config)
                .with_context(|| format!("saving {}", cli.config.display()))?;
            info!(path = %cli.config.display(), "configuration saved");
        }
        return Ok(());
    }

    let Some(root) = config.assets_dir.clone() else {
        bail!(
            "no asset directory configured; pass --assets-dir or set assets_dir in {}",
            cli.config.display()
        );
    };
    let mut library = AssetLibrary::new(root);
    library.set_author(config.author.clone());
    library.set_allow_external_edits(config.allow_external_edits);

    let mut prompt: Box<dyn Prompt> = if cli.yes {
        Box::new(AutoAnswer(PromptAnswer::Yes))
    } else if cli.no {
        Box::new(AutoAnswer(PromptAnswer::No))
    } else {
        Box::new(StdinPrompt)
    };
    let mut progress = StderrProgress::new(cli.progress);
    let lib = &mut library;
    let progress = &mut progress;

    match &cli.command {
        Command::Validate => commands::validate(lib, progress),
        Command::List { asset_type } => commands::list(lib, progress, *asset_type),
        Command::Show { id } => commands::show(lib, progress, id),
        Command::Normalize => commands::normalize(lib, progress),
        Command::Cleanup => commands::cleanup(lib, progress),
        Command::Delete { id } => commands::delete(lib, progress, prompt.as_mut(), id),
        Command::Refactor { from, to } => commands::refactor(lib, progress, from, to),
        Command::RenameAuthor { old, new } => commands::rename_author(lib, progress, old, new),
        Command::Authors => commands::authors(lib, progress),
        Command::NewMaterial {
            id,
            name,
            color,
            texture,
        } => commands::new_material(
            lib,
            progress,
            prompt.as_mut(),
            NewMaterial {
                id,
                name,
                color: color.as_deref(),
                texture: texture.as_deref(),
            },
        ),
        Command::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "pwassets",
            "delete",
            "luke.map.mars",
            "--yes",
            "--assets-dir",
            "/tmp/pw-assets",
        ])
        .unwrap();
        assert!(cli.yes);
        assert_eq!(cli.assets_dir, Some(PathBuf::from("/tmp/pw-assets")));
        assert!(matches!(cli.command, Command::Delete { ref id } if id == "luke.map.mars"));
    }

    #[test]
    fn new_material_needs_color_or_texture() {
        assert!(Cli::try_parse_from(["pwassets", "new-material", "a.material.b", "--name", "b"])
            .is_err());
        assert!(Cli::try_parse_from([
            "pwassets",
            "new-material",
            "a.material.b",
            "--name",
            "b",
            "--color",
            "0.5",
            "--texture",
            "b.png"
        ])
        .is_err());
        let cli = Cli::try_parse_from(["pwassets", "list", "--type", "prop"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                asset_type: Some(AssetType::Prop)
            }
        ));
    }
}
