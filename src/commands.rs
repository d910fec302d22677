//! Subcommand implementations on top of [`AssetLibrary`].

use anyhow::{bail, ensure, Context, Result};
use pwassets_assets::Asset;
use pwassets_core::{AssetType, Identifier, MaterialColor};
use pwassets_library::{
    import_resource, AssetLibrary, CancelToken, LoadReport, ProgressSink, Prompt, PromptAnswer,
    PromptRequest, ResourceKind, TaskOutcome,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

/// Prints percentages on stderr when enabled.
pub struct StderrProgress {
    enabled: bool,
    last: Option<u8>,
}

impl StderrProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }
}

impl ProgressSink for StderrProgress {
    fn report(&mut self, percent: u8) {
        if !self.enabled || self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        eprint!("\r{percent:>3}%");
        if percent >= 100 {
            eprintln!();
        }
    }
}

/// Asks on stdout and reads `y`, `n` or `c` from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, request: &PromptRequest<'_>) -> PromptAnswer {
        let stdin = io::stdin();
        loop {
            print!("{request} [y]es/[n]o/[c]ancel: ");
            if io::stdout().flush().is_err() {
                return PromptAnswer::Cancel;
            }
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return PromptAnswer::Cancel,
                Ok(_) => {}
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return PromptAnswer::Yes,
                "n" | "no" => return PromptAnswer::No,
                "c" | "cancel" => return PromptAnswer::Cancel,
                _ => println!("Please answer y, n or c."),
            }
        }
    }
}

/// Load the library, printing every problem found. Cancellation is an error.
pub fn load(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<LoadReport> {
    let outcome = library
        .load(progress, &CancelToken::new())
        .with_context(|| format!("loading assets from {}", library.root().display()))?;
    let TaskOutcome::Completed(report) = outcome else {
        bail!("loading was cancelled");
    };
    for error in &report.errors {
        eprintln!("error: {error}");
    }
    Ok(report)
}

fn parse_id(input: &str) -> Result<Identifier> {
    Identifier::parse(input).with_context(|| format!("invalid identifier '{input}'"))
}

pub fn validate(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<()> {
    let report = load(library, progress)?;
    ensure!(
        report.is_success(),
        "{} problem(s) found in {} asset(s)",
        report.errors.len(),
        library.assets().len()
    );
    println!("{} assets loaded, no problems found", report.loaded);
    Ok(())
}

pub fn list(
    library: &mut AssetLibrary,
    progress: &mut StderrProgress,
    asset_type: Option<AssetType>,
) -> Result<()> {
    load(library, progress)?;
    let types: Vec<AssetType> = match asset_type {
        Some(asset_type) => vec![asset_type],
        None => AssetType::ALL.to_vec(),
    };
    for asset_type in types {
        for id in library.sorted_identifiers(asset_type) {
            match library.get(&id) {
                Some(asset) => println!("{id}\t{asset}"),
                None => println!("{id}"),
            }
        }
    }
    Ok(())
}

pub fn show(library: &mut AssetLibrary, progress: &mut StderrProgress, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    load(library, progress)?;
    let asset = library
        .get(&id)
        .with_context(|| format!("no asset with identifier {id}"))?;
    println!("{}", asset.to_json_string()?);
    let dependents = library.get_assets_that_depend_on(&id);
    if !dependents.is_empty() {
        eprintln!("used by:");
        for dependent in dependents {
            eprintln!("  {dependent}");
        }
    }
    Ok(())
}

/// Rewrite every asset in the canonical format.
pub fn normalize(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<()> {
    load(library, progress)?;
    let ids: Vec<Identifier> = library
        .assets()
        .iter()
        .filter_map(Asset::identifier)
        .cloned()
        .collect();
    for id in &ids {
        library.mark_changed(id);
    }
    save(library, progress)
}

pub fn cleanup(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<()> {
    let report = load(library, progress)?;
    ensure!(
        report.is_success(),
        "refusing to clean up while assets fail to load"
    );
    let TaskOutcome::Completed(report) = library.cleanup(progress, &CancelToken::new())? else {
        bail!("cleanup was cancelled");
    };
    for file in &report.deleted {
        println!("deleted {}", file.display());
    }
    for dir in &report.removed_dirs {
        println!("removed {}", dir.display());
    }
    for (file, reason) in &report.failed {
        eprintln!("could not delete {}: {reason}", file.display());
    }
    ensure!(report.failed.is_empty(), "some files could not be deleted");
    Ok(())
}

pub fn delete(
    library: &mut AssetLibrary,
    progress: &mut StderrProgress,
    prompt: &mut dyn Prompt,
    id: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    load(library, progress)?;
    match library.delete_asset(&id, prompt)? {
        TaskOutcome::Completed(report) => {
            for file in &report.deleted {
                println!("deleted {}", file.display());
            }
            for (file, reason) in &report.failed {
                eprintln!("could not delete {}: {reason}", file.display());
            }
        }
        TaskOutcome::Cancelled => println!("nothing deleted"),
    }
    Ok(())
}

pub fn refactor(
    library: &mut AssetLibrary,
    progress: &mut StderrProgress,
    from: &str,
    to: &str,
) -> Result<()> {
    let (from, to) = (parse_id(from)?, parse_id(to)?);
    ensure!(
        from.asset_type() == to.asset_type(),
        "{from} and {to} are different kinds of asset"
    );
    load(library, progress)?;
    ensure!(library.has_identifier(&from), "no asset with identifier {from}");
    ensure!(!library.has_identifier(&to), "identifier {to} is already in use");
    ensure!(
        library.can_edit(&from) && library.can_edit(&to),
        "{from} belongs to another author; enable allow_external_edits to change it"
    );
    let changed = library.refactor_identifier(&from, &to)?;
    info!(%from, %to, changed, "refactored");
    println!("{changed} asset(s) updated");
    save(library, progress)
}

pub fn rename_author(
    library: &mut AssetLibrary,
    progress: &mut StderrProgress,
    old: &str,
    new: &str,
) -> Result<()> {
    ensure!(
        !new.is_empty() && !new.contains('.'),
        "author names cannot be empty or contain '.'"
    );
    load(library, progress)?;
    let renamed = library.refactor_author_name(old, new)?;
    println!("{renamed} asset(s) renamed");
    save(library, progress)
}

pub fn authors(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<()> {
    load(library, progress)?;
    let mut authors = library.existing_author_names();
    authors.sort();
    for author in authors {
        println!("{author}");
    }
    Ok(())
}

/// Arguments of the `new-material` subcommand.
pub struct NewMaterial<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub color: Option<&'a str>,
    pub texture: Option<&'a Path>,
}

pub fn new_material(
    library: &mut AssetLibrary,
    progress: &mut StderrProgress,
    prompt: &mut dyn Prompt,
    args: NewMaterial<'_>,
) -> Result<()> {
    let id = parse_id(args.id)?;
    ensure!(
        id.asset_type() == AssetType::Material,
        "{id} is not a material identifier"
    );
    load(library, progress)?;
    ensure!(
        library.can_edit(&id),
        "{id} belongs to another author than '{}'",
        library.author()
    );

    let mut asset = Asset::new(AssetType::Material);
    asset.set_identifier(Some(id.clone()));
    let json_path = asset.default_json_path(library.root());
    asset.set_json_path(Some(json_path.clone()));
    let Asset::Material(material) = &mut asset else {
        bail!("{id} did not create a material");
    };
    material.properties.name = args.name.to_string();
    if let Some(color) = args.color {
        material.properties.color = parse_color(color)?;
    }
    if let Some(texture) = args.texture {
        let source = texture
            .canonicalize()
            .with_context(|| format!("reading texture {}", texture.display()))?;
        let Some(reference) = import_resource(&json_path, &source, ResourceKind::Texture, prompt)?
        else {
            bail!("texture was not imported; material not created");
        };
        material.set_texture(Some(reference))?;
    }

    let id = library.create_asset(asset)?;
    println!("created {id}");
    save(library, progress)
}

/// `0.5` for a gray or `r,g,b` with components in `0..=1`.
fn parse_color(input: &str) -> Result<MaterialColor> {
    let parts: Vec<f32> = input
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid color '{input}'"))?;
    match parts.as_slice() {
        [gray] => Ok(MaterialColor::clamped(*gray, *gray, *gray)),
        [red, green, blue] => Ok(MaterialColor::clamped(*red, *green, *blue)),
        _ => bail!("invalid color '{input}': expected one value or three comma-separated values"),
    }
}

fn save(library: &mut AssetLibrary, progress: &mut StderrProgress) -> Result<()> {
    let TaskOutcome::Completed(report) = library.save_pending(progress, &CancelToken::new()) else {
        bail!("saving was cancelled");
    };
    for (id, reason) in &report.failed {
        warn!(%id, "{reason}");
        eprintln!("could not save {id}: {reason}");
    }
    ensure!(report.is_success(), "{} asset(s) were not saved", report.failed.len());
    println!("{} file(s) written", report.written.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse_as_gray_or_triple() {
        assert_eq!(parse_color("0.5").unwrap(), MaterialColor::GRAY);
        assert_eq!(parse_color("1, 0, 1").unwrap(), MaterialColor::MAGENTA);
        assert_eq!(parse_color("2,0,0").unwrap(), MaterialColor::RED);
        assert!(parse_color("1,0").is_err());
        assert!(parse_color("red").is_err());
    }
}
