use anyhow::{Context, Result, bail};
use civdata::path::default_mods_dir;
use civdata::{
    ErrorSeverity, FallbackSource, LoadContext, PlatformCapabilities, ReferenceValidator,
    Ruleset, RulesetCache,
};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "civrules")]
#[command(about = "Load a base ruleset and its mods into one merged ruleset")]
struct Args {
    /// Base ruleset folder, or its name under the mods folder
    #[arg(long)]
    base: String,

    /// Mod folder or name; repeat to add more, merged in the order given
    #[arg(long = "mod")]
    mods: Vec<String>,

    /// Folder that names given to --base and --mod are looked up in
    #[arg(long)]
    mods_dir: Option<PathBuf>,

    /// Vanilla ruleset folder used to backfill missing categories
    #[arg(long)]
    vanilla: Option<PathBuf>,

    /// Trust the decoder and skip reconciliation
    #[arg(long)]
    trust_decoder: bool,

    /// Run the integrity checks; fails when errors are found
    #[arg(long)]
    check: bool,

    /// Print the merged ruleset as JSON
    #[arg(long)]
    dump: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Combines the base and mods given on the command line.
///
/// Names are looked up in the mods folder cache; a name that is itself a
/// folder is loaded from there and takes the cached entry's place.
fn combine(
    base: &str,
    mods: &[String],
    mods_dir: Option<&Path>,
    context: &LoadContext,
) -> civdata::Result<Ruleset> {
    let mut cache = match mods_dir {
        Some(dir) if dir.is_dir() => RulesetCache::scan(dir, context)?,
        _ => RulesetCache::new(),
    };

    let mut names = Vec::with_capacity(mods.len() + 1);
    for name in std::iter::once(base).chain(mods.iter().map(String::as_str)) {
        let folder = Path::new(name);
        if folder.is_dir() {
            let ruleset = Ruleset::load_dir(folder, context)?;
            names.push(ruleset.name.clone());
            cache.insert(ruleset);
        } else {
            names.push(name.to_string());
        }
    }

    cache.complex_ruleset(&names[0], &names[1..], context)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    if args.trust_decoder {
        PlatformCapabilities::trusted().install();
    }

    let mut context = LoadContext::new();
    if let Some(vanilla) = &args.vanilla {
        context = context.with_fallback(FallbackSource::Directory(vanilla.clone()));
    }

    let mods_dir = args.mods_dir.clone().or_else(default_mods_dir);
    let ruleset = combine(&args.base, &args.mods, mods_dir.as_deref(), &context)
        .context("Failed to load rulesets")?;

    println!("{}: {}", ruleset, ruleset.summary());

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&ruleset)?);
    }

    if args.check {
        let errors = ruleset.error_list(&ReferenceValidator::default());
        for error in &errors {
            println!("{}", error);
        }
        let fatal = errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Error)
            .count();
        if fatal > 0 {
            bail!("{} errors found in {}", fatal, ruleset);
        }
        log::info!("No errors found ({} warnings)", errors.len());
    }

    Ok(())
}
