use clap::{Arg, ArgAction, Command};
use kiwi_i18n::source::{
    HttpProvider, JsonDirProvider, MessageProvider, StaticProvider, has_supplemental_files,
};
use kiwi_i18n::{I18n, LoadOutcome, Options, Replacements};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("kiwi-i18n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate message keys from a directory or URL of JSON language files")
        .arg(
            Arg::new("key")
                .help("Message key to translate (e.g. auth.failed or auth/failed)")
                .required_unless_present("keys")
                .index(1),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Language to translate into")
                .default_value("en"),
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .short('f')
                .help("Fallback language")
                .default_value("en"),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .short('d')
                .help("Directory with <lang>.json files")
                .default_value("lang")
                .conflicts_with("url"),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .help("Base URL serving <lang>.json files"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('c')
                .help("Pick the plural form for this count")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("replace")
                .long("replace")
                .short('r')
                .help("Placeholder value as name=value (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("Key prefix stripped from untranslated keys"),
        )
        .arg(
            Arg::new("php")
                .long("php")
                .help("Also load php_<lang>.json (detected automatically for --dir)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("preload")
                .long("preload")
                .help("Read every language file of --dir before translating")
                .action(ArgAction::SetTrue)
                .conflicts_with("url"),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .help("List the keys of the loaded language instead of translating")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log loading details to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let lang = matches
        .get_one::<String>("lang")
        .map(String::as_str)
        .unwrap_or("en");
    let fallback = matches
        .get_one::<String>("fallback")
        .map(String::as_str)
        .unwrap_or("en");

    let mut supplemental = matches.get_flag("php");
    let provider: Arc<dyn MessageProvider> = match matches.get_one::<String>("url") {
        Some(url) => Arc::new(HttpProvider::new(url)?),
        None => {
            let dir = matches
                .get_one::<String>("dir")
                .map(String::as_str)
                .unwrap_or("lang");
            if !Path::new(dir).is_dir() {
                return Err(format!("Language directory not found: {}", dir).into());
            }
            supplemental |= has_supplemental_files(Path::new(dir));
            if matches.get_flag("preload") {
                Arc::new(StaticProvider::from_dir(Path::new(dir))?)
            } else {
                Arc::new(JsonDirProvider::new(dir))
            }
        }
    };

    let mut options = Options::new()
        .with_provider(provider)
        .with_active_language(lang)
        .with_fallback_language(fallback)
        .with_supplemental_source(supplemental);
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        options = options.with_default_key_prefix(prefix);
    }

    let i18n = I18n::unloaded(options);
    let loaded = match i18n.load_language_async(lang).await {
        LoadOutcome::Committed(tag) => tag,
        LoadOutcome::Cancelled => return Err("Language load was cancelled".into()),
    };
    if loaded != lang {
        eprintln!("No messages for '{}', using '{}'", lang, loaded);
    }

    if matches.get_flag("keys") {
        for (key, value) in i18n.active_messages().iter() {
            if !value.is_null() {
                println!("{}", key);
            }
        }
        return Ok(());
    }

    let mut replacements = Replacements::new();
    if let Some(pairs) = matches.get_many::<String>("replace") {
        for pair in pairs {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid replacement '{}', expected name=value", pair))?;
            replacements.with(name, value);
        }
    }

    let key = matches
        .get_one::<String>("key")
        .ok_or("A message key is required")?;
    let text = match matches.get_one::<f64>("count") {
        Some(count) => i18n.translate_with_count(key, *count, &replacements),
        None => i18n.translate(key, &replacements),
    };
    println!("{}", text);

    Ok(())
}
