use clap::{Arg, ArgAction, ArgMatches, Command};
use json_translator::{
    DetectRequest, Dictionary, Explore, GoogleTranslateProvider, JsonTranslator,
    MachineTranslator, MockMode, MockTranslator, MtResult, SourceLanguage, TranslateRequest,
    compose_dictionary,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use tracing::{debug, info};

fn input_arg() -> Arg {
    Arg::new("input")
        .help("JSON file to read")
        .required(true)
        .index(1)
}

fn skip_key_arg() -> Arg {
    Arg::new("skip-key")
        .long("skip-key")
        .short('k')
        .help("Leave strings under this object key untranslated (repeatable)")
        .action(ArgAction::Append)
}

fn dictionary_arg() -> Arg {
    Arg::new("dictionary")
        .long("dictionary")
        .short('d')
        .help("JSON object mapping original strings to reserved translations")
}

fn mock_arg() -> Arg {
    Arg::new("mock")
        .long("mock")
        .short('m')
        .help("Use mock translator instead of Google Translate")
        .action(ArgAction::SetTrue)
}

fn cli() -> Command {
    Command::new("json-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate every string value of a JSON document")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every batch sent to the backend")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate a JSON file into another language")
                .arg(input_arg())
                .arg(
                    Arg::new("target")
                        .help("Target language code (e.g., fr, ko, pt-BR)")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("source")
                        .long("source")
                        .short('s')
                        .help("Source language code (default: detected)")
                        .conflicts_with("no-source"),
                )
                .arg(
                    Arg::new("no-source")
                        .long("no-source")
                        .help("Send no source language and let the backend decide per string")
                        .action(ArgAction::SetTrue),
                )
                .arg(dictionary_arg())
                .arg(skip_key_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the translated JSON here instead of stdout"),
                )
                .arg(mock_arg()),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect the language of a JSON file")
                .arg(input_arg())
                .arg(dictionary_arg())
                .arg(skip_key_arg())
                .arg(mock_arg()),
        )
        .subcommand(
            Command::new("dictionary")
                .about("Build an original → translated dictionary from two JSON files")
                .arg(input_arg())
                .arg(
                    Arg::new("output")
                        .help("Translated counterpart of the input")
                        .required(true)
                        .index(2),
                )
                .arg(skip_key_arg()),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("translate", sub)) if sub.get_flag("mock") => {
            translate(&JsonTranslator::new(MockTranslator::new(MockMode::Suffix)), sub).await
        }
        Some(("translate", sub)) => translate(&JsonTranslator::new(google()?), sub).await,
        Some(("detect", sub)) if sub.get_flag("mock") => {
            detect(&JsonTranslator::new(MockTranslator::new(MockMode::Suffix)), sub).await
        }
        Some(("detect", sub)) => detect(&JsonTranslator::new(google()?), sub).await,
        Some(("dictionary", sub)) => dictionary(sub).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

fn google() -> Result<GoogleTranslateProvider, Box<dyn std::error::Error>> {
    if env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
        eprintln!("❌ GOOGLE_TRANSLATE_API_KEY environment variable not set");
        eprintln!("   Set it with: export GOOGLE_TRANSLATE_API_KEY=your_api_key");
        eprintln!("   Or use --mock to use mock translator");
        return Err("Missing API key".into());
    }
    Ok(GoogleTranslateProvider::from_env()?)
}

async fn read_json(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path, e))?;
    Ok(value)
}

async fn read_dictionary(
    matches: &ArgMatches,
) -> Result<Option<Dictionary>, Box<dyn std::error::Error>> {
    let Some(path) = matches.get_one::<String>("dictionary") else {
        return Ok(None);
    };
    let dictionary: Dictionary = serde_json::from_value(read_json(path).await?)
        .map_err(|e| format!("{} is not an object of strings: {}", path, e))?;
    debug!(path = %path, entries = dictionary.len(), "loaded dictionary");
    Ok(Some(dictionary))
}

/// Filter rejecting leaves under any of the `--skip-key` keys
fn skip_keys(matches: &ArgMatches) -> impl Fn(&Explore<'_>) -> MtResult<bool> + Send + Sync {
    let skipped: Vec<String> = matches
        .get_many::<String>("skip-key")
        .map(|keys| keys.cloned().collect())
        .unwrap_or_default();
    move |explore: &Explore<'_>| -> MtResult<bool> {
        Ok(!explore
            .key
            .is_some_and(|key| skipped.iter().any(|skip| skip == key)))
    }
}

async fn write_json(
    value: &Value,
    path: Option<&String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            tokio::fs::write(Path::new(path), rendered + "\n").await?;
            info!(path = %path, "wrote output");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn translate<T: MachineTranslator>(
    translator: &JsonTranslator<T>,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_path = matches.get_one::<String>("input").ok_or("missing input")?;
    let target = matches.get_one::<String>("target").ok_or("missing target")?;
    let input = read_json(input_path).await?;
    let dictionary = read_dictionary(matches).await?;

    let source = match matches.get_one::<String>("source") {
        Some(code) => SourceLanguage::Code(code.clone()),
        None if matches.get_flag("no-source") => SourceLanguage::Omit,
        None => SourceLanguage::Detect,
    };

    let mut request = TranslateRequest::new(&input, target)
        .source(source)
        .filter(skip_keys(matches));
    if let Some(dictionary) = &dictionary {
        request = request.dictionary(dictionary);
    }

    let output = translator.translate(request).await?;
    write_json(&output, matches.get_one::<String>("output")).await
}

async fn detect<T: MachineTranslator>(
    translator: &JsonTranslator<T>,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_path = matches.get_one::<String>("input").ok_or("missing input")?;
    let input = read_json(input_path).await?;
    let dictionary = read_dictionary(matches).await?;

    let mut request = DetectRequest::new(&input).filter(skip_keys(matches));
    if let Some(dictionary) = &dictionary {
        request = request.dictionary(dictionary);
    }

    match translator.detect(request).await? {
        Some(language) => println!("{}", language),
        None => {
            eprintln!("❌ Could not determine the language of {}", input_path);
            return Err("Undetermined language".into());
        }
    }
    Ok(())
}

async fn dictionary(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let input_path = matches.get_one::<String>("input").ok_or("missing input")?;
    let output_path = matches.get_one::<String>("output").ok_or("missing output")?;
    let input = read_json(input_path).await?;
    let output = read_json(output_path).await?;

    let filter = skip_keys(matches);
    let dictionary = compose_dictionary(&input, &output, Some(&filter))?;
    info!(entries = dictionary.len(), "composed dictionary");

    let sorted: BTreeMap<_, _> = dictionary.into_iter().collect();
    let value = serde_json::to_value(&sorted)?;
    write_json(&value, None).await
}
