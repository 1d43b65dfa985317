// citemark CLI
//
// Annotates markdown read from a file or stdin. Titles come from an
// optional JSON map (`"entityType:entityId" -> title`) served through
// the in-memory StaticTitles resolver.

use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result, bail};
use citemark::{AnnotateConfig, Annotator, FallbackPolicy, StaticTitles, TitleCache};

const USAGE: &str = "\
usage: citemark [FILE] [--titles MAP.json] [--refs] [--key-fallback]

  FILE            markdown input (stdin when omitted)
  --titles PATH   JSON object mapping \"type:id\" to a display title
  --refs          print the reference list as JSON after the text
  --key-fallback  list entities with failed lookups under their key";

struct Args {
    input: Option<String>,
    titles: Option<String>,
    refs: bool,
    key_fallback: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        input: None,
        titles: None,
        refs: false,
        key_fallback: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--titles" => {
                args.titles = Some(iter.next().context("--titles requires a path")?);
            }
            "--refs" => args.refs = true,
            "--key-fallback" => args.key_fallback = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag '{flag}'\n{USAGE}"),
            file if args.input.is_none() => args.input = Some(file.to_string()),
            extra => bail!("unexpected argument '{extra}'\n{USAGE}"),
        }
    }
    Ok(args)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn load_titles(path: Option<&str>) -> Result<StaticTitles> {
    let Some(path) = path else {
        return Ok(StaticTitles::default());
    };
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let titles: HashMap<String, String> =
        serde_json::from_str(&raw).with_context(|| format!("invalid title map in {path}"))?;
    Ok(StaticTitles::new(titles))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;
    let text = read_input(args.input.as_deref())?;
    let resolver = load_titles(args.titles.as_deref())?;

    let fallback = if args.key_fallback {
        FallbackPolicy::KeyAsTitle
    } else {
        FallbackPolicy::OmitEntry
    };
    let annotator = Annotator::new(AnnotateConfig::new().with_fallback(fallback));
    let cache = TitleCache::new();

    let annotated = annotator.annotate(&text, &resolver, &cache).await;

    print!("{}", annotated.text);
    if args.refs {
        let refs = serde_json::to_string_pretty(&annotated.references)
            .context("failed to serialize reference list")?;
        println!("\n{refs}");
    }

    Ok(())
}
